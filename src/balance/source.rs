use crate::core::ids::{ExpenseId, GroupId};
use crate::core::participant::Member;
use crate::core::record::{ExpenseRecord, ExpenseSplitRecord, SettlementRecord};

/// Read access to a group's ledger rows.
///
/// Implementations hand back a consistent point-in-time snapshot; the
/// balance engine never writes through this trait.
pub trait LedgerSource {
    /// Members of the group, or `None` if the group does not exist.
    fn members(&self, group: &GroupId) -> Option<Vec<Member>>;

    /// Expenses of the group that have not been soft-deleted.
    fn active_expenses(&self, group: &GroupId) -> Vec<ExpenseRecord>;

    /// Non-deleted splits belonging to any of `expenses`.
    fn active_splits(&self, expenses: &[ExpenseId]) -> Vec<ExpenseSplitRecord>;

    /// Every settlement recorded in the group.
    fn settlements(&self, group: &GroupId) -> Vec<SettlementRecord>;
}

impl<T: LedgerSource + ?Sized> LedgerSource for &T {
    fn members(&self, group: &GroupId) -> Option<Vec<Member>> {
        (**self).members(group)
    }

    fn active_expenses(&self, group: &GroupId) -> Vec<ExpenseRecord> {
        (**self).active_expenses(group)
    }

    fn active_splits(&self, expenses: &[ExpenseId]) -> Vec<ExpenseSplitRecord> {
        (**self).active_splits(expenses)
    }

    fn settlements(&self, group: &GroupId) -> Vec<SettlementRecord> {
        (**self).settlements(group)
    }
}
