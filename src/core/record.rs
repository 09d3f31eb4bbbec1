use crate::core::ids::{ExpenseId, GroupId, SettlementId};
use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an expense was divided among its participants.
///
/// This is the persisted tag only; the data each policy needs lives in
/// [`SplitPolicy`](crate::split::SplitPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitKind {
    Equal,
    Exact,
    Percent,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitKind::Equal => "EQUAL",
            SplitKind::Exact => "EXACT",
            SplitKind::Percent => "PERCENT",
        };
        f.write_str(s)
    }
}

/// Who soft-deleted an expense, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deletion {
    pub at: DateTime<Utc>,
    pub by: ParticipantId,
}

/// An expense paid by one member on behalf of some participants.
///
/// Expenses are never mutated after creation except for being
/// soft-deleted, and are never removed from storage.
///
/// # Examples
///
/// ```
/// use group_ledger::core::money::Money;
/// use group_ledger::core::ids::GroupId;
/// use group_ledger::core::participant::ParticipantId;
/// use group_ledger::core::record::{ExpenseRecord, SplitKind};
///
/// let dinner = ExpenseRecord::new(
///     GroupId::new("trip"),
///     "Dinner",
///     Money::new(1_500),
///     ParticipantId::new("asha"),
///     SplitKind::Equal,
/// );
/// assert!(!dinner.is_deleted());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    id: ExpenseId,
    group_id: GroupId,
    description: String,
    /// Total paid. Always positive.
    amount: Money,
    currency: String,
    paid_by: ParticipantId,
    split_kind: SplitKind,
    created_at: DateTime<Utc>,
    #[serde(default)]
    idempotency_key: Option<String>,
    #[serde(default)]
    deleted: Option<Deletion>,
}

impl ExpenseRecord {
    /// Create a new, live expense.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(
        group_id: GroupId,
        description: impl Into<String>,
        amount: Money,
        paid_by: ParticipantId,
        split_kind: SplitKind,
    ) -> Self {
        assert!(
            amount.is_positive(),
            "Expense amount must be positive, got {}",
            amount
        );
        Self {
            id: ExpenseId::generate(),
            group_id,
            description: description.into(),
            amount,
            currency: crate::store::DEFAULT_CURRENCY.to_string(),
            paid_by,
            split_kind,
            created_at: Utc::now(),
            idempotency_key: None,
            deleted: None,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Mark the expense as deleted. Its splits must be marked in the same step.
    pub fn mark_deleted(&mut self, by: ParticipantId, at: DateTime<Utc>) {
        self.deleted = Some(Deletion { at, by });
    }

    // --- Accessors ---

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn paid_by(&self) -> &ParticipantId {
        &self.paid_by
    }

    pub fn split_kind(&self) -> SplitKind {
        self.split_kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn idempotency_key(&self) -> Option<&str> {
        self.idempotency_key.as_deref()
    }

    pub fn deletion(&self) -> Option<&Deletion> {
        self.deleted.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

/// One participant's share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplitRecord {
    pub expense_id: ExpenseId,
    pub user_id: ParticipantId,
    pub share: Money,
    #[serde(default)]
    pub is_deleted: bool,
}

impl ExpenseSplitRecord {
    pub fn new(expense_id: ExpenseId, user_id: ParticipantId, share: Money) -> Self {
        Self {
            expense_id,
            user_id,
            share,
            is_deleted: false,
        }
    }
}

/// A real-world payment already made from one member to another.
///
/// Settlements are immutable and never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    id: SettlementId,
    group_id: GroupId,
    from: ParticipantId,
    to: ParticipantId,
    /// Amount paid. Always positive.
    amount: Money,
    #[serde(default)]
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl SettlementRecord {
    /// Record that `from` paid `to`.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is not positive.
    pub fn new(group_id: GroupId, from: ParticipantId, to: ParticipantId, amount: Money) -> Self {
        assert!(
            amount.is_positive(),
            "Settlement amount must be positive, got {}",
            amount
        );
        Self {
            id: SettlementId::generate(),
            group_id,
            from,
            to,
            amount,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn id(&self) -> SettlementId {
        self.id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn from(&self) -> &ParticipantId {
        &self.from
    }

    pub fn to(&self) -> &ParticipantId {
        &self.to
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_expense() -> ExpenseRecord {
        ExpenseRecord::new(
            GroupId::new("flat"),
            "Groceries",
            Money::new(2_000),
            ParticipantId::new("asha"),
            SplitKind::Equal,
        )
    }

    #[test]
    fn test_expense_creation() {
        let e = sample_expense();
        assert_eq!(e.group_id().as_str(), "flat");
        assert_eq!(e.amount(), Money::new(2_000));
        assert_eq!(e.paid_by().as_str(), "asha");
        assert_eq!(e.currency(), "INR");
        assert!(!e.is_deleted());
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_expense_zero_amount() {
        ExpenseRecord::new(
            GroupId::new("flat"),
            "Nothing",
            Money::ZERO,
            ParticipantId::new("asha"),
            SplitKind::Exact,
        );
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_settlement_negative_amount() {
        SettlementRecord::new(
            GroupId::new("flat"),
            ParticipantId::new("ravi"),
            ParticipantId::new("asha"),
            Money::new(-100),
        );
    }

    #[test]
    fn test_expense_soft_delete() {
        let mut e = sample_expense();
        let at = Utc::now();
        e.mark_deleted(ParticipantId::new("ravi"), at);
        assert!(e.is_deleted());
        let deletion = e.deletion().unwrap();
        assert_eq!(deletion.by.as_str(), "ravi");
        assert_eq!(deletion.at, at);
    }

    #[test]
    fn test_split_kind_wire_names() {
        assert_eq!(serde_json::to_string(&SplitKind::Percent).unwrap(), "\"PERCENT\"");
        let kind: SplitKind = serde_json::from_str("\"EXACT\"").unwrap();
        assert_eq!(kind, SplitKind::Exact);
    }
}
