use crate::balance::source::LedgerSource;
use crate::balance::transfers::{minimize_transfers, TransferSuggestion};
use crate::core::ids::{ExpenseId, GroupId};
use crate::core::ledger::NetLedger;
use crate::core::money::Money;
use crate::core::participant::{Member, ParticipantId};
use crate::core::record::{ExpenseRecord, ExpenseSplitRecord, SettlementRecord};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors arising from balance computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("amounts in group {0} exceed the representable range")]
    AmountOverflow(GroupId),
}

/// A member's net position in a group.
///
/// Positive: the group owes them. Negative: they owe the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetBalance {
    pub user_id: ParticipantId,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "netPaise")]
    pub net: Money,
}

impl NetBalance {
    /// A balance with no profile details attached.
    pub fn bare(user_id: impl Into<String>, net: Money) -> Self {
        Self {
            user_id: ParticipantId::new(user_id),
            name: None,
            email: None,
            net,
        }
    }

    fn for_member(member: &Member, net: Money) -> Self {
        Self {
            user_id: member.user_id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
            net,
        }
    }

    pub fn is_creditor(&self) -> bool {
        self.net.is_positive()
    }

    pub fn is_debtor(&self) -> bool {
        self.net.is_negative()
    }
}

/// Net balances of every group member plus the suggested payments that
/// would settle them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBalances {
    pub net_balances: Vec<NetBalance>,
    pub suggestions: Vec<TransferSuggestion>,
}

impl GroupBalances {
    /// Net position of one member, zero if they are not in the group.
    pub fn net_of(&self, user: &ParticipantId) -> Money {
        self.net_balances
            .iter()
            .find(|b| &b.user_id == user)
            .map(|b| b.net)
            .unwrap_or(Money::ZERO)
    }

    /// Sum of all net balances. Zero whenever every member with a non-zero
    /// position is still in the group.
    pub fn total(&self) -> Money {
        self.net_balances.iter().map(|b| b.net).sum()
    }

    /// Amount still to change hands.
    pub fn total_outstanding(&self) -> Money {
        self.net_balances
            .iter()
            .filter(|b| b.is_creditor())
            .map(|b| b.net)
            .sum()
    }

    pub fn is_settled(&self) -> bool {
        self.net_balances.iter().all(|b| b.net.is_zero())
    }
}

impl std::fmt::Display for GroupBalances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Net Balances ===")?;
        for b in &self.net_balances {
            let label = b
                .name
                .as_deref()
                .or(b.email.as_deref())
                .unwrap_or_else(|| b.user_id.as_str());
            let status = if b.is_creditor() {
                "gets back"
            } else if b.is_debtor() {
                "owes"
            } else {
                "settled"
            };
            writeln!(f, "  {:<24} {:>12}  {}", label, b.net.format_major(2), status)?;
        }

        writeln!(f, "\n=== Suggested Payments ===")?;
        if self.suggestions.is_empty() {
            writeln!(f, "  Everyone is settled up.")?;
        }
        for s in &self.suggestions {
            writeln!(f, "  {} pays {} {}", s.from, s.to, s.amount.format_major(2))?;
        }
        Ok(())
    }
}

/// Reduces a group's ledger rows to per-member balances.
pub struct BalanceEngine;

impl BalanceEngine {
    /// Compute current balances and suggested payments for a group.
    ///
    /// Every call recomputes from the full record history; nothing is
    /// cached between calls.
    pub fn compute_group_balances<S: LedgerSource + ?Sized>(
        source: &S,
        group: &GroupId,
    ) -> Result<GroupBalances, BalanceError> {
        let members = source
            .members(group)
            .ok_or_else(|| BalanceError::GroupNotFound(group.clone()))?;

        let expenses = source.active_expenses(group);
        let splits = if expenses.is_empty() {
            Vec::new()
        } else {
            let ids: Vec<ExpenseId> = expenses.iter().map(|e| e.id()).collect();
            source.active_splits(&ids)
        };
        let settlements = source.settlements(group);

        if Self::gross_volume(&expenses, &splits, &settlements) > i64::MAX as i128 {
            return Err(BalanceError::AmountOverflow(group.clone()));
        }

        let ledger = Self::net_ledger(&members, &expenses, &splits, &settlements);
        let net_balances: Vec<NetBalance> = members
            .iter()
            .map(|m| NetBalance::for_member(m, ledger.position(&m.user_id)))
            .collect();
        let suggestions = minimize_transfers(&net_balances);

        debug!(
            "group {}: {} members, {} expenses, {} splits, {} settlements -> {} suggestions",
            group,
            members.len(),
            expenses.len(),
            splits.len(),
            settlements.len(),
            suggestions.len()
        );

        Ok(GroupBalances {
            net_balances,
            suggestions,
        })
    }

    /// Sum of the magnitudes of every row. No running position, nor the
    /// ledger total, can exceed it, so a volume within `i64` range means
    /// the reduction cannot overflow.
    pub fn gross_volume(
        expenses: &[ExpenseRecord],
        splits: &[ExpenseSplitRecord],
        settlements: &[SettlementRecord],
    ) -> i128 {
        let magnitude = |m: Money| (m.minor_units() as i128).abs();
        expenses.iter().map(|e| magnitude(e.amount())).sum::<i128>()
            + splits.iter().map(|s| magnitude(s.share)).sum::<i128>()
            + settlements.iter().map(|s| magnitude(s.amount())).sum::<i128>()
    }

    /// Pure reduction of ledger rows into net positions.
    ///
    /// # Algorithm
    ///
    /// 1. Every member starts at zero.
    /// 2. Each split debits its participant by the share.
    /// 3. Each expense credits its payer with the full amount, whether or
    ///    not the payer took part in the split.
    /// 4. Each settlement credits the payer and debits the payee.
    ///
    /// Deleted expenses, deleted splits and splits of deleted expenses are
    /// skipped, so callers may pass unfiltered rows.
    pub fn net_ledger(
        members: &[Member],
        expenses: &[ExpenseRecord],
        splits: &[ExpenseSplitRecord],
        settlements: &[SettlementRecord],
    ) -> NetLedger {
        let mut ledger = NetLedger::with_participants(members.iter().map(|m| &m.user_id));

        let live: HashSet<ExpenseId> = expenses
            .iter()
            .filter(|e| !e.is_deleted())
            .map(|e| e.id())
            .collect();

        for split in splits {
            if split.is_deleted || !live.contains(&split.expense_id) {
                continue;
            }
            ledger.debit(&split.user_id, split.share);
        }

        for expense in expenses.iter().filter(|e| !e.is_deleted()) {
            ledger.credit(expense.paid_by(), expense.amount());
        }

        for settlement in settlements {
            ledger.apply_transfer(settlement.from(), settlement.to(), settlement.amount());
        }

        ledger
    }
}
