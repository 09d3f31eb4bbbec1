use crate::balance::engine::NetBalance;
use crate::core::ledger::NetLedger;
use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recommended payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSuggestion {
    #[serde(rename = "fromUserId")]
    pub from: ParticipantId,
    #[serde(rename = "toUserId")]
    pub to: ParticipantId,
    #[serde(rename = "amountPaise")]
    pub amount: Money,
}

impl TransferSuggestion {
    pub fn new(from: ParticipantId, to: ParticipantId, amount: Money) -> Self {
        Self { from, to, amount }
    }
}

impl fmt::Display for TransferSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: {}", self.from, self.to, self.amount)
    }
}

/// Produce a small set of payments that brings every balance to zero.
///
/// # Algorithm
///
/// 1. Split balances into creditors (net > 0) and debtors (net < 0,
///    tracked as the positive amount owed).
/// 2. Stable-sort both lists by descending amount, so equal amounts keep
///    the order they arrived in.
/// 3. Walk both lists with two cursors. Each step pays
///    `min(debtor, creditor)` from the current debtor to the current
///    creditor and advances whichever side reached zero.
///
/// This greedy largest-first matching does not guarantee the minimum
/// number of payments, but it never overpays and, for balances summing
/// to zero, leaves everyone at exactly zero.
///
/// # Examples
///
/// ```
/// use group_ledger::balance::{minimize_transfers, NetBalance};
/// use group_ledger::core::money::Money;
///
/// let balances = vec![
///     NetBalance::bare("A", Money::new(500)),
///     NetBalance::bare("B", Money::new(-300)),
///     NetBalance::bare("C", Money::new(-200)),
/// ];
/// let plan = minimize_transfers(&balances);
/// assert_eq!(plan.len(), 2);
/// assert_eq!(plan[0].from.as_str(), "B");
/// assert_eq!(plan[0].amount, Money::new(300));
/// ```
pub fn minimize_transfers(balances: &[NetBalance]) -> Vec<TransferSuggestion> {
    let mut creditors: Vec<(&ParticipantId, Money)> = balances
        .iter()
        .filter(|b| b.net.is_positive())
        .map(|b| (&b.user_id, b.net))
        .collect();
    let mut debtors: Vec<(&ParticipantId, Money)> = balances
        .iter()
        .filter(|b| b.net.is_negative())
        .map(|b| (&b.user_id, b.net.abs()))
        .collect();

    // slice::sort_by is stable
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let x = debtors[i].1.min(creditors[j].1);

        transfers.push(TransferSuggestion::new(
            debtors[i].0.clone(),
            creditors[j].0.clone(),
            x,
        ));

        debtors[i].1 -= x;
        creditors[j].1 -= x;

        if debtors[i].1.is_zero() {
            i += 1;
        }
        if creditors[j].1.is_zero() {
            j += 1;
        }
    }

    transfers
}

/// The ledger that results from every balance having the suggested
/// payments applied to it.
pub fn apply_suggestions(balances: &[NetBalance], suggestions: &[TransferSuggestion]) -> NetLedger {
    let mut ledger = NetLedger::with_participants(balances.iter().map(|b| &b.user_id));
    for b in balances {
        ledger.credit(&b.user_id, b.net);
    }
    for s in suggestions {
        ledger.apply_transfer(&s.from, &s.to, s.amount);
    }
    ledger
}
