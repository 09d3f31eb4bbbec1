use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tracks the net position of each participant within one group.
///
/// A positive position means the group owes the participant (net creditor).
/// A negative position means the participant owes the group (net debtor).
///
/// Lookups of participants the ledger has never seen return zero, so
/// callers never need to pre-register a key before crediting or debiting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetLedger {
    positions: HashMap<ParticipantId, Money>,
}

impl NetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger with an explicit zero entry for each participant.
    pub fn with_participants<'a>(participants: impl IntoIterator<Item = &'a ParticipantId>) -> Self {
        let positions = participants
            .into_iter()
            .map(|p| (p.clone(), Money::ZERO))
            .collect();
        Self { positions }
    }

    /// Increase what the group owes `participant`.
    pub fn credit(&mut self, participant: &ParticipantId, amount: Money) {
        *self.entry(participant) += amount;
    }

    /// Increase what `participant` owes the group.
    pub fn debit(&mut self, participant: &ParticipantId, amount: Money) {
        *self.entry(participant) -= amount;
    }

    /// Apply a payment of `amount` from `from` to `to`: the payer's debt
    /// shrinks and the payee's credit is realised.
    pub fn apply_transfer(&mut self, from: &ParticipantId, to: &ParticipantId, amount: Money) {
        self.credit(from, amount);
        self.debit(to, amount);
    }

    /// Net position of a participant, zero if unknown.
    pub fn position(&self, participant: &ParticipantId) -> Money {
        self.positions
            .get(participant)
            .copied()
            .unwrap_or(Money::ZERO)
    }

    pub fn all_positions(&self) -> &HashMap<ParticipantId, Money> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of every position. Zero for any ledger built from balanced entries.
    pub fn total(&self) -> Money {
        self.positions.values().sum()
    }

    pub fn is_balanced(&self) -> bool {
        self.total().is_zero()
    }

    /// True when every participant's position is zero.
    pub fn is_settled(&self) -> bool {
        self.positions.values().all(|v| v.is_zero())
    }

    /// Total amount that still has to change hands: the sum of positive
    /// positions (equal to the sum of |negative| positions when balanced).
    pub fn total_outstanding(&self) -> Money {
        self.positions
            .values()
            .filter(|v| v.is_positive())
            .sum()
    }

    fn entry(&mut self, participant: &ParticipantId) -> &mut Money {
        self.positions
            .entry(participant.clone())
            .or_insert(Money::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_basic() {
        let mut ledger = NetLedger::new();
        let a = ParticipantId::new("A");
        let b = ParticipantId::new("B");
        ledger.credit(&a, Money::new(100));
        ledger.debit(&b, Money::new(100));

        assert_eq!(ledger.position(&a), Money::new(100));
        assert_eq!(ledger.position(&b), Money::new(-100));
        assert!(ledger.is_balanced());
        assert_eq!(ledger.total_outstanding(), Money::new(100));
    }

    #[test]
    fn test_unknown_participant_defaults_to_zero() {
        let ledger = NetLedger::new();
        assert_eq!(ledger.position(&ParticipantId::new("ghost")), Money::ZERO);
    }

    #[test]
    fn test_transfer_closes_positions() {
        let a = ParticipantId::new("A");
        let b = ParticipantId::new("B");
        let mut ledger = NetLedger::with_participants([&a, &b]);
        ledger.credit(&a, Money::new(250));
        ledger.debit(&b, Money::new(250));

        // B pays A back
        ledger.apply_transfer(&b, &a, Money::new(250));
        assert!(ledger.is_settled());
        assert_eq!(ledger.len(), 2);
    }
}
