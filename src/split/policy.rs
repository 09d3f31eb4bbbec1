use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use crate::core::record::SplitKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while turning a split policy into concrete shares.
///
/// All of them are validation failures of the caller's request and are
/// never retried or corrected silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("invalid split input: {0}")]
    InvalidInput(String),
    #[error("exact shares sum to {actual} but the expense amount is {expected}")]
    ShareMismatch { expected: Money, actual: Money },
    #[error("percent shares sum to {total_bps} basis points, expected 10000")]
    PercentMismatch { total_bps: i64 },
    #[error("participant {0} appears more than once")]
    DuplicateParticipant(ParticipantId),
}

/// A client-declared way of dividing an expense.
///
/// Each variant carries exactly the data its policy needs, so an exact
/// split can never be missing an amount and an equal split can never
/// carry one.
///
/// # Examples
///
/// ```
/// use group_ledger::core::participant::ParticipantId;
/// use group_ledger::split::SplitPolicy;
/// use rust_decimal_macros::dec;
///
/// let policy = SplitPolicy::Percent(vec![
///     (ParticipantId::new("asha"), dec!(60)),
///     (ParticipantId::new("ravi"), dec!(40)),
/// ]);
/// assert_eq!(policy.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "participants", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitPolicy {
    /// Divide evenly; leftover minor units go to the earliest participants.
    Equal(Vec<ParticipantId>),
    /// Caller states every share; they must add up to the amount.
    Exact(Vec<(ParticipantId, Money)>),
    /// Caller states percentages (up to two decimals) adding up to 100.
    Percent(Vec<(ParticipantId, Decimal)>),
}

impl SplitPolicy {
    pub fn kind(&self) -> SplitKind {
        match self {
            SplitPolicy::Equal(_) => SplitKind::Equal,
            SplitPolicy::Exact(_) => SplitKind::Exact,
            SplitPolicy::Percent(_) => SplitKind::Percent,
        }
    }

    /// Participants in the order the caller listed them.
    pub fn participants(&self) -> Vec<&ParticipantId> {
        match self {
            SplitPolicy::Equal(ids) => ids.iter().collect(),
            SplitPolicy::Exact(entries) => entries.iter().map(|(id, _)| id).collect(),
            SplitPolicy::Percent(entries) => entries.iter().map(|(id, _)| id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SplitPolicy::Equal(ids) => ids.len(),
            SplitPolicy::Exact(entries) => entries.len(),
            SplitPolicy::Percent(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A participant's concrete share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub user_id: ParticipantId,
    pub share: Money,
}

impl Share {
    pub fn new(user_id: ParticipantId, share: Money) -> Self {
        Self { user_id, share }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_policy_kind_and_participants() {
        let policy = SplitPolicy::Exact(vec![
            (ParticipantId::new("B"), Money::new(10)),
            (ParticipantId::new("A"), Money::new(20)),
        ]);
        assert_eq!(policy.kind(), SplitKind::Exact);
        let ids: Vec<&str> = policy.participants().iter().map(|p| p.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_policy_json_shape() {
        let policy = SplitPolicy::Percent(vec![(ParticipantId::new("A"), dec!(12.5))]);
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["type"], "PERCENT");
        assert_eq!(json["participants"][0][0], "A");
        assert_eq!(json["participants"][0][1], "12.5");
    }

    #[test]
    fn test_error_messages_name_the_violation() {
        let err = AllocationError::ShareMismatch {
            expected: Money::new(1000),
            actual: Money::new(900),
        };
        assert_eq!(
            err.to_string(),
            "exact shares sum to 900 but the expense amount is 1000"
        );
    }
}
