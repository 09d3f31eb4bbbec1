use crate::core::money::Money;
use crate::core::participant::ParticipantId;
use crate::split::policy::{AllocationError, Share, SplitPolicy};
use log::trace;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashSet;

/// One hundred percent expressed in basis points.
pub const FULL_BASIS_POINTS: i64 = 10_000;

/// Convert a split policy into concrete per-participant shares.
///
/// The returned shares are in the caller's input order and always sum to
/// `amount` exactly.
///
/// # Examples
///
/// ```
/// use group_ledger::core::money::Money;
/// use group_ledger::core::participant::ParticipantId;
/// use group_ledger::split::{allocate_shares, SplitPolicy};
///
/// let policy = SplitPolicy::Equal(vec![
///     ParticipantId::new("A"),
///     ParticipantId::new("B"),
///     ParticipantId::new("C"),
/// ]);
/// let shares = allocate_shares(Money::new(1000), &policy).unwrap();
/// assert_eq!(shares[0].share, Money::new(334));
/// assert_eq!(shares[1].share, Money::new(333));
/// ```
pub fn allocate_shares(amount: Money, policy: &SplitPolicy) -> Result<Vec<Share>, AllocationError> {
    if !amount.is_positive() {
        return Err(AllocationError::InvalidInput(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    ensure_unique_participants(policy.participants())?;

    let shares = match policy {
        SplitPolicy::Equal(ids) => equal_shares(amount, ids)?,
        SplitPolicy::Exact(entries) => exact_shares(amount, entries)?,
        SplitPolicy::Percent(entries) => percent_shares(amount, entries)?,
    };
    trace!(
        "allocated {} across {} participants ({})",
        amount,
        shares.len(),
        policy.kind()
    );
    Ok(shares)
}

/// Reject a participant list that names anyone twice.
pub fn ensure_unique_participants<'a>(
    participants: impl IntoIterator<Item = &'a ParticipantId>,
) -> Result<(), AllocationError> {
    let mut seen = HashSet::new();
    for p in participants {
        if !seen.insert(p) {
            return Err(AllocationError::DuplicateParticipant(p.clone()));
        }
    }
    Ok(())
}

/// Split `amount` evenly. The first `amount % n` participants in input
/// order each receive one extra minor unit.
pub fn equal_shares(amount: Money, participants: &[ParticipantId]) -> Result<Vec<Share>, AllocationError> {
    let n = participants.len() as i64;
    if n == 0 {
        return Err(AllocationError::InvalidInput("no participants".into()));
    }
    let total = amount.minor_units();
    let base = total.div_euclid(n);
    let mut remainder = total - base * n;

    Ok(participants
        .iter()
        .map(|p| {
            let extra = if remainder > 0 { 1 } else { 0 };
            remainder -= extra;
            Share::new(p.clone(), Money::new(base + extra))
        })
        .collect())
}

/// Accept caller-stated shares only if they add up to `amount` exactly.
pub fn exact_shares(
    amount: Money,
    entries: &[(ParticipantId, Money)],
) -> Result<Vec<Share>, AllocationError> {
    if entries.is_empty() {
        return Err(AllocationError::InvalidInput("no participants".into()));
    }
    if let Some((p, s)) = entries.iter().find(|(_, s)| s.is_negative()) {
        return Err(AllocationError::InvalidInput(format!(
            "share for {} must not be negative, got {}",
            p, s
        )));
    }

    let sum: i128 = entries.iter().map(|(_, s)| s.minor_units() as i128).sum();
    if sum != amount.minor_units() as i128 {
        return Err(AllocationError::ShareMismatch {
            expected: amount,
            actual: Money::new(sum.clamp(i64::MIN as i128, i64::MAX as i128) as i64),
        });
    }

    Ok(entries
        .iter()
        .map(|(p, s)| Share::new(p.clone(), *s))
        .collect())
}

/// Split `amount` by percentages.
///
/// Percentages are converted to basis points, rounding half away from
/// zero. Each share is the floor of its proportional part; the leftover
/// minor units are handed out one at a time to participants ordered by
/// descending basis points (ties keep input order), cycling if needed.
pub fn percent_shares(
    amount: Money,
    entries: &[(ParticipantId, Decimal)],
) -> Result<Vec<Share>, AllocationError> {
    if entries.is_empty() {
        return Err(AllocationError::InvalidInput("no participants".into()));
    }

    let bps = entries
        .iter()
        .map(|(p, pct)| to_basis_points(p, *pct))
        .collect::<Result<Vec<i64>, _>>()?;

    let total_bps: i64 = bps.iter().sum();
    if total_bps != FULL_BASIS_POINTS {
        return Err(AllocationError::PercentMismatch { total_bps });
    }

    let total = amount.minor_units() as i128;
    let mut shares: Vec<i64> = bps
        .iter()
        .map(|&b| (total * b as i128 / FULL_BASIS_POINTS as i128) as i64)
        .collect();
    let mut remainder = amount.minor_units() - shares.iter().sum::<i64>();

    // Stable sort: equal basis points keep their input order.
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| bps[b].cmp(&bps[a]));

    let mut cursor = 0;
    while remainder > 0 {
        shares[order[cursor]] += 1;
        remainder -= 1;
        cursor = (cursor + 1) % order.len();
    }

    Ok(entries
        .iter()
        .zip(shares)
        .map(|((p, _), s)| Share::new(p.clone(), Money::new(s)))
        .collect())
}

fn to_basis_points(participant: &ParticipantId, percent: Decimal) -> Result<i64, AllocationError> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(AllocationError::InvalidInput(format!(
            "percent for {} must be between 0 and 100, got {}",
            participant, percent
        )));
    }
    (percent * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            AllocationError::InvalidInput(format!("percent {} is not representable", percent))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ids(names: &[&str]) -> Vec<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n)).collect()
    }

    fn amounts(shares: &[Share]) -> Vec<i64> {
        shares.iter().map(|s| s.share.minor_units()).collect()
    }

    #[test]
    fn test_equal_split_remainder_goes_to_first() {
        let shares = allocate_shares(Money::new(1000), &SplitPolicy::Equal(ids(&["A", "B", "C"]))).unwrap();
        assert_eq!(amounts(&shares), vec![334, 333, 333]);
        assert_eq!(shares[0].user_id.as_str(), "A");
    }

    #[test]
    fn test_equal_split_follows_input_order_not_id_order() {
        let shares = allocate_shares(Money::new(5), &SplitPolicy::Equal(ids(&["Z", "A", "M"]))).unwrap();
        assert_eq!(amounts(&shares), vec![2, 2, 1]);
        assert_eq!(shares[0].user_id.as_str(), "Z");
    }

    #[test]
    fn test_equal_split_amount_smaller_than_group() {
        let shares = allocate_shares(Money::new(2), &SplitPolicy::Equal(ids(&["A", "B", "C", "D"]))).unwrap();
        assert_eq!(amounts(&shares), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_equal_split_no_participants() {
        let err = allocate_shares(Money::new(100), &SplitPolicy::Equal(vec![])).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput(_)));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let policy = SplitPolicy::Equal(ids(&["A"]));
        assert!(matches!(
            allocate_shares(Money::ZERO, &policy),
            Err(AllocationError::InvalidInput(_))
        ));
        assert!(matches!(
            allocate_shares(Money::new(-5), &policy),
            Err(AllocationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let err = allocate_shares(Money::new(100), &SplitPolicy::Equal(ids(&["A", "B", "A"]))).unwrap_err();
        assert_eq!(err, AllocationError::DuplicateParticipant(ParticipantId::new("A")));
    }

    #[test]
    fn test_exact_split_passes_through() {
        let entries = vec![
            (ParticipantId::new("A"), Money::new(400)),
            (ParticipantId::new("B"), Money::new(600)),
        ];
        let shares = allocate_shares(Money::new(1000), &SplitPolicy::Exact(entries)).unwrap();
        assert_eq!(amounts(&shares), vec![400, 600]);
    }

    #[test]
    fn test_exact_split_mismatch() {
        let entries = vec![
            (ParticipantId::new("A"), Money::new(400)),
            (ParticipantId::new("B"), Money::new(500)),
        ];
        let err = allocate_shares(Money::new(1000), &SplitPolicy::Exact(entries)).unwrap_err();
        assert_eq!(
            err,
            AllocationError::ShareMismatch {
                expected: Money::new(1000),
                actual: Money::new(900),
            }
        );
    }

    #[test]
    fn test_exact_split_zero_share_allowed_negative_rejected() {
        let ok = vec![
            (ParticipantId::new("A"), Money::new(1000)),
            (ParticipantId::new("B"), Money::ZERO),
        ];
        assert!(allocate_shares(Money::new(1000), &SplitPolicy::Exact(ok)).is_ok());

        let bad = vec![
            (ParticipantId::new("A"), Money::new(1100)),
            (ParticipantId::new("B"), Money::new(-100)),
        ];
        assert!(matches!(
            allocate_shares(Money::new(1000), &SplitPolicy::Exact(bad)),
            Err(AllocationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_percent_split_tie_goes_to_first_in_input() {
        let entries = vec![
            (ParticipantId::new("A"), dec!(50)),
            (ParticipantId::new("B"), dec!(50)),
        ];
        let shares = allocate_shares(Money::new(999), &SplitPolicy::Percent(entries)).unwrap();
        assert_eq!(amounts(&shares), vec![500, 499]);
    }

    #[test]
    fn test_percent_split_remainder_to_largest_bps_and_input_order_kept() {
        // floors: 333, 333, 333 on 1000 with 33.33/33.33/33.34
        let entries = vec![
            (ParticipantId::new("A"), dec!(33.33)),
            (ParticipantId::new("B"), dec!(33.33)),
            (ParticipantId::new("C"), dec!(33.34)),
        ];
        let shares = allocate_shares(Money::new(1000), &SplitPolicy::Percent(entries)).unwrap();
        assert_eq!(amounts(&shares), vec![333, 333, 334]);
        assert_eq!(shares[2].user_id.as_str(), "C");
    }

    #[test]
    fn test_percent_split_with_remainder_of_two() {
        // 101 * 3333/10000 = 33 (x2), 101 * 3334/10000 = 33 → remainder 2
        let entries = vec![
            (ParticipantId::new("A"), dec!(33.33)),
            (ParticipantId::new("B"), dec!(33.33)),
            (ParticipantId::new("C"), dec!(33.34)),
        ];
        let shares = allocate_shares(Money::new(101), &SplitPolicy::Percent(entries)).unwrap();
        assert_eq!(amounts(&shares), vec![34, 33, 34]);
    }

    #[test]
    fn test_percent_split_must_total_100() {
        let entries = vec![
            (ParticipantId::new("A"), dec!(50)),
            (ParticipantId::new("B"), dec!(49.99)),
        ];
        let err = allocate_shares(Money::new(1000), &SplitPolicy::Percent(entries)).unwrap_err();
        assert_eq!(err, AllocationError::PercentMismatch { total_bps: 9999 });
    }

    #[test]
    fn test_percent_basis_points_round_half_away_from_zero() {
        // 12.345% → 1234.5 bps → 1235; 87.655% → 8765.5 → 8766; sum 10001
        let entries = vec![
            (ParticipantId::new("A"), dec!(12.345)),
            (ParticipantId::new("B"), dec!(87.655)),
        ];
        let err = allocate_shares(Money::new(1000), &SplitPolicy::Percent(entries)).unwrap_err();
        assert_eq!(err, AllocationError::PercentMismatch { total_bps: 10001 });

        let entries = vec![
            (ParticipantId::new("A"), dec!(12.345)),
            (ParticipantId::new("B"), dec!(87.645)),
        ];
        let shares = allocate_shares(Money::new(10_000), &SplitPolicy::Percent(entries)).unwrap();
        assert_eq!(amounts(&shares), vec![1235, 8765]);
    }

    #[test]
    fn test_percent_out_of_range_rejected() {
        let entries = vec![
            (ParticipantId::new("A"), dec!(120)),
            (ParticipantId::new("B"), dec!(-20)),
        ];
        assert!(matches!(
            allocate_shares(Money::new(1000), &SplitPolicy::Percent(entries)),
            Err(AllocationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_percent_zero_share_participant() {
        let entries = vec![
            (ParticipantId::new("A"), dec!(0)),
            (ParticipantId::new("B"), dec!(100)),
        ];
        let shares = allocate_shares(Money::new(777), &SplitPolicy::Percent(entries)).unwrap();
        assert_eq!(amounts(&shares), vec![0, 777]);
    }
}
