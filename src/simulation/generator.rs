//! Random group activity for benchmarks and manual testing.
//!
//! Produces snapshots with a mix of equal, exact and percent expenses,
//! a few deletions, and settlements between random members.

use crate::core::money::Money;
use crate::core::participant::{Member, ParticipantId};
use crate::split::SplitPolicy;
use crate::store::snapshot::{ExpenseSnapshot, LedgerSnapshot, SettlementSnapshot};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for generating a random group.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Number of members in the group.
    pub member_count: usize,
    /// Number of expenses to generate.
    pub expense_count: usize,
    /// Number of settlements to generate.
    pub settlement_count: usize,
    /// Smallest expense, in minor units.
    pub min_amount: i64,
    /// Largest expense, in minor units.
    pub max_amount: i64,
    /// Probability that a generated expense is marked deleted.
    pub deletion_rate: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            member_count: 6,
            expense_count: 20,
            settlement_count: 4,
            min_amount: 100,
            max_amount: 500_000,
            deletion_rate: 0.05,
        }
    }
}

/// Generate a random group snapshot.
///
/// Every generated expense is valid, so the snapshot always loads.
pub fn generate_random_group(config: &GroupConfig) -> LedgerSnapshot {
    let mut rng = rand::thread_rng();
    let member_count = config.member_count.max(2);

    let members: Vec<Member> = (0..member_count)
        .map(|i| Member::new(format!("member-{:03}", i)).with_name(format!("Member {}", i)))
        .collect();
    let ids: Vec<ParticipantId> = members.iter().map(|m| m.user_id.clone()).collect();

    let (lo, hi) = if config.min_amount <= config.max_amount {
        (config.min_amount.max(1), config.max_amount.max(1))
    } else {
        (config.max_amount.max(1), config.min_amount.max(1))
    };

    let expenses = (0..config.expense_count)
        .map(|n| {
            let amount = rng.gen_range(lo..=hi);
            let payer = ids[rng.gen_range(0..ids.len())].clone();
            let take = rng.gen_range(1..=ids.len());
            let participants: Vec<ParticipantId> =
                ids.choose_multiple(&mut rng, take).cloned().collect();

            let split = match rng.gen_range(0..3) {
                0 => SplitPolicy::Equal(participants),
                1 => SplitPolicy::Exact(random_exact(&mut rng, amount, participants)),
                _ => SplitPolicy::Percent(random_percent(&mut rng, participants)),
            };

            ExpenseSnapshot {
                description: format!("Expense {}", n + 1),
                amount: Money::new(amount),
                paid_by: payer,
                split,
                currency: None,
                deleted: rng.gen_bool(config.deletion_rate.clamp(0.0, 1.0)),
            }
        })
        .collect();

    let settlements = (0..config.settlement_count)
        .map(|_| {
            let pair: Vec<&ParticipantId> = ids.choose_multiple(&mut rng, 2).collect();
            SettlementSnapshot {
                from: pair[0].clone(),
                to: pair[1].clone(),
                amount: Money::new(rng.gen_range(lo..=hi) / 4 + 1),
                note: None,
            }
        })
        .collect();

    LedgerSnapshot {
        name: format!("Random group ({} members)", member_count),
        members,
        expenses,
        settlements,
        departed: Vec::new(),
    }
}

/// Cut `amount` into one non-negative share per participant.
fn random_exact<R: Rng>(
    rng: &mut R,
    amount: i64,
    participants: Vec<ParticipantId>,
) -> Vec<(ParticipantId, Money)> {
    let mut cuts: Vec<i64> = (1..participants.len())
        .map(|_| rng.gen_range(0..=amount))
        .collect();
    cuts.push(0);
    cuts.push(amount);
    cuts.sort_unstable();

    participants
        .into_iter()
        .zip(cuts.windows(2))
        .map(|(p, w)| (p, Money::new(w[1] - w[0])))
        .collect()
}

/// Percentages with two decimals that add up to exactly 100.
fn random_percent<R: Rng>(rng: &mut R, participants: Vec<ParticipantId>) -> Vec<(ParticipantId, Decimal)> {
    let bps = random_exact(rng, 10_000, participants);
    bps.into_iter()
        .map(|(p, b)| (p, Decimal::new(b.minor_units(), 2)))
        .collect()
}
