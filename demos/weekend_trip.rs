//! Weekend trip example.
//!
//! Four friends share a hotel, fuel and tickets using each of the three
//! split policies, then settle up with the suggested payments.

use group_ledger::core::money::Money;
use group_ledger::core::participant::{Member, ParticipantId};
use group_ledger::split::SplitPolicy;
use group_ledger::store::{InMemoryLedger, NewExpense, NewSettlement};
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║   group-ledger: Weekend Trip Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let mut store = InMemoryLedger::new();
    let asha = ParticipantId::new("asha");
    let ravi = ParticipantId::new("ravi");
    let meera = ParticipantId::new("meera");
    let kiran = ParticipantId::new("kiran");

    let group = store
        .create_group("Weekend trip", Member::new("asha").with_name("Asha"))
        .expect("create group");
    for member in [
        Member::new("ravi").with_name("Ravi"),
        Member::new("meera").with_name("Meera"),
        Member::new("kiran").with_name("Kiran"),
    ] {
        store.add_member(&group, member).expect("add member");
    }

    // --- Scenario 1: Recording expenses ---
    println!("━━━ Scenario 1: Recording Expenses ━━━\n");

    let expenses = [
        (
            &asha,
            NewExpense::new(
                "Hotel",
                Money::new(1_000_001),
                asha.clone(),
                SplitPolicy::Equal(vec![asha.clone(), ravi.clone(), meera.clone(), kiran.clone()]),
            ),
        ),
        (
            &ravi,
            NewExpense::new(
                "Fuel",
                Money::new(300_000),
                ravi.clone(),
                SplitPolicy::Exact(vec![
                    (asha.clone(), Money::new(100_000)),
                    (ravi.clone(), Money::new(100_000)),
                    (meera.clone(), Money::new(100_000)),
                ]),
            ),
        ),
        (
            &meera,
            NewExpense::new(
                "Tickets",
                Money::new(99_999),
                meera.clone(),
                SplitPolicy::Percent(vec![(asha.clone(), dec!(33.33)), (kiran.clone(), dec!(66.67))]),
            ),
        ),
    ];

    for (actor, request) in expenses {
        let label = format!("{} ({})", request.description, request.policy.kind());
        let amount = request.amount;
        store
            .record_expense(actor, &group, request)
            .expect("record expense");
        println!("  {:<24} {:>12}  paid by {}", label, amount.format_major(2), actor);
    }
    println!();

    // --- Scenario 2: Balances and suggested payments ---
    println!("━━━ Scenario 2: Balances ━━━\n");

    let balances = store.group_balances(&asha, &group).expect("balances");
    println!("{}", balances);
    println!("Outstanding: {}\n", balances.total_outstanding().format_major(2));

    // --- Scenario 3: Settling up ---
    println!("━━━ Scenario 3: Settling Up ━━━\n");

    for s in &balances.suggestions {
        store
            .record_settlement(
                &s.from,
                &group,
                NewSettlement::new(s.from.clone(), s.to.clone(), s.amount).with_note("UPI"),
            )
            .expect("record settlement");
        println!("  {}", s);
    }

    let after = store.group_balances(&asha, &group).expect("balances");
    println!();
    println!("{}", after);
}
