use group_ledger::balance::{apply_suggestions, minimize_transfers, BalanceEngine, NetBalance};
use group_ledger::core::money::Money;
use group_ledger::core::participant::{Member, ParticipantId};
use group_ledger::split::{allocate_shares, AllocationError, SplitPolicy};
use group_ledger::store::{InMemoryLedger, LedgerSnapshot, NewExpense, NewSettlement, StoreError};
use rust_decimal_macros::dec;

fn p(id: &str) -> ParticipantId {
    ParticipantId::new(id)
}

/// Full pipeline: group → expenses of every policy → balances → settle up.
#[test]
fn full_pipeline_weekend_trip() {
    let mut store = InMemoryLedger::new();
    let asha = p("asha");
    let ravi = p("ravi");
    let meera = p("meera");
    let kiran = p("kiran");

    let group = store
        .create_group("Weekend trip", Member::new("asha").with_name("Asha"))
        .unwrap();
    store
        .add_member(&group, Member::new("ravi").with_email("ravi@example.com"))
        .unwrap();
    store.add_member(&group, Member::new("meera")).unwrap();
    store.add_member(&group, Member::new("kiran")).unwrap();

    // Hotel: 10,001 split equally four ways → 2501, 2500, 2500, 2500
    store
        .record_expense(
            &asha,
            &group,
            NewExpense::new(
                "Hotel",
                Money::new(10_001),
                asha.clone(),
                SplitPolicy::Equal(vec![asha.clone(), ravi.clone(), meera.clone(), kiran.clone()]),
            ),
        )
        .unwrap();

    // Fuel: exact shares, kiran did not ride
    store
        .record_expense(
            &ravi,
            &group,
            NewExpense::new(
                "Fuel",
                Money::new(3_000),
                ravi.clone(),
                SplitPolicy::Exact(vec![
                    (asha.clone(), Money::new(1_000)),
                    (ravi.clone(), Money::new(1_000)),
                    (meera.clone(), Money::new(1_000)),
                ]),
            ),
        )
        .unwrap();

    // Tickets: meera fronted the money for the others
    store
        .record_expense(
            &meera,
            &group,
            NewExpense::new(
                "Tickets",
                Money::new(999),
                meera.clone(),
                SplitPolicy::Percent(vec![(asha.clone(), dec!(50)), (kiran.clone(), dec!(50))]),
            ),
        )
        .unwrap();

    let balances = store.group_balances(&kiran, &group).unwrap();
    // asha: +10001 - 2501 - 1000 - 500 = 6000
    // ravi: -2500 + 3000 - 1000 = -500
    // meera: -2500 - 1000 + 999 = -2501
    // kiran: -2500 - 499 = -2999
    assert_eq!(balances.net_of(&asha), Money::new(6_000));
    assert_eq!(balances.net_of(&ravi), Money::new(-500));
    assert_eq!(balances.net_of(&meera), Money::new(-2_501));
    assert_eq!(balances.net_of(&kiran), Money::new(-2_999));
    assert_eq!(balances.total(), Money::ZERO);

    let plan: Vec<(&str, &str, i64)> = balances
        .suggestions
        .iter()
        .map(|s| (s.from.as_str(), s.to.as_str(), s.amount.minor_units()))
        .collect();
    assert_eq!(
        plan,
        vec![("kiran", "asha", 2_999), ("meera", "asha", 2_501), ("ravi", "asha", 500)]
    );

    for s in balances.suggestions.clone() {
        store
            .record_settlement(&s.from, &group, NewSettlement::new(s.from.clone(), s.to, s.amount))
            .unwrap();
    }
    let after = store.group_balances(&asha, &group).unwrap();
    assert!(after.is_settled());
    assert!(after.suggestions.is_empty());
}

/// Deleting an expense gives the same balances as never recording it.
#[test]
fn soft_delete_equals_never_recorded() {
    let build = |with_extra: bool| {
        let mut store = InMemoryLedger::new();
        let group = store.create_group("Flat", Member::new("A")).unwrap();
        store.add_member(&group, Member::new("B")).unwrap();
        store.add_member(&group, Member::new("C")).unwrap();

        store
            .record_expense(
                &p("A"),
                &group,
                NewExpense::new(
                    "Rent",
                    Money::new(30_000),
                    p("A"),
                    SplitPolicy::Equal(vec![p("A"), p("B"), p("C")]),
                ),
            )
            .unwrap();
        store
            .record_settlement(&p("B"), &group, NewSettlement::new(p("B"), p("A"), Money::new(4_000)))
            .unwrap();

        if with_extra {
            let extra = store
                .record_expense(
                    &p("C"),
                    &group,
                    NewExpense::new(
                        "Party",
                        Money::new(7_777),
                        p("C"),
                        SplitPolicy::Equal(vec![p("A"), p("B")]),
                    ),
                )
                .unwrap();
            store.delete_expense(&p("A"), &group, extra.id).unwrap();
        }
        store.group_balances(&p("A"), &group).unwrap()
    };

    assert_eq!(build(true), build(false));
}

/// Recomputing without intervening writes gives identical output.
#[test]
fn recomputation_is_idempotent() {
    let snapshot = group_ledger::simulation::generator::generate_random_group(&Default::default());
    let mut store = InMemoryLedger::new();
    let group = snapshot.load_into(&mut store).unwrap();

    let first = BalanceEngine::compute_group_balances(&store, &group).unwrap();
    let second = BalanceEngine::compute_group_balances(&store, &group).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_group_is_reported() {
    let store = InMemoryLedger::new();
    let missing = group_ledger::core::ids::GroupId::new("missing");
    let err = BalanceEngine::compute_group_balances(&store, &missing).unwrap_err();
    assert_eq!(err.to_string(), "group missing not found");
}

#[test]
fn allocation_examples() {
    let abc = vec![p("A"), p("B"), p("C")];
    let shares = allocate_shares(Money::new(1000), &SplitPolicy::Equal(abc)).unwrap();
    let amounts: Vec<i64> = shares.iter().map(|s| s.share.minor_units()).collect();
    assert_eq!(amounts, vec![334, 333, 333]);

    let exact = SplitPolicy::Exact(vec![(p("A"), Money::new(400)), (p("B"), Money::new(500))]);
    assert!(matches!(
        allocate_shares(Money::new(1000), &exact),
        Err(AllocationError::ShareMismatch { .. })
    ));

    let percent = SplitPolicy::Percent(vec![(p("A"), dec!(50)), (p("B"), dec!(50))]);
    let shares = allocate_shares(Money::new(999), &percent).unwrap();
    assert_eq!(shares[0].share, Money::new(500));
    assert_eq!(shares[1].share, Money::new(499));
}

#[test]
fn minimizer_example() {
    let balances = vec![
        NetBalance::bare("A", Money::new(500)),
        NetBalance::bare("B", Money::new(-300)),
        NetBalance::bare("C", Money::new(-200)),
    ];
    let transfers = minimize_transfers(&balances);
    assert_eq!(transfers.len(), 2);
    assert_eq!((transfers[0].from.as_str(), transfers[0].amount), ("B", Money::new(300)));
    assert_eq!((transfers[1].from.as_str(), transfers[1].amount), ("C", Money::new(200)));
    assert!(apply_suggestions(&balances, &transfers).is_settled());
}

#[test]
fn rejected_writes_surface_typed_errors() {
    let mut store = InMemoryLedger::new();
    let group = store.create_group("Office", Member::new("A")).unwrap();
    store.add_member(&group, Member::new("B")).unwrap();

    let err = store
        .record_expense(
            &p("A"),
            &group,
            NewExpense::new(
                "Lunch",
                Money::new(1000),
                p("A"),
                SplitPolicy::Exact(vec![(p("A"), Money::new(400)), (p("B"), Money::new(500))]),
            ),
        )
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Allocation(AllocationError::ShareMismatch {
            expected: Money::new(1000),
            actual: Money::new(900),
        })
    );

    let err = store
        .record_expense(
            &p("A"),
            &group,
            NewExpense::new("", Money::new(1000), p("A"), SplitPolicy::Equal(vec![p("A")])),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

/// Snapshot JSON round trip through the store preserves balances.
#[test]
fn snapshot_json_round_trip() {
    let snapshot = group_ledger::simulation::generator::generate_random_group(&Default::default());
    let json = snapshot.to_json().unwrap();
    let parsed = LedgerSnapshot::from_json(&json).unwrap();
    assert_eq!(parsed, snapshot);

    let mut store = InMemoryLedger::new();
    let group = parsed.load_into(&mut store).unwrap();
    let balances = BalanceEngine::compute_group_balances(&store, &group).unwrap();

    let value = serde_json::to_value(&balances).unwrap();
    assert!(value.get("netBalances").is_some());
    assert!(value.get("suggestions").is_some());
}
