//! Ledger behaviour over the in-memory store: the worked bidwar scenario,
//! conservation of totals, the zero floor, and rollback under injected
//! write failures.

#![allow(clippy::panic)]

use marathon_backend::domain::{Bid, BidOption, BidType, Donation, EarmarkRequest, EntityId};
use marathon_backend::error::MarathonError;
use marathon_backend::ledger::Ledger;
use marathon_backend::persistence::MemoryStore;

const EPS: f64 = 1e-9;

fn donation(id: &str, amount: f64, to_bid: bool) -> Donation {
    Donation {
        id: id.into(),
        name: "donor".to_string(),
        email: "donor@example.com".to_string(),
        time_mili: 1_700_000_000_000,
        amount,
        description: String::new(),
        to_bid,
        event_id: "E1".into(),
    }
}

fn option(bid: &str, id: &str, name: &str, amount: f64) -> BidOption {
    BidOption {
        id: id.into(),
        name: name.to_string(),
        current_amount: amount,
        bid_id: bid.into(),
    }
}

/// `B1` bidwar with `O1` = 10 and `O2` = 5.
async fn scenario_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_bid(Bid {
            id: "B1".into(),
            bidname: "Which ending".to_string(),
            goal: 0.0,
            current_amount: 15.0,
            description: String::new(),
            bid_type: BidType::Bidwar,
            create_new_options: true,
            status: "open".to_string(),
            run_id: "R1".into(),
            options: vec![option("B1", "O1", "good", 10.0), option("B1", "O2", "bad", 5.0)],
        })
        .await;
    store
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn bidwar_scenario_moves_totals_step_by_step() {
    let store = scenario_store().await;
    let ledger = Ledger::new(store.clone());
    let to_o2 = EarmarkRequest::option("B1".into(), "O2".into());
    let to_o1 = EarmarkRequest::option("B1".into(), "O1".into());

    let Ok(_) = ledger.allocate(donation("D1", 20.0, true), Some(to_o2.clone())).await else {
        panic!("allocate failed");
    };
    let state = store.snapshot().await;
    assert_close(state.option_total("O2"), 25.0);
    assert_close(state.bid_total("B1"), 35.0);

    let Ok(_) = ledger.reallocate(donation("D1", 5.0, true), Some(to_o2)).await else {
        panic!("amount edit failed");
    };
    let state = store.snapshot().await;
    assert_close(state.option_total("O2"), 10.0);
    assert_close(state.bid_total("B1"), 20.0);

    let Ok(_) = ledger.reallocate(donation("D1", 5.0, true), Some(to_o1)).await else {
        panic!("re-earmark failed");
    };
    let state = store.snapshot().await;
    assert_close(state.option_total("O1"), 15.0);
    assert_close(state.option_total("O2"), 5.0);
    assert_close(state.bid_total("B1"), 20.0);

    let Ok(_) = ledger.deallocate(&"D1".into()).await else {
        panic!("deallocate failed");
    };
    let state = store.snapshot().await;
    assert_close(state.option_total("O1"), 10.0);
    assert_close(state.bid_total("B1"), 15.0);
    assert!(state.donations.is_empty());
    assert!(state.earmarks.is_empty());
}

#[tokio::test]
async fn totals_match_earmarked_donations_after_mixed_operations() {
    let store = MemoryStore::new();
    store.seed_bid("B1", BidType::Bidwar, true).await;
    store.seed_option("B1", "O1", "left").await;
    store.seed_option("B1", "O2", "right").await;
    store.seed_bid("G1", BidType::Goal, false).await;
    let ledger = Ledger::new(store.clone());

    let writes = [
        ledger
            .allocate(donation("D1", 12.5, true), Some(EarmarkRequest::option("B1".into(), "O1".into())))
            .await,
        ledger
            .allocate(donation("D2", 7.0, true), Some(EarmarkRequest::new_option("B1".into(), "middle")))
            .await,
        ledger
            .allocate(donation("D3", 3.0, true), Some(EarmarkRequest::bid("G1".into())))
            .await,
        ledger
            .reallocate(donation("D1", 4.0, true), Some(EarmarkRequest::option("B1".into(), "O2".into())))
            .await,
        ledger
            .reallocate(donation("D3", 9.0, true), Some(EarmarkRequest::option("B1".into(), "O1".into())))
            .await,
        ledger.deallocate(&"D2".into()).await,
    ];
    assert!(writes.iter().all(Result::is_ok));

    let state = store.snapshot().await;
    assert_close(state.bid_total("B1"), state.earmarked_sum("B1"));
    assert_close(state.bid_total("B1"), state.options_sum("B1"));
    assert_close(state.bid_total("G1"), state.earmarked_sum("G1"));
    assert_close(state.bid_total("B1"), 13.0);
    assert_close(state.bid_total("G1"), 0.0);

    for bid in ["B1", "G1"] {
        let Ok(report) = ledger.audit(&bid.into()).await else {
            panic!("audit of {bid} reported drift");
        };
        assert!(report.is_consistent());
    }
}

#[tokio::test]
async fn subtraction_is_floored_at_zero() {
    let store = MemoryStore::new();
    store.seed_bid("G1", BidType::Goal, false).await;
    let ledger = Ledger::new(store.clone());
    let Ok(_) = ledger
        .allocate(donation("D1", 10.0, true), Some(EarmarkRequest::bid("G1".into())))
        .await
    else {
        panic!("allocate failed");
    };
    store.force_bid_total("G1", 4.0).await;

    let Ok(receipt) = ledger.deallocate(&"D1".into()).await else {
        panic!("deallocate failed");
    };
    assert_close(store.snapshot().await.bid_total("G1"), 0.0);
    assert!(receipt.changes.iter().all(|change| match change {
        marathon_backend::ledger::TotalChange::Bid { adjusted, .. }
        | marathon_backend::ledger::TotalChange::Option { adjusted, .. } => adjusted.current >= 0.0,
    }));
}

#[tokio::test]
async fn injected_failure_rolls_back_every_step() {
    // allocate writes: donation, option total, bid total, earmark
    for failing_write in 1..=4 {
        let store = scenario_store().await;
        let ledger = Ledger::new(store.clone());
        store.fail_on_write(failing_write);

        let result = ledger
            .allocate(
                donation("D1", 20.0, true),
                Some(EarmarkRequest::option("B1".into(), "O2".into())),
            )
            .await;
        assert!(
            matches!(result, Err(MarathonError::Database(_))),
            "write {failing_write} should fail"
        );

        let state = store.snapshot().await;
        assert!(state.donations.is_empty(), "donation kept after failure at write {failing_write}");
        assert!(state.earmarks.is_empty());
        assert_close(state.option_total("O2"), 5.0);
        assert_close(state.bid_total("B1"), 15.0);
    }
}

#[tokio::test]
async fn failed_reallocation_keeps_previous_earmark() {
    let store = scenario_store().await;
    let ledger = Ledger::new(store.clone());
    let Ok(_) = ledger
        .allocate(
            donation("D1", 20.0, true),
            Some(EarmarkRequest::option("B1".into(), "O2".into())),
        )
        .await
    else {
        panic!("allocate failed");
    };

    // reallocate writes: donation, old option, old bid, new option, ...
    store.fail_on_write(4);
    let result = ledger
        .reallocate(
            donation("D1", 5.0, true),
            Some(EarmarkRequest::option("B1".into(), "O1".into())),
        )
        .await;
    assert!(result.is_err());

    let state = store.snapshot().await;
    assert_close(state.option_total("O1"), 10.0);
    assert_close(state.option_total("O2"), 25.0);
    assert_close(state.bid_total("B1"), 35.0);
    let Some(earmark) = state.earmarks.get(&EntityId::from("D1")) else {
        panic!("earmark lost");
    };
    assert_eq!(earmark.option_id.as_ref().map(EntityId::as_str), Some("O2"));
    let Some(stored) = state.donations.first() else {
        panic!("donation lost");
    };
    assert_close(stored.amount, 20.0);
}

#[tokio::test]
async fn duplicate_donation_id_is_rejected_without_side_effects() {
    let store = scenario_store().await;
    let ledger = Ledger::new(store.clone());
    let request = EarmarkRequest::option("B1".into(), "O1".into());
    let Ok(_) = ledger.allocate(donation("D1", 1.0, true), Some(request.clone())).await else {
        panic!("allocate failed");
    };
    let result = ledger.allocate(donation("D1", 2.0, true), Some(request)).await;
    assert!(matches!(result, Err(MarathonError::Duplicated(_))));
    assert_close(store.snapshot().await.bid_total("B1"), 16.0);
}

#[tokio::test]
async fn reconcile_repairs_drift_found_by_audit() {
    let store = MemoryStore::new();
    store.seed_bid("B1", BidType::Bidwar, false).await;
    store.seed_option("B1", "O1", "left").await;
    let ledger = Ledger::new(store.clone());
    let Ok(_) = ledger
        .allocate(
            donation("D1", 8.0, true),
            Some(EarmarkRequest::option("B1".into(), "O1".into())),
        )
        .await
    else {
        panic!("allocate failed");
    };
    store.force_bid_total("B1", 1.0).await;

    assert!(matches!(
        ledger.audit(&"B1".into()).await,
        Err(MarathonError::Inconsistent(_))
    ));
    let Ok(reconciliation) = ledger.reconcile(&"B1".into()).await else {
        panic!("reconcile failed");
    };
    assert!(!reconciliation.before.is_consistent());
    assert_close(store.snapshot().await.bid_total("B1"), 8.0);
    assert!(ledger.audit(&"B1".into()).await.is_ok());
}

#[tokio::test]
async fn empty_option_ids_from_json_become_separate_write_ins() {
    let store = scenario_store().await;
    let ledger = Ledger::new(store.clone());
    for (id, amount, name) in [("D1", 10.0, "alpha"), ("D2", 5.0, "beta")] {
        let body = serde_json::json!({ "bid_id": "B1", "option_id": "", "option_name": name });
        let Ok(request) = serde_json::from_value::<EarmarkRequest>(body) else {
            panic!("earmark request did not parse");
        };
        let Ok(_) = ledger.allocate(donation(id, amount, true), Some(request)).await else {
            panic!("allocate of {id} failed");
        };
    }

    let state = store.snapshot().await;
    let by_name = |name: &str| {
        let Some(option) = state.options.iter().find(|o| o.name == name) else {
            panic!("option {name} missing");
        };
        option.clone()
    };
    let (alpha, beta) = (by_name("alpha"), by_name("beta"));
    assert_ne!(alpha.id, beta.id);
    assert!(state.options.iter().all(|o| !o.id.as_str().is_empty()));
    assert_close(alpha.current_amount, 10.0);
    assert_close(beta.current_amount, 5.0);
    assert_close(state.bid_total("B1"), 30.0);
    assert_close(state.options_sum("B1"), 30.0);
}
