//! `PgStockStore` behaviour through the engine and directly.

mod common;

use std::sync::Arc;

use common::{database, date, pg_fixture, refill, usage};
use fuelcast_core::alerts::{AlertKind, AlertScope, NewAlertRule, Severity};
use fuelcast_core::ledger::StockWarning;
use fuelcast_engine::{StockStore, StoreError, TransactionFilter};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

#[tokio::test]
async fn test_capacity_warning_persisted_with_transaction() {
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(500000)).await;

    f.engine.record_refill(refill(f.key, dec!(350000), date(2025, 1, 2))).await.unwrap();
    let receipt = f.engine.record_refill(refill(f.key, dec!(200000), date(2025, 1, 3))).await.unwrap();

    assert_eq!(receipt.balance.current_quantity, dec!(500000));
    let stored = f
        .engine
        .list_transactions(TransactionFilter::for_key(f.key))
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].transaction_date, date(2025, 1, 3));
    assert_eq!(stored[0].total_cost, Some(dec!(250000)));
    assert!(matches!(
        stored[0].warning,
        Some(StockWarning::CapacityExceeded { excess, .. }) if excess == dec!(50000)
    ));

    let balance = f.store.get_balance(f.key).await.unwrap().unwrap();
    assert_eq!(balance.ledger_total, dec!(550000));
    assert_eq!(balance.version, 2);
}

#[tokio::test]
async fn test_idempotent_retry_persists_once() {
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(50000)).await;

    let mut input = refill(f.key, dec!(1200), date(2025, 1, 5));
    input.idempotency_key = Some("delivery-88".to_string());
    let first = f.engine.record_refill(input.clone()).await.unwrap();
    let retry = f.engine.record_refill(input).await.unwrap();

    assert!(!first.replayed);
    assert!(retry.replayed);
    assert_eq!(retry.transaction.id, first.transaction.id);
    assert_eq!(retry.balance.current_quantity, dec!(1200));

    let found = f.store.find_by_idempotency_key(f.key, "delivery-88").await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(first.transaction.id));
}

#[tokio::test]
async fn test_stale_version_writes_nothing() {
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(50000)).await;
    f.engine.record_refill(refill(f.key, dec!(500), date(2025, 1, 1))).await.unwrap();

    let stale = f.store.get_balance(f.key).await.unwrap().unwrap();
    f.engine.record_usage(usage(f.key, dec!(100), date(2025, 1, 2))).await.unwrap();

    let change = stale
        .apply_delta(dec!(-50), fuelcast_shared::config::OverdraftPolicy::Reject, chrono::Utc::now())
        .unwrap();
    let tx = fuelcast_core::ledger::NewTransaction::from(usage(f.key, dec!(50), date(2025, 1, 3)))
        .into_transaction(chrono::Utc::now(), None);
    let err = f
        .store
        .commit_transaction(&tx, &change.balance, stale.version)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::VersionConflict(key) if key == f.key));
    let transactions = f
        .store
        .list_transactions(TransactionFilter::for_key(f.key))
        .await
        .unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(f.store.get_balance(f.key).await.unwrap().unwrap().current_quantity, dec!(400));
}

#[tokio::test]
async fn test_duplicate_site_code_rejected() {
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(1000)).await;
    let site = f.engine.site(f.key.site_id).await.unwrap();

    let mut clone = site.clone();
    clone.id = fuelcast_shared::types::SiteId::new();
    let err = f.store.insert_site(&clone).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
}

#[tokio::test]
async fn test_forecast_recalculation_overwrites_row() {
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(50000)).await;
    f.engine.record_refill(refill(f.key, dec!(44000), date(2025, 1, 1))).await.unwrap();
    for day in [10, 20, 30] {
        f.engine.record_usage(usage(f.key, dec!(12000), date(2025, 1, day))).await.unwrap();
    }

    let asof = date(2025, 1, 30);
    let first = f.engine.calculate(f.key, asof, Some(dec!(1))).await.unwrap();
    let second = f.engine.calculate(f.key, asof, Some(dec!(1))).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.days_remaining, Some(dec!(6.67)));
    let history = f.store.forecast_history(f.key).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].rate_source, first.rate_source);
    assert_eq!(f.store.get_forecast(first.id).await.unwrap().as_ref(), Some(&first));
}

#[tokio::test]
async fn test_alert_events_round_trip_and_acknowledge() {
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(10000)).await;
    f.engine.record_refill(refill(f.key, dec!(1500), date(2025, 1, 1))).await.unwrap();
    f.engine
        .create_alert_rule(NewAlertRule {
            name: "Low fill".to_string(),
            scope: AlertScope {
                site_id: Some(f.key.site_id),
                fuel_type_id: None,
            },
            kind: AlertKind::LowStock,
            threshold: dec!(25),
        })
        .await
        .unwrap();

    let evaluation = f.engine.check_alerts().await.unwrap();
    let ours: Vec<_> = evaluation.emitted.iter().filter(|e| e.key() == f.key).collect();
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].severity, Severity::Critical);

    let acknowledged = f.engine.acknowledge_alert(ours[0].id, "shift-lead").await.unwrap();
    let stored = f.store.get_alert_event(ours[0].id).await.unwrap().unwrap();
    assert!(stored.acknowledged);
    assert_eq!(stored.acknowledged_by.as_deref(), Some("shift-lead"));
    assert_eq!(stored.id, acknowledged.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_usage_against_postgres() {
    const TASKS: usize = 40;
    let Some(db) = database().await else { return };
    let f = pg_fixture(db, dec!(50000)).await;
    f.engine.record_refill(refill(f.key, dec!(4000), date(2025, 1, 1))).await.unwrap();

    let barrier = Arc::new(Barrier::new(TASKS));
    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let engine = Arc::clone(&f.engine);
            let barrier = Arc::clone(&barrier);
            let key = f.key;
            tokio::spawn(async move {
                barrier.wait().await;
                engine.record_usage(usage(key, dec!(25), date(2025, 1, 2))).await
            })
        })
        .collect();
    let results = join_all(handles).await;
    assert!(results.into_iter().all(|r| r.unwrap().is_ok()));

    let balance = f.store.get_balance(f.key).await.unwrap().unwrap();
    let transactions = f
        .store
        .list_transactions(TransactionFilter::for_key(f.key))
        .await
        .unwrap();
    let sum: Decimal = transactions.iter().map(|t| t.signed_quantity()).sum();
    assert_eq!(sum, dec!(3000));
    assert_eq!(balance.current_quantity, sum);
    assert_eq!(balance.version, i64::try_from(TASKS).unwrap() + 1);
}
