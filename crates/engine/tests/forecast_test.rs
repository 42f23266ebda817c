//! Forecast, batch and scenario behaviour through the engine.

mod common;

use std::sync::Arc;

use common::{date, depleting_fixture, fixture, refill, register_equipment, register_fuel};
use fuelcast_core::ledger::NewHoursEntry;
use fuelcast_core::rate::RateSource;
use fuelcast_core::scenario::ScenarioInput;
use fuelcast_engine::ErrorKind;
use fuelcast_shared::types::{ForecastId, MAX_RECORD_QUANTITY, StockKey};
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_forecast_example_days_remaining() {
    let f = depleting_fixture().await;

    let forecast = f
        .engine
        .calculate(f.key, date(2025, 1, 30), Some(dec!(1.0)))
        .await
        .unwrap();

    assert_eq!(forecast.daily_rate, dec!(1200));
    assert_eq!(forecast.available_quantity, dec!(8000));
    assert_eq!(forecast.days_remaining, Some(dec!(6.67)));
    assert_eq!(forecast.depletion_date, Some(date(2025, 2, 5)));
    // Seven safety-stock days before depletion is already past the as-of date.
    assert_eq!(forecast.reorder_date, Some(date(2025, 1, 30)));
    assert_eq!(forecast.rate_source, RateSource::UsageTransactions);
    assert_eq!(forecast.sample_days, 3);
    assert_eq!(forecast.id, ForecastId::for_key(f.key.site_id, f.key.fuel_type_id, date(2025, 1, 30)));
}

#[tokio::test]
async fn test_default_safety_factor_applies() {
    let f = depleting_fixture().await;
    let forecast = f.engine.calculate(f.key, date(2025, 1, 30), None).await.unwrap();

    assert_eq!(forecast.safety_factor, dec!(1.2));
    // 8000 / (1200 × 1.2)
    assert_eq!(forecast.days_remaining, Some(dec!(5.56)));
}

#[tokio::test]
async fn test_calculate_all_twice_is_identical() {
    let f = depleting_fixture().await;
    let cancel = CancellationToken::new();
    let asof = date(2025, 1, 30);

    let first = f.engine.calculate_all(asof, &cancel).await.unwrap();
    let stored = f.engine.forecast_history(f.key).await.unwrap();
    let second = f.engine.calculate_all(asof, &cancel).await.unwrap();
    let restored = f.engine.forecast_history(f.key).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.succeeded, vec![f.key]);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored, restored);
}

#[tokio::test]
async fn test_batch_reports_partial_failure() {
    let f = depleting_fixture().await;
    let petrol = register_fuel(&f.engine, "Petrol", "PTL").await;
    let idle = StockKey::new(f.site.id, petrol.id);
    f.engine.open_balance(idle, common::settings(dec!(1000))).await.unwrap();

    let summary = f
        .engine
        .calculate_all(date(2025, 1, 30), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.succeeded, vec![f.key]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].key, idle);
    assert_eq!(summary.failed[0].code, "COMPUTATION_ERROR");
    assert!(!summary.is_complete());

    let err = f.engine.calculate(idle, date(2025, 1, 30), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Computation);
}

#[tokio::test]
async fn test_cancelled_batch_runs_nothing() {
    let f = depleting_fixture().await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let summary = f.engine.calculate_all(date(2025, 1, 30), &cancel).await.unwrap();

    assert!(summary.cancelled);
    assert!(summary.succeeded.is_empty());
    assert!(f.engine.forecast_history(f.key).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deactivated_fuel_skipped_by_batch() {
    let f = depleting_fixture().await;
    f.engine.deactivate_fuel_type(f.fuel.id).await.unwrap();

    let summary = f
        .engine
        .calculate_all(date(2025, 1, 30), &CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.succeeded.is_empty());
    assert!(summary.failed.is_empty());
}

#[tokio::test]
async fn test_operational_hours_preferred_over_usage() {
    let f = fixture(dec!(50000)).await;
    let generator = register_equipment(&f.engine, f.key, "GEN-1", dec!(25)).await;
    f.engine.record_refill(refill(f.key, dec!(3000), date(2025, 1, 1))).await.unwrap();
    for day in [5, 6, 7] {
        f.engine
            .log_operational_hours(NewHoursEntry {
                site_id: f.site.id,
                equipment_id: generator.id,
                log_date: date(2025, 1, day),
                running_hours: dec!(12),
                fuel_consumed: Some(dec!(300)),
                recorded_by: Some("operator".to_string()),
                notes: None,
            })
            .await
            .unwrap();
    }

    let forecast = f.engine.calculate(f.key, date(2025, 1, 30), None).await.unwrap();

    assert_eq!(forecast.rate_source, RateSource::OperationalHours);
    // 900 litres over a 30-day window.
    assert_eq!(forecast.daily_rate, dec!(30));
}

#[tokio::test]
async fn test_extreme_metered_volumes_never_panic() {
    let f = fixture(dec!(50000)).await;
    let generator = register_equipment(&f.engine, f.key, "GEN-1", dec!(25)).await;
    f.engine.record_refill(refill(f.key, dec!(3000), date(2025, 1, 1))).await.unwrap();
    let entry = |day: u32, consumed| NewHoursEntry {
        site_id: f.site.id,
        equipment_id: generator.id,
        log_date: date(2025, 1, day),
        running_hours: dec!(24),
        fuel_consumed: Some(consumed),
        recorded_by: None,
        notes: None,
    };

    let err = f
        .engine
        .log_operational_hours(entry(9, dec!(1000000000000000)))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "QUANTITY_TOO_LARGE");
    for day in [10, 11, 12] {
        f.engine
            .log_operational_hours(entry(day, MAX_RECORD_QUANTITY))
            .await
            .unwrap();
    }

    let engine = Arc::clone(&f.engine);
    let key = f.key;
    let joined = tokio::spawn(async move { engine.calculate(key, date(2025, 1, 12), None).await }).await;

    let forecast = joined.expect("calculation task must not panic").unwrap();
    // 3 × 10^12 litres over a 30-day window.
    assert_eq!(forecast.daily_rate, dec!(100000000000));
    assert_eq!(forecast.days_remaining, Some(dec!(0)));
}

#[tokio::test]
async fn test_nominal_fallback_is_low_confidence() {
    let f = fixture(dec!(50000)).await;
    register_equipment(&f.engine, f.key, "GEN-1", dec!(25)).await;
    f.engine.record_refill(refill(f.key, dec!(4000), date(2025, 1, 1))).await.unwrap();

    let forecast = f.engine.calculate(f.key, date(2025, 1, 30), Some(dec!(1))).await.unwrap();

    assert_eq!(forecast.rate_source, RateSource::NominalRate);
    assert_eq!(forecast.daily_rate, dec!(200));
    assert_eq!(forecast.days_remaining, Some(dec!(20)));
    assert_eq!(forecast.confidence_level, fuelcast_core::rate::NOMINAL_CONFIDENCE);
}

#[tokio::test]
async fn test_zero_rate_is_unbounded() {
    let f = fixture(dec!(50000)).await;
    register_equipment(&f.engine, f.key, "STANDBY", dec!(0)).await;
    f.engine.record_refill(refill(f.key, dec!(4000), date(2025, 1, 1))).await.unwrap();

    let forecast = f.engine.calculate(f.key, date(2025, 1, 30), None).await.unwrap();

    assert!(forecast.is_unbounded());
    assert_eq!(forecast.depletion_date, None);
    assert_eq!(forecast.reorder_date, None);
}

#[tokio::test]
async fn test_get_forecast_picks_latest_on_or_before_date() {
    let f = depleting_fixture().await;
    f.engine.calculate(f.key, date(2025, 1, 30), None).await.unwrap();
    f.engine.calculate(f.key, date(2025, 2, 5), None).await.unwrap();

    let on_first = f.engine.get_forecast(Some(f.site.id), date(2025, 2, 1)).await.unwrap();
    assert_eq!(on_first.len(), 1);
    assert_eq!(on_first[0].asof_date, date(2025, 1, 30));

    let latest = f.engine.latest_forecast(f.key).await.unwrap().unwrap();
    assert_eq!(latest.asof_date, date(2025, 2, 5));
    assert_eq!(f.engine.forecast_history(f.key).await.unwrap().len(), 2);
    assert!(f.engine.get_forecast(None, date(2025, 1, 1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scenario_leaves_baseline_untouched() {
    let f = depleting_fixture().await;
    let baseline = f
        .engine
        .calculate(f.key, date(2025, 1, 30), Some(dec!(1.0)))
        .await
        .unwrap();

    let scenario = f
        .engine
        .create_scenario(
            baseline.id,
            ScenarioInput {
                name: "Half shift".to_string(),
                adjusted_rate: Some(dec!(600)),
                adjusted_safety_factor: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(scenario.days_remaining, Some(dec!(13.33)));
    assert_eq!(scenario.days_delta, Some(dec!(6.66)));
    assert_eq!(f.engine.get_forecast_by_id(baseline.id).await.unwrap(), baseline);
    assert_eq!(f.engine.list_scenarios(baseline.id), vec![scenario]);
}

#[tokio::test]
async fn test_scenario_errors() {
    let f = depleting_fixture().await;
    let baseline = f.engine.calculate(f.key, date(2025, 1, 30), None).await.unwrap();

    let missing = f
        .engine
        .create_scenario(
            ForecastId::new(),
            ScenarioInput {
                name: "Ghost".to_string(),
                adjusted_rate: Some(dec!(1)),
                adjusted_safety_factor: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    let empty = f
        .engine
        .create_scenario(
            baseline.id,
            ScenarioInput {
                name: "Nothing".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::Validation);

    let negative = f
        .engine
        .create_scenario(
            baseline.id,
            ScenarioInput {
                name: "Negative".to_string(),
                adjusted_rate: Some(dec!(-5)),
                adjusted_safety_factor: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(negative.kind(), ErrorKind::Validation);
}
