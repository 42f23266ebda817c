//! Property-based tests for alert evaluation.
//!
//! - Property 7: Severity is monotonic in the metric
//! - Property 8: Cooldown suppresses duplicate firing

use chrono::{Duration, Utc};
use fuelcast_shared::config::SeverityBands;
use fuelcast_shared::types::{FuelTypeId, SiteId, StockKey};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::evaluator::{AlertEvaluator, KeyObservation};
use super::severity::classify;
use super::types::{AlertKind, AlertScope, AlertTrigger, NewAlertRule};

/// Strategy to generate metric values (0.00 to 200.00).
fn metric() -> impl Strategy<Value = Decimal> {
    (0i64..20_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn kind() -> impl Strategy<Value = AlertKind> {
    prop_oneof![Just(AlertKind::LowStock), Just(AlertKind::ForecastShortage)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 7: Severity is monotonic in the metric
    // =========================================================================

    /// Property 7.1: A lower metric is never less severe.
    #[test]
    fn prop_severity_monotonic(a in metric(), b in metric()) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        for bands in [SeverityBands::days(), SeverityBands::fill()] {
            prop_assert!(classify(low, &bands) >= classify(high, &bands));
        }
    }

    // =========================================================================
    // Property 8: Cooldown suppresses duplicate firing
    // =========================================================================

    /// Property 8.1: A second pass inside the cooldown with unchanged metrics
    /// emits nothing for rules that already fired.
    #[test]
    fn prop_second_pass_emits_nothing(
        kind in kind(),
        threshold in (1i64..100i64).prop_map(Decimal::from),
        value in metric(),
        minutes_later in 0i64..720,
    ) {
        let evaluator = AlertEvaluator::default();
        let now = Utc::now();
        let rule = NewAlertRule {
            name: "rule".to_string(),
            scope: AlertScope::global(),
            kind,
            threshold,
        }
        .into_rule(now)
        .unwrap();
        let observations = [KeyObservation {
            key: StockKey::new(SiteId::new(), FuelTypeId::new()),
            site_name: "Site".to_string(),
            fuel_name: "Fuel".to_string(),
            fill_percentage: value,
            days_remaining: Some(value),
        }];
        let rules = [rule];

        let first = evaluator.evaluate(&rules, &observations, &[], AlertTrigger::Scheduled, now);
        let second = evaluator.evaluate(
            &rules,
            &observations,
            &first.emitted,
            AlertTrigger::Scheduled,
            now + Duration::minutes(minutes_later),
        );

        prop_assert!(second.emitted.is_empty());
        prop_assert_eq!(second.suppressed as usize, first.emitted.len());
    }
}
