//! Property-based tests for confidence scoring.
//!
//! - Property 4: Monotonic in sample count
//! - Property 5: Non-increasing in dispersion
//! - Property 6: Bounded and deterministic

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::confidence::{coefficient_of_variation, confidence_level, score};

/// Strategy to generate coefficients of variation (0.000 to 3.000).
fn cv() -> impl Strategy<Value = Decimal> {
    (0i64..=3000i64).prop_map(|v| Decimal::new(v, 3))
}

/// Strategy to generate per-day quantities (0.00 to 100,000.00 litres).
fn daily_quantities() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((0i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2)), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 4.1: More samples never lower the score at equal dispersion.
    #[test]
    fn prop_score_non_decreasing_in_samples(
        samples in 0u32..500,
        extra in 0u32..500,
        cv in cv(),
    ) {
        prop_assert!(score(samples, cv) <= score(samples + extra, cv));
    }

    /// Property 5.1: More dispersion never raises the score at equal sample count.
    #[test]
    fn prop_score_non_increasing_in_cv(
        samples in 0u32..500,
        low in cv(),
        high in cv(),
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        prop_assert!(score(samples, low) >= score(samples, high));
    }

    /// Property 6.1: Scores stay within 0..=100.
    #[test]
    fn prop_score_bounded(values in daily_quantities()) {
        prop_assert!(confidence_level(&values).is_some_and(|s| s <= 100));
    }

    /// Property 6.2: Identical inputs give identical scores.
    #[test]
    fn prop_score_deterministic(values in daily_quantities()) {
        prop_assert_eq!(confidence_level(&values), confidence_level(&values.clone()));
        prop_assert!(coefficient_of_variation(&values).is_some_and(|cv| cv >= Decimal::ZERO));
    }
}
