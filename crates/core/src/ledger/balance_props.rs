//! Property-based tests for the stock balance aggregate.
//!
//! - Property 1: Clamp-of-sum invariant
//! - Property 2: Balance never negative
//! - Property 3: Available never exceeds current

use chrono::Utc;
use fuelcast_shared::config::OverdraftPolicy;
use fuelcast_shared::types::{FuelTypeId, SiteId, StockKey};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{BalanceSettings, StockBalance, StockWarning};
use super::error::LedgerError;

/// Strategy to generate non-zero signed quantities (-50,000.00 to 50,000.00).
fn signed_quantity() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..5_000_000i64).prop_map(|c| Decimal::new(c, 2)),
        (1i64..5_000_000i64).prop_map(|c| Decimal::new(-c, 2)),
    ]
}

/// Strategy to generate consistent balance settings.
fn settings() -> impl Strategy<Value = BalanceSettings> {
    (1i64..20_000_000i64, 0u32..=100, 0u32..=20).prop_map(|(capacity, min_pct, reserve_pct)| {
        let maximum_capacity = Decimal::new(capacity, 2);
        BalanceSettings {
            maximum_capacity,
            minimum_threshold: maximum_capacity * Decimal::from(min_pct) / Decimal::from(100),
            reserved_quantity: maximum_capacity * Decimal::from(reserve_pct) / Decimal::from(100),
        }
    })
}

fn policy() -> impl Strategy<Value = OverdraftPolicy> {
    prop_oneof![Just(OverdraftPolicy::Reject), Just(OverdraftPolicy::Clamp)]
}

fn key() -> StockKey {
    StockKey::new(SiteId::new(), FuelTypeId::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // =========================================================================
    // Property 1: Clamp-of-sum invariant
    // =========================================================================

    /// Property 1.1: With the clamp policy every delta is accepted and the
    /// current quantity always equals `clamp(Σ deltas, 0, capacity)`.
    #[test]
    fn prop_current_is_clamp_of_sum(
        settings in settings(),
        deltas in prop::collection::vec(signed_quantity(), 1..60),
    ) {
        let now = Utc::now();
        let mut balance = StockBalance::open(key(), settings, now).unwrap();
        let mut sum = Decimal::ZERO;

        for delta in deltas {
            balance = balance.apply_delta(delta, OverdraftPolicy::Clamp, now).unwrap().balance;
            sum += delta;
            prop_assert_eq!(
                balance.current_quantity,
                sum.clamp(Decimal::ZERO, settings.maximum_capacity)
            );
            prop_assert_eq!(balance.ledger_total, sum);
        }
    }

    /// Property 1.2: Folding deltas one at a time equals replaying them at once.
    #[test]
    fn prop_incremental_matches_replay(
        settings in settings(),
        deltas in prop::collection::vec(signed_quantity(), 1..40),
    ) {
        let now = Utc::now();
        let k = key();
        let mut balance = StockBalance::open(k, settings, now).unwrap();
        for delta in &deltas {
            balance = balance.apply_delta(*delta, OverdraftPolicy::Clamp, now).unwrap().balance;
        }
        let replayed = StockBalance::replay(k, settings, deltas.iter().copied(), now).unwrap();

        prop_assert_eq!(balance.current_quantity, replayed.current_quantity);
        prop_assert_eq!(balance.available_quantity, replayed.available_quantity);
        prop_assert_eq!(balance.version, replayed.version);
    }

    // =========================================================================
    // Property 2: Balance never negative
    // =========================================================================

    /// Property 2.1: A usage above available is either rejected with the
    /// balance untouched, or clamped with a shortfall flag. Never negative.
    #[test]
    fn prop_overdraft_rejected_or_flagged(
        settings in settings(),
        policy in policy(),
        deltas in prop::collection::vec(signed_quantity(), 1..60),
    ) {
        let now = Utc::now();
        let mut balance = StockBalance::open(key(), settings, now).unwrap();

        for delta in deltas {
            let overdraws = delta.is_sign_negative() && -delta > balance.available_quantity;
            match balance.apply_delta(delta, policy, now) {
                Ok(change) => {
                    if overdraws {
                        prop_assert_eq!(policy, OverdraftPolicy::Clamp);
                        let is_shortfall = matches!(change.warning, Some(StockWarning::Shortfall { .. }));
                        prop_assert!(is_shortfall);
                    }
                    balance = change.balance;
                }
                Err(LedgerError::Overdraft { .. }) => {
                    prop_assert!(overdraws);
                    prop_assert_eq!(policy, OverdraftPolicy::Reject);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            prop_assert!(balance.current_quantity >= Decimal::ZERO);
            prop_assert!(balance.current_quantity <= settings.maximum_capacity);
        }
    }

    // =========================================================================
    // Property 3: Available never exceeds current
    // =========================================================================

    /// Property 3.1: `0 ≤ available ≤ current` after every delta.
    #[test]
    fn prop_available_within_current(
        settings in settings(),
        policy in policy(),
        deltas in prop::collection::vec(signed_quantity(), 1..60),
    ) {
        let now = Utc::now();
        let mut balance = StockBalance::open(key(), settings, now).unwrap();

        for delta in deltas {
            if let Ok(change) = balance.apply_delta(delta, policy, now) {
                balance = change.balance;
            }
            prop_assert!(balance.available_quantity >= Decimal::ZERO);
            prop_assert!(balance.available_quantity <= balance.current_quantity);
        }
    }

    /// Property 3.2: A refill above capacity always carries the excess.
    #[test]
    fn prop_capacity_excess_reported(
        settings in settings(),
        delta in (1i64..5_000_000i64).prop_map(|c| Decimal::new(c, 2)),
    ) {
        let now = Utc::now();
        let balance = StockBalance::open(key(), settings, now).unwrap();
        let change = balance.apply_delta(delta, OverdraftPolicy::Reject, now).unwrap();

        if delta > settings.maximum_capacity {
            prop_assert_eq!(
                change.warning,
                Some(StockWarning::CapacityExceeded {
                    requested: delta,
                    raw_total: delta,
                    capacity: settings.maximum_capacity,
                    excess: delta - settings.maximum_capacity,
                })
            );
        } else {
            prop_assert!(change.warning.is_none());
        }
    }
}
