//! Decimal quantity helpers.
//!
//! CRITICAL: Never use floating-point for stock quantities.
//! Litres, rates, costs and day counts are all `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// A fuel quantity (litres) with exact decimal precision.
pub type Quantity = Decimal;

/// Scale used for stored quantities and rates.
pub const QUANTITY_SCALE: u32 = 4;

/// Scale used for day counts and percentages.
pub const DISPLAY_SCALE: u32 = 2;

/// Largest quantity, rate or capacity a single record may carry: 10^12.
///
/// Keeps sums and products of recorded values well inside `Decimal` range.
pub const MAX_RECORD_QUANTITY: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Rounds a quantity or rate to storage precision using Banker's Rounding.
#[must_use]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a day count to two decimal places using Banker's Rounding.
#[must_use]
pub fn round_days(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns `part` as a percentage of `whole`, rounded to two decimals.
///
/// Returns zero when `whole` is not positive.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_days(part * Decimal::ONE_HUNDRED / whole)
}
