//! Confidence scoring for rate estimates.
//!
//! `score = 100 · n / (n + 4) · (1 − min(cv, 1) / 2)`, rounded to a whole
//! number, where `n` is the number of distinct days with data and `cv` the
//! coefficient of variation of the per-day quantities. The score rises with
//! `n` and falls with `cv`; the same inputs always give the same score.
//!
//! Deviations are taken on `v / mean` so the variance stays bounded by the
//! sample count however large the quantities are.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

/// Fixed score for estimates built from equipment nameplate rates.
pub const NOMINAL_CONFIDENCE: u8 = 20;

/// Sample count at which the sample term reaches half weight.
const HALF_WEIGHT_SAMPLES: u32 = 4;

/// Maximum fraction of the score removed by dispersion.
const DISPERSION_PENALTY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Scores a series of per-day quantities.
///
/// Returns `None` when the series total does not fit in a `Decimal`.
#[must_use]
pub fn confidence_level(per_day: &[Decimal]) -> Option<u8> {
    let samples = u32::try_from(per_day.len()).unwrap_or(u32::MAX);
    Some(score(samples, coefficient_of_variation(per_day)?))
}

/// Combines a sample count and a coefficient of variation into a 0–100 score.
#[must_use]
pub fn score(samples: u32, cv: Decimal) -> u8 {
    if samples == 0 {
        return 0;
    }
    let n = Decimal::from(samples);
    let sample_term = Decimal::ONE_HUNDRED * n / (n + Decimal::from(HALF_WEIGHT_SAMPLES));
    let dispersion = cv.clamp(Decimal::ZERO, Decimal::ONE);
    let raw = sample_term * (Decimal::ONE - dispersion * DISPERSION_PENALTY);

    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
        .map_or(0, |s| s.min(100))
}

/// Population coefficient of variation; zero for empty or zero-mean input.
///
/// Returns `None` on arithmetic overflow.
#[must_use]
pub fn coefficient_of_variation(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return Some(Decimal::ZERO);
    }
    let n = Decimal::from(values.len());
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    let mean = total.checked_div(n)?;
    if mean <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }

    let mut squares = Decimal::ZERO;
    for v in values {
        let deviation = v.checked_div(mean)?.checked_sub(Decimal::ONE)?;
        squares = squares.checked_add(deviation.checked_mul(deviation)?)?;
    }

    Some(squares.checked_div(n)?.sqrt().unwrap_or(Decimal::ZERO))
}
