//! Scenario error types.

use fuelcast_shared::types::ForecastId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Scenario-related errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Baseline forecast does not exist.
    #[error("Forecast not found: {0}")]
    ForecastNotFound(ForecastId),

    /// Neither an adjusted rate nor an adjusted safety factor was given.
    #[error("Scenario must adjust the rate, the safety factor, or both")]
    NoAdjustment,

    /// Adjusted rate is negative.
    #[error("Adjusted rate cannot be negative, got {0}")]
    NegativeRate(Decimal),

    /// Adjusted safety factor is not positive.
    #[error("Adjusted safety factor must be positive, got {0}")]
    InvalidSafetyFactor(Decimal),

    /// Adjusted parameters push the projection out of range.
    #[error("Scenario projection exceeds the representable range")]
    Overflow,

    /// Scenario name is blank.
    #[error("Scenario name must not be empty")]
    EmptyName,
}

impl ScenarioError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ForecastNotFound(_) => "FORECAST_NOT_FOUND",
            Self::NoAdjustment => "NO_ADJUSTMENT",
            Self::NegativeRate(_) => "NEGATIVE_RATE",
            Self::InvalidSafetyFactor(_) => "INVALID_SAFETY_FACTOR",
            Self::Overflow => "ARITHMETIC_OVERFLOW",
            Self::EmptyName => "EMPTY_NAME",
        }
    }

    /// Returns true if retrying the same request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}
