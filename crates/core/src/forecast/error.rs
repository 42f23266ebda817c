//! Forecast error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::rate::RateError;

/// Forecast-related errors.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Safety factor must be strictly positive.
    #[error("Safety factor must be positive, got {0}")]
    InvalidSafetyFactor(Decimal),

    /// Projection left the `Decimal` range.
    #[error("Projection exceeds the representable range")]
    Overflow,

    /// Rate could not be estimated.
    #[error(transparent)]
    Rate(#[from] RateError),
}

impl ForecastError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSafetyFactor(_) => "INVALID_SAFETY_FACTOR",
            Self::Overflow => "ARITHMETIC_OVERFLOW",
            Self::Rate(inner) => inner.error_code(),
        }
    }

    /// Returns true if retrying could succeed without new data.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Returns true for input errors, false for computation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidSafetyFactor(_) | Self::Rate(RateError::EmptyWindow))
    }
}
