//! Rate estimation error types.

use fuelcast_shared::types::StockKey;
use thiserror::Error;

/// Errors that can occur while estimating a consumption rate.
#[derive(Debug, Error)]
pub enum RateError {
    /// Neither logged data nor a nominal fallback is available.
    #[error("No usable consumption data and no equipment fallback for {0}")]
    NoUsableData(StockKey),

    /// Logged quantities sum past the representable range.
    #[error("Consumption totals for {0} exceed the representable range")]
    Overflow(StockKey),

    /// Lookback window must cover at least one day.
    #[error("Lookback window must be at least one day")]
    EmptyWindow,
}

impl RateError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoUsableData(_) => "NO_USABLE_DATA",
            Self::Overflow(_) => "ARITHMETIC_OVERFLOW",
            Self::EmptyWindow => "EMPTY_WINDOW",
        }
    }

    /// Returns true if retrying could succeed without new data.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}
