//! Forecast calculation.
//!
//! Combines a balance, a rate estimate and a safety factor into days
//! remaining, a depletion date and a re-order date.

pub mod calculator;
pub mod error;
pub mod types;

pub use calculator::{ForecastCalculator, Projection};
pub use error::ForecastError;
pub use types::{ConsumptionForecast, NO_CONSUMPTION_DETECTED};
