//! Consumption rate estimation.
//!
//! Produces a daily-rate estimate for one (site, fuel) pair from logged
//! operational hours, usage transactions or, failing both, the nameplate
//! rates of the installed equipment.

pub mod confidence;
pub mod error;
pub mod estimator;

#[cfg(test)]
mod confidence_props;

pub use confidence::{NOMINAL_CONFIDENCE, confidence_level};
pub use error::RateError;
pub use estimator::{RateEstimate, RateEstimator, RateInputs, RateParams, RateSource};
