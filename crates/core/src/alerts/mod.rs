//! Threshold alerts.
//!
//! This module implements:
//! - Alert rules scoped to a site, a fuel, both, or global
//! - A deterministic severity step function
//! - Evaluation with cooldown-based de-duplication

pub mod error;
pub mod evaluator;
pub mod severity;
pub mod types;

#[cfg(test)]
mod evaluator_props;

pub use error::AlertError;
pub use evaluator::{AlertEvaluator, KeyObservation};
pub use severity::classify;
pub use types::{
    AlertEvaluation, AlertEvent, AlertKind, AlertRule, AlertScope, AlertTrigger, NewAlertRule,
    Severity,
};
