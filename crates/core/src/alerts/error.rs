//! Alert error types.

use fuelcast_shared::types::{AlertEventId, AlertRuleId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Alert-related errors.
#[derive(Debug, Error)]
pub enum AlertError {
    /// Rule name is blank.
    #[error("Alert rule name must not be empty")]
    EmptyName,

    /// Threshold outside the range of the rule's metric.
    #[error("Threshold {threshold} is out of range for {kind} rules")]
    InvalidThreshold {
        /// Rule kind.
        kind: &'static str,
        /// Rejected threshold.
        threshold: Decimal,
    },

    /// Alert rule not found.
    #[error("Alert rule not found: {0}")]
    RuleNotFound(AlertRuleId),

    /// Alert event not found.
    #[error("Alert event not found: {0}")]
    EventNotFound(AlertEventId),
}

impl AlertError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_NAME",
            Self::InvalidThreshold { .. } => "INVALID_THRESHOLD",
            Self::RuleNotFound(_) => "ALERT_RULE_NOT_FOUND",
            Self::EventNotFound(_) => "ALERT_EVENT_NOT_FOUND",
        }
    }

    /// Returns true when the error means the referenced record does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RuleNotFound(_) | Self::EventNotFound(_))
    }

    /// Returns true if retrying the same request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}
