//! Engine error taxonomy.
//!
//! Every domain error from `fuelcast-core` and every [`StoreError`] converts
//! into one [`EngineError`]. Warnings (capacity exceeded, clamped shortfall)
//! are not errors; they ride on the successful [`crate::TransactionReceipt`].

use std::time::Duration;

use fuelcast_core::alerts::AlertError;
use fuelcast_core::forecast::ForecastError;
use fuelcast_core::ledger::LedgerError;
use fuelcast_core::rate::RateError;
use fuelcast_core::reference::ReferenceError;
use fuelcast_core::scenario::ScenarioError;
use fuelcast_shared::AppError;
use fuelcast_shared::types::StockKey;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using `EngineError`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Unknown site, fuel, equipment, balance, forecast, rule or event.
    NotFound,
    /// Concurrent update detected or unique value already taken.
    Conflict,
    /// Usage would force the balance negative.
    Overdraft,
    /// Rate estimator had nothing to work with.
    Computation,
    /// Storage call or lock wait exceeded its bound.
    Timeout,
    /// Storage collaborator failed.
    Storage,
}

/// Errors returned by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input.
    #[error("{message}")]
    Validation {
        /// Machine-readable code from the domain error.
        code: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// Referenced record does not exist.
    #[error("{message}")]
    NotFound {
        /// Machine-readable code from the domain error.
        code: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// Concurrent update detected or unique value already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Usage exceeds the available quantity under the reject policy.
    #[error("Usage of {requested} exceeds available quantity {available}")]
    Overdraft {
        /// Quantity the usage asked for.
        requested: Decimal,
        /// Quantity available at the time.
        available: Decimal,
    },

    /// No usable data for a rate estimate.
    #[error("Cannot compute forecast for {key}: {reason}")]
    Computation {
        /// Key whose forecast failed.
        key: StockKey,
        /// Why.
        reason: String,
    },

    /// Storage call or lock acquisition exceeded its bound.
    #[error("{operation} timed out after {}ms", after.as_millis())]
    Timeout {
        /// Operation that timed out.
        operation: &'static str,
        /// Bound that was exceeded.
        after: Duration,
    },

    /// Storage collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub(crate) fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Returns the coarse classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Overdraft { .. } => ErrorKind::Overdraft,
            Self::Computation { .. } => ErrorKind::Computation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. } | Self::NotFound { code, .. } => *code,
            Self::Conflict(_) => "CONFLICT",
            Self::Overdraft { .. } => "OVERDRAFT",
            Self::Computation { .. } => "COMPUTATION_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the caller may retry with the same idempotency key.
    ///
    /// The engine never retries internally.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Conflict(_))
    }
}

impl From<ReferenceError> for EngineError {
    fn from(err: ReferenceError) -> Self {
        let code = err.error_code();
        if err.is_not_found() {
            Self::not_found(code, err.to_string())
        } else if err.is_conflict() {
            Self::Conflict(err.to_string())
        } else {
            Self::validation(code, err.to_string())
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Reference(inner) => inner.into(),
            LedgerError::Overdraft {
                requested,
                available,
            } => Self::Overdraft {
                requested,
                available,
            },
            other @ LedgerError::BalanceAlreadyOpen(_) => Self::Conflict(other.to_string()),
            other @ LedgerError::Overflow(key) => Self::Computation {
                key,
                reason: other.to_string(),
            },
            other if other.is_not_found() => Self::not_found(other.error_code(), other.to_string()),
            other => Self::validation(other.error_code(), other.to_string()),
        }
    }
}

impl From<ForecastError> for EngineError {
    fn from(err: ForecastError) -> Self {
        match err {
            ForecastError::Rate(
                inner @ (RateError::NoUsableData(key) | RateError::Overflow(key)),
            ) => Self::Computation {
                key,
                reason: inner.to_string(),
            },
            other => Self::validation(other.error_code(), other.to_string()),
        }
    }
}

impl From<ScenarioError> for EngineError {
    fn from(err: ScenarioError) -> Self {
        match err {
            other @ ScenarioError::ForecastNotFound(_) => {
                Self::not_found(other.error_code(), other.to_string())
            }
            other => Self::validation(other.error_code(), other.to_string()),
        }
    }
}

impl From<AlertError> for EngineError {
    fn from(err: AlertError) -> Self {
        if err.is_not_found() {
            Self::not_found(err.error_code(), err.to_string())
        } else {
            Self::validation(err.error_code(), err.to_string())
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            other @ (StoreError::VersionConflict(_) | StoreError::Duplicate(_)) => {
                Self::Conflict(other.to_string())
            }
            other @ StoreError::Missing(_) => Self::not_found("NOT_FOUND", other.to_string()),
            StoreError::Backend(message) => Self::Storage(message),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err.kind() {
            ErrorKind::Validation | ErrorKind::Overdraft | ErrorKind::Computation => {
                Self::Validation(err.to_string())
            }
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::Conflict => Self::Conflict(err.to_string()),
            ErrorKind::Timeout => Self::Timeout(err.to_string()),
            ErrorKind::Storage => Self::Database(err.to_string()),
        }
    }
}
