//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur while appending to the
//! stock ledger or applying a delta to a balance.

use chrono::NaiveDate;
use fuelcast_shared::types::{EquipmentId, FuelTypeId, StockKey};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::reference::ReferenceError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Quantity must be strictly positive.
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Quantity above the largest single movement the ledger accepts.
    #[error("Quantity {0} exceeds the per-record limit")]
    QuantityTooLarge(Decimal),

    /// Unit cost cannot be negative.
    #[error("Unit cost cannot be negative")]
    NegativeUnitCost,

    /// Unit cost above the per-record limit.
    #[error("Unit cost {0} exceeds the per-record limit")]
    UnitCostTooLarge(Decimal),

    /// Idempotency key was supplied but blank.
    #[error("Idempotency key must not be blank")]
    BlankIdempotencyKey,

    /// Running hours outside a single day.
    #[error("Running hours must be between 0 and 24, got {0}")]
    InvalidRunningHours(Decimal),

    /// Logged fuel consumption cannot be negative.
    #[error("Fuel consumed cannot be negative")]
    NegativeFuelConsumed,

    /// Record dated beyond the accepted horizon.
    #[error("Date {date} is after {today}")]
    FutureDate {
        /// The date the caller supplied.
        date: NaiveDate,
        /// The engine's current date.
        today: NaiveDate,
    },

    /// Equipment burns a different fuel than the transaction names.
    #[error("Equipment {equipment_id} does not use fuel type {fuel_type_id}")]
    EquipmentFuelMismatch {
        /// The equipment referenced.
        equipment_id: EquipmentId,
        /// The fuel the caller named.
        fuel_type_id: FuelTypeId,
    },

    /// Balance settings are inconsistent.
    #[error("Invalid balance settings: {0}")]
    InvalidSettings(&'static str),

    /// Reference entity missing or inactive.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    // ========== Balance Errors ==========
    /// No balance has been opened for this (site, fuel) pair.
    #[error("No stock balance opened for {0}")]
    BalanceNotFound(StockKey),

    /// A balance already exists for this (site, fuel) pair.
    #[error("Stock balance already opened for {0}")]
    BalanceAlreadyOpen(StockKey),

    /// Running total left the `Decimal` range.
    #[error("Ledger total for {0} exceeds the representable range")]
    Overflow(StockKey),

    /// Usage exceeds the available quantity under the reject policy.
    #[error("Usage of {requested} exceeds available quantity {available}")]
    Overdraft {
        /// Quantity the usage asked for.
        requested: Decimal,
        /// Quantity available at the time.
        available: Decimal,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::QuantityTooLarge(_) => "QUANTITY_TOO_LARGE",
            Self::NegativeUnitCost => "NEGATIVE_UNIT_COST",
            Self::UnitCostTooLarge(_) => "UNIT_COST_TOO_LARGE",
            Self::BlankIdempotencyKey => "BLANK_IDEMPOTENCY_KEY",
            Self::InvalidRunningHours(_) => "INVALID_RUNNING_HOURS",
            Self::NegativeFuelConsumed => "NEGATIVE_FUEL_CONSUMED",
            Self::FutureDate { .. } => "FUTURE_DATE",
            Self::EquipmentFuelMismatch { .. } => "EQUIPMENT_FUEL_MISMATCH",
            Self::InvalidSettings(_) => "INVALID_BALANCE_SETTINGS",
            Self::Reference(inner) => inner.error_code(),
            Self::BalanceNotFound(_) => "BALANCE_NOT_FOUND",
            Self::BalanceAlreadyOpen(_) => "BALANCE_ALREADY_OPEN",
            Self::Overdraft { .. } => "OVERDRAFT",
            Self::Overflow(_) => "ARITHMETIC_OVERFLOW",
        }
    }

    /// Returns true if retrying the same request could succeed.
    ///
    /// Ledger errors are deterministic for a given balance; an overdraft
    /// may clear after a refill but that is a different request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }

    /// Returns true when the error means something referenced does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::BalanceNotFound(_) => true,
            Self::Reference(inner) => inner.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelcast_shared::types::SiteId;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::NonPositiveQuantity(dec!(0)).error_code(),
            "NON_POSITIVE_QUANTITY"
        );
        assert_eq!(
            LedgerError::Overdraft {
                requested: dec!(10),
                available: dec!(5)
            }
            .error_code(),
            "OVERDRAFT"
        );
        assert_eq!(
            LedgerError::Reference(ReferenceError::SiteNotFound(SiteId::new())).error_code(),
            "SITE_NOT_FOUND"
        );
    }

    #[test]
    fn test_not_found_classification() {
        let key = StockKey::new(SiteId::new(), FuelTypeId::new());
        assert!(LedgerError::BalanceNotFound(key).is_not_found());
        assert!(LedgerError::Reference(ReferenceError::FuelTypeNotFound(FuelTypeId::new())).is_not_found());
        assert!(!LedgerError::BalanceAlreadyOpen(key).is_not_found());
        assert!(!LedgerError::NegativeUnitCost.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Overdraft {
            requested: dec!(9000),
            available: dec!(7500),
        };
        assert_eq!(
            err.to_string(),
            "Usage of 9000 exceeds available quantity 7500"
        );
    }
}
