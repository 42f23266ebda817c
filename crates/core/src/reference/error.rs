//! Reference data error types.

use fuelcast_shared::types::{EquipmentId, FuelTypeId, SiteId};
use thiserror::Error;

/// Errors raised while registering or resolving reference entities.
#[derive(Debug, Error)]
pub enum ReferenceError {
    /// A required text field is blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A numeric field is negative or otherwise out of range.
    #[error("{field} is out of range: {reason}")]
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Another active entity already uses this code.
    #[error("Code already in use: {0}")]
    DuplicateCode(String),

    /// Site not found.
    #[error("Site not found: {0}")]
    SiteNotFound(SiteId),

    /// Site is deactivated.
    #[error("Site {0} is inactive")]
    SiteInactive(SiteId),

    /// Fuel type not found.
    #[error("Fuel type not found: {0}")]
    FuelTypeNotFound(FuelTypeId),

    /// Fuel type is deactivated.
    #[error("Fuel type {0} is inactive")]
    FuelTypeInactive(FuelTypeId),

    /// Equipment not found.
    #[error("Equipment not found: {0}")]
    EquipmentNotFound(EquipmentId),

    /// Equipment is deactivated.
    #[error("Equipment {0} is inactive")]
    EquipmentInactive(EquipmentId),

    /// Equipment is installed at a different site.
    #[error("Equipment {equipment_id} does not belong to site {site_id}")]
    EquipmentSiteMismatch {
        /// The equipment referenced.
        equipment_id: EquipmentId,
        /// The site the caller named.
        site_id: SiteId,
    },
}

impl ReferenceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::SiteNotFound(_) => "SITE_NOT_FOUND",
            Self::SiteInactive(_) => "SITE_INACTIVE",
            Self::FuelTypeNotFound(_) => "FUEL_TYPE_NOT_FOUND",
            Self::FuelTypeInactive(_) => "FUEL_TYPE_INACTIVE",
            Self::EquipmentNotFound(_) => "EQUIPMENT_NOT_FOUND",
            Self::EquipmentInactive(_) => "EQUIPMENT_INACTIVE",
            Self::EquipmentSiteMismatch { .. } => "EQUIPMENT_SITE_MISMATCH",
        }
    }

    /// Returns true when the error means the referenced entity does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SiteNotFound(_) | Self::FuelTypeNotFound(_) | Self::EquipmentNotFound(_)
        )
    }

    /// Returns true when the error is a uniqueness clash.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateCode(_))
    }
}
