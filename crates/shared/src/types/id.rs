//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `SiteId` where a `FuelTypeId` is expected.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(SiteId, "Unique identifier for a storage site.");
typed_id!(FuelTypeId, "Unique identifier for a fuel type.");
typed_id!(EquipmentId, "Unique identifier for a piece of fuel-consuming equipment.");
typed_id!(TransactionId, "Unique identifier for a stock ledger transaction.");
typed_id!(HoursEntryId, "Unique identifier for an operational hours log entry.");
typed_id!(ForecastId, "Unique identifier for a consumption forecast.");
typed_id!(ScenarioId, "Unique identifier for a forecast scenario.");
typed_id!(AlertRuleId, "Unique identifier for an alert rule.");
typed_id!(AlertEventId, "Unique identifier for a triggered alert event.");

/// Namespace for deterministic forecast identifiers.
const FORECAST_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_9d3b_4c57_8e21_0b7a_5d94_c3e8);

impl ForecastId {
    /// Derives the forecast ID for a (site, fuel, as-of date) triple.
    ///
    /// Recalculating the same key for the same date always yields the same ID,
    /// so a rerun supersedes the stored row instead of adding a duplicate.
    #[must_use]
    pub fn for_key(site_id: SiteId, fuel_type_id: FuelTypeId, asof_date: NaiveDate) -> Self {
        let name = format!("{site_id}/{fuel_type_id}/{asof_date}");
        Self(Uuid::new_v5(&FORECAST_NAMESPACE, name.as_bytes()))
    }
}
