//! Composite key for per-site, per-fuel aggregates.

use serde::{Deserialize, Serialize};

use super::id::{FuelTypeId, SiteId};

/// Identifies one stock position: a fuel type held at a site.
///
/// Balances, forecasts, locks and recompute commands are all scoped to this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StockKey {
    /// The site holding the stock.
    pub site_id: SiteId,
    /// The fuel type held.
    pub fuel_type_id: FuelTypeId,
}

impl StockKey {
    /// Creates a new stock key.
    #[must_use]
    pub const fn new(site_id: SiteId, fuel_type_id: FuelTypeId) -> Self {
        Self {
            site_id,
            fuel_type_id,
        }
    }
}

impl std::fmt::Display for StockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.site_id, self.fuel_type_id)
    }
}
