//! Forecast types.

use chrono::NaiveDate;
use fuelcast_shared::types::{ForecastId, FuelTypeId, SiteId, StockKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::rate::RateSource;

/// Message shown instead of a day count when the rate is zero.
pub const NO_CONSUMPTION_DETECTED: &str = "no consumption detected";

/// Projected depletion timeline for one (site, fuel) pair on one as-of date.
///
/// Contains no wall-clock fields: the same inputs always produce an
/// identical value, and the id is derived from the key and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionForecast {
    /// Deterministic ID (site, fuel, as-of date).
    pub id: ForecastId,
    /// Site.
    pub site_id: SiteId,
    /// Fuel.
    pub fuel_type_id: FuelTypeId,
    /// Date the forecast is computed for.
    pub asof_date: NaiveDate,
    /// Estimated litres per day before the safety factor.
    pub daily_rate: Decimal,
    /// Days until available stock runs out; `None` when unbounded.
    pub days_remaining: Option<Decimal>,
    /// `asof_date + ⌊days_remaining⌋`; `None` when unbounded.
    pub depletion_date: Option<NaiveDate>,
    /// Latest date to order more while keeping the site's safety stock.
    pub reorder_date: Option<NaiveDate>,
    /// Rate estimate reliability, 0–100.
    pub confidence_level: u8,
    /// Current quantity at calculation time.
    pub current_balance: Decimal,
    /// Available quantity the projection drew down.
    pub available_quantity: Decimal,
    /// Safety factor applied.
    pub safety_factor: Decimal,
    /// Which source produced the rate.
    pub rate_source: RateSource,
    /// Distinct days of data behind the rate.
    pub sample_days: u32,
}

impl ConsumptionForecast {
    /// The (site, fuel) key.
    #[must_use]
    pub const fn key(&self) -> StockKey {
        StockKey::new(self.site_id, self.fuel_type_id)
    }

    /// True when the rate is zero and stock never runs out.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.days_remaining.is_none()
    }

    /// Human-readable days remaining.
    #[must_use]
    pub fn days_remaining_label(&self) -> String {
        self.days_remaining
            .map_or_else(|| NO_CONSUMPTION_DETECTED.to_string(), |d| format!("{d} days"))
    }
}
