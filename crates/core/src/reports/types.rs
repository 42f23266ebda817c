//! Report types.

use chrono::NaiveDate;
use fuelcast_shared::types::{EquipmentId, FuelTypeId, SiteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Usage totals for one (site, fuel) pair over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionSummaryRow {
    /// Site ID.
    pub site_id: SiteId,
    /// Site name.
    pub site_name: String,
    /// Fuel type ID.
    pub fuel_type_id: FuelTypeId,
    /// Fuel name.
    pub fuel_name: String,
    /// Litres drawn.
    pub total_consumed: Decimal,
    /// Litres per usage transaction, four decimals.
    pub average_per_transaction: Decimal,
    /// Number of usage transactions.
    pub transaction_count: u32,
    /// Earliest usage date in range.
    pub first_usage: NaiveDate,
    /// Latest usage date in range.
    pub last_usage: NaiveDate,
}

/// Logged versus nameplate consumption for one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentEfficiencyRow {
    /// Equipment ID.
    pub equipment_id: EquipmentId,
    /// Equipment name.
    pub equipment_name: String,
    /// Site ID.
    pub site_id: SiteId,
    /// Site name.
    pub site_name: String,
    /// Fuel burned.
    pub fuel_type_id: FuelTypeId,
    /// Number of log entries.
    pub entry_count: u32,
    /// Hours run across all entries.
    pub total_running_hours: Decimal,
    /// Litres burned, metered or estimated from the nameplate rate.
    pub total_fuel_consumed: Decimal,
    /// `total_fuel_consumed / total_running_hours`; `None` with no hours.
    pub actual_rate_per_hour: Option<Decimal>,
    /// Nameplate litres per hour.
    pub nominal_rate: Decimal,
    /// `(actual − nominal) / nominal × 100`, two decimals.
    pub variance_percent: Option<Decimal>,
}
