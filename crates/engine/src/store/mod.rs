//! Storage collaborator.
//!
//! The engine needs a durable store providing atomic append-plus-balance
//! commits and plain reads. Any transactional engine satisfies this;
//! [`MemoryStore`] backs tests and single-process use, and `fuelcast-db`
//! provides PostgreSQL.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use fuelcast_core::alerts::{AlertEvent, AlertRule};
use fuelcast_core::forecast::ConsumptionForecast;
use fuelcast_core::ledger::{OperationalHoursEntry, StockBalance, StockTransaction, TransactionKind};
use fuelcast_core::reference::{Equipment, FuelType, Site};
use fuelcast_shared::types::{
    AlertEventId, AlertRuleId, EquipmentId, ForecastId, FuelTypeId, SiteId, StockKey,
};
use thiserror::Error;

/// Errors reported by a [`StockStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The balance changed since it was read.
    #[error("Stock balance {0} was modified concurrently")]
    VersionConflict(StockKey),

    /// A unique value is already taken.
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// A record the write depends on does not exist.
    #[error("Record not found: {0}")]
    Missing(String),

    /// The backend failed.
    #[error("{0}")]
    Backend(String),
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    /// Filter by site.
    pub site_id: Option<SiteId>,
    /// Filter by fuel.
    pub fuel_type_id: Option<FuelTypeId>,
    /// Filter by kind.
    pub kind: Option<TransactionKind>,
    /// Filter by equipment.
    pub equipment_id: Option<EquipmentId>,
    /// Filter by date range start (inclusive).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// A filter for one (site, fuel) key.
    #[must_use]
    pub fn for_key(key: StockKey) -> Self {
        Self {
            site_id: Some(key.site_id),
            fuel_type_id: Some(key.fuel_type_id),
            ..Self::default()
        }
    }

    /// True if `tx` passes every set criterion.
    #[must_use]
    pub fn matches(&self, tx: &StockTransaction) -> bool {
        self.site_id.is_none_or(|s| s == tx.site_id)
            && self.fuel_type_id.is_none_or(|f| f == tx.fuel_type_id)
            && self.kind.is_none_or(|k| k == tx.kind)
            && self.equipment_id.is_none_or(|e| Some(e) == tx.equipment_id)
            && self.from.is_none_or(|d| tx.transaction_date >= d)
            && self.to.is_none_or(|d| tx.transaction_date <= d)
    }
}

/// Filter options for listing operational hours.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoursFilter {
    /// Filter by site.
    pub site_id: Option<SiteId>,
    /// Filter by fuel.
    pub fuel_type_id: Option<FuelTypeId>,
    /// Filter by equipment.
    pub equipment_id: Option<EquipmentId>,
    /// Filter by date range start (inclusive).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub to: Option<NaiveDate>,
}

impl HoursFilter {
    /// A filter for one (site, fuel) key.
    #[must_use]
    pub fn for_key(key: StockKey) -> Self {
        Self {
            site_id: Some(key.site_id),
            fuel_type_id: Some(key.fuel_type_id),
            ..Self::default()
        }
    }

    /// True if `entry` passes every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &OperationalHoursEntry) -> bool {
        self.site_id.is_none_or(|s| s == entry.site_id)
            && self.fuel_type_id.is_none_or(|f| f == entry.fuel_type_id)
            && self.equipment_id.is_none_or(|e| e == entry.equipment_id)
            && self.from.is_none_or(|d| entry.log_date >= d)
            && self.to.is_none_or(|d| entry.log_date <= d)
    }
}

/// Durable storage used by the engine.
///
/// List methods return records in the order documented on each method.
/// `commit_transaction` and `update_balance` must be atomic with respect to
/// the balance version: if the stored version differs from
/// `expected_version`, nothing is written and `VersionConflict` is returned.
#[async_trait]
pub trait StockStore: Send + Sync {
    // ========== Reference data ==========

    /// Inserts a site.
    async fn insert_site(&self, site: &Site) -> Result<(), StoreError>;
    /// Replaces a site's mutable fields.
    async fn update_site(&self, site: &Site) -> Result<(), StoreError>;
    /// Looks up a site.
    async fn get_site(&self, id: SiteId) -> Result<Option<Site>, StoreError>;
    /// All sites, active or not, in any order.
    async fn list_sites(&self) -> Result<Vec<Site>, StoreError>;

    /// Inserts a fuel type.
    async fn insert_fuel_type(&self, fuel: &FuelType) -> Result<(), StoreError>;
    /// Replaces a fuel type's mutable fields.
    async fn update_fuel_type(&self, fuel: &FuelType) -> Result<(), StoreError>;
    /// Looks up a fuel type.
    async fn get_fuel_type(&self, id: FuelTypeId) -> Result<Option<FuelType>, StoreError>;
    /// All fuel types, active or not, in any order.
    async fn list_fuel_types(&self) -> Result<Vec<FuelType>, StoreError>;

    /// Inserts equipment.
    async fn insert_equipment(&self, equipment: &Equipment) -> Result<(), StoreError>;
    /// Replaces equipment's mutable fields.
    async fn update_equipment(&self, equipment: &Equipment) -> Result<(), StoreError>;
    /// Looks up equipment.
    async fn get_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>, StoreError>;
    /// Equipment, optionally at one site, active or not, in any order.
    async fn list_equipment(&self, site_id: Option<SiteId>) -> Result<Vec<Equipment>, StoreError>;

    // ========== Ledger ==========

    /// Inserts a freshly opened balance; `Duplicate` if one exists.
    async fn insert_balance(&self, balance: &StockBalance) -> Result<(), StoreError>;
    /// Looks up a balance.
    async fn get_balance(&self, key: StockKey) -> Result<Option<StockBalance>, StoreError>;
    /// All balances in any order.
    async fn list_balances(&self) -> Result<Vec<StockBalance>, StoreError>;
    /// Replaces a balance if its stored version equals `expected_version`.
    async fn update_balance(&self, balance: &StockBalance, expected_version: i64) -> Result<(), StoreError>;

    /// Finds the transaction previously committed under an idempotency key for `key`.
    async fn find_by_idempotency_key(
        &self,
        key: StockKey,
        idempotency_key: &str,
    ) -> Result<Option<StockTransaction>, StoreError>;

    /// Appends `transaction` and replaces its balance as one atomic unit.
    async fn commit_transaction(
        &self,
        transaction: &StockTransaction,
        balance: &StockBalance,
        expected_version: i64,
    ) -> Result<(), StoreError>;

    /// Transactions matching `filter`, newest transaction date first.
    async fn list_transactions(&self, filter: TransactionFilter) -> Result<Vec<StockTransaction>, StoreError>;

    /// Appends an operational hours entry.
    async fn insert_hours(&self, entry: &OperationalHoursEntry) -> Result<(), StoreError>;
    /// Hours entries matching `filter`, newest log date first.
    async fn list_hours(&self, filter: HoursFilter) -> Result<Vec<OperationalHoursEntry>, StoreError>;

    // ========== Forecasts ==========

    /// Inserts or replaces the forecast with the same id.
    async fn upsert_forecast(&self, forecast: &ConsumptionForecast) -> Result<(), StoreError>;
    /// Looks up a forecast.
    async fn get_forecast(&self, id: ForecastId) -> Result<Option<ConsumptionForecast>, StoreError>;
    /// Every forecast for a key, newest as-of date first.
    async fn forecast_history(&self, key: StockKey) -> Result<Vec<ConsumptionForecast>, StoreError>;

    // ========== Alerts ==========

    /// Inserts a rule.
    async fn insert_alert_rule(&self, rule: &AlertRule) -> Result<(), StoreError>;
    /// Replaces a rule.
    async fn update_alert_rule(&self, rule: &AlertRule) -> Result<(), StoreError>;
    /// Looks up a rule.
    async fn get_alert_rule(&self, id: AlertRuleId) -> Result<Option<AlertRule>, StoreError>;
    /// All rules, active or not, oldest first.
    async fn list_alert_rules(&self) -> Result<Vec<AlertRule>, StoreError>;

    /// Appends fired events.
    async fn insert_alert_events(&self, events: &[AlertEvent]) -> Result<(), StoreError>;
    /// Replaces an event (acknowledgement).
    async fn update_alert_event(&self, event: &AlertEvent) -> Result<(), StoreError>;
    /// Looks up an event.
    async fn get_alert_event(&self, id: AlertEventId) -> Result<Option<AlertEvent>, StoreError>;
    /// Events triggered at or after `since`, newest first.
    async fn list_alert_events(&self, since: DateTime<Utc>) -> Result<Vec<AlertEvent>, StoreError>;
}
