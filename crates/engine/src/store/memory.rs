//! In-process [`StockStore`] backed by ordered maps.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fuelcast_core::alerts::{AlertEvent, AlertRule};
use fuelcast_core::forecast::ConsumptionForecast;
use fuelcast_core::ledger::{OperationalHoursEntry, StockBalance, StockTransaction};
use fuelcast_core::reference::{Equipment, FuelType, Site};
use fuelcast_shared::types::{
    AlertEventId, AlertRuleId, EquipmentId, ForecastId, FuelTypeId, SiteId, StockKey,
};
use tokio::sync::RwLock;

use super::{HoursFilter, StockStore, StoreError, TransactionFilter};

#[derive(Default)]
struct State {
    sites: HashMap<SiteId, Site>,
    fuel_types: HashMap<FuelTypeId, FuelType>,
    equipment: HashMap<EquipmentId, Equipment>,
    balances: BTreeMap<StockKey, StockBalance>,
    transactions: Vec<StockTransaction>,
    idempotency: HashMap<(StockKey, String), usize>,
    hours: Vec<OperationalHoursEntry>,
    forecasts: HashMap<ForecastId, ConsumptionForecast>,
    rules: Vec<AlertRule>,
    events: Vec<AlertEvent>,
}

/// Keeps everything in memory behind one async `RwLock`.
///
/// `with_latency` delays every call, which lets tests drive the engine's
/// storage timeouts.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    latency: Option<Duration>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that sleeps for `latency` before every call.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: RwLock::default(),
            latency: Some(latency),
        }
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn missing(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::Missing(format!("{what} {id}"))
}

fn check_version(stored: &StockBalance, expected_version: i64) -> Result<(), StoreError> {
    if stored.version == expected_version {
        Ok(())
    } else {
        Err(StoreError::VersionConflict(stored.key()))
    }
}

#[async_trait]
impl StockStore for MemoryStore {
    async fn insert_site(&self, site: &Site) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.sites.values().any(|s| s.code == site.code) {
            return Err(StoreError::Duplicate(format!("site code {}", site.code)));
        }
        state.sites.insert(site.id, site.clone());
        Ok(())
    }

    async fn update_site(&self, site: &Site) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let slot = state.sites.get_mut(&site.id).ok_or_else(|| missing("site", site.id))?;
        *slot = site.clone();
        Ok(())
    }

    async fn get_site(&self, id: SiteId) -> Result<Option<Site>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.sites.get(&id).cloned())
    }

    async fn list_sites(&self) -> Result<Vec<Site>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.sites.values().cloned().collect())
    }

    async fn insert_fuel_type(&self, fuel: &FuelType) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.fuel_types.values().any(|f| f.code == fuel.code) {
            return Err(StoreError::Duplicate(format!("fuel type code {}", fuel.code)));
        }
        state.fuel_types.insert(fuel.id, fuel.clone());
        Ok(())
    }

    async fn update_fuel_type(&self, fuel: &FuelType) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let slot = state
            .fuel_types
            .get_mut(&fuel.id)
            .ok_or_else(|| missing("fuel type", fuel.id))?;
        *slot = fuel.clone();
        Ok(())
    }

    async fn get_fuel_type(&self, id: FuelTypeId) -> Result<Option<FuelType>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.fuel_types.get(&id).cloned())
    }

    async fn list_fuel_types(&self) -> Result<Vec<FuelType>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.fuel_types.values().cloned().collect())
    }

    async fn insert_equipment(&self, equipment: &Equipment) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        if state.equipment.values().any(|e| e.code == equipment.code) {
            return Err(StoreError::Duplicate(format!("equipment code {}", equipment.code)));
        }
        state.equipment.insert(equipment.id, equipment.clone());
        Ok(())
    }

    async fn update_equipment(&self, equipment: &Equipment) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let slot = state
            .equipment
            .get_mut(&equipment.id)
            .ok_or_else(|| missing("equipment", equipment.id))?;
        *slot = equipment.clone();
        Ok(())
    }

    async fn get_equipment(&self, id: EquipmentId) -> Result<Option<Equipment>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.equipment.get(&id).cloned())
    }

    async fn list_equipment(&self, site_id: Option<SiteId>) -> Result<Vec<Equipment>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        Ok(state
            .equipment
            .values()
            .filter(|e| site_id.is_none_or(|s| s == e.site_id))
            .cloned()
            .collect())
    }

    async fn insert_balance(&self, balance: &StockBalance) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let key = balance.key();
        if state.balances.contains_key(&key) {
            return Err(StoreError::Duplicate(format!("stock balance {key}")));
        }
        state.balances.insert(key, balance.clone());
        Ok(())
    }

    async fn get_balance(&self, key: StockKey) -> Result<Option<StockBalance>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.balances.get(&key).cloned())
    }

    async fn list_balances(&self) -> Result<Vec<StockBalance>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.balances.values().cloned().collect())
    }

    async fn update_balance(&self, balance: &StockBalance, expected_version: i64) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let key = balance.key();
        let stored = state
            .balances
            .get_mut(&key)
            .ok_or_else(|| missing("stock balance", key))?;
        check_version(stored, expected_version)?;
        *stored = balance.clone();
        Ok(())
    }

    async fn find_by_idempotency_key(
        &self,
        key: StockKey,
        idempotency_key: &str,
    ) -> Result<Option<StockTransaction>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        Ok(state
            .idempotency
            .get(&(key, idempotency_key.to_string()))
            .and_then(|&index| state.transactions.get(index))
            .cloned())
    }

    async fn commit_transaction(
        &self,
        transaction: &StockTransaction,
        balance: &StockBalance,
        expected_version: i64,
    ) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let key = transaction.key();

        // All checks run before the first mutation so a failure writes nothing.
        let stored = state
            .balances
            .get(&key)
            .ok_or_else(|| missing("stock balance", key))?;
        check_version(stored, expected_version)?;
        if let Some(token) = &transaction.idempotency_key
            && state.idempotency.contains_key(&(key, token.clone()))
        {
            return Err(StoreError::Duplicate(format!("idempotency key {token}")));
        }

        let index = state.transactions.len();
        state.transactions.push(transaction.clone());
        if let Some(token) = &transaction.idempotency_key {
            state.idempotency.insert((key, token.clone()), index);
        }
        state.balances.insert(key, balance.clone());
        Ok(())
    }

    async fn list_transactions(&self, filter: TransactionFilter) -> Result<Vec<StockTransaction>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .transactions
            .iter()
            .filter(|tx| filter.matches(tx))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.transaction_date
                .cmp(&a.transaction_date)
                .then(b.recorded_at.cmp(&a.recorded_at))
        });
        Ok(rows)
    }

    async fn insert_hours(&self, entry: &OperationalHoursEntry) -> Result<(), StoreError> {
        self.pause().await;
        self.state.write().await.hours.push(entry.clone());
        Ok(())
    }

    async fn list_hours(&self, filter: HoursFilter) -> Result<Vec<OperationalHoursEntry>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .hours
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.log_date
                .cmp(&a.log_date)
                .then(b.recorded_at.cmp(&a.recorded_at))
        });
        Ok(rows)
    }

    async fn upsert_forecast(&self, forecast: &ConsumptionForecast) -> Result<(), StoreError> {
        self.pause().await;
        self.state
            .write()
            .await
            .forecasts
            .insert(forecast.id, forecast.clone());
        Ok(())
    }

    async fn get_forecast(&self, id: ForecastId) -> Result<Option<ConsumptionForecast>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.forecasts.get(&id).cloned())
    }

    async fn forecast_history(&self, key: StockKey) -> Result<Vec<ConsumptionForecast>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .forecasts
            .values()
            .filter(|f| f.key() == key)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.asof_date.cmp(&a.asof_date));
        Ok(rows)
    }

    async fn insert_alert_rule(&self, rule: &AlertRule) -> Result<(), StoreError> {
        self.pause().await;
        self.state.write().await.rules.push(rule.clone());
        Ok(())
    }

    async fn update_alert_rule(&self, rule: &AlertRule) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let slot = state
            .rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| missing("alert rule", rule.id))?;
        *slot = rule.clone();
        Ok(())
    }

    async fn get_alert_rule(&self, id: AlertRuleId) -> Result<Option<AlertRule>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        Ok(state.rules.iter().find(|r| r.id == id).cloned())
    }

    async fn list_alert_rules(&self) -> Result<Vec<AlertRule>, StoreError> {
        self.pause().await;
        Ok(self.state.read().await.rules.clone())
    }

    async fn insert_alert_events(&self, events: &[AlertEvent]) -> Result<(), StoreError> {
        self.pause().await;
        self.state.write().await.events.extend_from_slice(events);
        Ok(())
    }

    async fn update_alert_event(&self, event: &AlertEvent) -> Result<(), StoreError> {
        self.pause().await;
        let mut state = self.state.write().await;
        let slot = state
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| missing("alert event", event.id))?;
        *slot = event.clone();
        Ok(())
    }

    async fn get_alert_event(&self, id: AlertEventId) -> Result<Option<AlertEvent>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        Ok(state.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_alert_events(&self, since: DateTime<Utc>) -> Result<Vec<AlertEvent>, StoreError> {
        self.pause().await;
        let state = self.state.read().await;
        let mut rows: Vec<_> = state
            .events
            .iter()
            .rev()
            .filter(|e| e.triggered_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        Ok(rows)
    }
}
