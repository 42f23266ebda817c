//! The engine operation surface.
//!
//! [`ForecastEngine`] owns the store handle, the per-key lock maps and the
//! alert evaluator. Operations are split by concern across the submodules;
//! each is an `impl ForecastEngine` block.

mod alerts;
mod forecast;
mod ledger;
mod reference;
mod reports;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use fuelcast_core::alerts::AlertEvaluator;
use fuelcast_core::reference::{FuelType, Site};
use fuelcast_core::scenario::ScenarioCache;
use fuelcast_shared::types::{FuelTypeId, SiteId, StockKey};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::EngineResult;
use crate::locks::{KeyedLocks, bounded};
use crate::publisher::{AlertPublisher, TracingPublisher};
use crate::recompute::{RecomputeCommand, RecomputeQueue};
use crate::settings::EngineSettings;
use crate::store::StockStore;

/// Stock ledger and forecasting engine.
///
/// Writes to one (site, fuel) key are serialized by a per-key lock held
/// across read, apply and commit. Forecast recalculation takes a second,
/// independent per-key lock. Different keys never contend.
pub struct ForecastEngine {
    store: Arc<dyn StockStore>,
    settings: EngineSettings,
    evaluator: AlertEvaluator,
    balance_locks: KeyedLocks,
    forecast_locks: KeyedLocks,
    alert_gate: Mutex<()>,
    scenarios: ScenarioCache,
    publisher: Arc<dyn AlertPublisher>,
    recompute: Option<RecomputeQueue>,
}

impl ForecastEngine {
    /// Creates an engine that logs alerts and issues no recompute commands.
    #[must_use]
    pub fn new(store: Arc<dyn StockStore>, settings: EngineSettings) -> Self {
        Self {
            evaluator: settings.alert_evaluator(),
            store,
            settings,
            balance_locks: KeyedLocks::new(),
            forecast_locks: KeyedLocks::new(),
            alert_gate: Mutex::new(()),
            scenarios: ScenarioCache::new(),
            publisher: Arc::new(TracingPublisher),
            recompute: None,
        }
    }

    /// Replaces the alert publisher.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn AlertPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Sends scoped recompute commands to `queue` after every successful write.
    #[must_use]
    pub fn with_recompute(mut self, queue: RecomputeQueue) -> Self {
        self.recompute = Some(queue);
        self
    }

    /// The settings the engine runs with.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Runs a store call under the storage bound.
    async fn call<T, F>(&self, operation: &'static str, future: F) -> EngineResult<T>
    where
        F: Future<Output = Result<T, crate::store::StoreError>>,
    {
        bounded(operation, self.settings.storage_timeout, future).await
    }

    fn enqueue(&self, command: RecomputeCommand) {
        let Some(queue) = &self.recompute else {
            return;
        };
        if let Err(err) = queue.send(command) {
            warn!(
                site_id = %command.key.site_id,
                fuel_type_id = %command.key.fuel_type_id,
                error = %err,
                "Recompute command dropped"
            );
        }
    }

    /// Display names of every site and fuel, active or not.
    async fn names(&self) -> EngineResult<Names> {
        let sites = self.call("list_sites", self.store.list_sites()).await?;
        let fuels = self.call("list_fuel_types", self.store.list_fuel_types()).await?;
        Ok(Names::new(sites, fuels))
    }
}

/// Lookup of sites and fuels used to order and decorate results.
struct Names {
    sites: HashMap<SiteId, Site>,
    fuels: HashMap<FuelTypeId, FuelType>,
}

impl Names {
    fn new(sites: Vec<Site>, fuels: Vec<FuelType>) -> Self {
        Self {
            sites: sites.into_iter().map(|s| (s.id, s)).collect(),
            fuels: fuels.into_iter().map(|f| (f.id, f)).collect(),
        }
    }

    fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(&id)
    }

    fn fuel(&self, id: FuelTypeId) -> Option<&FuelType> {
        self.fuels.get(&id)
    }

    /// True if both sides of the key exist and are active.
    fn is_active(&self, key: StockKey) -> bool {
        self.site(key.site_id).is_some_and(|s| s.is_active)
            && self.fuel(key.fuel_type_id).is_some_and(|f| f.is_active)
    }

    /// Orders keys by (site name, fuel name), falling back to the key itself.
    fn compare(&self, a: StockKey, b: StockKey) -> Ordering {
        let name = |key: StockKey| {
            (
                self.site(key.site_id).map(|s| s.name.as_str()),
                self.fuel(key.fuel_type_id).map(|f| f.name.as_str()),
            )
        };
        name(a).cmp(&name(b)).then(a.cmp(&b))
    }

    fn sites(&self) -> Vec<Site> {
        self.sites.values().cloned().collect()
    }

    fn fuels(&self) -> Vec<FuelType> {
        self.fuels.values().cloned().collect()
    }
}

impl std::fmt::Debug for ForecastEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("settings", &self.settings)
            .field("recompute", &self.recompute.is_some())
            .finish_non_exhaustive()
    }
}
