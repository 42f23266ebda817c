//! Scenario storage using Moka.
//!
//! Scenarios are not persisted; they live in a bounded TTL cache keyed by
//! the baseline forecast they were created against.

use moka::sync::Cache;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use fuelcast_shared::types::ForecastId;

use super::types::ForecastScenario;

/// Default number of baseline forecasts tracked.
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

/// Default time-to-live for a baseline's scenarios (24 hours).
const DEFAULT_TTL_SECS: u64 = 86_400;

type ScenarioList = Arc<Mutex<Vec<ForecastScenario>>>;

/// Thread-safe cache of scenarios per baseline forecast.
#[derive(Clone)]
pub struct ScenarioCache {
    cache: Cache<ForecastId, ScenarioList>,
}

impl ScenarioCache {
    /// Creates a cache with default settings (1000 baselines, 24 hour TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Appends a scenario under its baseline forecast.
    pub fn insert(&self, scenario: ForecastScenario) {
        let list = self
            .cache
            .get_with(scenario.forecast_id, || Arc::new(Mutex::new(Vec::new())));
        list.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(scenario);
    }

    /// Scenarios for a baseline, in creation order.
    #[must_use]
    pub fn list(&self, forecast_id: ForecastId) -> Vec<ForecastScenario> {
        self.cache.get(&forecast_id).map_or_else(Vec::new, |list| {
            list.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }

    /// Drops every scenario of a baseline.
    pub fn invalidate(&self, forecast_id: ForecastId) {
        self.cache.invalidate(&forecast_id);
    }

    /// Number of baselines currently holding scenarios.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for ScenarioCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fuelcast_shared::types::ScenarioId;
    use rust_decimal_macros::dec;

    fn scenario(forecast_id: ForecastId, name: &str) -> ForecastScenario {
        ForecastScenario {
            id: ScenarioId::new(),
            forecast_id,
            name: name.to_string(),
            adjusted_rate: Some(dec!(100)),
            adjusted_safety_factor: None,
            daily_rate: dec!(100),
            safety_factor: dec!(1.2),
            days_remaining: Some(dec!(10)),
            depletion_date: None,
            days_delta: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_list_in_creation_order() {
        let cache = ScenarioCache::new();
        let forecast_id = ForecastId::new();
        cache.insert(scenario(forecast_id, "first"));
        cache.insert(scenario(forecast_id, "second"));
        cache.insert(scenario(ForecastId::new(), "other"));

        let names: Vec<_> = cache.list(forecast_id).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_unknown_forecast_lists_nothing() {
        assert!(ScenarioCache::new().list(ForecastId::new()).is_empty());
    }

    #[test]
    fn test_invalidate() {
        let cache = ScenarioCache::new();
        let forecast_id = ForecastId::new();
        cache.insert(scenario(forecast_id, "first"));
        cache.invalidate(forecast_id);
        assert!(cache.list(forecast_id).is_empty());
    }
}
