//! Engine-facing projection of the application configuration.

use std::time::Duration;

use fuelcast_core::alerts::AlertEvaluator;
use fuelcast_core::rate::RateParams;
use fuelcast_shared::AppConfig;
use fuelcast_shared::config::{
    AlertConfig, EngineConfig, ForecastConfig, OverdraftPolicy, SchedulerConfig,
};
use rust_decimal::Decimal;

/// Default lookback for [`crate::ForecastEngine::get_alerts`].
pub const DEFAULT_ALERT_LOOKBACK_DAYS: u32 = 7;

/// Runtime settings for [`crate::ForecastEngine`] and its background tasks.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// What to do with a usage that exceeds the available quantity.
    pub overdraft_policy: OverdraftPolicy,
    /// Safety factor used when the caller does not supply one.
    pub default_safety_factor: Decimal,
    /// Rate estimation window and fallback parameters.
    pub rate: RateParams,
    /// Keys calculated concurrently by a batch.
    pub parallelism: usize,
    /// Alert cooldown and severity bands.
    pub alerts: AlertConfig,
    /// Bound on every storage call and lock wait.
    pub storage_timeout: Duration,
    /// Capacity of the recompute command channel.
    pub recompute_queue_capacity: usize,
    /// Window in which recompute commands are coalesced.
    pub recompute_debounce: Duration,
    /// Periodic batch triggers.
    pub scheduler: SchedulerConfig,
}

impl EngineSettings {
    /// Builds the evaluator configured by these settings.
    #[must_use]
    pub fn alert_evaluator(&self) -> AlertEvaluator {
        AlertEvaluator::from(&self.alerts)
    }

    /// Returns a copy with a different storage bound.
    #[must_use]
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Returns a copy with a different overdraft policy.
    #[must_use]
    pub const fn with_overdraft_policy(mut self, policy: OverdraftPolicy) -> Self {
        self.overdraft_policy = policy;
        self
    }

    fn from_sections(
        policy: OverdraftPolicy,
        forecast: &ForecastConfig,
        alerts: &AlertConfig,
        engine: EngineConfig,
        scheduler: SchedulerConfig,
    ) -> Self {
        Self {
            overdraft_policy: policy,
            default_safety_factor: forecast.default_safety_factor,
            rate: RateParams::from(forecast),
            parallelism: forecast.parallelism.max(1),
            alerts: alerts.clone(),
            storage_timeout: Duration::from_millis(engine.storage_timeout_ms),
            recompute_queue_capacity: engine.recompute_queue_capacity.max(1),
            recompute_debounce: Duration::from_millis(engine.recompute_debounce_ms),
            scheduler,
        }
    }
}

impl From<&AppConfig> for EngineSettings {
    fn from(config: &AppConfig) -> Self {
        Self::from_sections(
            config.ledger.overdraft_policy,
            &config.forecast,
            &config.alerts,
            config.engine,
            config.scheduler,
        )
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_sections(
            OverdraftPolicy::default(),
            &ForecastConfig::default(),
            &AlertConfig::default(),
            EngineConfig::default(),
            SchedulerConfig::default(),
        )
    }
}
