//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger write policy.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Rate estimation and forecast defaults.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Alert evaluation settings.
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Engine runtime bounds.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Periodic batch triggers.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Log output settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// What to do with a usage that exceeds the available quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverdraftPolicy {
    /// Refuse the usage with an overdraft error.
    #[default]
    Reject,
    /// Accept the usage, clamp the balance at zero and flag the shortfall.
    Clamp,
}

/// Ledger write policy.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LedgerConfig {
    /// Overdraft handling for usage transactions.
    #[serde(default)]
    pub overdraft_policy: OverdraftPolicy,
}

/// Rate estimation and forecast defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Multiplier applied to the daily rate when projecting depletion.
    #[serde(default = "default_safety_factor")]
    pub default_safety_factor: Decimal,
    /// Calendar days of history used by the rate estimator.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Minimum distinct dates before a logged source is trusted.
    #[serde(default = "default_min_sample_days")]
    pub min_sample_days: u32,
    /// Assumed running hours per day for the nominal-rate fallback.
    #[serde(default = "default_expected_daily_hours")]
    pub expected_daily_hours: Decimal,
    /// Number of keys recalculated concurrently by a batch run.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_safety_factor() -> Decimal {
    Decimal::new(12, 1)
}

fn default_lookback_days() -> u32 {
    30
}

fn default_min_sample_days() -> u32 {
    3
}

fn default_expected_daily_hours() -> Decimal {
    Decimal::new(8, 0)
}

fn default_parallelism() -> usize {
    4
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_safety_factor: default_safety_factor(),
            lookback_days: default_lookback_days(),
            min_sample_days: default_min_sample_days(),
            expected_daily_hours: default_expected_daily_hours(),
            parallelism: default_parallelism(),
        }
    }
}

/// Upper bounds (exclusive) of the Critical, High and Medium severity steps.
///
/// A metric below `critical` is Critical, below `high` is High, below
/// `medium` is Medium, anything else that still breaches a rule is Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SeverityBands {
    /// Critical below this value.
    pub critical: Decimal,
    /// High below this value.
    pub high: Decimal,
    /// Medium below this value.
    pub medium: Decimal,
}

impl SeverityBands {
    /// Default bands for days-remaining metrics.
    #[must_use]
    pub fn days() -> Self {
        Self {
            critical: Decimal::new(7, 0),
            high: Decimal::new(14, 0),
            medium: Decimal::new(30, 0),
        }
    }

    /// Default bands for fill-percentage metrics.
    #[must_use]
    pub fn fill() -> Self {
        Self {
            critical: Decimal::new(20, 0),
            high: Decimal::new(30, 0),
            medium: Decimal::new(40, 0),
        }
    }
}

/// Alert evaluation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Minutes during which an unacknowledged alert suppresses duplicates.
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,
    /// Severity steps for days-remaining rules.
    #[serde(default = "SeverityBands::days")]
    pub days_bands: SeverityBands,
    /// Severity steps for fill-percentage rules.
    #[serde(default = "SeverityBands::fill")]
    pub fill_bands: SeverityBands,
}

fn default_cooldown_minutes() -> u64 {
    720
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: default_cooldown_minutes(),
            days_bands: SeverityBands::days(),
            fill_bands: SeverityBands::fill(),
        }
    }
}

/// Engine runtime bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EngineConfig {
    /// Upper bound for every storage call and lock acquisition, in milliseconds.
    #[serde(default = "default_storage_timeout_ms")]
    pub storage_timeout_ms: u64,
    /// Capacity of the scoped recompute command channel.
    #[serde(default = "default_recompute_queue_capacity")]
    pub recompute_queue_capacity: usize,
    /// Window for coalescing recompute commands, in milliseconds.
    #[serde(default = "default_recompute_debounce_ms")]
    pub recompute_debounce_ms: u64,
}

fn default_storage_timeout_ms() -> u64 {
    5_000
}

fn default_recompute_queue_capacity() -> usize {
    1_024
}

fn default_recompute_debounce_ms() -> u64 {
    250
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_timeout_ms: default_storage_timeout_ms(),
            recompute_queue_capacity: default_recompute_queue_capacity(),
            recompute_debounce_ms: default_recompute_debounce_ms(),
        }
    }
}

/// Periodic batch triggers.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the scheduled batch runs at all.
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
    /// Seconds between full forecast recalculations.
    #[serde(default = "default_forecast_interval")]
    pub forecast_interval_secs: u64,
    /// Seconds between scheduled alert evaluations.
    #[serde(default = "default_alert_interval")]
    pub alert_interval_secs: u64,
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_forecast_interval() -> u64 {
    86_400 // 24 hours
}

fn default_alert_interval() -> u64 {
    3_600
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            forecast_interval_secs: default_forecast_interval(),
            alert_interval_secs: default_alert_interval(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if a source cannot be read or the
    /// merged result is inconsistent.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FUELCAST").separator("__"))
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> AppResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::Configuration("database.url is empty".to_string()));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::Configuration(
                "database.min_connections exceeds max_connections".to_string(),
            ));
        }
        if self.forecast.default_safety_factor <= Decimal::ZERO {
            return Err(AppError::Configuration(
                "forecast.default_safety_factor must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
