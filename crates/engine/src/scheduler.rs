//! Periodic forecast batches and alert evaluations.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fuelcast_core::alerts::AlertTrigger;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::engine::ForecastEngine;

/// Drives `calculate_all(today)` and `evaluate(Scheduled)` on fixed intervals.
///
/// Both run once immediately on start.
pub struct Scheduler {
    engine: Arc<ForecastEngine>,
    forecast_every: Duration,
    alerts_every: Duration,
}

impl Scheduler {
    /// Creates a scheduler using the engine's configured intervals.
    #[must_use]
    pub fn new(engine: Arc<ForecastEngine>) -> Self {
        let config = engine.settings().scheduler;
        Self::with_intervals(
            engine,
            Duration::from_secs(config.forecast_interval_secs),
            Duration::from_secs(config.alert_interval_secs),
        )
    }

    /// Creates a scheduler with explicit intervals.
    #[must_use]
    pub fn with_intervals(engine: Arc<ForecastEngine>, forecast_every: Duration, alerts_every: Duration) -> Self {
        let floor = Duration::from_millis(1);
        Self {
            engine,
            forecast_every: forecast_every.max(floor),
            alerts_every: alerts_every.max(floor),
        }
    }

    /// Runs until `cancel` fires. A batch in flight stops between keys.
    pub async fn run(self, cancel: CancellationToken) {
        let mut forecasts = tokio::time::interval(self.forecast_every);
        forecasts.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut alerts = tokio::time::interval(self.alerts_every);
        alerts.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            forecast_every_secs = self.forecast_every.as_secs(),
            alerts_every_secs = self.alerts_every.as_secs(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = forecasts.tick() => {
                    let today = Utc::now().date_naive();
                    match self.engine.calculate_all(today, &cancel).await {
                        Ok(summary) if !summary.failed.is_empty() => warn!(
                            failed = summary.failed.len(),
                            succeeded = summary.succeeded.len(),
                            "Scheduled forecast batch had failures"
                        ),
                        Ok(_) => {}
                        Err(err) => error!(error = %err, "Scheduled forecast batch failed"),
                    }
                }
                _ = alerts.tick() => {
                    if let Err(err) = self.engine.evaluate(AlertTrigger::Scheduled).await {
                        error!(error = %err, "Scheduled alert evaluation failed");
                    }
                }
            }
        }

        info!("Scheduler stopped");
    }
}
