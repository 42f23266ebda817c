//! Forecast calculation, batches and scenarios.

use chrono::{Days, NaiveDate, Utc};
use futures::StreamExt;
use futures::stream;
use fuelcast_core::forecast::{ConsumptionForecast, ForecastCalculator, ForecastError};
use fuelcast_core::ledger::{StockBalance, TransactionKind};
use fuelcast_core::rate::{RateEstimator, RateInputs};
use fuelcast_core::scenario::{ForecastScenario, ScenarioEngine, ScenarioError, ScenarioInput};
use fuelcast_shared::types::{ForecastId, FuelTypeId, SiteId, StockKey};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ForecastEngine;
use crate::error::{EngineError, EngineResult};
use crate::store::{HoursFilter, TransactionFilter};
use crate::views::{BatchSummary, FailedKey};

impl ForecastEngine {
    /// Calculates and stores the forecast for one key as of `asof`.
    ///
    /// Re-running for the same key and date replaces the stored forecast
    /// with an identical one when inputs are unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound` if the balance is not open, validation for inactive
    /// references or a non-positive safety factor, `Computation` when the
    /// rate estimator has nothing to work with.
    pub async fn calculate(
        &self,
        key: StockKey,
        asof: NaiveDate,
        safety_factor: Option<Decimal>,
    ) -> EngineResult<ConsumptionForecast> {
        let safety_factor = safety_factor.unwrap_or(self.settings.default_safety_factor);
        let _guard = self
            .forecast_locks
            .acquire(key, "calculate_forecast", self.settings.storage_timeout)
            .await?;

        let site = self.site(key.site_id).await?;
        site.ensure_active()?;
        self.fuel_type(key.fuel_type_id).await?.ensure_active()?;
        let balance = self.stored_balance(key).await?;

        let from = asof
            .checked_sub_days(Days::new(u64::from(self.settings.rate.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let transactions = self
            .call(
                "list_transactions",
                self.store.list_transactions(TransactionFilter {
                    kind: Some(TransactionKind::Usage),
                    from: Some(from),
                    to: Some(asof),
                    ..TransactionFilter::for_key(key)
                }),
            )
            .await?;
        let hours = self
            .call(
                "list_hours",
                self.store.list_hours(HoursFilter {
                    from: Some(from),
                    to: Some(asof),
                    ..HoursFilter::for_key(key)
                }),
            )
            .await?;
        let equipment = self
            .call("list_equipment", self.store.list_equipment(Some(key.site_id)))
            .await?;

        let inputs = RateInputs {
            hours: &hours,
            transactions: &transactions,
            equipment: &equipment,
        };
        let estimate = RateEstimator::estimate(key, asof, inputs, self.settings.rate).map_err(ForecastError::from)?;
        let forecast = ForecastCalculator::calculate(&balance, &site, &estimate, asof, safety_factor)
            .map_err(|err| match err {
                ForecastError::Overflow => EngineError::Computation {
                    key,
                    reason: err.to_string(),
                },
                other => other.into(),
            })?;

        self.call("upsert_forecast", self.store.upsert_forecast(&forecast))
            .await?;
        self.scenarios.invalidate(forecast.id);

        debug!(
            site_id = %key.site_id,
            fuel_type_id = %key.fuel_type_id,
            asof = %asof,
            daily_rate = %forecast.daily_rate,
            days_remaining = %forecast.days_remaining_label(),
            source = ?forecast.rate_source,
            "Forecast calculated"
        );
        Ok(forecast)
    }

    /// Calculates every active key with an open balance.
    ///
    /// # Errors
    ///
    /// Only when the key list cannot be read; per-key failures land in the summary.
    pub async fn calculate_all(&self, asof: NaiveDate, cancel: &CancellationToken) -> EngineResult<BatchSummary> {
        self.calculate_forecasts(None, None, asof, cancel).await
    }

    /// Calculates active keys matching the filters, up to `parallelism` at a time.
    ///
    /// Cancellation is checked before each key starts; a started key always
    /// finishes. Failures do not stop the batch.
    ///
    /// # Errors
    ///
    /// Only when the key list cannot be read.
    pub async fn calculate_forecasts(
        &self,
        site_id: Option<SiteId>,
        fuel_type_id: Option<FuelTypeId>,
        asof: NaiveDate,
        cancel: &CancellationToken,
    ) -> EngineResult<BatchSummary> {
        let keys = self.active_keys(site_id, fuel_type_id).await?;

        let outcomes: Vec<_> = stream::iter(keys)
            .map(|key| async move {
                if cancel.is_cancelled() {
                    return None;
                }
                Some((key, self.calculate(key, asof, None).await))
            })
            .buffered(self.settings.parallelism)
            .collect()
            .await;

        let mut summary = BatchSummary {
            asof,
            succeeded: Vec::new(),
            failed: Vec::new(),
            cancelled: false,
        };
        for outcome in outcomes {
            match outcome {
                Some((key, Ok(_))) => summary.succeeded.push(key),
                Some((key, Err(err))) => {
                    warn!(
                        site_id = %key.site_id,
                        fuel_type_id = %key.fuel_type_id,
                        code = err.error_code(),
                        error = %err,
                        "Forecast failed"
                    );
                    summary.failed.push(FailedKey {
                        key,
                        code: err.error_code(),
                        reason: err.to_string(),
                    });
                }
                None => summary.cancelled = true,
            }
        }

        info!(
            asof = %asof,
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "Forecast batch finished"
        );
        Ok(summary)
    }

    /// Keys with an open balance whose site and fuel are active, ordered by
    /// (site name, fuel name).
    pub(super) async fn active_keys(
        &self,
        site_id: Option<SiteId>,
        fuel_type_id: Option<FuelTypeId>,
    ) -> EngineResult<Vec<StockKey>> {
        let names = self.names().await?;
        let mut keys: Vec<StockKey> = self
            .call("list_balances", self.store.list_balances())
            .await?
            .iter()
            .map(StockBalance::key)
            .filter(|key| {
                names.is_active(*key)
                    && site_id.is_none_or(|s| s == key.site_id)
                    && fuel_type_id.is_none_or(|f| f == key.fuel_type_id)
            })
            .collect();
        keys.sort_by(|a, b| names.compare(*a, *b));
        Ok(keys)
    }

    // ========== Forecast queries ==========

    /// For each active key (optionally at one site), the latest forecast
    /// dated on or before `date`. Keys never forecast are omitted.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn get_forecast(&self, site_id: Option<SiteId>, date: NaiveDate) -> EngineResult<Vec<ConsumptionForecast>> {
        let mut forecasts = Vec::new();
        for key in self.active_keys(site_id, None).await? {
            let history = self.forecast_history(key).await?;
            if let Some(forecast) = history.into_iter().find(|f| f.asof_date <= date) {
                forecasts.push(forecast);
            }
        }
        Ok(forecasts)
    }

    /// Looks up a forecast by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn get_forecast_by_id(&self, id: ForecastId) -> EngineResult<ConsumptionForecast> {
        self.call("get_forecast", self.store.get_forecast(id))
            .await?
            .ok_or_else(|| ScenarioError::ForecastNotFound(id).into())
    }

    /// The newest forecast for a key, if any.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn latest_forecast(&self, key: StockKey) -> EngineResult<Option<ConsumptionForecast>> {
        Ok(self.forecast_history(key).await?.into_iter().next())
    }

    /// Every stored forecast for a key, newest as-of date first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn forecast_history(&self, key: StockKey) -> EngineResult<Vec<ConsumptionForecast>> {
        self.call("forecast_history", self.store.forecast_history(key))
            .await
    }

    // ========== Scenarios ==========

    /// Projects a what-if variant of a stored forecast. The baseline is not touched.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown forecast, validation for a missing or bad adjustment.
    pub async fn create_scenario(&self, forecast_id: ForecastId, input: ScenarioInput) -> EngineResult<ForecastScenario> {
        let baseline = self.get_forecast_by_id(forecast_id).await?;
        let scenario = ScenarioEngine::project(&baseline, input, Utc::now())?;
        self.scenarios.insert(scenario.clone());
        info!(
            scenario_id = %scenario.id,
            forecast_id = %forecast_id,
            name = %scenario.name,
            "Scenario created"
        );
        Ok(scenario)
    }

    /// Scenarios cached for a forecast, in creation order.
    #[must_use]
    pub fn list_scenarios(&self, forecast_id: ForecastId) -> Vec<ForecastScenario> {
        self.scenarios.list(forecast_id)
    }
}
