//! Alert rules, evaluation and acknowledgement.

use chrono::{DateTime, TimeDelta, Utc};
use fuelcast_core::alerts::{
    AlertError, AlertEvaluation, AlertEvent, AlertRule, AlertTrigger, KeyObservation, NewAlertRule,
};
use fuelcast_shared::types::{AlertEventId, AlertRuleId, StockKey};
use tracing::{error, info};

use super::ForecastEngine;
use crate::error::{EngineError, EngineResult};
use crate::settings::DEFAULT_ALERT_LOOKBACK_DAYS;

impl ForecastEngine {
    // ========== Rules ==========

    /// Creates an alert rule. Scoped sites and fuels must exist.
    ///
    /// # Errors
    ///
    /// Validation for a blank name or out-of-range threshold, `NotFound`
    /// for an unknown scoped site or fuel.
    pub async fn create_alert_rule(&self, input: NewAlertRule) -> EngineResult<AlertRule> {
        if let Some(site_id) = input.scope.site_id {
            self.site(site_id).await?;
        }
        if let Some(fuel_type_id) = input.scope.fuel_type_id {
            self.fuel_type(fuel_type_id).await?;
        }
        let rule = input.into_rule(Utc::now())?;
        self.call("insert_alert_rule", self.store.insert_alert_rule(&rule))
            .await?;
        info!(rule_id = %rule.id, kind = rule.kind.as_str(), threshold = %rule.threshold, "Alert rule created");
        Ok(rule)
    }

    /// Stops a rule from firing. Its events remain.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown rule.
    pub async fn deactivate_alert_rule(&self, id: AlertRuleId) -> EngineResult<AlertRule> {
        let mut rule = self
            .call("get_alert_rule", self.store.get_alert_rule(id))
            .await?
            .ok_or(AlertError::RuleNotFound(id))?;
        if rule.is_active {
            rule.is_active = false;
            self.call("update_alert_rule", self.store.update_alert_rule(&rule))
                .await?;
            info!(rule_id = %id, "Alert rule deactivated");
        }
        Ok(rule)
    }

    /// All rules, oldest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_alert_rules(&self) -> EngineResult<Vec<AlertRule>> {
        self.call("list_alert_rules", self.store.list_alert_rules()).await
    }

    // ========== Evaluation ==========

    /// Manual evaluation over every active key.
    ///
    /// # Errors
    ///
    /// See [`Self::evaluate`].
    pub async fn check_alerts(&self) -> EngineResult<AlertEvaluation> {
        self.evaluate(AlertTrigger::Manual).await
    }

    /// Evaluates every active rule against every active key.
    ///
    /// # Errors
    ///
    /// `Timeout` if another evaluation holds the gate past the storage
    /// bound, storage failures otherwise.
    pub async fn evaluate(&self, trigger: AlertTrigger) -> EngineResult<AlertEvaluation> {
        self.evaluate_keys(trigger, None).await
    }

    /// Evaluates only `keys` when given. Used by the recompute worker.
    ///
    /// Passes are serialized so two concurrent passes cannot both fire the
    /// same rule for the same key.
    pub(crate) async fn evaluate_keys(
        &self,
        trigger: AlertTrigger,
        keys: Option<&[StockKey]>,
    ) -> EngineResult<AlertEvaluation> {
        let timeout = self.settings.storage_timeout;
        let _gate = tokio::time::timeout(timeout, self.alert_gate.lock())
            .await
            .map_err(|_| EngineError::Timeout {
                operation: "evaluate_alerts",
                after: timeout,
            })?;

        let rules: Vec<AlertRule> = self
            .list_alert_rules()
            .await?
            .into_iter()
            .filter(|r| r.is_active)
            .collect();
        if rules.is_empty() {
            return Ok(AlertEvaluation {
                trigger,
                emitted: Vec::new(),
                suppressed: 0,
            });
        }

        let mut observations = Vec::new();
        for view in self.get_balance(None, None).await? {
            let key = view.balance.key();
            if keys.is_some_and(|scoped| !scoped.contains(&key)) {
                continue;
            }
            let days_remaining = self
                .latest_forecast(key)
                .await?
                .and_then(|f| f.days_remaining);
            observations.push(KeyObservation {
                key,
                site_name: view.site_name,
                fuel_name: view.fuel_name,
                fill_percentage: view.fill_percentage,
                days_remaining,
            });
        }
        let names = self.names().await?;
        observations.retain(|o| names.is_active(o.key));

        let now = Utc::now();
        let prior = self
            .call(
                "list_alert_events",
                self.store.list_alert_events(cooldown_start(self.settings.alerts.cooldown_minutes, now)),
            )
            .await?;
        let evaluation = self
            .evaluator
            .evaluate(&rules, &observations, &prior, trigger, now);

        if !evaluation.emitted.is_empty() {
            self.call(
                "insert_alert_events",
                self.store.insert_alert_events(&evaluation.emitted),
            )
            .await?;
        }
        for event in &evaluation.emitted {
            if let Err(err) = self.publisher.publish(event).await {
                error!(event_id = %event.id, error = %err, "Alert publish failed");
            }
        }

        info!(
            trigger = trigger.as_str(),
            emitted = evaluation.emitted.len(),
            suppressed = evaluation.suppressed,
            "Alert evaluation finished"
        );
        Ok(evaluation)
    }

    // ========== Events ==========

    /// Marks an event acknowledged. Acknowledging twice keeps the first stamp.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event.
    pub async fn acknowledge_alert(&self, id: AlertEventId, by: &str) -> EngineResult<AlertEvent> {
        let mut event = self
            .call("get_alert_event", self.store.get_alert_event(id))
            .await?
            .ok_or(AlertError::EventNotFound(id))?;
        if !event.acknowledged {
            event.acknowledge(by, Utc::now());
            self.call("update_alert_event", self.store.update_alert_event(&event))
                .await?;
            info!(event_id = %id, by, "Alert acknowledged");
        }
        Ok(event)
    }

    /// Events triggered in the last `lookback_days` days (default 7), newest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn get_alerts(&self, lookback_days: Option<u32>) -> EngineResult<Vec<AlertEvent>> {
        let days = lookback_days.unwrap_or(DEFAULT_ALERT_LOOKBACK_DAYS);
        let since = Utc::now()
            .checked_sub_signed(TimeDelta::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.call("list_alert_events", self.store.list_alert_events(since))
            .await
    }
}

/// Events older than the cooldown can never suppress, so they are not loaded.
fn cooldown_start(cooldown_minutes: u64, now: DateTime<Utc>) -> DateTime<Utc> {
    i64::try_from(cooldown_minutes)
        .ok()
        .and_then(TimeDelta::try_minutes)
        .and_then(|cooldown| now.checked_sub_signed(cooldown))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
