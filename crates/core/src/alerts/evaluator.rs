//! Alert evaluation and de-duplication.

use chrono::{DateTime, TimeDelta, Utc};
use fuelcast_shared::config::{AlertConfig, SeverityBands};
use fuelcast_shared::types::{AlertEventId, StockKey};
use rust_decimal::Decimal;

use super::severity::classify;
use super::types::{AlertEvaluation, AlertEvent, AlertKind, AlertRule, AlertTrigger, Severity};

/// Metrics of one stock position at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyObservation {
    /// Position observed.
    pub key: StockKey,
    /// Site display name, for messages.
    pub site_name: String,
    /// Fuel display name, for messages.
    pub fuel_name: String,
    /// Balance fill percentage.
    pub fill_percentage: Decimal,
    /// Latest forecast days remaining; `None` if unbounded or never forecast.
    pub days_remaining: Option<Decimal>,
}

/// Alert evaluator.
///
/// Compares observations against active rules. A breach is suppressed when
/// the latest prior event for the same rule and key is unacknowledged,
/// younger than the cooldown and at least as severe.
#[derive(Debug, Clone, Copy)]
pub struct AlertEvaluator {
    cooldown: TimeDelta,
    days_bands: SeverityBands,
    fill_bands: SeverityBands,
}

impl AlertEvaluator {
    /// Creates an evaluator.
    #[must_use]
    pub fn new(cooldown_minutes: u64, days_bands: SeverityBands, fill_bands: SeverityBands) -> Self {
        let cooldown = i64::try_from(cooldown_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .unwrap_or(TimeDelta::MAX);
        Self {
            cooldown,
            days_bands,
            fill_bands,
        }
    }

    /// Runs one evaluation pass.
    ///
    /// `observations` order is preserved in the emitted events.
    #[must_use]
    pub fn evaluate(
        &self,
        rules: &[AlertRule],
        observations: &[KeyObservation],
        prior: &[AlertEvent],
        trigger: AlertTrigger,
        now: DateTime<Utc>,
    ) -> AlertEvaluation {
        let mut emitted = Vec::new();
        let mut suppressed = 0;

        for observation in observations {
            for rule in rules
                .iter()
                .filter(|r| r.is_active && r.scope.matches(observation.key))
            {
                let Some(metric) = Self::metric(rule.kind, observation) else {
                    continue;
                };
                if metric >= rule.threshold {
                    continue;
                }

                let severity = classify(metric, self.bands(rule.kind));
                let latest = prior
                    .iter()
                    .filter(|e| e.rule_id == rule.id && e.key() == observation.key)
                    .max_by_key(|e| e.triggered_at);
                if latest.is_some_and(|p| self.suppresses(p, severity, now)) {
                    suppressed += 1;
                    continue;
                }

                emitted.push(AlertEvent {
                    id: AlertEventId::new(),
                    rule_id: rule.id,
                    site_id: observation.key.site_id,
                    fuel_type_id: observation.key.fuel_type_id,
                    kind: rule.kind,
                    severity,
                    metric_value: metric,
                    threshold: rule.threshold,
                    message: Self::message(rule, observation, metric),
                    trigger,
                    triggered_at: now,
                    acknowledged: false,
                    acknowledged_at: None,
                    acknowledged_by: None,
                });
            }
        }

        AlertEvaluation {
            trigger,
            emitted,
            suppressed,
        }
    }

    /// True if `prior` still covers a breach of `severity` at `now`.
    #[must_use]
    pub fn suppresses(&self, prior: &AlertEvent, severity: Severity, now: DateTime<Utc>) -> bool {
        !prior.acknowledged
            && now.signed_duration_since(prior.triggered_at) < self.cooldown
            && severity <= prior.severity
    }

    fn metric(kind: AlertKind, observation: &KeyObservation) -> Option<Decimal> {
        match kind {
            AlertKind::LowStock => Some(observation.fill_percentage),
            AlertKind::ForecastShortage => observation.days_remaining,
        }
    }

    const fn bands(&self, kind: AlertKind) -> &SeverityBands {
        match kind {
            AlertKind::LowStock => &self.fill_bands,
            AlertKind::ForecastShortage => &self.days_bands,
        }
    }

    fn message(rule: &AlertRule, observation: &KeyObservation, metric: Decimal) -> String {
        match rule.kind {
            AlertKind::LowStock => format!(
                "Low stock: {} at {} is {}% full (threshold {}%)",
                observation.fuel_name, observation.site_name, metric, rule.threshold
            ),
            AlertKind::ForecastShortage => format!(
                "Forecast shortage: {} at {} runs out in {} days (threshold {} days)",
                observation.fuel_name, observation.site_name, metric, rule.threshold
            ),
        }
    }
}

impl From<&AlertConfig> for AlertEvaluator {
    fn from(config: &AlertConfig) -> Self {
        Self::new(config.cooldown_minutes, config.days_bands, config.fill_bands)
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::from(&AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{AlertScope, NewAlertRule};
    use chrono::Duration;
    use fuelcast_shared::types::{FuelTypeId, SiteId};
    use rust_decimal_macros::dec;

    fn observation(days: Option<Decimal>, fill: Decimal) -> KeyObservation {
        KeyObservation {
            key: StockKey::new(SiteId::new(), FuelTypeId::new()),
            site_name: "Site B".to_string(),
            fuel_name: "Diesel".to_string(),
            fill_percentage: fill,
            days_remaining: days,
        }
    }

    fn rule(kind: AlertKind, threshold: Decimal) -> AlertRule {
        NewAlertRule {
            name: "rule".to_string(),
            scope: AlertScope::global(),
            kind,
            threshold,
        }
        .into_rule(Utc::now())
        .unwrap()
    }

    #[test]
    fn test_shortage_fires_critical() {
        let rules = [rule(AlertKind::ForecastShortage, dec!(7))];
        let obs = [observation(Some(dec!(6.67)), dec!(16))];
        let result = AlertEvaluator::default().evaluate(&rules, &obs, &[], AlertTrigger::Manual, Utc::now());

        assert_eq!(result.emitted.len(), 1);
        let event = &result.emitted[0];
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.metric_value, dec!(6.67));
        assert_eq!(
            event.message,
            "Forecast shortage: Diesel at Site B runs out in 6.67 days (threshold 7 days)"
        );
    }

    #[test]
    fn test_unbounded_never_fires() {
        let rules = [rule(AlertKind::ForecastShortage, dec!(30))];
        let obs = [observation(None, dec!(70))];
        let result = AlertEvaluator::default().evaluate(&rules, &obs, &[], AlertTrigger::Scheduled, Utc::now());
        assert!(result.emitted.is_empty());
        assert_eq!(result.suppressed, 0);
    }

    #[test]
    fn test_at_threshold_does_not_fire() {
        let rules = [rule(AlertKind::LowStock, dec!(20))];
        let obs = [observation(None, dec!(20))];
        let result = AlertEvaluator::default().evaluate(&rules, &obs, &[], AlertTrigger::Manual, Utc::now());
        assert!(result.emitted.is_empty());
    }

    #[test]
    fn test_second_pass_within_cooldown_suppressed() {
        let evaluator = AlertEvaluator::default();
        let rules = [rule(AlertKind::LowStock, dec!(40))];
        let obs = [observation(None, dec!(16))];
        let now = Utc::now();

        let first = evaluator.evaluate(&rules, &obs, &[], AlertTrigger::Manual, now);
        assert_eq!(first.emitted.len(), 1);

        let second = evaluator.evaluate(&rules, &obs, &first.emitted, AlertTrigger::Manual, now + Duration::minutes(5));
        assert!(second.emitted.is_empty());
        assert_eq!(second.suppressed, 1);
    }

    #[test]
    fn test_refires_after_acknowledge_expiry_or_escalation() {
        let evaluator = AlertEvaluator::default();
        let rules = [rule(AlertKind::ForecastShortage, dec!(30))];
        let now = Utc::now();
        let mut obs = [observation(Some(dec!(20)), dec!(50))];

        let first = evaluator.evaluate(&rules, &obs, &[], AlertTrigger::Manual, now);
        assert_eq!(first.emitted[0].severity, Severity::Medium);

        // Escalation within the cooldown.
        obs[0].days_remaining = Some(dec!(5));
        let escalated = evaluator.evaluate(&rules, &obs, &first.emitted, AlertTrigger::OnTransaction, now);
        assert_eq!(escalated.emitted.len(), 1);
        assert_eq!(escalated.emitted[0].severity, Severity::Critical);

        // Acknowledged.
        let mut acked = escalated.emitted.clone();
        acked[0].acknowledge("ops", now);
        let after_ack = evaluator.evaluate(&rules, &obs, &acked, AlertTrigger::Manual, now);
        assert_eq!(after_ack.emitted.len(), 1);

        // Expired.
        let expired = evaluator.evaluate(
            &rules,
            &obs,
            &escalated.emitted,
            AlertTrigger::Scheduled,
            now + Duration::minutes(721),
        );
        assert_eq!(expired.emitted.len(), 1);
    }

    #[test]
    fn test_inactive_and_out_of_scope_rules_skipped() {
        let mut inactive = rule(AlertKind::LowStock, dec!(50));
        inactive.is_active = false;
        let mut scoped = rule(AlertKind::LowStock, dec!(50));
        scoped.scope.site_id = Some(SiteId::new());

        let obs = [observation(None, dec!(10))];
        let result = AlertEvaluator::default().evaluate(&[inactive, scoped], &obs, &[], AlertTrigger::Manual, Utc::now());
        assert!(result.emitted.is_empty());
    }
}
