//! Alert types.

use chrono::{DateTime, Utc};
use fuelcast_shared::types::{AlertEventId, AlertRuleId, FuelTypeId, SiteId, StockKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AlertError;

/// Metric a rule watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Fill percentage of the balance; threshold in percent.
    LowStock,
    /// Days remaining in the latest forecast; threshold in days.
    ForecastShortage,
}

impl AlertKind {
    /// Returns the storage string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowStock => "low_stock",
            Self::ForecastShortage => "forecast_shortage",
        }
    }
}

impl std::str::FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low_stock" => Ok(Self::LowStock),
            "forecast_shortage" => Ok(Self::ForecastShortage),
            _ => Err(format!("Unknown alert kind: {s}")),
        }
    }
}

/// Which stock positions a rule applies to. `None` matches any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertScope {
    /// Restrict to one site.
    pub site_id: Option<SiteId>,
    /// Restrict to one fuel.
    pub fuel_type_id: Option<FuelTypeId>,
}

impl AlertScope {
    /// A scope matching every stock position.
    #[must_use]
    pub const fn global() -> Self {
        Self {
            site_id: None,
            fuel_type_id: None,
        }
    }

    /// True if `key` falls inside this scope.
    #[must_use]
    pub fn matches(&self, key: StockKey) -> bool {
        self.site_id.is_none_or(|s| s == key.site_id)
            && self.fuel_type_id.is_none_or(|f| f == key.fuel_type_id)
    }
}

/// Alert severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Breached, but far from the critical band.
    Low,
    /// Approaching critical.
    Medium,
    /// Close to critical.
    High,
    /// Act now.
    Critical,
}

impl Severity {
    /// Returns the storage string for this severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            "Critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {s}")),
        }
    }
}

/// What started an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTrigger {
    /// An operator asked for it.
    Manual,
    /// The periodic scheduler.
    Scheduled,
    /// A committed write, scoped to the keys it touched.
    OnTransaction,
}

impl AlertTrigger {
    /// Returns the storage string for this trigger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::OnTransaction => "on_transaction",
        }
    }
}

impl std::str::FromStr for AlertTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "scheduled" => Ok(Self::Scheduled),
            "on_transaction" => Ok(Self::OnTransaction),
            _ => Err(format!("Unknown alert trigger: {s}")),
        }
    }
}

/// A configured threshold rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Rule ID.
    pub id: AlertRuleId,
    /// Display name.
    pub name: String,
    /// Positions the rule applies to.
    pub scope: AlertScope,
    /// Metric watched.
    pub kind: AlertKind,
    /// Fires when the metric is strictly below this value.
    pub threshold: Decimal,
    /// Inactive rules are skipped.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Caller input for a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlertRule {
    /// Display name.
    pub name: String,
    /// Positions the rule applies to.
    #[serde(default)]
    pub scope: AlertScope,
    /// Metric watched.
    pub kind: AlertKind,
    /// Threshold (percent for `LowStock`, days for `ForecastShortage`).
    pub threshold: Decimal,
}

impl NewAlertRule {
    /// Validates the input and builds the rule.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName` or `InvalidThreshold`.
    pub fn into_rule(self, now: DateTime<Utc>) -> Result<AlertRule, AlertError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AlertError::EmptyName);
        }
        let out_of_range = match self.kind {
            AlertKind::LowStock => {
                self.threshold <= Decimal::ZERO || self.threshold > Decimal::ONE_HUNDRED
            }
            AlertKind::ForecastShortage => self.threshold <= Decimal::ZERO,
        };
        if out_of_range {
            return Err(AlertError::InvalidThreshold {
                kind: self.kind.as_str(),
                threshold: self.threshold,
            });
        }

        Ok(AlertRule {
            id: AlertRuleId::new(),
            name: name.to_string(),
            scope: self.scope,
            kind: self.kind,
            threshold: self.threshold,
            is_active: true,
            created_at: now,
        })
    }
}

/// A fired alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Event ID.
    pub id: AlertEventId,
    /// Rule that fired.
    pub rule_id: AlertRuleId,
    /// Site the metric belongs to.
    pub site_id: SiteId,
    /// Fuel the metric belongs to.
    pub fuel_type_id: FuelTypeId,
    /// Metric kind.
    pub kind: AlertKind,
    /// Severity at firing time.
    pub severity: Severity,
    /// Metric value that breached.
    pub metric_value: Decimal,
    /// Rule threshold at firing time.
    pub threshold: Decimal,
    /// Human-readable description.
    pub message: String,
    /// What started the evaluation.
    pub trigger: AlertTrigger,
    /// Firing time.
    pub triggered_at: DateTime<Utc>,
    /// Whether an operator has acknowledged it.
    pub acknowledged: bool,
    /// Acknowledgement time.
    pub acknowledged_at: Option<DateTime<Utc>>,
    /// Who acknowledged it.
    pub acknowledged_by: Option<String>,
}

impl AlertEvent {
    /// The (site, fuel) key the event belongs to.
    #[must_use]
    pub const fn key(&self) -> StockKey {
        StockKey::new(self.site_id, self.fuel_type_id)
    }

    /// Marks the event acknowledged. Acknowledging twice keeps the first stamp.
    pub fn acknowledge(&mut self, by: impl Into<String>, now: DateTime<Utc>) {
        if self.acknowledged {
            return;
        }
        self.acknowledged = true;
        self.acknowledged_at = Some(now);
        self.acknowledged_by = Some(by.into());
    }
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvaluation {
    /// What started the pass.
    pub trigger: AlertTrigger,
    /// Events emitted.
    pub emitted: Vec<AlertEvent>,
    /// Breaches suppressed by the cooldown.
    pub suppressed: u32,
}
