//! Scenario types.

use chrono::{DateTime, NaiveDate, Utc};
use fuelcast_shared::types::{ForecastId, ScenarioId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Caller input for a scenario.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// Display name, e.g. "Double shift".
    pub name: String,
    /// Replacement daily rate.
    pub adjusted_rate: Option<Decimal>,
    /// Replacement safety factor.
    pub adjusted_safety_factor: Option<Decimal>,
}

/// A non-persisted what-if projection over a baseline forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastScenario {
    /// Scenario ID.
    pub id: ScenarioId,
    /// Baseline forecast.
    pub forecast_id: ForecastId,
    /// Display name.
    pub name: String,
    /// Rate override, as supplied.
    pub adjusted_rate: Option<Decimal>,
    /// Safety factor override, as supplied.
    pub adjusted_safety_factor: Option<Decimal>,
    /// Rate actually used.
    pub daily_rate: Decimal,
    /// Safety factor actually used.
    pub safety_factor: Decimal,
    /// Projected days remaining; `None` when unbounded.
    pub days_remaining: Option<Decimal>,
    /// Projected depletion date; `None` when unbounded.
    pub depletion_date: Option<NaiveDate>,
    /// Scenario minus baseline days remaining; `None` if either is unbounded.
    pub days_delta: Option<Decimal>,
    /// When the scenario was created.
    pub created_at: DateTime<Utc>,
}
