//! Scenario projection.

use chrono::{DateTime, Utc};
use fuelcast_shared::types::ScenarioId;
use rust_decimal::Decimal;

use super::error::ScenarioError;
use super::types::{ForecastScenario, ScenarioInput};
use crate::forecast::{ConsumptionForecast, ForecastCalculator, ForecastError};

/// Scenario engine for what-if projections.
///
/// Takes the baseline by shared reference; it cannot mutate it.
pub struct ScenarioEngine;

impl ScenarioEngine {
    /// Validates a scenario input without projecting it.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName`, `NoAdjustment`, `NegativeRate` or `InvalidSafetyFactor`.
    pub fn validate(input: &ScenarioInput) -> Result<(), ScenarioError> {
        if input.name.trim().is_empty() {
            return Err(ScenarioError::EmptyName);
        }
        if input.adjusted_rate.is_none() && input.adjusted_safety_factor.is_none() {
            return Err(ScenarioError::NoAdjustment);
        }
        if let Some(rate) = input.adjusted_rate.filter(|r| r.is_sign_negative()) {
            return Err(ScenarioError::NegativeRate(rate));
        }
        if let Some(factor) = input.adjusted_safety_factor.filter(|f| *f <= Decimal::ZERO) {
            return Err(ScenarioError::InvalidSafetyFactor(factor));
        }
        Ok(())
    }

    /// Re-projects the baseline with whichever adjustments are supplied.
    ///
    /// # Errors
    ///
    /// Returns a validation error from [`Self::validate`], or `Overflow` when
    /// the adjusted rate cannot be projected.
    pub fn project(
        baseline: &ConsumptionForecast,
        input: ScenarioInput,
        now: DateTime<Utc>,
    ) -> Result<ForecastScenario, ScenarioError> {
        Self::validate(&input)?;

        let daily_rate = input.adjusted_rate.unwrap_or(baseline.daily_rate);
        let safety_factor = input.adjusted_safety_factor.unwrap_or(baseline.safety_factor);
        let projection = ForecastCalculator::project(
            baseline.available_quantity,
            daily_rate,
            safety_factor,
            baseline.asof_date,
        )
        .map_err(|err| match err {
            ForecastError::Overflow => ScenarioError::Overflow,
            _ => ScenarioError::InvalidSafetyFactor(safety_factor),
        })?;

        let days_delta = projection
            .days_remaining
            .zip(baseline.days_remaining)
            .map(|(scenario, base)| scenario - base);

        Ok(ForecastScenario {
            id: ScenarioId::new(),
            forecast_id: baseline.id,
            name: input.name.trim().to_string(),
            adjusted_rate: input.adjusted_rate,
            adjusted_safety_factor: input.adjusted_safety_factor,
            daily_rate,
            safety_factor,
            days_remaining: projection.days_remaining,
            depletion_date: projection.depletion_date,
            days_delta,
            created_at: now,
        })
    }
}
