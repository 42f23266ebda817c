//! Forecast calculator.

use chrono::{Days, NaiveDate};
use fuelcast_shared::types::{ForecastId, round_days};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::ForecastError;
use super::types::ConsumptionForecast;
use crate::ledger::StockBalance;
use crate::rate::RateEstimate;
use crate::reference::Site;

/// Days remaining and depletion date for one set of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// `available / (daily_rate × safety_factor)`, two decimals; `None` when unbounded.
    pub days_remaining: Option<Decimal>,
    /// `asof + ⌊days_remaining⌋`; `None` when unbounded or past the calendar.
    pub depletion_date: Option<NaiveDate>,
}

/// Forecast calculator.
///
/// This service contains pure business logic with no storage dependencies.
pub struct ForecastCalculator;

impl ForecastCalculator {
    /// Projects depletion of `available` litres at `daily_rate × safety_factor`.
    ///
    /// A zero rate is not an error: the projection is unbounded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSafetyFactor` if `safety_factor` is not positive and
    /// `Overflow` when the effective rate or day count leaves the `Decimal` range.
    pub fn project(
        available: Decimal,
        daily_rate: Decimal,
        safety_factor: Decimal,
        asof: NaiveDate,
    ) -> Result<Projection, ForecastError> {
        if safety_factor <= Decimal::ZERO {
            return Err(ForecastError::InvalidSafetyFactor(safety_factor));
        }
        let effective_rate = daily_rate
            .checked_mul(safety_factor)
            .ok_or(ForecastError::Overflow)?;
        if effective_rate <= Decimal::ZERO {
            return Ok(Projection {
                days_remaining: None,
                depletion_date: None,
            });
        }

        let days = available
            .max(Decimal::ZERO)
            .checked_div(effective_rate)
            .map(round_days)
            .ok_or(ForecastError::Overflow)?;
        let depletion_date = days
            .floor()
            .to_u64()
            .and_then(|whole| asof.checked_add_days(Days::new(whole)));

        Ok(Projection {
            days_remaining: Some(days),
            depletion_date,
        })
    }

    /// Latest order date that keeps `safety_stock_days` of stock in hand.
    ///
    /// Never earlier than `asof`.
    #[must_use]
    pub fn reorder_date(
        depletion_date: Option<NaiveDate>,
        safety_stock_days: u32,
        asof: NaiveDate,
    ) -> Option<NaiveDate> {
        depletion_date.map(|depletion| {
            depletion
                .checked_sub_days(Days::new(u64::from(safety_stock_days)))
                .map_or(asof, |d| d.max(asof))
        })
    }

    /// Builds the forecast for one key from its balance and rate estimate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSafetyFactor` if `safety_factor` is not positive.
    pub fn calculate(
        balance: &StockBalance,
        site: &Site,
        estimate: &RateEstimate,
        asof: NaiveDate,
        safety_factor: Decimal,
    ) -> Result<ConsumptionForecast, ForecastError> {
        let projection = Self::project(
            balance.available_quantity,
            estimate.daily_rate,
            safety_factor,
            asof,
        )?;

        Ok(ConsumptionForecast {
            id: ForecastId::for_key(balance.site_id, balance.fuel_type_id, asof),
            site_id: balance.site_id,
            fuel_type_id: balance.fuel_type_id,
            asof_date: asof,
            daily_rate: estimate.daily_rate,
            days_remaining: projection.days_remaining,
            depletion_date: projection.depletion_date,
            reorder_date: Self::reorder_date(projection.depletion_date, site.safety_stock_days, asof),
            confidence_level: estimate.confidence_level,
            current_balance: balance.current_quantity,
            available_quantity: balance.available_quantity,
            safety_factor,
            rate_source: estimate.source,
            sample_days: estimate.sample_days,
        })
    }
}
