//! Daily consumption rate estimator.

use std::collections::{BTreeMap, HashMap};

use chrono::{Days, NaiveDate};
use fuelcast_shared::config::ForecastConfig;
use fuelcast_shared::types::{EquipmentId, StockKey, round_quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::confidence::{NOMINAL_CONFIDENCE, confidence_level};
use super::error::RateError;
use crate::ledger::{OperationalHoursEntry, StockTransaction, TransactionKind};
use crate::reference::Equipment;

/// Where a rate estimate came from, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Fuel consumed as logged against operational hours.
    OperationalHours,
    /// Usage transactions drawn from the ledger.
    UsageTransactions,
    /// Equipment nameplate rates times expected daily running hours.
    NominalRate,
}

impl RateSource {
    /// Returns the storage string for this source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OperationalHours => "operational_hours",
            Self::UsageTransactions => "usage_transactions",
            Self::NominalRate => "nominal_rate",
        }
    }
}

impl std::str::FromStr for RateSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational_hours" => Ok(Self::OperationalHours),
            "usage_transactions" => Ok(Self::UsageTransactions),
            "nominal_rate" => Ok(Self::NominalRate),
            _ => Err(format!("Unknown rate source: {s}")),
        }
    }
}

/// Estimator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateParams {
    /// Calendar days in the window, ending on and including the as-of date.
    pub lookback_days: u32,
    /// Distinct dates a logged source needs before it is trusted.
    pub min_sample_days: u32,
    /// Running hours per day assumed for the nominal fallback.
    pub expected_daily_hours: Decimal,
}

impl From<&ForecastConfig> for RateParams {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            lookback_days: config.lookback_days,
            min_sample_days: config.min_sample_days,
            expected_daily_hours: config.expected_daily_hours,
        }
    }
}

impl Default for RateParams {
    fn default() -> Self {
        Self::from(&ForecastConfig::default())
    }
}

/// Raw material for one estimate. Records outside the key or window are ignored.
#[derive(Debug, Clone, Copy)]
pub struct RateInputs<'a> {
    /// Operational hours entries.
    pub hours: &'a [OperationalHoursEntry],
    /// Ledger transactions; only usage counts.
    pub transactions: &'a [StockTransaction],
    /// Equipment registered at the site.
    pub equipment: &'a [Equipment],
}

/// A daily-rate estimate with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Litres per calendar day, four decimals.
    pub daily_rate: Decimal,
    /// Reliability score 0–100.
    pub confidence_level: u8,
    /// Which source produced the rate.
    pub source: RateSource,
    /// Distinct dates with data; zero for the nominal fallback.
    pub sample_days: u32,
    /// First day of the window.
    pub window_start: NaiveDate,
    /// Last day of the window (the as-of date).
    pub window_end: NaiveDate,
}

/// Consumption rate estimator.
///
/// Pure function of its inputs: identical inputs produce identical estimates.
pub struct RateEstimator;

impl RateEstimator {
    /// Estimates the daily rate for `key` over the window ending at `asof`.
    ///
    /// Preference order:
    /// 1. Operational hours (metered, or `running_hours × nominal` when not metered)
    /// 2. Usage transactions
    /// 3. Σ active equipment nominal rate × expected daily hours
    ///
    /// Logged sources are divided by the full window length in calendar days,
    /// and are used only when they cover at least `min_sample_days` dates.
    ///
    /// # Errors
    ///
    /// Returns `EmptyWindow` for a zero-day window, `NoUsableData` when
    /// no source applies and `Overflow` when totals leave the `Decimal` range.
    pub fn estimate(
        key: StockKey,
        asof: NaiveDate,
        inputs: RateInputs<'_>,
        params: RateParams,
    ) -> Result<RateEstimate, RateError> {
        if params.lookback_days == 0 {
            return Err(RateError::EmptyWindow);
        }
        let window_start = asof
            .checked_sub_days(Days::new(u64::from(params.lookback_days - 1)))
            .unwrap_or(NaiveDate::MIN);
        let in_window = |d: NaiveDate| d >= window_start && d <= asof;
        let window_days = Decimal::from(params.lookback_days);

        let nominal_by_equipment: HashMap<EquipmentId, Decimal> = inputs
            .equipment
            .iter()
            .map(|e| (e.id, e.nominal_consumption_rate))
            .collect();

        let mut hours_by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for entry in inputs
            .hours
            .iter()
            .filter(|e| e.key() == key && in_window(e.log_date))
        {
            let nominal = nominal_by_equipment
                .get(&entry.equipment_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let slot = hours_by_day.entry(entry.log_date).or_default();
            *slot = slot
                .checked_add(entry.consumed_or_estimated(nominal))
                .ok_or(RateError::Overflow(key))?;
        }

        let mut usage_by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for tx in inputs.transactions.iter().filter(|t| {
            t.kind == TransactionKind::Usage && t.key() == key && in_window(t.transaction_date)
        }) {
            let slot = usage_by_day.entry(tx.transaction_date).or_default();
            *slot = slot.checked_add(tx.quantity).ok_or(RateError::Overflow(key))?;
        }

        let logged = [
            (RateSource::OperationalHours, hours_by_day),
            (RateSource::UsageTransactions, usage_by_day),
        ];
        for (source, by_day) in logged {
            let sample_days = u32::try_from(by_day.len()).unwrap_or(u32::MAX);
            if sample_days >= params.min_sample_days.max(1) {
                let per_day: Vec<Decimal> = by_day.into_values().collect();
                let total = per_day
                    .iter()
                    .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
                    .ok_or(RateError::Overflow(key))?;
                return Ok(RateEstimate {
                    daily_rate: round_quantity(total / window_days),
                    confidence_level: confidence_level(&per_day).ok_or(RateError::Overflow(key))?,
                    source,
                    sample_days,
                    window_start,
                    window_end: asof,
                });
            }
        }

        let mut fallback = inputs
            .equipment
            .iter()
            .filter(|e| e.is_active && e.site_id == key.site_id && e.fuel_type_id == key.fuel_type_id)
            .peekable();
        if fallback.peek().is_none() {
            return Err(RateError::NoUsableData(key));
        }
        let daily = fallback
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.nominal_consumption_rate))
            .and_then(|hourly| hourly.checked_mul(params.expected_daily_hours))
            .ok_or(RateError::Overflow(key))?;

        Ok(RateEstimate {
            daily_rate: round_quantity(daily),
            confidence_level: NOMINAL_CONFIDENCE,
            source: RateSource::NominalRate,
            sample_days: 0,
            window_start,
            window_end: asof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{NewHoursEntry, NewTransaction, UsageInput};
    use crate::reference::NewEquipment;
    use chrono::Utc;
    use fuelcast_shared::types::{FuelTypeId, SiteId};
    use rust_decimal_macros::dec;

    fn asof() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
    }

    fn key() -> StockKey {
        StockKey::new(SiteId::new(), FuelTypeId::new())
    }

    fn equipment(key: StockKey, rate: Decimal) -> Equipment {
        NewEquipment {
            site_id: key.site_id,
            fuel_type_id: key.fuel_type_id,
            name: "Generator".to_string(),
            code: "GEN".to_string(),
            nominal_consumption_rate: rate,
            equipment_type: None,
            manufacturer: None,
            model: None,
        }
        .into_equipment(Utc::now())
        .unwrap()
    }

    fn usage(key: StockKey, days_ago: u64, quantity: Decimal) -> StockTransaction {
        let tx: NewTransaction = UsageInput {
            site_id: key.site_id,
            fuel_type_id: key.fuel_type_id,
            equipment_id: None,
            department: None,
            quantity,
            date: asof() - Days::new(days_ago),
            purpose: None,
            actor: None,
            idempotency_key: None,
        }
        .into();
        tx.into_transaction(Utc::now(), None)
    }

    fn hours(equipment: &Equipment, days_ago: u64, running: Decimal, consumed: Option<Decimal>) -> OperationalHoursEntry {
        NewHoursEntry {
            site_id: equipment.site_id,
            equipment_id: equipment.id,
            log_date: asof() - Days::new(days_ago),
            running_hours: running,
            fuel_consumed: consumed,
            recorded_by: None,
            notes: None,
        }
        .into_entry(equipment, Utc::now())
    }

    #[test]
    fn test_prefers_operational_hours() {
        let k = key();
        let gen_set = equipment(k, dec!(25));
        let hours_log = vec![
            hours(&gen_set, 0, dec!(8), Some(dec!(200))),
            hours(&gen_set, 1, dec!(8), None),
            hours(&gen_set, 2, dec!(4), Some(dec!(100))),
        ];
        let txs = vec![usage(k, 0, dec!(9000)), usage(k, 1, dec!(9000)), usage(k, 2, dec!(9000))];

        let estimate = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &hours_log, transactions: &txs, equipment: &[gen_set] },
            RateParams::default(),
        )
        .unwrap();

        // (200 + 8·25 + 100) / 30
        assert_eq!(estimate.source, RateSource::OperationalHours);
        assert_eq!(estimate.daily_rate, dec!(16.6667));
        assert_eq!(estimate.sample_days, 3);
        assert_eq!(estimate.window_start, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    }

    #[test]
    fn test_falls_back_to_usage_when_hours_sparse() {
        let k = key();
        let gen_set = equipment(k, dec!(25));
        let hours_log = vec![hours(&gen_set, 0, dec!(8), None)];
        let txs = vec![
            usage(k, 0, dec!(12000)),
            usage(k, 5, dec!(12000)),
            usage(k, 10, dec!(12000)),
            usage(k, 40, dec!(99999)),
        ];

        let estimate = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &hours_log, transactions: &txs, equipment: &[gen_set] },
            RateParams::default(),
        )
        .unwrap();

        assert_eq!(estimate.source, RateSource::UsageTransactions);
        assert_eq!(estimate.daily_rate, dec!(1200));
        assert_eq!(estimate.sample_days, 3);
        assert!(estimate.confidence_level > NOMINAL_CONFIDENCE);
    }

    #[test]
    fn test_nominal_fallback_is_low_confidence() {
        let k = key();
        let equipment = vec![equipment(k, dec!(25)), equipment(k, dec!(12.5))];
        let txs = vec![usage(k, 0, dec!(100))];

        let estimate = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &[], transactions: &txs, equipment: &equipment },
            RateParams::default(),
        )
        .unwrap();

        assert_eq!(estimate.source, RateSource::NominalRate);
        assert_eq!(estimate.daily_rate, dec!(300));
        assert_eq!(estimate.confidence_level, NOMINAL_CONFIDENCE);
    }

    #[test]
    fn test_inactive_and_foreign_equipment_ignored() {
        let k = key();
        let mut idle = equipment(k, dec!(25));
        idle.is_active = false;
        let elsewhere = equipment(key(), dec!(40));

        let result = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &[], transactions: &[], equipment: &[idle, elsewhere] },
            RateParams::default(),
        );
        assert!(matches!(result, Err(RateError::NoUsableData(_))));
    }

    #[test]
    fn test_future_records_excluded() {
        let k = key();
        let mut txs = vec![usage(k, 0, dec!(300)), usage(k, 1, dec!(300)), usage(k, 2, dec!(300))];
        let mut future = usage(k, 0, dec!(50000));
        future.transaction_date = asof() + Days::new(1);
        txs.push(future);

        let estimate = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &[], transactions: &txs, equipment: &[] },
            RateParams::default(),
        )
        .unwrap();
        assert_eq!(estimate.daily_rate, dec!(30));
    }

    #[test]
    fn test_huge_metered_days_estimate_without_panic() {
        let k = key();
        let gen_set = equipment(k, dec!(25));
        let hours_log: Vec<_> = (1..=3u64)
            .map(|day| hours(&gen_set, day, dec!(8), Some(Decimal::from(day) * dec!(1000000000000000))))
            .collect();

        let estimate = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &hours_log, transactions: &[], equipment: &[gen_set] },
            RateParams::default(),
        )
        .unwrap();

        // 6e15 / 30
        assert_eq!(estimate.daily_rate, dec!(200000000000000));
        assert!(estimate.confidence_level <= 100);
    }

    #[test]
    fn test_unrepresentable_usage_total_is_overflow() {
        let k = key();
        let txs = vec![
            usage(k, 0, Decimal::MAX),
            usage(k, 0, Decimal::MAX),
            usage(k, 1, dec!(1)),
            usage(k, 2, dec!(1)),
        ];

        let result = RateEstimator::estimate(
            k,
            asof(),
            RateInputs { hours: &[], transactions: &txs, equipment: &[] },
            RateParams::default(),
        );
        assert!(matches!(result, Err(RateError::Overflow(_))));
    }

    #[test]
    fn test_zero_window_rejected() {
        let params = RateParams { lookback_days: 0, ..RateParams::default() };
        let result = RateEstimator::estimate(
            key(),
            asof(),
            RateInputs { hours: &[], transactions: &[], equipment: &[] },
            params,
        );
        assert!(matches!(result, Err(RateError::EmptyWindow)));
    }
}
