//! Report generation service.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use fuelcast_shared::types::{EquipmentId, FuelTypeId, SiteId, StockKey, round_days, round_quantity};
use rust_decimal::Decimal;

use super::types::{ConsumptionSummaryRow, EquipmentEfficiencyRow};
use crate::ledger::{OperationalHoursEntry, StockTransaction, TransactionKind};
use crate::reference::{Equipment, FuelType, Site};

/// Service for generating consumption reports.
pub struct ReportService;

impl ReportService {
    /// Usage totals per (site, fuel) between `from` and `to` inclusive.
    ///
    /// Rows are ordered by (site name, fuel name). Pairs without usage in
    /// range are omitted.
    #[must_use]
    pub fn consumption_summary(
        transactions: &[StockTransaction],
        sites: &[Site],
        fuels: &[FuelType],
        site_filter: Option<SiteId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<ConsumptionSummaryRow> {
        let site_names: HashMap<SiteId, &str> = sites.iter().map(|s| (s.id, s.name.as_str())).collect();
        let fuel_names: HashMap<FuelTypeId, &str> = fuels.iter().map(|f| (f.id, f.name.as_str())).collect();

        let mut grouped: BTreeMap<StockKey, Vec<&StockTransaction>> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| {
            t.kind == TransactionKind::Usage
                && site_filter.is_none_or(|s| s == t.site_id)
                && t.transaction_date >= from
                && t.transaction_date <= to
        }) {
            grouped.entry(tx.key()).or_default().push(tx);
        }

        let mut rows: Vec<ConsumptionSummaryRow> = grouped
            .into_iter()
            .filter_map(|(key, txs)| {
                let first_usage = txs.iter().map(|t| t.transaction_date).min()?;
                let last_usage = txs.iter().map(|t| t.transaction_date).max()?;
                let total: Decimal = txs.iter().map(|t| t.quantity).sum();
                let count = u32::try_from(txs.len()).unwrap_or(u32::MAX);

                Some(ConsumptionSummaryRow {
                    site_id: key.site_id,
                    site_name: site_names.get(&key.site_id).copied().unwrap_or_default().to_string(),
                    fuel_type_id: key.fuel_type_id,
                    fuel_name: fuel_names.get(&key.fuel_type_id).copied().unwrap_or_default().to_string(),
                    total_consumed: total,
                    average_per_transaction: round_quantity(total / Decimal::from(count)),
                    transaction_count: count,
                    first_usage,
                    last_usage,
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.site_name.as_str(), a.fuel_name.as_str(), a.site_id, a.fuel_type_id)
                .cmp(&(b.site_name.as_str(), b.fuel_name.as_str(), b.site_id, b.fuel_type_id))
        });
        rows
    }

    /// Logged versus nameplate consumption per machine.
    ///
    /// Every equipment record in scope gets a row, including machines with
    /// no log entries. Rows are ordered by (site name, equipment name).
    #[must_use]
    pub fn equipment_efficiency(
        entries: &[OperationalHoursEntry],
        equipment: &[Equipment],
        sites: &[Site],
        site_filter: Option<SiteId>,
    ) -> Vec<EquipmentEfficiencyRow> {
        let site_names: HashMap<SiteId, &str> = sites.iter().map(|s| (s.id, s.name.as_str())).collect();

        let mut totals: HashMap<EquipmentId, (u32, Decimal, Decimal)> = HashMap::new();
        let nominal: HashMap<EquipmentId, Decimal> =
            equipment.iter().map(|e| (e.id, e.nominal_consumption_rate)).collect();
        for entry in entries {
            let rate = nominal.get(&entry.equipment_id).copied().unwrap_or(Decimal::ZERO);
            let slot = totals.entry(entry.equipment_id).or_default();
            slot.0 += 1;
            slot.1 += entry.running_hours;
            slot.2 += entry.consumed_or_estimated(rate);
        }

        let mut rows: Vec<EquipmentEfficiencyRow> = equipment
            .iter()
            .filter(|e| site_filter.is_none_or(|s| s == e.site_id))
            .map(|e| {
                let (entry_count, hours, fuel) = totals.get(&e.id).copied().unwrap_or_default();
                let actual = (hours > Decimal::ZERO).then(|| round_quantity(fuel / hours));
                let variance_percent = actual
                    .filter(|_| e.nominal_consumption_rate > Decimal::ZERO)
                    .map(|a| {
                        round_days(
                            (a - e.nominal_consumption_rate) * Decimal::ONE_HUNDRED
                                / e.nominal_consumption_rate,
                        )
                    });

                EquipmentEfficiencyRow {
                    equipment_id: e.id,
                    equipment_name: e.name.clone(),
                    site_id: e.site_id,
                    site_name: site_names.get(&e.site_id).copied().unwrap_or_default().to_string(),
                    fuel_type_id: e.fuel_type_id,
                    entry_count,
                    total_running_hours: hours,
                    total_fuel_consumed: fuel,
                    actual_rate_per_hour: actual,
                    nominal_rate: e.nominal_consumption_rate,
                    variance_percent,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            (a.site_name.as_str(), a.equipment_name.as_str(), a.equipment_id)
                .cmp(&(b.site_name.as_str(), b.equipment_name.as_str(), b.equipment_id))
        });
        rows
    }
}
