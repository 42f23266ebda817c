//! Read-only consumption reports.

use chrono::NaiveDate;
use fuelcast_core::ledger::TransactionKind;
use fuelcast_core::reports::{ConsumptionSummaryRow, EquipmentEfficiencyRow, ReportService};
use fuelcast_shared::types::SiteId;

use super::ForecastEngine;
use crate::error::{EngineError, EngineResult};
use crate::store::{HoursFilter, TransactionFilter};

impl ForecastEngine {
    /// Usage totals per (site, fuel) between two dates, ordered by
    /// (site name, fuel name).
    ///
    /// # Errors
    ///
    /// Validation if `from` is after `to`, storage failures otherwise.
    pub async fn consumption_summary(
        &self,
        site_id: Option<SiteId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<ConsumptionSummaryRow>> {
        if from > to {
            return Err(EngineError::validation(
                "INVALID_DATE_RANGE",
                format!("Range start {from} is after end {to}"),
            ));
        }
        let transactions = self
            .list_transactions(TransactionFilter {
                site_id,
                kind: Some(TransactionKind::Usage),
                from: Some(from),
                to: Some(to),
                ..TransactionFilter::default()
            })
            .await?;
        let names = self.names().await?;
        Ok(ReportService::consumption_summary(
            &transactions,
            &names.sites(),
            &names.fuels(),
            site_id,
            from,
            to,
        ))
    }

    /// Logged against nominal consumption per piece of equipment.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn equipment_efficiency(&self, site_id: Option<SiteId>) -> EngineResult<Vec<EquipmentEfficiencyRow>> {
        let entries = self
            .list_operational_hours(HoursFilter {
                site_id,
                ..HoursFilter::default()
            })
            .await?;
        let equipment = self
            .call("list_equipment", self.store.list_equipment(site_id))
            .await?;
        let names = self.names().await?;
        Ok(ReportService::equipment_efficiency(
            &entries,
            &equipment,
            &names.sites(),
            site_id,
        ))
    }
}
