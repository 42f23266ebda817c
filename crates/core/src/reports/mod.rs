//! Consumption and efficiency reports.
//!
//! Read-only aggregations over the ledger and the operational hours log.

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::{ConsumptionSummaryRow, EquipmentEfficiencyRow};
