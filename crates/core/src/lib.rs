//! Core stock ledger and forecasting logic for Fuelcast.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `reference` - Sites, fuel types and equipment
//! - `ledger` - Append-only stock transactions and the derived balance
//! - `rate` - Daily consumption rate estimation
//! - `forecast` - Days-remaining and depletion-date projection
//! - `scenario` - Non-mutating what-if projections
//! - `alerts` - Threshold rules, severity and de-duplication
//! - `reports` - Consumption and equipment efficiency summaries

pub mod alerts;
pub mod forecast;
pub mod ledger;
pub mod rate;
pub mod reference;
pub mod reports;
pub mod scenario;
