//! `SeaORM` entity definitions, one module per table.

pub mod alert_events;
pub mod alert_rules;
pub mod consumption_forecasts;
pub mod equipment;
pub mod fuel_types;
pub mod operational_hours;
pub mod sites;
pub mod stock_balances;
pub mod stock_transactions;
