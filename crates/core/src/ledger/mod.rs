//! Append-only stock ledger.
//!
//! This module implements the write side of the stock engine:
//! - Transaction records (refills and usage), write-once
//! - Operational hours log entries, write-once
//! - The per-(site, fuel) balance aggregate folded from the ledger
//! - Validation of inputs against reference data
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod hours;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{BalanceChange, BalanceSettings, StockBalance, StockStatus, StockWarning};
pub use error::LedgerError;
pub use hours::{NewHoursEntry, OperationalHoursEntry};
pub use types::{
    NewTransaction, RefillInput, StockTransaction, TransactionDetails, TransactionKind, UsageInput,
    DEFAULT_ACTOR,
};
pub use validation::LedgerService;
