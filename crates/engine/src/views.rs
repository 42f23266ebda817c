//! Result shapes returned by engine operations.

use chrono::NaiveDate;
use fuelcast_core::ledger::{StockBalance, StockStatus, StockTransaction, StockWarning};
use fuelcast_core::reference::{FuelType, Site};
use fuelcast_shared::types::StockKey;
use rust_decimal::Decimal;
use serde::Serialize;

/// A balance decorated with display names and dashboard metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    /// The stored aggregate.
    #[serde(flatten)]
    pub balance: StockBalance,
    /// Site display name.
    pub site_name: String,
    /// Fuel display name.
    pub fuel_name: String,
    /// Current / capacity × 100, two decimals.
    pub fill_percentage: Decimal,
    /// Dashboard band.
    pub stock_status: StockStatus,
}

impl BalanceView {
    /// Decorates `balance` with the names of its site and fuel.
    #[must_use]
    pub fn new(balance: StockBalance, site: &Site, fuel: &FuelType) -> Self {
        Self {
            fill_percentage: balance.fill_percentage(),
            stock_status: balance.stock_status(),
            site_name: site.name.clone(),
            fuel_name: fuel.name.clone(),
            balance,
        }
    }
}

/// Outcome of a committed (or replayed) refill or usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    /// The ledger record.
    pub transaction: StockTransaction,
    /// Balance right after the commit. On replay, the balance as it is now.
    pub balance: StockBalance,
    /// Capacity or shortfall warning raised by the commit.
    pub warning: Option<StockWarning>,
    /// True when the idempotency key matched an earlier commit and nothing was applied.
    pub replayed: bool,
}

/// A key a batch could not calculate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedKey {
    /// Position that failed.
    pub key: StockKey,
    /// Error code of the failure.
    pub code: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

/// Partial-failure summary of a forecast batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// As-of date of the batch.
    pub asof: NaiveDate,
    /// Keys whose forecast was stored, in (site name, fuel name) order.
    pub succeeded: Vec<StockKey>,
    /// Keys that failed, with reasons.
    pub failed: Vec<FailedKey>,
    /// True if cancellation stopped the batch before every key ran.
    pub cancelled: bool,
}

impl BatchSummary {
    /// True if every scheduled key succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.cancelled
    }
}
