//! Stock balance aggregate.
//!
//! The balance is a fold over the ledger: it keeps the raw running sum of
//! every signed quantity ever applied (`ledger_total`) and derives
//! `current_quantity = clamp(ledger_total, 0, maximum_capacity)`.
//! Overflow and shortfall therefore stay visible in `ledger_total` instead
//! of being discarded by the clamp.

use chrono::{DateTime, Utc};
use fuelcast_shared::config::OverdraftPolicy;
use fuelcast_shared::types::{FuelTypeId, MAX_RECORD_QUANTITY, SiteId, StockKey, percent_of};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Fill percentage below which stock is Critical.
const CRITICAL_FILL_PERCENT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Fill percentage below which stock is Low.
const LOW_FILL_PERCENT: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Operator-configured limits of one tank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSettings {
    /// Tank capacity in litres.
    pub maximum_capacity: Decimal,
    /// Re-order threshold in litres.
    pub minimum_threshold: Decimal,
    /// Unpumpable heel that never counts as available.
    pub reserved_quantity: Decimal,
}

impl BalanceSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` when capacity is not positive or a threshold
    /// lies outside `[0, maximum_capacity]`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.maximum_capacity <= Decimal::ZERO {
            return Err(LedgerError::InvalidSettings("maximum capacity must be positive"));
        }
        if self.maximum_capacity > MAX_RECORD_QUANTITY {
            return Err(LedgerError::InvalidSettings("maximum capacity exceeds the per-record limit"));
        }
        if self.minimum_threshold.is_sign_negative() || self.minimum_threshold > self.maximum_capacity {
            return Err(LedgerError::InvalidSettings(
                "minimum threshold must lie between 0 and capacity",
            ));
        }
        if self.reserved_quantity.is_sign_negative() || self.reserved_quantity > self.maximum_capacity {
            return Err(LedgerError::InvalidSettings(
                "reserved quantity must lie between 0 and capacity",
            ));
        }
        Ok(())
    }
}

/// Qualitative stock level shown on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    /// At or under the minimum threshold, or under 20 % full.
    Critical,
    /// Under 40 % full.
    Low,
    /// Anything else.
    Normal,
}

/// Non-fatal condition recorded alongside a successful transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StockWarning {
    /// A refill pushed the raw ledger total above tank capacity.
    CapacityExceeded {
        /// Quantity the refill delivered.
        requested: Decimal,
        /// Ledger total after the refill.
        raw_total: Decimal,
        /// Tank capacity.
        capacity: Decimal,
        /// `raw_total - capacity`.
        excess: Decimal,
    },
    /// A usage exceeded the available quantity and was clamped.
    Shortfall {
        /// Quantity the usage drew.
        requested: Decimal,
        /// Quantity that was available.
        available: Decimal,
        /// `requested - available`.
        shortfall: Decimal,
    },
}

impl StockWarning {
    /// Returns the warning code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::Shortfall { .. } => "OVERDRAFT_SHORTFALL",
        }
    }
}

/// Current stock position for one (site, fuel) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBalance {
    /// Site holding the stock.
    pub site_id: SiteId,
    /// Fuel held.
    pub fuel_type_id: FuelTypeId,
    /// Raw running sum of every applied signed quantity.
    pub ledger_total: Decimal,
    /// `clamp(ledger_total, 0, maximum_capacity)`.
    pub current_quantity: Decimal,
    /// `clamp(current_quantity - reserved_quantity, 0, current_quantity)`.
    pub available_quantity: Decimal,
    /// Re-order threshold.
    pub minimum_threshold: Decimal,
    /// Tank capacity.
    pub maximum_capacity: Decimal,
    /// Unpumpable heel.
    pub reserved_quantity: Decimal,
    /// Incremented on every commit; used for optimistic concurrency.
    pub version: i64,
    /// Last commit time.
    pub last_updated: DateTime<Utc>,
}

/// Result of applying a delta: the next balance plus any warning raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceChange {
    /// Balance after the delta.
    pub balance: StockBalance,
    /// Capacity or shortfall warning.
    pub warning: Option<StockWarning>,
}

impl StockBalance {
    /// Opens an empty balance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` if the settings do not validate.
    pub fn open(key: StockKey, settings: BalanceSettings, now: DateTime<Utc>) -> Result<Self, LedgerError> {
        settings.validate()?;
        Ok(Self::derive(key, settings, Decimal::ZERO, 0, now))
    }

    /// Rebuilds a balance by folding a sequence of signed ledger quantities.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` if the settings do not validate and
    /// `Overflow` if the running total leaves the `Decimal` range.
    pub fn replay<I>(
        key: StockKey,
        settings: BalanceSettings,
        signed_quantities: I,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        settings.validate()?;
        let mut total = Decimal::ZERO;
        let mut version = 0;
        for quantity in signed_quantities {
            total = total.checked_add(quantity).ok_or(LedgerError::Overflow(key))?;
            version += 1;
        }
        Ok(Self::derive(key, settings, total, version, now))
    }

    fn derive(
        key: StockKey,
        settings: BalanceSettings,
        ledger_total: Decimal,
        version: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let current = ledger_total.clamp(Decimal::ZERO, settings.maximum_capacity);
        let available = (current - settings.reserved_quantity).clamp(Decimal::ZERO, current);
        Self {
            site_id: key.site_id,
            fuel_type_id: key.fuel_type_id,
            ledger_total,
            current_quantity: current,
            available_quantity: available,
            minimum_threshold: settings.minimum_threshold,
            maximum_capacity: settings.maximum_capacity,
            reserved_quantity: settings.reserved_quantity,
            version,
            last_updated: now,
        }
    }

    /// The (site, fuel) key of this balance.
    #[must_use]
    pub const fn key(&self) -> StockKey {
        StockKey::new(self.site_id, self.fuel_type_id)
    }

    /// The limits this balance was opened with.
    #[must_use]
    pub const fn settings(&self) -> BalanceSettings {
        BalanceSettings {
            maximum_capacity: self.maximum_capacity,
            minimum_threshold: self.minimum_threshold,
            reserved_quantity: self.reserved_quantity,
        }
    }

    /// Current quantity as a percentage of capacity, two decimals.
    #[must_use]
    pub fn fill_percentage(&self) -> Decimal {
        percent_of(self.current_quantity, self.maximum_capacity)
    }

    /// Dashboard status derived from fill level and minimum threshold.
    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        let fill = self.fill_percentage();
        if self.current_quantity <= self.minimum_threshold || fill < CRITICAL_FILL_PERCENT {
            StockStatus::Critical
        } else if fill < LOW_FILL_PERCENT {
            StockStatus::Low
        } else {
            StockStatus::Normal
        }
    }

    /// Applies one signed ledger quantity and returns the next balance.
    ///
    /// Refills that push the raw total above capacity clamp and raise
    /// `CapacityExceeded`. Usage above `available_quantity` is rejected with
    /// `Overdraft` under [`OverdraftPolicy::Reject`], or clamped at zero with
    /// a `Shortfall` warning under [`OverdraftPolicy::Clamp`].
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveQuantity` for a zero delta, `Overdraft` when the
    /// reject policy refuses a usage and `Overflow` when the raw total would
    /// leave the `Decimal` range.
    pub fn apply_delta(
        &self,
        signed_quantity: Decimal,
        policy: OverdraftPolicy,
        now: DateTime<Utc>,
    ) -> Result<BalanceChange, LedgerError> {
        if signed_quantity.is_zero() {
            return Err(LedgerError::NonPositiveQuantity(signed_quantity));
        }

        let raw_total = self
            .ledger_total
            .checked_add(signed_quantity)
            .ok_or_else(|| LedgerError::Overflow(self.key()))?;
        let warning = if signed_quantity.is_sign_negative() {
            let requested = -signed_quantity;
            if requested > self.available_quantity {
                match policy {
                    OverdraftPolicy::Reject => {
                        return Err(LedgerError::Overdraft {
                            requested,
                            available: self.available_quantity,
                        });
                    }
                    OverdraftPolicy::Clamp => Some(StockWarning::Shortfall {
                        requested,
                        available: self.available_quantity,
                        shortfall: requested - self.available_quantity,
                    }),
                }
            } else {
                None
            }
        } else if raw_total > self.maximum_capacity {
            Some(StockWarning::CapacityExceeded {
                requested: signed_quantity,
                raw_total,
                capacity: self.maximum_capacity,
                excess: raw_total - self.maximum_capacity,
            })
        } else {
            None
        };

        Ok(BalanceChange {
            balance: Self::derive(self.key(), self.settings(), raw_total, self.version + 1, now),
            warning,
        })
    }

    /// Returns a copy with new limits, re-deriving quantities from the ledger total.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` if the settings do not validate.
    pub fn with_settings(&self, settings: BalanceSettings, now: DateTime<Utc>) -> Result<Self, LedgerError> {
        settings.validate()?;
        Ok(Self::derive(self.key(), settings, self.ledger_total, self.version + 1, now))
    }
}
