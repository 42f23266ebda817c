//! Ledger domain types for stock transactions.
//!
//! A transaction is a signed quantity delta against one (site, fuel) pair.
//! Once committed it is never edited; corrections are new transactions.

use chrono::{DateTime, NaiveDate, Utc};
use fuelcast_shared::types::{EquipmentId, FuelTypeId, SiteId, StockKey, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::balance::StockWarning;

/// Actor recorded when the caller does not name one.
pub const DEFAULT_ACTOR: &str = "system";

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Fuel delivered into storage.
    Refill,
    /// Fuel drawn from storage.
    Usage,
}

impl TransactionKind {
    /// Applies the direction to a positive magnitude.
    #[must_use]
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            Self::Refill => quantity,
            Self::Usage => -quantity,
        }
    }

    /// Prefix of the human-readable reference number.
    #[must_use]
    pub const fn reference_prefix(self) -> &'static str {
        match self {
            Self::Refill => "REF",
            Self::Usage => "USE",
        }
    }

    /// Returns the storage string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Refill => "refill",
            Self::Usage => "usage",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "refill" => Ok(Self::Refill),
            "usage" => Ok(Self::Usage),
            _ => Err(format!("Unknown transaction kind: {s}")),
        }
    }
}

/// Kind-specific descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Supplier that delivered a refill.
    pub supplier: Option<String>,
    /// Cost per litre of a refill.
    pub unit_cost: Option<Decimal>,
    /// Department drawing a usage.
    pub department: Option<String>,
    /// Stated purpose of a usage.
    pub purpose: Option<String>,
}

/// A committed, immutable ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Human-readable reference, e.g. `REF-20250103-3FA9C1`.
    pub reference_number: String,
    /// Refill or usage.
    pub kind: TransactionKind,
    /// Site affected.
    pub site_id: SiteId,
    /// Fuel affected.
    pub fuel_type_id: FuelTypeId,
    /// Equipment that drew a usage.
    pub equipment_id: Option<EquipmentId>,
    /// Positive magnitude of the movement.
    pub quantity: Decimal,
    /// Business date of the movement.
    pub transaction_date: NaiveDate,
    /// Commit time.
    pub recorded_at: DateTime<Utc>,
    /// Who recorded it.
    pub actor: String,
    /// Caller-supplied retry token.
    pub idempotency_key: Option<String>,
    /// Kind-specific details.
    pub details: TransactionDetails,
    /// `unit_cost × quantity` for refills with a cost.
    pub total_cost: Option<Decimal>,
    /// Capacity or shortfall warning raised when this was applied.
    pub warning: Option<StockWarning>,
}

impl StockTransaction {
    /// The signed delta this transaction contributes to the ledger total.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        self.kind.signed(self.quantity)
    }

    /// The (site, fuel) key this transaction belongs to.
    #[must_use]
    pub const fn key(&self) -> StockKey {
        StockKey::new(self.site_id, self.fuel_type_id)
    }
}

/// Validated input for appending a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Refill or usage.
    pub kind: TransactionKind,
    /// Site affected.
    pub site_id: SiteId,
    /// Fuel affected.
    pub fuel_type_id: FuelTypeId,
    /// Equipment that drew a usage.
    pub equipment_id: Option<EquipmentId>,
    /// Positive magnitude.
    pub quantity: Decimal,
    /// Business date.
    pub transaction_date: NaiveDate,
    /// Who records it.
    pub actor: String,
    /// Caller-supplied retry token.
    pub idempotency_key: Option<String>,
    /// Kind-specific details.
    pub details: TransactionDetails,
}

impl NewTransaction {
    /// The (site, fuel) key this transaction targets.
    #[must_use]
    pub const fn key(&self) -> StockKey {
        StockKey::new(self.site_id, self.fuel_type_id)
    }

    /// The signed delta this transaction will contribute.
    #[must_use]
    pub fn signed_quantity(&self) -> Decimal {
        self.kind.signed(self.quantity)
    }

    /// Stamps an ID, reference number and commit time onto the input.
    #[must_use]
    pub fn into_transaction(
        self,
        recorded_at: DateTime<Utc>,
        warning: Option<StockWarning>,
    ) -> StockTransaction {
        let id = TransactionId::new();
        let total_cost = match (self.kind, self.details.unit_cost) {
            (TransactionKind::Refill, Some(unit_cost)) => Some(unit_cost * self.quantity),
            _ => None,
        };

        StockTransaction {
            id,
            reference_number: reference_number(self.kind, self.transaction_date, id),
            kind: self.kind,
            site_id: self.site_id,
            fuel_type_id: self.fuel_type_id,
            equipment_id: self.equipment_id,
            quantity: self.quantity,
            transaction_date: self.transaction_date,
            recorded_at,
            actor: self.actor,
            idempotency_key: self.idempotency_key,
            details: self.details,
            total_cost,
            warning,
        }
    }
}

/// Caller input for a refill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefillInput {
    /// Site receiving fuel.
    pub site_id: SiteId,
    /// Fuel delivered.
    pub fuel_type_id: FuelTypeId,
    /// Supplier name.
    pub supplier: Option<String>,
    /// Litres delivered.
    pub quantity: Decimal,
    /// Cost per litre.
    pub unit_cost: Option<Decimal>,
    /// Delivery date.
    pub date: NaiveDate,
    /// Who records it; defaults to [`DEFAULT_ACTOR`].
    pub actor: Option<String>,
    /// Retry token.
    pub idempotency_key: Option<String>,
}

impl From<RefillInput> for NewTransaction {
    fn from(input: RefillInput) -> Self {
        Self {
            kind: TransactionKind::Refill,
            site_id: input.site_id,
            fuel_type_id: input.fuel_type_id,
            equipment_id: None,
            quantity: input.quantity,
            transaction_date: input.date,
            actor: actor_or_default(input.actor),
            idempotency_key: input.idempotency_key,
            details: TransactionDetails {
                supplier: input.supplier,
                unit_cost: input.unit_cost,
                ..Default::default()
            },
        }
    }
}

/// Caller input for a usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageInput {
    /// Site drawing fuel.
    pub site_id: SiteId,
    /// Fuel drawn.
    pub fuel_type_id: FuelTypeId,
    /// Equipment fuelled.
    pub equipment_id: Option<EquipmentId>,
    /// Department charged.
    pub department: Option<String>,
    /// Litres drawn.
    pub quantity: Decimal,
    /// Usage date.
    pub date: NaiveDate,
    /// Stated purpose.
    pub purpose: Option<String>,
    /// Who records it; defaults to [`DEFAULT_ACTOR`].
    pub actor: Option<String>,
    /// Retry token.
    pub idempotency_key: Option<String>,
}

impl From<UsageInput> for NewTransaction {
    fn from(input: UsageInput) -> Self {
        Self {
            kind: TransactionKind::Usage,
            site_id: input.site_id,
            fuel_type_id: input.fuel_type_id,
            equipment_id: input.equipment_id,
            quantity: input.quantity,
            transaction_date: input.date,
            actor: actor_or_default(input.actor),
            idempotency_key: input.idempotency_key,
            details: TransactionDetails {
                department: input.department,
                purpose: input.purpose,
                ..Default::default()
            },
        }
    }
}

fn actor_or_default(actor: Option<String>) -> String {
    actor
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string())
}

fn reference_number(kind: TransactionKind, date: NaiveDate, id: TransactionId) -> String {
    let simple = id.into_inner().simple().to_string().to_uppercase();
    let suffix = &simple[simple.len() - 6..];
    format!("{}-{}-{suffix}", kind.reference_prefix(), date.format("%Y%m%d"))
}
