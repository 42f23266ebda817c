//! Reference entities: sites, fuel types and equipment.
//!
//! Identity is immutable, descriptive fields are editable, and entities are
//! only ever soft-deactivated so that ledger history keeps resolving.

pub mod error;
pub mod types;

pub use error::ReferenceError;
pub use types::{
    Equipment, FuelType, NewEquipment, NewFuelType, NewSite, Site, SiteUpdate,
    DEFAULT_FUEL_DENSITY, DEFAULT_SAFETY_STOCK_DAYS,
};
