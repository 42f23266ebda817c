//! Reference entity types and their registration inputs.

use chrono::{DateTime, Utc};
use fuelcast_shared::types::{EquipmentId, FuelTypeId, MAX_RECORD_QUANTITY, SiteId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReferenceError;

/// Safety-stock days applied when a site does not specify its own.
pub const DEFAULT_SAFETY_STOCK_DAYS: u32 = 7;

/// Density (kg/L) applied when a fuel type does not specify its own.
pub const DEFAULT_FUEL_DENSITY: Decimal = Decimal::from_parts(850, 0, 0, false, 3);

/// A location that stores fuel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// Site ID.
    pub id: SiteId,
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Free-form classification (warehouse, construction, mining, ...).
    pub site_type: String,
    /// Street address.
    pub location_address: Option<String>,
    /// Contact person.
    pub contact_person: Option<String>,
    /// Contact phone.
    pub contact_phone: Option<String>,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Total tank capacity across fuels, in litres.
    pub storage_capacity: Decimal,
    /// Days of stock to keep in hand when planning the next refill.
    pub safety_stock_days: u32,
    /// Whether the site accepts new activity.
    pub is_active: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last descriptive update.
    pub updated_at: DateTime<Utc>,
}

/// A fuel product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelType {
    /// Fuel type ID.
    pub id: FuelTypeId,
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Density in kg/L.
    pub density: Decimal,
    /// Energy content in MJ/L, if known.
    pub energy_content: Option<Decimal>,
    /// Emission factor in kg CO2/L, if known.
    pub carbon_factor: Option<Decimal>,
    /// Whether the fuel accepts new activity.
    pub is_active: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// A fuel-consuming machine installed at a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Equipment ID.
    pub id: EquipmentId,
    /// Site where the equipment runs.
    pub site_id: SiteId,
    /// Fuel the equipment burns.
    pub fuel_type_id: FuelTypeId,
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Nameplate consumption in litres per running hour.
    pub nominal_consumption_rate: Decimal,
    /// Free-form classification (generator, excavator, ...).
    pub equipment_type: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Whether the equipment accepts new activity.
    pub is_active: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Input for registering a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSite {
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Classification.
    pub site_type: String,
    /// Street address.
    pub location_address: Option<String>,
    /// Contact person.
    pub contact_person: Option<String>,
    /// Contact phone.
    pub contact_phone: Option<String>,
    /// Contact email.
    pub contact_email: Option<String>,
    /// Total tank capacity in litres.
    pub storage_capacity: Decimal,
    /// Safety-stock days; defaults to [`DEFAULT_SAFETY_STOCK_DAYS`].
    pub safety_stock_days: Option<u32>,
}

impl NewSite {
    /// Validates the input and builds the site record.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is blank or capacity is negative.
    pub fn into_site(self, now: DateTime<Utc>) -> Result<Site, ReferenceError> {
        let name = required(self.name, "site name")?;
        let code = required(self.code, "site code")?;
        let site_type = required(self.site_type, "site type")?;
        check_range(self.storage_capacity, "storage_capacity")?;

        Ok(Site {
            id: SiteId::new(),
            name,
            code,
            site_type,
            location_address: self.location_address,
            contact_person: self.contact_person,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            storage_capacity: self.storage_capacity,
            safety_stock_days: self.safety_stock_days.unwrap_or(DEFAULT_SAFETY_STOCK_DAYS),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Editable descriptive fields of a site. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New classification.
    pub site_type: Option<String>,
    /// New address.
    pub location_address: Option<String>,
    /// New contact person.
    pub contact_person: Option<String>,
    /// New contact phone.
    pub contact_phone: Option<String>,
    /// New contact email.
    pub contact_email: Option<String>,
    /// New total capacity.
    pub storage_capacity: Option<Decimal>,
    /// New safety-stock days.
    pub safety_stock_days: Option<u32>,
}

impl Site {
    /// Applies descriptive changes. Identity and code never change.
    ///
    /// # Errors
    ///
    /// Returns an error if a supplied value is blank or out of range.
    pub fn apply_update(&mut self, update: SiteUpdate, now: DateTime<Utc>) -> Result<(), ReferenceError> {
        if let Some(name) = update.name {
            self.name = required(name, "site name")?;
        }
        if let Some(site_type) = update.site_type {
            self.site_type = required(site_type, "site type")?;
        }
        if let Some(capacity) = update.storage_capacity {
            check_range(capacity, "storage_capacity")?;
            self.storage_capacity = capacity;
        }
        if update.location_address.is_some() {
            self.location_address = update.location_address;
        }
        if update.contact_person.is_some() {
            self.contact_person = update.contact_person;
        }
        if update.contact_phone.is_some() {
            self.contact_phone = update.contact_phone;
        }
        if update.contact_email.is_some() {
            self.contact_email = update.contact_email;
        }
        if let Some(days) = update.safety_stock_days {
            self.safety_stock_days = days;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Checks that the site can accept new activity.
    ///
    /// # Errors
    ///
    /// Returns `SiteInactive` for a deactivated site.
    pub fn ensure_active(&self) -> Result<(), ReferenceError> {
        if self.is_active {
            Ok(())
        } else {
            Err(ReferenceError::SiteInactive(self.id))
        }
    }
}

/// Input for registering a fuel type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFuelType {
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Density in kg/L; defaults to [`DEFAULT_FUEL_DENSITY`].
    pub density: Option<Decimal>,
    /// Energy content in MJ/L.
    pub energy_content: Option<Decimal>,
    /// Emission factor in kg CO2/L.
    pub carbon_factor: Option<Decimal>,
}

impl NewFuelType {
    /// Validates the input and builds the fuel type record.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is blank or density is not positive.
    pub fn into_fuel_type(self, now: DateTime<Utc>) -> Result<FuelType, ReferenceError> {
        let name = required(self.name, "fuel name")?;
        let code = required(self.code, "fuel code")?;
        let density = self.density.unwrap_or(DEFAULT_FUEL_DENSITY);
        if density <= Decimal::ZERO {
            return Err(ReferenceError::OutOfRange {
                field: "density",
                reason: "must be positive",
            });
        }

        Ok(FuelType {
            id: FuelTypeId::new(),
            name,
            code,
            density,
            energy_content: self.energy_content,
            carbon_factor: self.carbon_factor,
            is_active: true,
            created_at: now,
        })
    }
}

impl FuelType {
    /// Checks that the fuel type can accept new activity.
    ///
    /// # Errors
    ///
    /// Returns `FuelTypeInactive` for a deactivated fuel type.
    pub fn ensure_active(&self) -> Result<(), ReferenceError> {
        if self.is_active {
            Ok(())
        } else {
            Err(ReferenceError::FuelTypeInactive(self.id))
        }
    }
}

/// Input for registering equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEquipment {
    /// Site where the equipment runs.
    pub site_id: SiteId,
    /// Fuel the equipment burns.
    pub fuel_type_id: FuelTypeId,
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Nameplate consumption in litres per running hour.
    pub nominal_consumption_rate: Decimal,
    /// Classification.
    pub equipment_type: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Model.
    pub model: Option<String>,
}

impl NewEquipment {
    /// Validates the input and builds the equipment record.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is blank or the rate is negative.
    pub fn into_equipment(self, now: DateTime<Utc>) -> Result<Equipment, ReferenceError> {
        let name = required(self.name, "equipment name")?;
        let code = required(self.code, "equipment code")?;
        check_range(self.nominal_consumption_rate, "nominal_consumption_rate")?;

        Ok(Equipment {
            id: EquipmentId::new(),
            site_id: self.site_id,
            fuel_type_id: self.fuel_type_id,
            name,
            code,
            nominal_consumption_rate: self.nominal_consumption_rate,
            equipment_type: self.equipment_type,
            manufacturer: self.manufacturer,
            model: self.model,
            is_active: true,
            created_at: now,
        })
    }
}

impl Equipment {
    /// Checks that the equipment is active and installed at `site_id`.
    ///
    /// # Errors
    ///
    /// Returns `EquipmentInactive` or `EquipmentSiteMismatch`.
    pub fn ensure_usable_at(&self, site_id: SiteId) -> Result<(), ReferenceError> {
        if !self.is_active {
            return Err(ReferenceError::EquipmentInactive(self.id));
        }
        if self.site_id != site_id {
            return Err(ReferenceError::EquipmentSiteMismatch {
                equipment_id: self.id,
                site_id,
            });
        }
        Ok(())
    }
}

fn check_range(value: Decimal, field: &'static str) -> Result<(), ReferenceError> {
    if value.is_sign_negative() {
        return Err(ReferenceError::OutOfRange {
            field,
            reason: "must not be negative",
        });
    }
    if value > MAX_RECORD_QUANTITY {
        return Err(ReferenceError::OutOfRange {
            field,
            reason: "exceeds the per-record limit",
        });
    }
    Ok(())
}

fn required(value: String, field: &'static str) -> Result<String, ReferenceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ReferenceError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
