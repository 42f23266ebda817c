//! Site, fuel and equipment registry operations.

use chrono::Utc;
use fuelcast_core::reference::{
    Equipment, FuelType, NewEquipment, NewFuelType, NewSite, ReferenceError, Site, SiteUpdate,
};
use fuelcast_shared::types::{EquipmentId, FuelTypeId, SiteId};
use tracing::info;

use super::ForecastEngine;
use crate::error::EngineResult;

impl ForecastEngine {
    // ========== Sites ==========

    /// Registers a site.
    ///
    /// # Errors
    ///
    /// Validation on bad input, `Conflict` if the code is taken.
    pub async fn register_site(&self, input: NewSite) -> EngineResult<Site> {
        let site = input.into_site(Utc::now())?;
        self.call("insert_site", self.store.insert_site(&site)).await?;
        info!(site_id = %site.id, code = %site.code, "Site registered");
        Ok(site)
    }

    /// Applies a partial update to a site.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown site, validation on bad input.
    pub async fn update_site(&self, id: SiteId, update: SiteUpdate) -> EngineResult<Site> {
        let mut site = self.site(id).await?;
        site.apply_update(update, Utc::now())?;
        self.call("update_site", self.store.update_site(&site)).await?;
        Ok(site)
    }

    /// Soft-deactivates a site. Its history stays readable.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown site.
    pub async fn deactivate_site(&self, id: SiteId) -> EngineResult<Site> {
        let mut site = self.site(id).await?;
        if site.is_active {
            site.is_active = false;
            site.updated_at = Utc::now();
            self.call("update_site", self.store.update_site(&site)).await?;
            info!(site_id = %id, "Site deactivated");
        }
        Ok(site)
    }

    /// Looks up a site, active or not.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown site.
    pub async fn site(&self, id: SiteId) -> EngineResult<Site> {
        self.call("get_site", self.store.get_site(id))
            .await?
            .ok_or_else(|| ReferenceError::SiteNotFound(id).into())
    }

    /// Active sites ordered by name.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_sites(&self) -> EngineResult<Vec<Site>> {
        let mut sites = self.call("list_sites", self.store.list_sites()).await?;
        sites.retain(|s| s.is_active);
        sites.sort_by(|a, b| a.name.cmp(&b.name).then(a.code.cmp(&b.code)));
        Ok(sites)
    }

    // ========== Fuel types ==========

    /// Registers a fuel type.
    ///
    /// # Errors
    ///
    /// Validation on bad input, `Conflict` if the code is taken.
    pub async fn register_fuel_type(&self, input: NewFuelType) -> EngineResult<FuelType> {
        let fuel = input.into_fuel_type(Utc::now())?;
        self.call("insert_fuel_type", self.store.insert_fuel_type(&fuel)).await?;
        info!(fuel_type_id = %fuel.id, code = %fuel.code, "Fuel type registered");
        Ok(fuel)
    }

    /// Soft-deactivates a fuel type.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown fuel type.
    pub async fn deactivate_fuel_type(&self, id: FuelTypeId) -> EngineResult<FuelType> {
        let mut fuel = self.fuel_type(id).await?;
        if fuel.is_active {
            fuel.is_active = false;
            self.call("update_fuel_type", self.store.update_fuel_type(&fuel)).await?;
            info!(fuel_type_id = %id, "Fuel type deactivated");
        }
        Ok(fuel)
    }

    /// Looks up a fuel type, active or not.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown fuel type.
    pub async fn fuel_type(&self, id: FuelTypeId) -> EngineResult<FuelType> {
        self.call("get_fuel_type", self.store.get_fuel_type(id))
            .await?
            .ok_or_else(|| ReferenceError::FuelTypeNotFound(id).into())
    }

    /// Active fuel types ordered by name.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_fuel_types(&self) -> EngineResult<Vec<FuelType>> {
        let mut fuels = self.call("list_fuel_types", self.store.list_fuel_types()).await?;
        fuels.retain(|f| f.is_active);
        fuels.sort_by(|a, b| a.name.cmp(&b.name).then(a.code.cmp(&b.code)));
        Ok(fuels)
    }

    // ========== Equipment ==========

    /// Registers equipment at an active site, burning an active fuel.
    ///
    /// # Errors
    ///
    /// Validation on bad input or inactive references, `NotFound` for
    /// unknown references, `Conflict` if the code is taken.
    pub async fn register_equipment(&self, input: NewEquipment) -> EngineResult<Equipment> {
        self.site(input.site_id).await?.ensure_active()?;
        self.fuel_type(input.fuel_type_id).await?.ensure_active()?;

        let equipment = input.into_equipment(Utc::now())?;
        self.call("insert_equipment", self.store.insert_equipment(&equipment))
            .await?;
        info!(
            equipment_id = %equipment.id,
            site_id = %equipment.site_id,
            code = %equipment.code,
            "Equipment registered"
        );
        Ok(equipment)
    }

    /// Soft-deactivates equipment.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown equipment.
    pub async fn deactivate_equipment(&self, id: EquipmentId) -> EngineResult<Equipment> {
        let mut equipment = self.equipment(id).await?;
        if equipment.is_active {
            equipment.is_active = false;
            self.call("update_equipment", self.store.update_equipment(&equipment))
                .await?;
            info!(equipment_id = %id, "Equipment deactivated");
        }
        Ok(equipment)
    }

    /// Looks up equipment, active or not.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown equipment.
    pub async fn equipment(&self, id: EquipmentId) -> EngineResult<Equipment> {
        self.call("get_equipment", self.store.get_equipment(id))
            .await?
            .ok_or_else(|| ReferenceError::EquipmentNotFound(id).into())
    }

    /// Active equipment, optionally at one site, ordered by name.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn list_equipment(&self, site_id: Option<SiteId>) -> EngineResult<Vec<Equipment>> {
        let mut equipment = self
            .call("list_equipment", self.store.list_equipment(site_id))
            .await?;
        equipment.retain(|e| e.is_active);
        equipment.sort_by(|a, b| a.name.cmp(&b.name).then(a.code.cmp(&b.code)));
        Ok(equipment)
    }
}
