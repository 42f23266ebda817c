//! Operational hours log entries.

use chrono::{DateTime, NaiveDate, Utc};
use fuelcast_shared::types::{EquipmentId, FuelTypeId, HoursEntryId, SiteId, StockKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::DEFAULT_ACTOR;
use crate::reference::Equipment;

/// One day of running time for one machine. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationalHoursEntry {
    /// Entry ID.
    pub id: HoursEntryId,
    /// Site where the equipment ran.
    pub site_id: SiteId,
    /// Equipment that ran.
    pub equipment_id: EquipmentId,
    /// Fuel the equipment burns, copied at logging time.
    pub fuel_type_id: FuelTypeId,
    /// Day being logged.
    pub log_date: NaiveDate,
    /// Hours run on that day.
    pub running_hours: Decimal,
    /// Metered litres burned, if the operator recorded them.
    pub fuel_consumed: Option<Decimal>,
    /// Who logged it.
    pub recorded_by: String,
    /// Free-form remarks.
    pub notes: Option<String>,
    /// Commit time.
    pub recorded_at: DateTime<Utc>,
}

impl OperationalHoursEntry {
    /// The (site, fuel) key the entry feeds.
    #[must_use]
    pub const fn key(&self) -> StockKey {
        StockKey::new(self.site_id, self.fuel_type_id)
    }

    /// Metered consumption, or `running_hours × nominal_rate` when none was logged.
    #[must_use]
    pub fn consumed_or_estimated(&self, nominal_rate: Decimal) -> Decimal {
        self.fuel_consumed
            .unwrap_or_else(|| self.running_hours * nominal_rate)
    }
}

/// Caller input for logging operational hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHoursEntry {
    /// Site where the equipment ran.
    pub site_id: SiteId,
    /// Equipment that ran.
    pub equipment_id: EquipmentId,
    /// Day being logged.
    pub log_date: NaiveDate,
    /// Hours run, 0 to 24.
    pub running_hours: Decimal,
    /// Metered litres burned.
    pub fuel_consumed: Option<Decimal>,
    /// Who logged it; defaults to [`DEFAULT_ACTOR`].
    pub recorded_by: Option<String>,
    /// Free-form remarks.
    pub notes: Option<String>,
}

impl NewHoursEntry {
    /// Builds the entry, taking the fuel from the equipment record.
    #[must_use]
    pub fn into_entry(self, equipment: &Equipment, now: DateTime<Utc>) -> OperationalHoursEntry {
        let recorded_by = self
            .recorded_by
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

        OperationalHoursEntry {
            id: HoursEntryId::new(),
            site_id: self.site_id,
            equipment_id: self.equipment_id,
            fuel_type_id: equipment.fuel_type_id,
            log_date: self.log_date,
            running_hours: self.running_hours,
            fuel_consumed: self.fuel_consumed,
            recorded_by,
            notes: self.notes,
            recorded_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::NewEquipment;
    use rust_decimal_macros::dec;

    fn equipment() -> Equipment {
        NewEquipment {
            site_id: SiteId::new(),
            fuel_type_id: FuelTypeId::new(),
            name: "Generator 1".to_string(),
            code: "GEN-1".to_string(),
            nominal_consumption_rate: dec!(25),
            equipment_type: None,
            manufacturer: None,
            model: None,
        }
        .into_equipment(Utc::now())
        .unwrap()
    }

    #[test]
    fn test_entry_takes_fuel_from_equipment() {
        let equipment = equipment();
        let entry = NewHoursEntry {
            site_id: equipment.site_id,
            equipment_id: equipment.id,
            log_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            running_hours: dec!(8),
            fuel_consumed: None,
            recorded_by: None,
            notes: None,
        }
        .into_entry(&equipment, Utc::now());

        assert_eq!(entry.fuel_type_id, equipment.fuel_type_id);
        assert_eq!(entry.recorded_by, DEFAULT_ACTOR);
        assert_eq!(entry.key(), StockKey::new(equipment.site_id, equipment.fuel_type_id));
    }

    #[test]
    fn test_consumed_or_estimated() {
        let equipment = equipment();
        let mut entry = NewHoursEntry {
            site_id: equipment.site_id,
            equipment_id: equipment.id,
            log_date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            running_hours: dec!(6.5),
            fuel_consumed: None,
            recorded_by: Some("operator".to_string()),
            notes: None,
        }
        .into_entry(&equipment, Utc::now());

        assert_eq!(entry.consumed_or_estimated(dec!(25)), dec!(162.5));

        entry.fuel_consumed = Some(dec!(150));
        assert_eq!(entry.consumed_or_estimated(dec!(25)), dec!(150));
    }
}
