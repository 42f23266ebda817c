//! Conversions between entity models and domain records.
//!
//! Writes build a fully populated `ActiveModel`; reads go through
//! `TryFrom` because enum columns are stored as text.

use std::str::FromStr;

use fuelcast_core::alerts::{AlertEvent, AlertRule, AlertScope};
use fuelcast_core::forecast::ConsumptionForecast;
use fuelcast_core::ledger::{OperationalHoursEntry, StockBalance, StockTransaction, TransactionDetails};
use fuelcast_core::reference::{Equipment, FuelType, Site};
use fuelcast_shared::types::{
    AlertEventId, AlertRuleId, EquipmentId, ForecastId, FuelTypeId, HoursEntryId, SiteId, TransactionId,
};
use sea_orm::Set;
use uuid::Uuid;

use crate::entities::{
    alert_events, alert_rules, consumption_forecasts, equipment, fuel_types, operational_hours, sites,
    stock_balances, stock_transactions,
};
use crate::error::MappingError;

fn parse<T: FromStr<Err = String>>(table: &'static str, id: Uuid, value: &str) -> Result<T, MappingError> {
    value.parse().map_err(|reason: String| MappingError::corrupt(table, id, reason))
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn non_negative(table: &'static str, id: Uuid, value: i32) -> Result<u32, MappingError> {
    u32::try_from(value).map_err(|_| MappingError::corrupt(table, id, format!("negative count {value}")))
}

// ========== Reference data ==========

impl From<&Site> for sites::ActiveModel {
    fn from(site: &Site) -> Self {
        Self {
            id: Set(site.id.into_inner()),
            name: Set(site.name.clone()),
            code: Set(site.code.clone()),
            site_type: Set(site.site_type.clone()),
            location_address: Set(site.location_address.clone()),
            contact_person: Set(site.contact_person.clone()),
            contact_phone: Set(site.contact_phone.clone()),
            contact_email: Set(site.contact_email.clone()),
            storage_capacity: Set(site.storage_capacity),
            safety_stock_days: Set(saturating_i32(site.safety_stock_days)),
            is_active: Set(site.is_active),
            created_at: Set(site.created_at),
            updated_at: Set(site.updated_at),
        }
    }
}

impl TryFrom<sites::Model> for Site {
    type Error = MappingError;

    fn try_from(model: sites::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SiteId::from_uuid(model.id),
            safety_stock_days: non_negative("sites", model.id, model.safety_stock_days)?,
            name: model.name,
            code: model.code,
            site_type: model.site_type,
            location_address: model.location_address,
            contact_person: model.contact_person,
            contact_phone: model.contact_phone,
            contact_email: model.contact_email,
            storage_capacity: model.storage_capacity,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&FuelType> for fuel_types::ActiveModel {
    fn from(fuel: &FuelType) -> Self {
        Self {
            id: Set(fuel.id.into_inner()),
            name: Set(fuel.name.clone()),
            code: Set(fuel.code.clone()),
            density: Set(fuel.density),
            energy_content: Set(fuel.energy_content),
            carbon_factor: Set(fuel.carbon_factor),
            is_active: Set(fuel.is_active),
            created_at: Set(fuel.created_at),
        }
    }
}

impl From<fuel_types::Model> for FuelType {
    fn from(model: fuel_types::Model) -> Self {
        Self {
            id: FuelTypeId::from_uuid(model.id),
            name: model.name,
            code: model.code,
            density: model.density,
            energy_content: model.energy_content,
            carbon_factor: model.carbon_factor,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl From<&Equipment> for equipment::ActiveModel {
    fn from(equipment: &Equipment) -> Self {
        Self {
            id: Set(equipment.id.into_inner()),
            site_id: Set(equipment.site_id.into_inner()),
            fuel_type_id: Set(equipment.fuel_type_id.into_inner()),
            name: Set(equipment.name.clone()),
            code: Set(equipment.code.clone()),
            nominal_consumption_rate: Set(equipment.nominal_consumption_rate),
            equipment_type: Set(equipment.equipment_type.clone()),
            manufacturer: Set(equipment.manufacturer.clone()),
            model_name: Set(equipment.model.clone()),
            is_active: Set(equipment.is_active),
            created_at: Set(equipment.created_at),
        }
    }
}

impl From<equipment::Model> for Equipment {
    fn from(model: equipment::Model) -> Self {
        Self {
            id: EquipmentId::from_uuid(model.id),
            site_id: SiteId::from_uuid(model.site_id),
            fuel_type_id: FuelTypeId::from_uuid(model.fuel_type_id),
            name: model.name,
            code: model.code,
            nominal_consumption_rate: model.nominal_consumption_rate,
            equipment_type: model.equipment_type,
            manufacturer: model.manufacturer,
            model: model.model_name,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

// ========== Ledger ==========

impl From<&StockBalance> for stock_balances::ActiveModel {
    fn from(balance: &StockBalance) -> Self {
        Self {
            site_id: Set(balance.site_id.into_inner()),
            fuel_type_id: Set(balance.fuel_type_id.into_inner()),
            ledger_total: Set(balance.ledger_total),
            current_quantity: Set(balance.current_quantity),
            available_quantity: Set(balance.available_quantity),
            minimum_threshold: Set(balance.minimum_threshold),
            maximum_capacity: Set(balance.maximum_capacity),
            reserved_quantity: Set(balance.reserved_quantity),
            version: Set(balance.version),
            last_updated: Set(balance.last_updated),
        }
    }
}

impl From<stock_balances::Model> for StockBalance {
    fn from(model: stock_balances::Model) -> Self {
        Self {
            site_id: SiteId::from_uuid(model.site_id),
            fuel_type_id: FuelTypeId::from_uuid(model.fuel_type_id),
            ledger_total: model.ledger_total,
            current_quantity: model.current_quantity,
            available_quantity: model.available_quantity,
            minimum_threshold: model.minimum_threshold,
            maximum_capacity: model.maximum_capacity,
            reserved_quantity: model.reserved_quantity,
            version: model.version,
            last_updated: model.last_updated,
        }
    }
}

impl TryFrom<&StockTransaction> for stock_transactions::ActiveModel {
    type Error = MappingError;

    fn try_from(tx: &StockTransaction) -> Result<Self, Self::Error> {
        let warning = tx.warning.as_ref().map(serde_json::to_value).transpose()?;
        Ok(Self {
            id: Set(tx.id.into_inner()),
            reference_number: Set(tx.reference_number.clone()),
            kind: Set(tx.kind.as_str().to_string()),
            site_id: Set(tx.site_id.into_inner()),
            fuel_type_id: Set(tx.fuel_type_id.into_inner()),
            equipment_id: Set(tx.equipment_id.map(EquipmentId::into_inner)),
            quantity: Set(tx.quantity),
            transaction_date: Set(tx.transaction_date),
            recorded_at: Set(tx.recorded_at),
            actor: Set(tx.actor.clone()),
            idempotency_key: Set(tx.idempotency_key.clone()),
            supplier: Set(tx.details.supplier.clone()),
            unit_cost: Set(tx.details.unit_cost),
            department: Set(tx.details.department.clone()),
            purpose: Set(tx.details.purpose.clone()),
            total_cost: Set(tx.total_cost),
            warning: Set(warning),
        })
    }
}

impl TryFrom<stock_transactions::Model> for StockTransaction {
    type Error = MappingError;

    fn try_from(model: stock_transactions::Model) -> Result<Self, Self::Error> {
        let warning = model.warning.map(serde_json::from_value).transpose()?;
        Ok(Self {
            id: TransactionId::from_uuid(model.id),
            kind: parse("stock_transactions", model.id, &model.kind)?,
            reference_number: model.reference_number,
            site_id: SiteId::from_uuid(model.site_id),
            fuel_type_id: FuelTypeId::from_uuid(model.fuel_type_id),
            equipment_id: model.equipment_id.map(EquipmentId::from_uuid),
            quantity: model.quantity,
            transaction_date: model.transaction_date,
            recorded_at: model.recorded_at,
            actor: model.actor,
            idempotency_key: model.idempotency_key,
            details: TransactionDetails {
                supplier: model.supplier,
                unit_cost: model.unit_cost,
                department: model.department,
                purpose: model.purpose,
            },
            total_cost: model.total_cost,
            warning,
        })
    }
}

impl From<&OperationalHoursEntry> for operational_hours::ActiveModel {
    fn from(entry: &OperationalHoursEntry) -> Self {
        Self {
            id: Set(entry.id.into_inner()),
            site_id: Set(entry.site_id.into_inner()),
            equipment_id: Set(entry.equipment_id.into_inner()),
            fuel_type_id: Set(entry.fuel_type_id.into_inner()),
            log_date: Set(entry.log_date),
            running_hours: Set(entry.running_hours),
            fuel_consumed: Set(entry.fuel_consumed),
            recorded_by: Set(entry.recorded_by.clone()),
            notes: Set(entry.notes.clone()),
            recorded_at: Set(entry.recorded_at),
        }
    }
}

impl From<operational_hours::Model> for OperationalHoursEntry {
    fn from(model: operational_hours::Model) -> Self {
        Self {
            id: HoursEntryId::from_uuid(model.id),
            site_id: SiteId::from_uuid(model.site_id),
            equipment_id: EquipmentId::from_uuid(model.equipment_id),
            fuel_type_id: FuelTypeId::from_uuid(model.fuel_type_id),
            log_date: model.log_date,
            running_hours: model.running_hours,
            fuel_consumed: model.fuel_consumed,
            recorded_by: model.recorded_by,
            notes: model.notes,
            recorded_at: model.recorded_at,
        }
    }
}

// ========== Forecasts ==========

impl From<&ConsumptionForecast> for consumption_forecasts::ActiveModel {
    fn from(forecast: &ConsumptionForecast) -> Self {
        Self {
            id: Set(forecast.id.into_inner()),
            site_id: Set(forecast.site_id.into_inner()),
            fuel_type_id: Set(forecast.fuel_type_id.into_inner()),
            asof_date: Set(forecast.asof_date),
            daily_rate: Set(forecast.daily_rate),
            days_remaining: Set(forecast.days_remaining),
            depletion_date: Set(forecast.depletion_date),
            reorder_date: Set(forecast.reorder_date),
            confidence_level: Set(i16::from(forecast.confidence_level)),
            current_balance: Set(forecast.current_balance),
            available_quantity: Set(forecast.available_quantity),
            safety_factor: Set(forecast.safety_factor),
            rate_source: Set(forecast.rate_source.as_str().to_string()),
            sample_days: Set(saturating_i32(forecast.sample_days)),
        }
    }
}

impl TryFrom<consumption_forecasts::Model> for ConsumptionForecast {
    type Error = MappingError;

    fn try_from(model: consumption_forecasts::Model) -> Result<Self, Self::Error> {
        const TABLE: &str = "consumption_forecasts";
        let confidence_level = u8::try_from(model.confidence_level)
            .map_err(|_| MappingError::corrupt(TABLE, model.id, "confidence out of range"))?;

        Ok(Self {
            id: ForecastId::from_uuid(model.id),
            site_id: SiteId::from_uuid(model.site_id),
            fuel_type_id: FuelTypeId::from_uuid(model.fuel_type_id),
            asof_date: model.asof_date,
            daily_rate: model.daily_rate,
            days_remaining: model.days_remaining,
            depletion_date: model.depletion_date,
            reorder_date: model.reorder_date,
            confidence_level,
            current_balance: model.current_balance,
            available_quantity: model.available_quantity,
            safety_factor: model.safety_factor,
            rate_source: parse(TABLE, model.id, &model.rate_source)?,
            sample_days: non_negative(TABLE, model.id, model.sample_days)?,
        })
    }
}

// ========== Alerts ==========

impl From<&AlertRule> for alert_rules::ActiveModel {
    fn from(rule: &AlertRule) -> Self {
        Self {
            id: Set(rule.id.into_inner()),
            name: Set(rule.name.clone()),
            site_id: Set(rule.scope.site_id.map(SiteId::into_inner)),
            fuel_type_id: Set(rule.scope.fuel_type_id.map(FuelTypeId::into_inner)),
            kind: Set(rule.kind.as_str().to_string()),
            threshold: Set(rule.threshold),
            is_active: Set(rule.is_active),
            created_at: Set(rule.created_at),
        }
    }
}

impl TryFrom<alert_rules::Model> for AlertRule {
    type Error = MappingError;

    fn try_from(model: alert_rules::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AlertRuleId::from_uuid(model.id),
            kind: parse("alert_rules", model.id, &model.kind)?,
            name: model.name,
            scope: AlertScope {
                site_id: model.site_id.map(SiteId::from_uuid),
                fuel_type_id: model.fuel_type_id.map(FuelTypeId::from_uuid),
            },
            threshold: model.threshold,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

impl From<&AlertEvent> for alert_events::ActiveModel {
    fn from(event: &AlertEvent) -> Self {
        Self {
            id: Set(event.id.into_inner()),
            rule_id: Set(event.rule_id.into_inner()),
            site_id: Set(event.site_id.into_inner()),
            fuel_type_id: Set(event.fuel_type_id.into_inner()),
            kind: Set(event.kind.as_str().to_string()),
            severity: Set(event.severity.as_str().to_string()),
            metric_value: Set(event.metric_value),
            threshold: Set(event.threshold),
            message: Set(event.message.clone()),
            trigger: Set(event.trigger.as_str().to_string()),
            triggered_at: Set(event.triggered_at),
            acknowledged: Set(event.acknowledged),
            acknowledged_at: Set(event.acknowledged_at),
            acknowledged_by: Set(event.acknowledged_by.clone()),
        }
    }
}

impl TryFrom<alert_events::Model> for AlertEvent {
    type Error = MappingError;

    fn try_from(model: alert_events::Model) -> Result<Self, Self::Error> {
        const TABLE: &str = "alert_events";
        Ok(Self {
            id: AlertEventId::from_uuid(model.id),
            rule_id: AlertRuleId::from_uuid(model.rule_id),
            site_id: SiteId::from_uuid(model.site_id),
            fuel_type_id: FuelTypeId::from_uuid(model.fuel_type_id),
            kind: parse(TABLE, model.id, &model.kind)?,
            severity: parse(TABLE, model.id, &model.severity)?,
            trigger: parse(TABLE, model.id, &model.trigger)?,
            metric_value: model.metric_value,
            threshold: model.threshold,
            message: model.message,
            triggered_at: model.triggered_at,
            acknowledged: model.acknowledged,
            acknowledged_at: model.acknowledged_at,
            acknowledged_by: model.acknowledged_by,
        })
    }
}
