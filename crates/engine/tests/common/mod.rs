//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use fuelcast_core::ledger::{BalanceSettings, RefillInput, UsageInput};
use fuelcast_core::reference::{Equipment, FuelType, NewEquipment, NewFuelType, NewSite, Site};
use fuelcast_engine::{EngineSettings, ForecastEngine, MemoryStore, StockStore};
use fuelcast_shared::types::StockKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub struct Fixture {
    pub engine: Arc<ForecastEngine>,
    pub site: Site,
    pub fuel: FuelType,
    pub key: StockKey,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn engine_with(settings: EngineSettings) -> ForecastEngine {
    let store: Arc<dyn StockStore> = Arc::new(MemoryStore::new());
    ForecastEngine::new(store, settings)
}

pub fn settings(capacity: Decimal) -> BalanceSettings {
    BalanceSettings {
        maximum_capacity: capacity,
        minimum_threshold: dec!(0),
        reserved_quantity: dec!(0),
    }
}

pub async fn register_site(engine: &ForecastEngine, name: &str, code: &str) -> Site {
    engine
        .register_site(NewSite {
            name: name.to_string(),
            code: code.to_string(),
            site_type: "warehouse".to_string(),
            storage_capacity: dec!(500000),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn register_fuel(engine: &ForecastEngine, name: &str, code: &str) -> FuelType {
    engine
        .register_fuel_type(NewFuelType {
            name: name.to_string(),
            code: code.to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub async fn register_equipment(engine: &ForecastEngine, key: StockKey, code: &str, nominal: Decimal) -> Equipment {
    engine
        .register_equipment(NewEquipment {
            site_id: key.site_id,
            fuel_type_id: key.fuel_type_id,
            name: format!("Generator {code}"),
            code: code.to_string(),
            nominal_consumption_rate: nominal,
            equipment_type: Some("generator".to_string()),
            manufacturer: None,
            model: None,
        })
        .await
        .unwrap()
}

/// One site, one fuel, one opened balance.
pub async fn fixture_with(engine_settings: EngineSettings, capacity: Decimal) -> Fixture {
    let engine = engine_with(engine_settings);
    let site = register_site(&engine, "Site B", "SB").await;
    let fuel = register_fuel(&engine, "Diesel", "DSL").await;
    let key = StockKey::new(site.id, fuel.id);
    engine.open_balance(key, settings(capacity)).await.unwrap();
    Fixture {
        engine: Arc::new(engine),
        site,
        fuel,
        key,
    }
}

pub async fn fixture(capacity: Decimal) -> Fixture {
    fixture_with(EngineSettings::default(), capacity).await
}

pub fn refill(key: StockKey, quantity: Decimal, date: NaiveDate) -> RefillInput {
    RefillInput {
        site_id: key.site_id,
        fuel_type_id: key.fuel_type_id,
        supplier: Some("Shell".to_string()),
        quantity,
        unit_cost: None,
        date,
        actor: None,
        idempotency_key: None,
    }
}

pub fn usage(key: StockKey, quantity: Decimal, date: NaiveDate) -> UsageInput {
    UsageInput {
        site_id: key.site_id,
        fuel_type_id: key.fuel_type_id,
        equipment_id: None,
        department: None,
        quantity,
        date,
        purpose: None,
        actor: None,
        idempotency_key: None,
    }
}

/// Balance 8000 of 50000 after 36000 used over three days in January 2025.
///
/// With a 30-day window ending 2025-01-30 the usage rate is 1200 per day.
pub async fn depleting_fixture() -> Fixture {
    let f = fixture(dec!(50000)).await;
    f.engine.record_refill(refill(f.key, dec!(44000), date(2025, 1, 1))).await.unwrap();
    for day in [10, 20, 30] {
        f.engine.record_usage(usage(f.key, dec!(12000), date(2025, 1, day))).await.unwrap();
    }
    f
}
