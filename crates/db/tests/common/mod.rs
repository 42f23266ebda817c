//! Shared setup for PostgreSQL-backed tests.
//!
//! Tests return early unless `DATABASE_URL` points at a disposable database.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use fuelcast_core::ledger::{BalanceSettings, RefillInput, UsageInput};
use fuelcast_core::reference::{NewFuelType, NewSite};
use fuelcast_db::PgStockStore;
use fuelcast_db::entities::{
    alert_events, alert_rules, consumption_forecasts, equipment, fuel_types, operational_hours, sites,
    stock_balances, stock_transactions,
};
use fuelcast_engine::{EngineSettings, ForecastEngine};
use fuelcast_shared::config::DatabaseConfig;
use fuelcast_shared::types::StockKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use tokio::sync::OnceCell;
use uuid::Uuid;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

pub struct PgFixture {
    pub engine: Arc<ForecastEngine>,
    pub store: Arc<PgStockStore>,
    pub key: StockKey,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A short code that will not collide with other test runs.
pub fn unique_code(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..10])
}

async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    // Parents before children so foreign keys resolve.
    let mut statements = vec![
        schema.create_table_from_entity(sites::Entity),
        schema.create_table_from_entity(fuel_types::Entity),
        schema.create_table_from_entity(equipment::Entity),
        schema.create_table_from_entity(stock_balances::Entity),
        schema.create_table_from_entity(stock_transactions::Entity),
        schema.create_table_from_entity(operational_hours::Entity),
        schema.create_table_from_entity(consumption_forecasts::Entity),
        schema.create_table_from_entity(alert_rules::Entity),
        schema.create_table_from_entity(alert_events::Entity),
    ];
    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }
    Ok(())
}

/// Connects and ensures the schema, or `None` when no database is configured.
pub async fn database() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
        return None;
    };
    let config = DatabaseConfig {
        url,
        max_connections: 20,
        min_connections: 1,
    };
    let db = fuelcast_db::connect(&config).await.expect("connect to DATABASE_URL");
    SCHEMA
        .get_or_try_init(|| create_tables(&db))
        .await
        .expect("create tables from entities");
    Some(db)
}

pub fn balance_settings(capacity: Decimal) -> BalanceSettings {
    BalanceSettings {
        maximum_capacity: capacity,
        minimum_threshold: dec!(0),
        reserved_quantity: dec!(0),
    }
}

/// An engine on PostgreSQL with one freshly registered site, fuel and balance.
pub async fn pg_fixture(db: DatabaseConnection, capacity: Decimal) -> PgFixture {
    let store = Arc::new(PgStockStore::new(db));
    let engine = ForecastEngine::new(store.clone(), EngineSettings::default());

    let site = engine
        .register_site(NewSite {
            name: "Site B".to_string(),
            code: unique_code("SB"),
            site_type: "warehouse".to_string(),
            storage_capacity: dec!(500000),
            ..Default::default()
        })
        .await
        .unwrap();
    let fuel = engine
        .register_fuel_type(NewFuelType {
            name: "Diesel".to_string(),
            code: unique_code("DSL"),
            ..Default::default()
        })
        .await
        .unwrap();
    let key = StockKey::new(site.id, fuel.id);
    engine.open_balance(key, balance_settings(capacity)).await.unwrap();

    PgFixture {
        engine: Arc::new(engine),
        store,
        key,
    }
}

pub fn refill(key: StockKey, quantity: Decimal, date: NaiveDate) -> RefillInput {
    RefillInput {
        site_id: key.site_id,
        fuel_type_id: key.fuel_type_id,
        supplier: Some("Shell".to_string()),
        quantity,
        unit_cost: Some(dec!(1.25)),
        date,
        actor: Some("depot".to_string()),
        idempotency_key: None,
    }
}

pub fn usage(key: StockKey, quantity: Decimal, date: NaiveDate) -> UsageInput {
    UsageInput {
        site_id: key.site_id,
        fuel_type_id: key.fuel_type_id,
        equipment_id: None,
        department: Some("Operations".to_string()),
        quantity,
        date,
        purpose: None,
        actor: None,
        idempotency_key: None,
    }
}
