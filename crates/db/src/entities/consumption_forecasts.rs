//! `SeaORM` Entity for consumption_forecasts table.
//!
//! The id is derived from (site, fuel, as-of date), so a recalculation
//! overwrites its row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consumption_forecasts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub site_id: Uuid,
    pub fuel_type_id: Uuid,
    pub asof_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub daily_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub days_remaining: Option<Decimal>,
    pub depletion_date: Option<Date>,
    pub reorder_date: Option<Date>,
    pub confidence_level: i16,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub available_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((6, 4)))")]
    pub safety_factor: Decimal,
    pub rate_source: String,
    pub sample_days: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_balances::Entity",
        from = "(Column::SiteId, Column::FuelTypeId)",
        to = "(super::stock_balances::Column::SiteId, super::stock_balances::Column::FuelTypeId)"
    )]
    StockBalances,
}

impl Related<super::stock_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
