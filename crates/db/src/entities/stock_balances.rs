//! `SeaORM` Entity for stock_balances table.
//!
//! One row per (site, fuel). `version` guards every update.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub site_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub fuel_type_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ledger_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub current_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub available_quantity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub minimum_threshold: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub maximum_capacity: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub reserved_quantity: Decimal,
    pub version: i64,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sites::Entity",
        from = "Column::SiteId",
        to = "super::sites::Column::Id"
    )]
    Sites,
    #[sea_orm(
        belongs_to = "super::fuel_types::Entity",
        from = "Column::FuelTypeId",
        to = "super::fuel_types::Column::Id"
    )]
    FuelTypes,
}

impl Related<super::sites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sites.def()
    }
}

impl Related<super::fuel_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FuelTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
