//! `SeaORM` Entity for stock_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub reference_number: String,
    pub kind: String,
    #[sea_orm(indexed)]
    pub site_id: Uuid,
    pub fuel_type_id: Uuid,
    pub equipment_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    pub transaction_date: Date,
    pub recorded_at: DateTimeUtc,
    pub actor: String,
    pub idempotency_key: Option<String>,
    pub supplier: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub unit_cost: Option<Decimal>,
    pub department: Option<String>,
    pub purpose: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub total_cost: Option<Decimal>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub warning: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stock_balances::Entity",
        from = "(Column::SiteId, Column::FuelTypeId)",
        to = "(super::stock_balances::Column::SiteId, super::stock_balances::Column::FuelTypeId)"
    )]
    StockBalances,
    #[sea_orm(
        belongs_to = "super::equipment::Entity",
        from = "Column::EquipmentId",
        to = "super::equipment::Column::Id"
    )]
    Equipment,
}

impl Related<super::stock_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBalances.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Equipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
