//! `SeaORM` Entity for fuel_types table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fuel_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Decimal(Some((8, 4)))")]
    pub density: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))", nullable)]
    pub energy_content: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))", nullable)]
    pub carbon_factor: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_balances::Entity")]
    StockBalances,
}

impl Related<super::stock_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
