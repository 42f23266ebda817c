//! `SeaORM` Entity for equipment table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub site_id: Uuid,
    pub fuel_type_id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub nominal_consumption_rate: Decimal,
    pub equipment_type: Option<String>,
    pub manufacturer: Option<String>,
    #[sea_orm(column_name = "model")]
    pub model_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
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
