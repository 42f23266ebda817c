//! `SeaORM` Entity for alert_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub site_id: Option<Uuid>,
    pub fuel_type_id: Option<Uuid>,
    pub kind: String,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub threshold: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::alert_events::Entity")]
    AlertEvents,
}

impl Related<super::alert_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
