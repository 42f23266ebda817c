//! `SeaORM` Entity for alert_events table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub rule_id: Uuid,
    pub site_id: Uuid,
    pub fuel_type_id: Uuid,
    pub kind: String,
    pub severity: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub metric_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub threshold: Decimal,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub trigger: String,
    #[sea_orm(indexed)]
    pub triggered_at: DateTimeUtc,
    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTimeUtc>,
    pub acknowledged_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::alert_rules::Entity",
        from = "Column::RuleId",
        to = "super::alert_rules::Column::Id"
    )]
    AlertRules,
}

impl Related<super::alert_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
