//! Shoutout type entity (catalog taxonomy, seeded reference data).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shoutout_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shoutout::Entity")]
    Shoutouts,
}

impl Related<super::shoutout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shoutouts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
