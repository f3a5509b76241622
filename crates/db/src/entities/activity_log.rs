//! Activity log entity: append-only audit trail.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Who performed the logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "creator")]
    Creator,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "system")]
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub actor_type: ActorType,

    #[sea_orm(nullable)]
    pub actor_id: Option<String>,

    /// Machine-readable action code (e.g. ORDER_CREATED)
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub action: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(nullable, column_type = "String(StringLen::N(45))")]
    pub ip_address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
