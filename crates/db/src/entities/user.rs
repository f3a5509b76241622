//! User entity (purchaser account).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    /// Public handle, unique across users
    #[sea_orm(unique)]
    pub display_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash
    pub password: String,

    pub date_of_birth: Date,

    pub country: String,

    /// Storage key of the avatar object
    #[sea_orm(nullable)]
    pub avatar: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
