//! Shoutout entity (a creator's sellable listing).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shoutout")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub creator_id: String,

    pub shoutout_type_id: String,

    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Price in the platform's fiat currency
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,

    /// Promised delivery window in hours
    pub delivery_time: i32,

    /// Soft-delete marker; inactive listings are hidden and unorderable
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::creator::Entity",
        from = "Column::CreatorId",
        to = "super::creator::Column::Id",
        on_delete = "Cascade"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::shoutout_type::Entity",
        from = "Column::ShoutoutTypeId",
        to = "super::shoutout_type::Column::Id"
    )]
    ShoutoutType,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::creator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::shoutout_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoutoutType.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
