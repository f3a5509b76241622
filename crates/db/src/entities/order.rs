//! Order entity: the ledger-affecting transaction between a user and a
//! creator for one shoutout.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fulfilment state, driven by creator actions and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Payment state, driven by provider callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub creator_id: String,

    pub shoutout_id: String,

    /// Human-readable reference, also the provider-facing order id
    #[sea_orm(unique, column_type = "String(StringLen::N(20))")]
    pub order_number: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub instructions: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,

    /// Creator's commission rate at creation time, not live
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub commission_rate: Decimal,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub commission_amount: Decimal,

    /// price - commission_amount, fixed for the order's lifetime
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub creator_earnings: Decimal,

    pub status: OrderStatus,

    pub payment_status: PaymentStatus,

    /// Provider-side payment id
    #[sea_orm(nullable, column_type = "String(StringLen::N(100))")]
    pub payment_id: Option<String>,

    /// Storage key of the delivered file
    #[sea_orm(nullable)]
    pub delivery_file: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub creator_message: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_response: Option<String>,

    #[sea_orm(nullable)]
    pub accepted_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(nullable)]
    pub completed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::creator::Entity",
        from = "Column::CreatorId",
        to = "super::creator::Column::Id"
    )]
    Creator,
    #[sea_orm(
        belongs_to = "super::shoutout::Entity",
        from = "Column::ShoutoutId",
        to = "super::shoutout::Column::Id"
    )]
    Shoutout,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::creator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::shoutout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shoutout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
