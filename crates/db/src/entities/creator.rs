//! Creator entity (seller account with earnings ledger).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "creator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub first_name: String,

    pub last_name: String,

    /// Public handle, unique across creators
    #[sea_orm(unique)]
    pub display_name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 password hash
    pub password: String,

    pub date_of_birth: Date,

    pub country: String,

    #[sea_orm(nullable)]
    pub avatar: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    /// Sponsored creators sort first in the public catalog
    #[sea_orm(default_value = false)]
    pub is_sponsored: bool,

    /// Platform cut in percent, snapshotted onto each order at creation
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub commission_rate: Decimal,

    #[sea_orm(default_value = true)]
    pub withdrawal_permission: bool,

    /// Lifetime credited revenue; only ever increases
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_earnings: Decimal,

    /// Withdrawable funds; debited by withdrawal requests
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub available_balance: Decimal,

    /// Bank payout details: `{type, bank_name, account_number,
    /// routing_number?, account_holder_name}`
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub payout_method: Option<Json>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shoutout::Entity")]
    Shoutouts,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
    #[sea_orm(has_many = "super::withdrawal::Entity")]
    Withdrawals,
}

impl Related<super::shoutout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shoutouts.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::withdrawal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
