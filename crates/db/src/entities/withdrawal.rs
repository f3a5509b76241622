//! Withdrawal entity (creator payout request).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Withdrawal lifecycle: pending until an admin decides, then terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum WithdrawalStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub creator_id: String,

    /// Amount debited from available_balance at request time
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,

    pub status: WithdrawalStatus,

    /// Payout details snapshotted at request time
    #[sea_orm(column_type = "JsonBinary")]
    pub payout_method: Json,

    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    #[sea_orm(nullable)]
    pub processed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::creator::Entity",
        from = "Column::CreatorId",
        to = "super::creator::Column::Id"
    )]
    Creator,
}

impl Related<super::creator::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
