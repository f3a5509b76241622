//! Create order table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Order::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Order::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Order::OrderNumber).string_len(20).not_null())
                    .col(ColumnDef::new(Order::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Order::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Order::ShoutoutId).string_len(32).not_null())
                    .col(ColumnDef::new(Order::Instructions).text().not_null())
                    .col(ColumnDef::new(Order::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Order::CommissionRate).decimal_len(5, 2).not_null())
                    .col(ColumnDef::new(Order::CommissionAmount).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Order::CreatorEarnings).decimal_len(10, 2).not_null())
                    .col(
                        ColumnDef::new(Order::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Order::PaymentStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Order::PaymentId).string_len(100).null())
                    .col(ColumnDef::new(Order::DeliveryFile).string_len(512).null())
                    .col(ColumnDef::new(Order::CreatorMessage).text().null())
                    .col(ColumnDef::new(Order::UserResponse).text().null())
                    .col(ColumnDef::new(Order::AcceptedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Order::CompletedAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Order::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Order::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_user")
                            .from(Order::Table, Order::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_creator")
                            .from(Order::Table, Order::CreatorId)
                            .to(Creator::Table, Creator::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_shoutout")
                            .from(Order::Table, Order::ShoutoutId)
                            .to(Shoutout::Table, Shoutout::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_order_number")
                    .table(Order::Table)
                    .col(Order::OrderNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_user_id")
                    .table(Order::Table)
                    .col(Order::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_creator_id")
                    .table(Order::Table)
                    .col(Order::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_status")
                    .table(Order::Table)
                    .col(Order::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_order_payment_id")
                    .table(Order::Table)
                    .col(Order::PaymentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Order::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Order {
    Table,
    Id,
    OrderNumber,
    UserId,
    CreatorId,
    ShoutoutId,
    Instructions,
    Price,
    CommissionRate,
    CommissionAmount,
    CreatorEarnings,
    Status,
    PaymentStatus,
    PaymentId,
    DeliveryFile,
    CreatorMessage,
    UserResponse,
    AcceptedAt,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Creator {
    Table,
    Id,
}

#[derive(Iden)]
enum Shoutout {
    Table,
    Id,
}
