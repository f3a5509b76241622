//! Create withdrawal table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Withdrawal::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Withdrawal::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Withdrawal::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Withdrawal::Amount).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(Withdrawal::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Withdrawal::PayoutMethod).json_binary().not_null())
                    .col(ColumnDef::new(Withdrawal::AdminNotes).text().null())
                    .col(ColumnDef::new(Withdrawal::ProcessedAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Withdrawal::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Withdrawal::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawal_creator")
                            .from(Withdrawal::Table, Withdrawal::CreatorId)
                            .to(Creator::Table, Creator::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_withdrawal_creator_id")
                    .table(Withdrawal::Table)
                    .col(Withdrawal::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_withdrawal_status")
                    .table(Withdrawal::Table)
                    .col(Withdrawal::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Withdrawal::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Withdrawal {
    Table,
    Id,
    CreatorId,
    Amount,
    Status,
    PayoutMethod,
    AdminNotes,
    ProcessedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Creator {
    Table,
    Id,
}
