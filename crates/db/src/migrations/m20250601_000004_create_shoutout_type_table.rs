//! Create shoutout_type table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShoutoutType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShoutoutType::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShoutoutType::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ShoutoutType::Description).text())
                    .col(
                        ColumnDef::new(ShoutoutType::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shoutout_type_name")
                    .table(ShoutoutType::Table)
                    .col(ShoutoutType::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShoutoutType::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ShoutoutType {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}
