//! Create shoutout table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shoutout::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shoutout::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Shoutout::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Shoutout::ShoutoutTypeId).string_len(32).not_null())
                    .col(ColumnDef::new(Shoutout::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Shoutout::Description).text().not_null())
                    .col(ColumnDef::new(Shoutout::Price).decimal_len(10, 2).not_null())
                    .col(ColumnDef::new(Shoutout::DeliveryTime).integer().not_null())
                    .col(ColumnDef::new(Shoutout::IsActive).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Shoutout::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Shoutout::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shoutout_creator")
                            .from(Shoutout::Table, Shoutout::CreatorId)
                            .to(Creator::Table, Creator::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shoutout_type")
                            .from(Shoutout::Table, Shoutout::ShoutoutTypeId)
                            .to(ShoutoutType::Table, ShoutoutType::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shoutout_creator_id")
                    .table(Shoutout::Table)
                    .col(Shoutout::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shoutout_is_active")
                    .table(Shoutout::Table)
                    .col(Shoutout::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shoutout::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shoutout {
    Table,
    Id,
    CreatorId,
    ShoutoutTypeId,
    Title,
    Description,
    Price,
    DeliveryTime,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Creator {
    Table,
    Id,
}

#[derive(Iden)]
enum ShoutoutType {
    Table,
    Id,
}
