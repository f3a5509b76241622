//! Create site setting table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SiteSetting::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SiteSetting::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(SiteSetting::Key).string_len(100).not_null())
                    .col(ColumnDef::new(SiteSetting::Value).text().not_null())
                    .col(
                        ColumnDef::new(SiteSetting::ValueType)
                            .string_len(16)
                            .not_null()
                            .default("string"),
                    )
                    .col(ColumnDef::new(SiteSetting::Description).text().null())
                    .col(
                        ColumnDef::new(SiteSetting::UpdatedAt)
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
                    .name("idx_site_setting_key")
                    .table(SiteSetting::Table)
                    .col(SiteSetting::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteSetting::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SiteSetting {
    Table,
    Id,
    Key,
    Value,
    ValueType,
    Description,
    UpdatedAt,
}
