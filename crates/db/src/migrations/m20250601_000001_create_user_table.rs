//! Create user table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(User::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(User::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(User::DisplayName).string_len(50).not_null())
                    .col(ColumnDef::new(User::Email).string_len(255).not_null())
                    .col(ColumnDef::new(User::Password).string_len(255).not_null())
                    .col(ColumnDef::new(User::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(User::Country).string_len(100).not_null())
                    .col(ColumnDef::new(User::Avatar).string_len(512))
                    .col(ColumnDef::new(User::IsVerified).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
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
                    .name("idx_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_display_name")
                    .table(User::Table)
                    .col(User::DisplayName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    FirstName,
    LastName,
    DisplayName,
    Email,
    Password,
    DateOfBirth,
    Country,
    Avatar,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}
