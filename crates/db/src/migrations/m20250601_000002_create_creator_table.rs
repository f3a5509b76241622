//! Create creator table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Creator::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Creator::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Creator::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Creator::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Creator::DisplayName).string_len(50).not_null())
                    .col(ColumnDef::new(Creator::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Creator::Password).string_len(255).not_null())
                    .col(ColumnDef::new(Creator::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Creator::Country).string_len(100).not_null())
                    .col(ColumnDef::new(Creator::Avatar).string_len(512))
                    .col(ColumnDef::new(Creator::Bio).text())
                    .col(ColumnDef::new(Creator::IsVerified).boolean().not_null().default(false))
                    .col(ColumnDef::new(Creator::IsSponsored).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Creator::CommissionRate)
                            .decimal_len(5, 2)
                            .not_null()
                            .default("15.00"),
                    )
                    .col(
                        ColumnDef::new(Creator::WithdrawalPermission)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Creator::TotalEarnings)
                            .decimal_len(12, 2)
                            .not_null()
                            .default("0.00"),
                    )
                    .col(
                        ColumnDef::new(Creator::AvailableBalance)
                            .decimal_len(12, 2)
                            .not_null()
                            .default("0.00"),
                    )
                    .col(ColumnDef::new(Creator::PayoutMethod).json_binary())
                    .col(
                        ColumnDef::new(Creator::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Creator::UpdatedAt)
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
                    .name("idx_creator_email")
                    .table(Creator::Table)
                    .col(Creator::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_creator_display_name")
                    .table(Creator::Table)
                    .col(Creator::DisplayName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Sponsored creators sort first in catalog queries
        manager
            .create_index(
                Index::create()
                    .name("idx_creator_is_sponsored")
                    .table(Creator::Table)
                    .col(Creator::IsSponsored)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Creator::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Creator {
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
    Bio,
    IsVerified,
    IsSponsored,
    CommissionRate,
    WithdrawalPermission,
    TotalEarnings,
    AvailableBalance,
    PayoutMethod,
    CreatedAt,
    UpdatedAt,
}
