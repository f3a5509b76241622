//! Create activity log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ActivityLog::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(ActivityLog::ActorType).string_len(20).not_null())
                    .col(ColumnDef::new(ActivityLog::ActorId).string_len(32).null())
                    .col(ColumnDef::new(ActivityLog::Action).string_len(100).not_null())
                    .col(ColumnDef::new(ActivityLog::Description).text().not_null())
                    .col(ColumnDef::new(ActivityLog::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(ActivityLog::UserAgent).text().null())
                    .col(ColumnDef::new(ActivityLog::Metadata).json_binary().null())
                    .col(
                        ColumnDef::new(ActivityLog::CreatedAt)
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
                    .name("idx_activity_log_created_at")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_actor_type")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::ActorType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_activity_log_action")
                    .table(ActivityLog::Table)
                    .col(ActivityLog::Action)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ActivityLog {
    Table,
    Id,
    ActorType,
    ActorId,
    Action,
    Description,
    IpAddress,
    UserAgent,
    Metadata,
    CreatedAt,
}
