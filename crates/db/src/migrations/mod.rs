//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_user_table;
mod m20250601_000002_create_creator_table;
mod m20250601_000003_create_admin_table;
mod m20250601_000004_create_shoutout_type_table;
mod m20250601_000005_create_shoutout_table;
mod m20250601_000006_create_order_table;
mod m20250601_000007_create_withdrawal_table;
mod m20250601_000008_create_activity_log_table;
mod m20250601_000009_create_site_setting_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_user_table::Migration),
            Box::new(m20250601_000002_create_creator_table::Migration),
            Box::new(m20250601_000003_create_admin_table::Migration),
            Box::new(m20250601_000004_create_shoutout_type_table::Migration),
            Box::new(m20250601_000005_create_shoutout_table::Migration),
            Box::new(m20250601_000006_create_order_table::Migration),
            Box::new(m20250601_000007_create_withdrawal_table::Migration),
            Box::new(m20250601_000008_create_activity_log_table::Migration),
            Box::new(m20250601_000009_create_site_setting_table::Migration),
        ]
    }
}
