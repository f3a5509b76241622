//! Site setting repository.

use std::sync::Arc;

use crate::entities::{SiteSetting, site_setting};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use shoutly_common::{AppError, AppResult};

/// Site setting repository for database operations.
#[derive(Clone)]
pub struct SiteSettingRepository {
    db: Arc<DatabaseConnection>,
}

impl SiteSettingRepository {
    /// Create a new site setting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a setting by key.
    pub async fn find_by_key(&self, key: &str) -> AppResult<Option<site_setting::Model>> {
        SiteSetting::find()
            .filter(site_setting::Column::Key.eq(key))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all settings, key ascending.
    pub async fn list_all(&self) -> AppResult<Vec<site_setting::Model>> {
        SiteSetting::find()
            .order_by_asc(site_setting::Column::Key)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new setting.
    pub async fn create(&self, model: site_setting::ActiveModel) -> AppResult<site_setting::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a setting.
    pub async fn update(&self, model: site_setting::ActiveModel) -> AppResult<site_setting::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::SettingType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_setting(key: &str, value: &str) -> site_setting::Model {
        site_setting::Model {
            id: format!("setting-{key}"),
            key: key.to_string(),
            value: value.to_string(),
            value_type: SettingType::String,
            description: None,
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_key() {
        let setting = create_test_setting("platform_name", "Shoutly");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[setting.clone()]])
                .into_connection(),
        );

        let repo = SiteSettingRepository::new(db);
        let result = repo.find_by_key("platform_name").await.unwrap();

        assert_eq!(result.unwrap().value, "Shoutly");
    }

    #[tokio::test]
    async fn test_list_all_ordered() {
        let a = create_test_setting("commission_default", "15");
        let b = create_test_setting("platform_name", "Shoutly");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a, b]])
                .into_connection(),
        );

        let repo = SiteSettingRepository::new(db);
        let result = repo.list_all().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].key, "commission_default");
    }

    #[tokio::test]
    async fn test_create_setting() {
        let setting = create_test_setting("maintenance_mode", "false");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[setting.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = SiteSettingRepository::new(db);

        let active = site_setting::ActiveModel {
            id: Set("setting-maintenance_mode".to_string()),
            key: Set("maintenance_mode".to_string()),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.key, "maintenance_mode");
    }
}
