//! Site settings service: typed key/value platform parameters managed
//! from the admin back office.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shoutly_common::{AppError, AppResult, IdGenerator};
use shoutly_db::{
    entities::site_setting::{self, SettingType},
    repositories::SiteSettingRepository,
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};

/// Site settings service.
#[derive(Clone)]
pub struct SettingsService {
    setting_repo: SiteSettingRepository,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

/// Input for creating or updating a setting, keyed by `key`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSettingInput {
    #[validate(length(min = 1, max = 100))]
    pub key: String,

    pub value: String,

    #[serde(rename = "type", default)]
    pub value_type: SettingType,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// A setting as returned to the admin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingRow {
    pub id: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: SettingType,
    pub description: Option<String>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<site_setting::Model> for SettingRow {
    fn from(model: site_setting::Model) -> Self {
        Self {
            id: model.id,
            key: model.key,
            value: model.value,
            value_type: model.value_type,
            description: model.description,
            updated_at: model.updated_at,
        }
    }
}

/// Check that a value is readable as its declared type before it lands
/// in the table. String accepts anything.
fn check_value_type(value: &str, value_type: SettingType) -> AppResult<()> {
    let ok = match value_type {
        SettingType::String => true,
        SettingType::Number => value.parse::<f64>().is_ok(),
        SettingType::Boolean => matches!(value, "true" | "false"),
        SettingType::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
    };
    if ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Value is not a valid {}",
            match value_type {
                SettingType::Number => "number",
                SettingType::Boolean => "boolean",
                SettingType::Json => "JSON document",
                SettingType::String => "string",
            }
        )))
    }
}

impl SettingsService {
    /// Create a new settings service.
    #[must_use]
    pub fn new(setting_repo: SiteSettingRepository, activity: ActivityLogService) -> Self {
        Self {
            setting_repo,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// List all settings, ordered by key.
    pub async fn list(&self) -> AppResult<Vec<SettingRow>> {
        let settings = self.setting_repo.list_all().await?;
        Ok(settings.into_iter().map(SettingRow::from).collect())
    }

    /// Create or update a setting by key.
    pub async fn upsert(
        &self,
        admin_id: &str,
        input: UpsertSettingInput,
        client: &ClientInfo,
    ) -> AppResult<SettingRow> {
        input.validate()?;
        check_value_type(&input.value, input.value_type)?;

        let existing = self.setting_repo.find_by_key(&input.key).await?;
        let old_value = existing.as_ref().map(|s| s.value.clone());

        let saved = match existing {
            Some(current) => {
                let mut active: site_setting::ActiveModel = current.into();
                active.value = Set(input.value.clone());
                active.value_type = Set(input.value_type);
                active.description = Set(input.description.clone());
                active.updated_at = Set(Utc::now().into());
                self.setting_repo.update(active).await?
            }
            None => {
                let model = site_setting::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    key: Set(input.key.clone()),
                    value: Set(input.value.clone()),
                    value_type: Set(input.value_type),
                    description: Set(input.description.clone()),
                    updated_at: Set(Utc::now().into()),
                };
                self.setting_repo.create(model).await?
            }
        };

        self.activity
            .admin_action(
                admin_id,
                actions::SETTING_UPDATED,
                format!("Updated site setting: {}", input.key),
                Some(json!({
                    "settingKey": input.key,
                    "oldValue": old_value,
                    "newValue": input.value,
                })),
                client,
            )
            .await;

        Ok(saved.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use shoutly_db::repositories::ActivityLogRepository;
    use std::sync::Arc;

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_service(setting_db: Arc<sea_orm::DatabaseConnection>) -> SettingsService {
        SettingsService::new(
            SiteSettingRepository::new(setting_db),
            ActivityLogService::new(ActivityLogRepository::new(empty_mock())),
        )
    }

    fn create_test_setting(key: &str, value: &str) -> site_setting::Model {
        site_setting::Model {
            id: "setting1".to_string(),
            key: key.to_string(),
            value: value.to_string(),
            value_type: SettingType::String,
            description: None,
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_check_value_type() {
        assert!(check_value_type("anything", SettingType::String).is_ok());
        assert!(check_value_type("42.5", SettingType::Number).is_ok());
        assert!(check_value_type("not a number", SettingType::Number).is_err());
        assert!(check_value_type("true", SettingType::Boolean).is_ok());
        assert!(check_value_type("yes", SettingType::Boolean).is_err());
        assert!(check_value_type(r#"{"a": 1}"#, SettingType::Json).is_ok());
        assert!(check_value_type("{broken", SettingType::Json).is_err());
    }

    #[tokio::test]
    async fn test_list_settings() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_setting("platform_name", "Shoutly"),
                    create_test_setting("support_email", "help@example.com"),
                ]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let settings = service.list().await.unwrap();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings[0].key, "platform_name");
    }

    #[tokio::test]
    async fn test_upsert_creates_missing_key() {
        let created = create_test_setting("maintenance_mode", "false");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // Lookup misses, then the insert returns the new row.
                .append_query_results([Vec::<site_setting::Model>::new()])
                .append_query_results([[created]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = create_test_service(db);

        let row = service
            .upsert(
                "admin1",
                UpsertSettingInput {
                    key: "maintenance_mode".to_string(),
                    value: "false".to_string(),
                    value_type: SettingType::Boolean,
                    description: None,
                },
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        assert_eq!(row.key, "maintenance_mode");
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_key() {
        let existing = create_test_setting("platform_name", "Shoutly");
        let mut updated = existing.clone();
        updated.value = "Shoutly Beta".to_string();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = create_test_service(db);

        let row = service
            .upsert(
                "admin1",
                UpsertSettingInput {
                    key: "platform_name".to_string(),
                    value: "Shoutly Beta".to_string(),
                    value_type: SettingType::String,
                    description: None,
                },
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        assert_eq!(row.value, "Shoutly Beta");
    }

    #[tokio::test]
    async fn test_upsert_rejects_mistyped_value() {
        let service = create_test_service(empty_mock());

        let result = service
            .upsert(
                "admin1",
                UpsertSettingInput {
                    key: "max_order_price".to_string(),
                    value: "lots".to_string(),
                    value_type: SettingType::Number,
                    description: None,
                },
                &ClientInfo::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
