//! Shoutout type repository.

use std::sync::Arc;

use crate::entities::{ShoutoutType, shoutout_type};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use shoutly_common::{AppError, AppResult};

/// Shoutout type repository for database operations.
#[derive(Clone)]
pub struct ShoutoutTypeRepository {
    db: Arc<DatabaseConnection>,
}

impl ShoutoutTypeRepository {
    /// Create a new shoutout type repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a shoutout type by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<shoutout_type::Model>> {
        ShoutoutType::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find shoutout types by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<shoutout_type::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        ShoutoutType::find()
            .filter(shoutout_type::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a shoutout type by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<shoutout_type::Model>> {
        ShoutoutType::find()
            .filter(shoutout_type::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all shoutout types, name ascending.
    pub async fn list_all(&self) -> AppResult<Vec<shoutout_type::Model>> {
        ShoutoutType::find()
            .order_by_asc(shoutout_type::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new shoutout type.
    pub async fn create(&self, model: shoutout_type::ActiveModel) -> AppResult<shoutout_type::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all shoutout types.
    pub async fn count_all(&self) -> AppResult<u64> {
        ShoutoutType::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_type(id: &str, name: &str) -> shoutout_type::Model {
        shoutout_type::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(format!("{name} description")),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_list_all() {
        let audio = create_test_type("type1", "Audio Shoutout");
        let video = create_test_type("type2", "Video Shoutout");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[audio, video]])
                .into_connection(),
        );

        let repo = ShoutoutTypeRepository::new(db);
        let result = repo.list_all().await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Audio Shoutout");
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<shoutout_type::Model>::new()])
                .into_connection(),
        );

        let repo = ShoutoutTypeRepository::new(db);
        let result = repo.find_by_id("missing").await.unwrap();

        assert!(result.is_none());
    }
}
