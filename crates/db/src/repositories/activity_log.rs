//! Activity log repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crate::entities::{ActivityLog, ActorType, activity_log};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};
use shoutly_common::{AppError, AppResult};

/// Filters for the admin activity-log listing.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    /// Only entries created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only entries by this actor type.
    pub actor_type: Option<ActorType>,
    /// Substring match on the action code.
    pub action: Option<String>,
    /// Substring match on the description.
    pub search: Option<String>,
}

impl ActivityLogFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(since) = self.since {
            condition = condition.add(activity_log::Column::CreatedAt.gte(since));
        }
        if let Some(actor_type) = self.actor_type {
            condition = condition.add(activity_log::Column::ActorType.eq(actor_type));
        }
        if let Some(action) = &self.action {
            let pattern = format!("%{}%", action.replace('%', "\\%").replace('_', "\\_"));
            condition =
                condition.add(Expr::col(activity_log::Column::Action).ilike(pattern.as_str()));
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            condition =
                condition.add(Expr::col(activity_log::Column::Description).ilike(pattern.as_str()));
        }
        condition
    }
}

/// Activity log repository for database operations.
#[derive(Clone)]
pub struct ActivityLogRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityLogRepository {
    /// Create a new activity log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append an entry.
    pub async fn create(&self, model: activity_log::ActiveModel) -> AppResult<activity_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List entries matching the filter, newest first.
    pub async fn list(
        &self,
        filter: &ActivityLogFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<activity_log::Model>> {
        ActivityLog::find()
            .filter(filter.condition())
            .order_by_desc(activity_log::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count entries matching the filter.
    pub async fn count(&self, filter: &ActivityLogFilter) -> AppResult<u64> {
        ActivityLog::find()
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent entries.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<activity_log::Model>> {
        ActivityLog::find()
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all entries.
    pub async fn count_all(&self) -> AppResult<u64> {
        ActivityLog::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete entries created strictly before the cutoff; returns the
    /// number of rows removed.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = ActivityLog::delete_many()
            .filter(activity_log::Column::CreatedAt.lt(cutoff))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// The creation instant of the n-th newest entry (1-based), used as
    /// the cutoff when trimming the log back to a row cap.
    pub async fn nth_newest_created_at(
        &self,
        n: u64,
    ) -> AppResult<Option<DateTime<chrono::FixedOffset>>> {
        if n == 0 {
            return Ok(None);
        }

        ActivityLog::find()
            .select_only()
            .column(activity_log::Column::CreatedAt)
            .order_by_desc(activity_log::Column::CreatedAt)
            .offset(n - 1)
            .limit(1)
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use std::sync::Arc;

    fn create_test_entry(id: &str, action: &str) -> activity_log::Model {
        activity_log::Model {
            id: id.to_string(),
            actor_type: ActorType::User,
            actor_id: Some("user1".to_string()),
            action: action.to_string(),
            description: "test entry".to_string(),
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("test-agent".to_string()),
            metadata: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_entry() {
        let entry = create_test_entry("log1", "LOGIN");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ActivityLogRepository::new(db);

        let active = activity_log::ActiveModel {
            id: Set("log1".to_string()),
            action: Set("LOGIN".to_string()),
            ..Default::default()
        };

        let result = repo.create(active).await.unwrap();
        assert_eq!(result.action, "LOGIN");
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let entry = create_test_entry("log1", "ORDER_CREATED");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[entry]])
                .into_connection(),
        );

        let repo = ActivityLogRepository::new(db);
        let filter = ActivityLogFilter {
            since: Some(Utc::now() - chrono::Duration::days(30)),
            actor_type: Some(ActorType::User),
            action: Some("ORDER".to_string()),
            search: None,
        };
        let result = repo.list(&filter, 50, 0).await.unwrap();

        assert_eq!(result.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_older_than_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 7,
                }])
                .into_connection(),
        );

        let repo = ActivityLogRepository::new(db);
        let removed = repo
            .delete_older_than(Utc::now() - chrono::Duration::days(30))
            .await
            .unwrap();

        assert_eq!(removed, 7);
    }

    #[tokio::test]
    async fn test_nth_newest_zero_is_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let repo = ActivityLogRepository::new(db);
        let cutoff = repo.nth_newest_created_at(0).await.unwrap();

        assert!(cutoff.is_none());
    }
}
