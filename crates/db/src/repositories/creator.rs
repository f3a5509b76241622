//! Creator repository.
//!
//! Balance mutations here are single atomic UPDATE statements so that
//! concurrent money flows can never interleave a read-then-write. The
//! debit carries its own sufficient-funds guard in the WHERE clause.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crate::entities::{Creator, creator};
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use shoutly_common::{AppError, AppResult};

/// Creator repository for database operations.
#[derive(Clone)]
pub struct CreatorRepository {
    db: Arc<DatabaseConnection>,
}

impl CreatorRepository {
    /// Create a new creator repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a creator by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<creator::Model>> {
        Creator::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a creator by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<creator::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))
    }

    /// Find creators by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<creator::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Creator::find()
            .filter(creator::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a creator by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<creator::Model>> {
        Creator::find()
            .filter(creator::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a creator by display name.
    pub async fn find_by_display_name(
        &self,
        display_name: &str,
    ) -> AppResult<Option<creator::Model>> {
        Creator::find()
            .filter(creator::Column::DisplayName.eq(display_name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new creator.
    pub async fn create(&self, model: creator::ActiveModel) -> AppResult<creator::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a creator.
    pub async fn update(&self, model: creator::ActiveModel) -> AppResult<creator::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List creators, newest first, optionally filtered by display name.
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<creator::Model>> {
        Creator::find()
            .filter(Self::search_condition(search))
            .order_by_desc(creator::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count creators matching the optional display-name filter.
    pub async fn count(&self, search: Option<&str>) -> AppResult<u64> {
        Creator::find()
            .filter(Self::search_condition(search))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get IDs of creators whose display name matches the pattern.
    pub async fn find_ids_by_display_name_like(&self, query: &str) -> AppResult<Vec<String>> {
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));

        Creator::find()
            .select_only()
            .column(creator::Column::Id)
            .filter(Expr::col(creator::Column::DisplayName).ilike(pattern))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all creators.
    pub async fn count_all(&self) -> AppResult<u64> {
        Creator::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count creators created at or after the given instant.
    pub async fn count_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        Creator::find()
            .filter(creator::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Credit earnings atomically: adds to both the lifetime total and the
    /// withdrawable balance in a single UPDATE.
    pub async fn credit_earnings<C>(
        &self,
        conn: &C,
        creator_id: &str,
        amount: Decimal,
    ) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let result = Creator::update_many()
            .col_expr(
                creator::Column::TotalEarnings,
                Expr::col(creator::Column::TotalEarnings).add(amount),
            )
            .col_expr(
                creator::Column::AvailableBalance,
                Expr::col(creator::Column::AvailableBalance).add(amount),
            )
            .col_expr(creator::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(creator::Column::Id.eq(creator_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Creator not found".to_string()));
        }
        Ok(())
    }

    /// Debit the withdrawable balance atomically. The WHERE clause carries
    /// the sufficient-funds guard; returns `false` when the guard rejected
    /// the debit (balance below `amount` or creator missing).
    pub async fn debit_available_balance<C>(
        &self,
        conn: &C,
        creator_id: &str,
        amount: Decimal,
    ) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let result = Creator::update_many()
            .col_expr(
                creator::Column::AvailableBalance,
                Expr::col(creator::Column::AvailableBalance).sub(amount),
            )
            .col_expr(creator::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(creator::Column::Id.eq(creator_id))
            .filter(creator::Column::AvailableBalance.gte(amount))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Credit the withdrawable balance atomically (rejected-withdrawal
    /// refund; lifetime total is untouched).
    pub async fn credit_available_balance<C>(
        &self,
        conn: &C,
        creator_id: &str,
        amount: Decimal,
    ) -> AppResult<()>
    where
        C: ConnectionTrait,
    {
        let result = Creator::update_many()
            .col_expr(
                creator::Column::AvailableBalance,
                Expr::col(creator::Column::AvailableBalance).add(amount),
            )
            .col_expr(creator::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(creator::Column::Id.eq(creator_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Creator not found".to_string()));
        }
        Ok(())
    }

    fn search_condition(search: Option<&str>) -> Condition {
        let mut condition = Condition::all();
        if let Some(query) = search {
            let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
            condition = condition.add(Expr::col(creator::Column::DisplayName).ilike(pattern));
        }
        condition
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_creator(id: &str, display_name: &str) -> creator::Model {
        creator::Model {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "Creator".to_string(),
            display_name: display_name.to_string(),
            email: format!("{display_name}@example.com"),
            password: "$argon2id$stub".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 6, 15).unwrap(),
            country: "US".to_string(),
            avatar: None,
            bio: None,
            is_verified: false,
            is_sponsored: false,
            commission_rate: dec!(15.00),
            withdrawal_permission: true,
            total_earnings: dec!(0.00),
            available_balance: dec!(0.00),
            payout_method: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<creator::Model>::new()])
                .into_connection(),
        );

        let repo = CreatorRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_display_name() {
        let creator = create_test_creator("creator1", "star");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[creator.clone()]])
                .into_connection(),
        );

        let repo = CreatorRepository::new(db);
        let result = repo.find_by_display_name("star").await.unwrap();

        assert_eq!(result.unwrap().id, "creator1");
    }

    #[tokio::test]
    async fn test_credit_earnings_missing_creator_errors() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CreatorRepository::new(db.clone());
        let result = repo
            .credit_earnings(db.as_ref(), "missing", dec!(42.50))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_credit_earnings_ok() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = CreatorRepository::new(db.clone());
        let result = repo
            .credit_earnings(db.as_ref(), "creator1", dec!(42.50))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_debit_insufficient_balance_returns_false() {
        // Guard in the WHERE clause filters the row out: zero rows affected.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CreatorRepository::new(db.clone());
        let debited = repo
            .debit_available_balance(db.as_ref(), "creator1", dec!(100.00))
            .await
            .unwrap();

        assert!(!debited);
    }

    #[tokio::test]
    async fn test_debit_sufficient_balance_returns_true() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = CreatorRepository::new(db.clone());
        let debited = repo
            .debit_available_balance(db.as_ref(), "creator1", dec!(25.00))
            .await
            .unwrap();

        assert!(debited);
    }
}
