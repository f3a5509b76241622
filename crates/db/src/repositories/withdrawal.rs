//! Withdrawal repository.
//!
//! The admin decision is a guarded UPDATE: `pending` is the only state
//! it fires from, so two admins deciding the same request race safely.

use std::sync::Arc;

use crate::entities::{Withdrawal, WithdrawalStatus, withdrawal};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use shoutly_common::{AppError, AppResult};

/// Withdrawal repository for database operations.
#[derive(Clone)]
pub struct WithdrawalRepository {
    db: Arc<DatabaseConnection>,
}

impl WithdrawalRepository {
    /// Create a new withdrawal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a withdrawal by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<withdrawal::Model>> {
        Withdrawal::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a withdrawal by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<withdrawal::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))
    }

    /// Create a new withdrawal on the given connection, so the insert can
    /// share a transaction with the balance debit.
    pub async fn create<C>(
        &self,
        conn: &C,
        model: withdrawal::ActiveModel,
    ) -> AppResult<withdrawal::Model>
    where
        C: ConnectionTrait,
    {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Decide a pending withdrawal. The WHERE clause pins the pre-state;
    /// returns `false` when the request was not pending anymore.
    pub async fn decide<C>(
        &self,
        conn: &C,
        id: &str,
        status: WithdrawalStatus,
        admin_notes: Option<String>,
    ) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let result = Withdrawal::update_many()
            .col_expr(withdrawal::Column::Status, Expr::value(status))
            .col_expr(withdrawal::Column::AdminNotes, Expr::value(admin_notes))
            .col_expr(
                withdrawal::Column::ProcessedAt,
                Expr::current_timestamp().into(),
            )
            .col_expr(
                withdrawal::Column::UpdatedAt,
                Expr::current_timestamp().into(),
            )
            .filter(withdrawal::Column::Id.eq(id))
            .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// List a creator's withdrawals, newest first.
    pub async fn list_by_creator(
        &self,
        creator_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<withdrawal::Model>> {
        Withdrawal::find()
            .filter(withdrawal::Column::CreatorId.eq(creator_id))
            .order_by_desc(withdrawal::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a creator's withdrawals.
    pub async fn count_by_creator(&self, creator_id: &str) -> AppResult<u64> {
        Withdrawal::find()
            .filter(withdrawal::Column::CreatorId.eq(creator_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Lifetime sum of a creator's withdrawal requests.
    pub async fn sum_amount_by_creator(&self, creator_id: &str) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = Withdrawal::find()
            .select_only()
            .column_as(withdrawal::Column::Amount.sum(), "total")
            .filter(withdrawal::Column::CreatorId.eq(creator_id))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Most recent withdrawals for a creator.
    pub async fn recent_by_creator(
        &self,
        creator_id: &str,
        limit: u64,
    ) -> AppResult<Vec<withdrawal::Model>> {
        Withdrawal::find()
            .filter(withdrawal::Column::CreatorId.eq(creator_id))
            .order_by_desc(withdrawal::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List withdrawals for the admin back office, newest first.
    pub async fn list_admin(
        &self,
        status: Option<WithdrawalStatus>,
        creator_ids: Option<&[String]>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<withdrawal::Model>> {
        Withdrawal::find()
            .filter(Self::admin_condition(status, creator_ids))
            .order_by_desc(withdrawal::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count withdrawals matching the admin filter.
    pub async fn count_admin(
        &self,
        status: Option<WithdrawalStatus>,
        creator_ids: Option<&[String]>,
    ) -> AppResult<u64> {
        Withdrawal::find()
            .filter(Self::admin_condition(status, creator_ids))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count withdrawals awaiting a decision.
    pub async fn count_pending(&self) -> AppResult<u64> {
        Withdrawal::find()
            .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn admin_condition(
        status: Option<WithdrawalStatus>,
        creator_ids: Option<&[String]>,
    ) -> Condition {
        let mut condition = Condition::all();
        if let Some(status) = status {
            condition = condition.add(withdrawal::Column::Status.eq(status));
        }
        if let Some(ids) = creator_ids {
            condition = condition.add(withdrawal::Column::CreatorId.is_in(ids.to_vec()));
        }
        condition
    }
}
