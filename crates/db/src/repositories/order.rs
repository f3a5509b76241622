//! Order repository.
//!
//! State transitions are single guarded UPDATE statements: the required
//! pre-state lives in the WHERE clause and the affected-row count tells
//! the caller whether the transition won. Two racing callers can
//! therefore never both succeed on the same transition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crate::entities::{Order, OrderStatus, PaymentStatus, order};
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use shoutly_common::{AppError, AppResult};

/// Pre-resolved search terms for the admin order listing: the raw text
/// matches order numbers directly, plus the IDs of users/creators whose
/// display name matched it.
#[derive(Debug, Clone, Default)]
pub struct OrderSearch {
    /// Raw search text, matched against order numbers.
    pub pattern: String,
    /// Users whose display name matched the text.
    pub user_ids: Vec<String>,
    /// Creators whose display name matched the text.
    pub creator_ids: Vec<String>,
}

/// Order repository for database operations.
#[derive(Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an order by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<order::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    /// Find an order visible to the given user.
    pub async fn find_owned_by_user(
        &self,
        id: &str,
        user_id: &str,
    ) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .filter(order::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an order visible to the given creator.
    pub async fn find_owned_by_creator(
        &self,
        id: &str,
        creator_id: &str,
    ) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .filter(order::Column::CreatorId.eq(creator_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an order by its human-readable order number.
    pub async fn find_by_order_number(&self, order_number: &str) -> AppResult<Option<order::Model>> {
        Order::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new order.
    pub async fn create(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an order.
    pub async fn update(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Compensate a failed payment initiation: `(cancelled, failed)`.
    pub async fn mark_payment_init_failed(&self, order_id: &str) -> AppResult<()> {
        Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(
                order::Column::PaymentStatus,
                Expr::value(PaymentStatus::Failed),
            )
            .col_expr(order::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(order::Column::Id.eq(order_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Mark a payment as settled. Guarded by `payment_status <> 'paid'`
    /// so racing success callbacks settle exactly once; returns `false`
    /// when another caller already won.
    pub async fn confirm_payment<C>(&self, conn: &C, order_id: &str) -> AppResult<bool>
    where
        C: ConnectionTrait,
    {
        let result = Order::update_many()
            .col_expr(
                order::Column::PaymentStatus,
                Expr::value(PaymentStatus::Paid),
            )
            .col_expr(order::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::PaymentStatus.ne(PaymentStatus::Paid))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Cancel an order by its order number: `(cancelled, cancelled)`.
    pub async fn cancel_by_order_number(&self, order_number: &str) -> AppResult<u64> {
        let result = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(
                order::Column::PaymentStatus,
                Expr::value(PaymentStatus::Cancelled),
            )
            .col_expr(order::Column::UpdatedAt, Expr::current_timestamp().into())
            .filter(order::Column::OrderNumber.eq(order_number))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Accept a pending, paid order, storing the creator's note when one
    /// was given. Returns `false` when the order is not in
    /// `(pending, paid)` or not owned by the creator.
    pub async fn accept(
        &self,
        order_id: &str,
        creator_id: &str,
        message: Option<String>,
    ) -> AppResult<bool> {
        let mut stmt = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Accepted))
            .col_expr(order::Column::AcceptedAt, Expr::current_timestamp().into())
            .col_expr(order::Column::UpdatedAt, Expr::current_timestamp().into());
        if let Some(message) = message {
            stmt = stmt.col_expr(order::Column::CreatorMessage, Expr::value(message));
        }

        let result = stmt
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Reject a pending order. Returns `false` when the order is not
    /// pending or not owned by the creator.
    pub async fn reject(
        &self,
        order_id: &str,
        creator_id: &str,
        message: Option<String>,
    ) -> AppResult<bool> {
        let mut stmt = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Rejected))
            .col_expr(order::Column::UpdatedAt, Expr::current_timestamp().into());
        if let Some(message) = message {
            stmt = stmt.col_expr(order::Column::CreatorMessage, Expr::value(message));
        }

        let result = stmt
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Complete an accepted order, storing the delivery file key and the
    /// creator's message when given; an omitted message keeps the one
    /// written at accept time. Returns `false` when the order is not
    /// accepted or not owned by the creator.
    pub async fn complete(
        &self,
        order_id: &str,
        creator_id: &str,
        delivery_file: Option<String>,
        message: Option<String>,
    ) -> AppResult<bool> {
        let mut stmt = Order::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Completed))
            .col_expr(order::Column::CompletedAt, Expr::current_timestamp().into())
            .col_expr(order::Column::UpdatedAt, Expr::current_timestamp().into());
        if let Some(delivery_file) = delivery_file {
            stmt = stmt.col_expr(order::Column::DeliveryFile, Expr::value(delivery_file));
        }
        if let Some(message) = message {
            stmt = stmt.col_expr(order::Column::CreatorMessage, Expr::value(message));
        }

        let result = stmt
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::Status.eq(OrderStatus::Accepted))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// List a user's orders, newest first, optionally filtered by status.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<order::Model>> {
        let mut query = Order::find().filter(order::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        query
            .order_by_desc(order::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's orders, optionally filtered by status.
    pub async fn count_by_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
    ) -> AppResult<u64> {
        let mut query = Order::find().filter(order::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List a creator's orders, newest first, optionally filtered by status.
    pub async fn list_by_creator(
        &self,
        creator_id: &str,
        status: Option<OrderStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<order::Model>> {
        let mut query = Order::find().filter(order::Column::CreatorId.eq(creator_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        query
            .order_by_desc(order::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a creator's orders, optionally filtered by status.
    pub async fn count_by_creator(
        &self,
        creator_id: &str,
        status: Option<OrderStatus>,
    ) -> AppResult<u64> {
        let mut query = Order::find().filter(order::Column::CreatorId.eq(creator_id));
        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List orders for the admin back office, newest first.
    pub async fn list_admin(
        &self,
        status: Option<OrderStatus>,
        search: Option<&OrderSearch>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<order::Model>> {
        Order::find()
            .filter(Self::admin_condition(status, search))
            .order_by_desc(order::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count orders matching the admin filter.
    pub async fn count_admin(
        &self,
        status: Option<OrderStatus>,
        search: Option<&OrderSearch>,
    ) -> AppResult<u64> {
        Order::find()
            .filter(Self::admin_condition(status, search))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent orders platform-wide.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<order::Model>> {
        Order::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent orders for a creator.
    pub async fn recent_by_creator(
        &self,
        creator_id: &str,
        limit: u64,
    ) -> AppResult<Vec<order::Model>> {
        Order::find()
            .filter(order::Column::CreatorId.eq(creator_id))
            .order_by_desc(order::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all orders.
    pub async fn count_all(&self) -> AppResult<u64> {
        Order::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count orders created at or after the given instant.
    pub async fn count_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count orders with the given status platform-wide.
    pub async fn count_with_status(&self, status: OrderStatus) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a creator's actionable orders: pending and already paid.
    pub async fn count_pending_paid_by_creator(&self, creator_id: &str) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a creator's orders created at or after the given instant.
    pub async fn count_by_creator_since(
        &self,
        creator_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::CreatedAt.gte(since))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a user's paid orders.
    pub async fn count_paid_by_user(&self, user_id: &str) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of a creator's earnings on orders completed at or after the
    /// given instant.
    pub async fn sum_earnings_completed_since(
        &self,
        creator_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = Order::find()
            .select_only()
            .column_as(order::Column::CreatorEarnings.sum(), "total")
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .filter(order::Column::CompletedAt.gte(since))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Sum of platform commission on orders completed at or after the
    /// given instant.
    pub async fn sum_commission_completed_since(&self, since: DateTime<Utc>) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = Order::find()
            .select_only()
            .column_as(order::Column::CommissionAmount.sum(), "total")
            .filter(order::Column::Status.eq(OrderStatus::Completed))
            .filter(order::Column::CompletedAt.gte(since))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Sum of a user's spend across paid orders.
    pub async fn sum_paid_by_user(&self, user_id: &str) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = Order::find()
            .select_only()
            .column_as(order::Column::Price.sum(), "total")
            .filter(order::Column::UserId.eq(user_id))
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Count a creator's paid orders.
    pub async fn count_paid_by_creator(&self, creator_id: &str) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of order prices a creator has been paid for.
    pub async fn sum_paid_by_creator(&self, creator_id: &str) -> AppResult<Decimal> {
        let total: Option<Option<Decimal>> = Order::find()
            .select_only()
            .column_as(order::Column::Price.sum(), "total")
            .filter(order::Column::CreatorId.eq(creator_id))
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    fn admin_condition(status: Option<OrderStatus>, search: Option<&OrderSearch>) -> Condition {
        let mut condition = Condition::all();

        if let Some(status) = status {
            condition = condition.add(order::Column::Status.eq(status));
        }
        if let Some(search) = search {
            let pattern = format!(
                "%{}%",
                search.pattern.replace('%', "\\%").replace('_', "\\_")
            );
            let mut any = Condition::any()
                .add(Expr::col(order::Column::OrderNumber).ilike(pattern.as_str()));
            if !search.user_ids.is_empty() {
                any = any.add(order::Column::UserId.is_in(search.user_ids.clone()));
            }
            if !search.creator_ids.is_empty() {
                any = any.add(order::Column::CreatorId.is_in(search.creator_ids.clone()));
            }
            condition = condition.add(any);
        }

        condition
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn create_test_order(id: &str, status: OrderStatus, payment: PaymentStatus) -> order::Model {
        order::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            creator_id: "creator1".to_string(),
            shoutout_id: "shoutout1".to_string(),
            order_number: "SO-0123456789ABCDEF0".to_string(),
            instructions: Some("Say happy birthday to Sam".to_string()),
            price: dec!(50.00),
            commission_rate: dec!(15.00),
            commission_amount: dec!(7.50),
            creator_earnings: dec!(42.50),
            status,
            payment_status: payment,
            payment_id: Some("pay_1".to_string()),
            delivery_file: None,
            creator_message: None,
            user_response: None,
            accepted_at: None,
            completed_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_owned_by_user_scopes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<order::Model>::new()])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let result = repo.find_owned_by_user("order1", "someone-else").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_confirm_payment_wins_once() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = OrderRepository::new(db.clone());

        let first = repo.confirm_payment(db.as_ref(), "order1").await.unwrap();
        let second = repo.confirm_payment(db.as_ref(), "order1").await.unwrap();

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn test_accept_requires_pending_paid() {
        // Order already accepted: the guard filters it out.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let accepted = repo.accept("order1", "creator1", None).await.unwrap();

        assert!(!accepted);
    }

    #[tokio::test]
    async fn test_reject_pending_succeeds() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let rejected = repo
            .reject("order1", "creator1", Some("Not my thing".to_string()))
            .await
            .unwrap();

        assert!(rejected);
    }

    #[tokio::test]
    async fn test_list_by_creator_with_status() {
        let order = create_test_order("order1", OrderStatus::Pending, PaymentStatus::Paid);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order]])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let result = repo
            .list_by_creator("creator1", Some(OrderStatus::Pending), 10, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_sum_earnings_empty_is_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "total" => Value::from(None::<Decimal>),
                }]])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let total = repo
            .sum_earnings_completed_since("creator1", Utc::now())
            .await
            .unwrap();

        assert_eq!(total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_sum_paid_by_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "total" => Value::from(Some(dec!(125.00))),
                }]])
                .into_connection(),
        );

        let repo = OrderRepository::new(db);
        let total = repo.sum_paid_by_user("user1").await.unwrap();

        assert_eq!(total, dec!(125.00));
    }
}
