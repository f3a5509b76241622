//! Order lifecycle service.
//!
//! Owns the money flow: order creation with provider payment initiation,
//! the provider's success/cancel callbacks (where the creator's ledger is
//! credited), and the creator's accept/reject/complete decisions. All
//! state transitions ride on guarded updates in the repository, and the
//! settle path runs its order update and ledger credit in one
//! transaction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shoutly_common::{
    AppError, AppResult, Config, IdGenerator, SIGNED_URL_TTL_SECS, StorageBackend, is_valid_id,
};
use shoutly_db::{
    entities::{
        activity_log::ActorType,
        order::{self, OrderStatus, PaymentStatus},
    },
    repositories::{
        CreatorRepository, OrderRepository, OrderSearch, ShoutoutRepository,
        ShoutoutTypeRepository, UserRepository,
    },
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};
use crate::services::admin::Pagination;
use crate::services::payment::{CreatePaymentRequest, PaymentProvider};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 50;
const MAX_ADMIN_PAGE_SIZE: u64 = 100;

/// Order lifecycle service.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    order_repo: OrderRepository,
    shoutout_repo: ShoutoutRepository,
    type_repo: ShoutoutTypeRepository,
    user_repo: UserRepository,
    creator_repo: CreatorRepository,
    activity: ActivityLogService,
    provider: Arc<dyn PaymentProvider>,
    storage: Arc<dyn StorageBackend>,
    frontend_url: String,
    id_gen: IdGenerator,
}

/// Input for creating an order.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[validate(length(min = 1))]
    pub shoutout_id: String,

    #[validate(length(max = 1000))]
    pub instructions: Option<String>,
}

/// A creator's decision on one of their orders.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderDecisionInput {
    /// One of `accept`, `reject`, `complete`.
    pub action: String,

    #[validate(length(max = 1000))]
    pub message: Option<String>,

    /// Storage key of the delivered file; `complete` only.
    pub delivery_file: Option<String>,
}

/// Page and status-filter parameters for user and creator order lists.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

/// Page, status, and search parameters for the admin order list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    /// Matches order numbers and both display names.
    pub search: Option<String>,
}

/// Query parameters the payment provider appends to its callbacks.
/// `order_id` carries the public order number.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentCallbackQuery {
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
}

/// Counterpart account snippet attached to order rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub id: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
}

/// Counterpart account snippet on admin order rows, including the email.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccountRef {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Ordered-listing snippet attached to order rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoutoutRef {
    pub id: String,
    pub title: String,
    pub delivery_time: i32,
    pub type_name: Option<String>,
}

/// Order row returned to the buying user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrder {
    pub id: String,
    pub order_number: String,
    pub instructions: Option<String>,
    pub price: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub creator_message: Option<String>,
    pub accepted_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub creator: Option<AccountRef>,
    pub shoutout: Option<ShoutoutRef>,
}

/// User's order list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrderList {
    pub orders: Vec<UserOrder>,
    pub pagination: Pagination,
}

/// Full order detail for the buying user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrderDetail {
    pub id: String,
    pub order_number: String,
    pub instructions: Option<String>,
    pub price: Decimal,
    pub commission_amount: Decimal,
    pub creator_earnings: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub delivery_file: Option<String>,
    /// Presigned download URL, attached when signing succeeds.
    pub delivery_file_url: Option<String>,
    pub creator_message: Option<String>,
    pub user_response: Option<String>,
    pub accepted_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub creator: Option<AccountRef>,
    pub shoutout: Option<ShoutoutRef>,
}

/// Order row returned to the selling creator; also the decision
/// response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorOrder {
    pub id: String,
    pub order_number: String,
    pub instructions: Option<String>,
    pub price: Decimal,
    pub creator_earnings: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_file: Option<String>,
    pub creator_message: Option<String>,
    pub user_response: Option<String>,
    pub accepted_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub user: Option<AccountRef>,
    pub shoutout: Option<ShoutoutRef>,
}

/// Creator's order list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorOrderList {
    pub orders: Vec<CreatorOrder>,
    pub pagination: Pagination,
}

/// Order row in the admin list with both counterpart accounts attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrder {
    pub id: String,
    pub order_number: String,
    pub instructions: Option<String>,
    pub price: Decimal,
    pub commission_amount: Decimal,
    pub creator_earnings: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub delivery_file: Option<String>,
    pub creator_message: Option<String>,
    pub user_response: Option<String>,
    pub accepted_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub user: Option<AdminAccountRef>,
    pub creator: Option<AdminAccountRef>,
    pub shoutout_title: Option<String>,
}

/// Admin order list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderList {
    pub orders: Vec<AdminOrder>,
    pub pagination: Pagination,
}

/// Response to order creation: the stored order plus the provider's
/// hosted-payment details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order: OrderReceipt,
    pub payment: PaymentReceipt,
}

/// The slice of a new order the buyer needs to start paying.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: String,
    pub order_number: String,
    pub price: Decimal,
}

/// Provider-side payment handle for a new order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub payment_url: Option<String>,
    pub pay_address: Option<String>,
    pub pay_amount: Option<f64>,
    pub pay_currency: Option<String>,
}

/// How a success callback resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SettleOutcome {
    /// This callback won the settle: payment marked paid, ledger credited.
    Settled { order_id: String },
    /// Another callback already settled the payment; nothing was changed.
    AlreadyProcessed { order_id: String },
}

/// Split a price into platform commission and creator earnings.
/// Earnings are derived by subtraction, so the two always sum to the
/// price exactly.
fn commission_split(price: Decimal, rate: Decimal) -> (Decimal, Decimal) {
    let commission = (price * rate / Decimal::ONE_HUNDRED).round_dp(2);
    (commission, price - commission)
}

fn page_params(page: Option<u64>, limit: Option<u64>, max_limit: u64) -> (u64, u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, max_limit);
    (page, limit, (page - 1) * limit)
}

fn parse_status(value: Option<&str>) -> AppResult<Option<OrderStatus>> {
    match value {
        None | Some("") => Ok(None),
        Some("pending") => Ok(Some(OrderStatus::Pending)),
        Some("accepted") => Ok(Some(OrderStatus::Accepted)),
        Some("rejected") => Ok(Some(OrderStatus::Rejected)),
        Some("completed") => Ok(Some(OrderStatus::Completed)),
        Some("cancelled") => Ok(Some(OrderStatus::Cancelled)),
        Some(_) => Err(AppError::BadRequest("Invalid order status".to_string())),
    }
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        order_repo: OrderRepository,
        shoutout_repo: ShoutoutRepository,
        type_repo: ShoutoutTypeRepository,
        user_repo: UserRepository,
        creator_repo: CreatorRepository,
        activity: ActivityLogService,
        provider: Arc<dyn PaymentProvider>,
        storage: Arc<dyn StorageBackend>,
        config: &Config,
    ) -> Self {
        Self {
            db,
            order_repo,
            shoutout_repo,
            type_repo,
            user_repo,
            creator_repo,
            activity,
            provider,
            storage,
            frontend_url: config.server.frontend_url.trim_end_matches('/').to_string(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an order for an active shoutout and initiate the provider
    /// payment. The order is persisted `(pending, pending)` before the
    /// provider call; a provider failure compensates it to
    /// `(cancelled, failed)`.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateOrderInput,
        client: &ClientInfo,
    ) -> AppResult<OrderCreated> {
        input.validate()?;

        let shoutout = self
            .shoutout_repo
            .find_by_id(&input.shoutout_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Shoutout not found".to_string()))?;
        if !shoutout.is_active {
            return Err(AppError::BadRequest(
                "Shoutout is no longer available".to_string(),
            ));
        }

        let creator = self.creator_repo.get_by_id(&shoutout.creator_id).await?;

        // Snapshot the creator's rate: later rate changes must not move
        // money on existing orders.
        let (commission_amount, creator_earnings) =
            commission_split(shoutout.price, creator.commission_rate);

        let now = Utc::now();
        let model = order::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            creator_id: Set(creator.id.clone()),
            shoutout_id: Set(shoutout.id.clone()),
            order_number: Set(self.id_gen.generate_order_number()),
            instructions: Set(input.instructions),
            price: Set(shoutout.price),
            commission_rate: Set(creator.commission_rate),
            commission_amount: Set(commission_amount),
            creator_earnings: Set(creator_earnings),
            status: Set(OrderStatus::Pending),
            payment_status: Set(PaymentStatus::Pending),
            payment_id: Set(None),
            delivery_file: Set(None),
            creator_message: Set(None),
            user_response: Set(None),
            accepted_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let order = self.order_repo.create(model).await?;

        let request = CreatePaymentRequest {
            order_number: order.order_number.clone(),
            amount: order.price,
            description: format!("Shoutout: {} by {}", shoutout.title, creator.display_name),
        };
        let payment = match self.provider.create_payment(&request).await {
            Ok(details) => details,
            Err(e) => {
                self.order_repo.mark_payment_init_failed(&order.id).await?;
                tracing::warn!(
                    order_id = %order.id,
                    error = %e,
                    "Payment initiation failed, order cancelled"
                );
                return Err(AppError::ExternalService(
                    "Failed to create payment. Please try again.".to_string(),
                ));
            }
        };

        let mut active: order::ActiveModel = order.into();
        active.payment_id = Set(Some(payment.payment_id.clone()));
        active.updated_at = Set(Utc::now().into());
        let order = self.order_repo.update(active).await?;

        self.activity
            .order_created(user_id, &order.id, order.price, client)
            .await;

        Ok(OrderCreated {
            order: OrderReceipt {
                id: order.id,
                order_number: order.order_number,
                price: order.price,
            },
            payment: PaymentReceipt {
                payment_id: payment.payment_id,
                payment_url: payment.pay_url,
                pay_address: payment.pay_address,
                pay_amount: payment.pay_amount,
                pay_currency: payment.pay_currency,
            },
        })
    }

    /// Handle the provider's success callback. Always yields a frontend
    /// redirect target; failures land on the payment error page.
    pub async fn payment_success(&self, query: PaymentCallbackQuery, client: &ClientInfo) -> String {
        let (Some(payment_id), Some(order_number)) = (query.payment_id, query.order_id) else {
            return self.frontend_redirect(
                "/payment/error",
                &[("message", "Missing payment information")],
            );
        };

        match self.settle_payment(&payment_id, &order_number, client).await {
            Ok(SettleOutcome::Settled { order_id }) => {
                self.frontend_redirect("/payment/success", &[("order_id", order_id.as_str())])
            }
            Ok(SettleOutcome::AlreadyProcessed { order_id }) => self.frontend_redirect(
                &format!("/orders/{order_id}"),
                &[("message", "Payment already processed")],
            ),
            Err(e) => {
                tracing::warn!(
                    order_number = %order_number,
                    error = %e,
                    "Payment success callback failed"
                );
                let message = match e {
                    AppError::NotFound(_) => "Order not found",
                    AppError::ExternalService(_) | AppError::InvalidState(_) => {
                        "Payment verification failed"
                    }
                    _ => "Payment processing failed",
                };
                self.frontend_redirect("/payment/error", &[("message", message)])
            }
        }
    }

    /// Handle the provider's cancel callback: unconditionally cancel the
    /// order and send the buyer to the cancelled page.
    pub async fn payment_cancel(&self, query: PaymentCallbackQuery, client: &ClientInfo) -> String {
        let Some(order_number) = query.order_id else {
            return self.frontend_redirect("/payment/cancelled", &[]);
        };

        match self.order_repo.cancel_by_order_number(&order_number).await {
            Ok(cancelled) => {
                if cancelled > 0 {
                    self.activity
                        .record(
                            ActorType::System,
                            None,
                            actions::PAYMENT_CANCELLED,
                            format!("Payment cancelled for order {order_number}"),
                            client,
                            None,
                        )
                        .await;
                }
                self.frontend_redirect(
                    "/payment/cancelled",
                    &[("order_id", order_number.as_str())],
                )
            }
            Err(e) => {
                tracing::warn!(
                    order_number = %order_number,
                    error = %e,
                    "Payment cancel callback failed"
                );
                self.frontend_redirect(
                    "/payment/error",
                    &[("message", "Payment cancellation failed")],
                )
            }
        }
    }

    /// Verify the payment with the provider, then settle it: mark the
    /// order paid and credit the creator's ledger, both in one
    /// transaction. The order update is a compare-and-swap on
    /// `payment_status`, so of two racing callbacks exactly one credits.
    async fn settle_payment(
        &self,
        payment_id: &str,
        order_number: &str,
        client: &ClientInfo,
    ) -> AppResult<SettleOutcome> {
        let info = self.provider.get_payment(payment_id).await?;
        if !info.is_settled() {
            return Err(AppError::InvalidState(format!(
                "Payment not settled: {}",
                info.payment_status
            )));
        }

        let order = self
            .order_repo
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.payment_status == PaymentStatus::Paid {
            return Ok(SettleOutcome::AlreadyProcessed { order_id: order.id });
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let settled = self.order_repo.confirm_payment(&txn, &order.id).await?;
        if settled {
            self.creator_repo
                .credit_earnings(&txn, &order.creator_id, order.creator_earnings)
                .await?;
        }
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !settled {
            return Ok(SettleOutcome::AlreadyProcessed { order_id: order.id });
        }

        tracing::info!(
            order_id = %order.id,
            creator_id = %order.creator_id,
            earnings = %order.creator_earnings,
            "Payment settled, creator earnings credited"
        );
        self.activity
            .record(
                ActorType::System,
                None,
                actions::PAYMENT_CONFIRMED,
                format!("Payment confirmed for order {order_number}"),
                client,
                Some(json!({ "orderId": order.id, "paymentId": payment_id })),
            )
            .await;

        Ok(SettleOutcome::Settled { order_id: order.id })
    }

    /// Apply a creator's decision to one of their orders. The state guard
    /// runs inside the update itself, so a stale read can never
    /// double-apply a transition.
    pub async fn decide(
        &self,
        creator_id: &str,
        order_id: &str,
        input: OrderDecisionInput,
        client: &ClientInfo,
    ) -> AppResult<CreatorOrder> {
        input.validate()?;
        if !is_valid_id(order_id) {
            return Err(AppError::BadRequest("Invalid order ID format".to_string()));
        }

        // Ownership first: a missing or foreign order is 404, not a
        // state error.
        self.order_repo
            .find_owned_by_creator(order_id, creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let (applied, past_tense) = match input.action.as_str() {
            "accept" => (
                self.order_repo
                    .accept(order_id, creator_id, input.message)
                    .await?,
                "accepted",
            ),
            "reject" => (
                self.order_repo
                    .reject(order_id, creator_id, input.message)
                    .await?,
                "rejected",
            ),
            "complete" => (
                self.order_repo
                    .complete(order_id, creator_id, input.delivery_file, input.message)
                    .await?,
                "completed",
            ),
            _ => return Err(AppError::BadRequest("Invalid action".to_string())),
        };
        if !applied {
            return Err(AppError::InvalidState(format!(
                "Order cannot be {past_tense} in current state"
            )));
        }

        match past_tense {
            "accepted" => self.activity.order_accepted(creator_id, order_id, client).await,
            "completed" => {
                self.activity.order_completed(creator_id, order_id, client).await;
            }
            _ => {
                self.activity
                    .record(
                        ActorType::Creator,
                        Some(creator_id),
                        actions::ORDER_REJECTED,
                        format!("Order rejected: {order_id}"),
                        client,
                        Some(json!({ "orderId": order_id })),
                    )
                    .await;
            }
        }

        self.creator_order_detail(creator_id, order_id).await
    }

    /// List the user's own orders.
    pub async fn user_orders(
        &self,
        user_id: &str,
        query: OrderListQuery,
    ) -> AppResult<UserOrderList> {
        let (page, limit, offset) = page_params(query.page, query.limit, MAX_PAGE_SIZE);
        let status = parse_status(query.status.as_deref())?;

        let orders = self
            .order_repo
            .list_by_user(user_id, status, limit, offset)
            .await?;
        let total = self.order_repo.count_by_user(user_id, status).await?;

        let rows = self.user_rows(orders).await?;
        let fetched = rows.len() as u64;
        Ok(UserOrderList {
            orders: rows,
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    /// Get one of the user's orders, with a best-effort presigned
    /// download URL for the delivery file.
    pub async fn user_order_detail(
        &self,
        user_id: &str,
        order_id: &str,
    ) -> AppResult<UserOrderDetail> {
        if !is_valid_id(order_id) {
            return Err(AppError::BadRequest("Invalid order ID format".to_string()));
        }

        let order = self
            .order_repo
            .find_owned_by_user(order_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let delivery_file_url = match order.delivery_file.as_deref() {
            Some(key) => match self.storage.signed_download_url(key, SIGNED_URL_TTL_SECS).await {
                Ok(url) => Some(url),
                Err(e) => {
                    // The rest of the order is still useful without it.
                    tracing::warn!(
                        order_id = %order.id,
                        error = %e,
                        "Failed to sign delivery file URL"
                    );
                    None
                }
            },
            None => None,
        };

        let creator = self
            .creator_repo
            .find_by_id(&order.creator_id)
            .await?
            .map(|c| AccountRef {
                id: c.id,
                display_name: c.display_name,
                avatar: c.avatar,
                is_verified: c.is_verified,
            });
        let shoutout = self
            .shoutout_lookup(std::slice::from_ref(&order))
            .await?
            .remove(&order.shoutout_id);

        Ok(UserOrderDetail {
            id: order.id,
            order_number: order.order_number,
            instructions: order.instructions,
            price: order.price,
            commission_amount: order.commission_amount,
            creator_earnings: order.creator_earnings,
            status: order.status,
            payment_status: order.payment_status,
            payment_id: order.payment_id,
            delivery_file: order.delivery_file,
            delivery_file_url,
            creator_message: order.creator_message,
            user_response: order.user_response,
            accepted_at: order.accepted_at,
            completed_at: order.completed_at,
            created_at: order.created_at,
            updated_at: order.updated_at,
            creator,
            shoutout,
        })
    }

    /// List the creator's own orders.
    pub async fn creator_orders(
        &self,
        creator_id: &str,
        query: OrderListQuery,
    ) -> AppResult<CreatorOrderList> {
        let (page, limit, offset) = page_params(query.page, query.limit, MAX_PAGE_SIZE);
        let status = parse_status(query.status.as_deref())?;

        let orders = self
            .order_repo
            .list_by_creator(creator_id, status, limit, offset)
            .await?;
        let total = self.order_repo.count_by_creator(creator_id, status).await?;

        let rows = self.creator_rows(orders).await?;
        let fetched = rows.len() as u64;
        Ok(CreatorOrderList {
            orders: rows,
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    /// Get one of the creator's orders.
    pub async fn creator_order_detail(
        &self,
        creator_id: &str,
        order_id: &str,
    ) -> AppResult<CreatorOrder> {
        if !is_valid_id(order_id) {
            return Err(AppError::BadRequest("Invalid order ID format".to_string()));
        }

        let order = self
            .order_repo
            .find_owned_by_creator(order_id, creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        let mut rows = self.creator_rows(vec![order]).await?;
        rows.pop()
            .ok_or_else(|| AppError::Internal("Order row vanished".to_string()))
    }

    /// List all orders for the admin back office, with optional status
    /// filter and text search over order numbers and display names.
    pub async fn admin_orders(&self, query: AdminOrderQuery) -> AppResult<AdminOrderList> {
        let (page, limit, offset) = page_params(query.page, query.limit, MAX_ADMIN_PAGE_SIZE);
        let status = parse_status(query.status.as_deref())?;

        let search = match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => Some(OrderSearch {
                pattern: term.to_string(),
                user_ids: self.user_repo.find_ids_by_display_name_like(term).await?,
                creator_ids: self
                    .creator_repo
                    .find_ids_by_display_name_like(term)
                    .await?,
            }),
            None => None,
        };

        let orders = self
            .order_repo
            .list_admin(status, search.as_ref(), limit, offset)
            .await?;
        let total = self.order_repo.count_admin(status, search.as_ref()).await?;

        let rows = self.admin_rows(orders).await?;
        let fetched = rows.len() as u64;
        Ok(AdminOrderList {
            orders: rows,
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    fn frontend_redirect(&self, path: &str, pairs: &[(&str, &str)]) -> String {
        if pairs.is_empty() {
            return format!("{}{path}", self.frontend_url);
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}{path}?{query}", self.frontend_url)
    }

    /// Resolve the shoutouts referenced by a batch of orders, with their
    /// type names attached.
    async fn shoutout_lookup(
        &self,
        orders: &[order::Model],
    ) -> AppResult<HashMap<String, ShoutoutRef>> {
        let ids: Vec<String> = orders.iter().map(|o| o.shoutout_id.clone()).collect();
        let shoutouts = self.shoutout_repo.find_by_ids(&ids).await?;

        let type_ids: Vec<String> = shoutouts
            .iter()
            .map(|s| s.shoutout_type_id.clone())
            .collect();
        let type_names: HashMap<String, String> = self
            .type_repo
            .find_by_ids(&type_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        Ok(shoutouts
            .into_iter()
            .map(|s| {
                let type_name = type_names.get(&s.shoutout_type_id).cloned();
                (
                    s.id.clone(),
                    ShoutoutRef {
                        id: s.id,
                        title: s.title,
                        delivery_time: s.delivery_time,
                        type_name,
                    },
                )
            })
            .collect())
    }

    async fn user_rows(&self, orders: Vec<order::Model>) -> AppResult<Vec<UserOrder>> {
        let creator_ids: Vec<String> = orders.iter().map(|o| o.creator_id.clone()).collect();
        let creators: HashMap<String, AccountRef> = self
            .creator_repo
            .find_by_ids(&creator_ids)
            .await?
            .into_iter()
            .map(|c| {
                (
                    c.id.clone(),
                    AccountRef {
                        id: c.id,
                        display_name: c.display_name,
                        avatar: c.avatar,
                        is_verified: c.is_verified,
                    },
                )
            })
            .collect();
        let mut shoutouts = self.shoutout_lookup(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|order| UserOrder {
                creator: creators.get(&order.creator_id).cloned(),
                shoutout: shoutouts.remove(&order.shoutout_id),
                id: order.id,
                order_number: order.order_number,
                instructions: order.instructions,
                price: order.price,
                status: order.status,
                payment_status: order.payment_status,
                creator_message: order.creator_message,
                accepted_at: order.accepted_at,
                completed_at: order.completed_at,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
            .collect())
    }

    async fn creator_rows(&self, orders: Vec<order::Model>) -> AppResult<Vec<CreatorOrder>> {
        let user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        let users: HashMap<String, AccountRef> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id.clone(),
                    AccountRef {
                        id: u.id,
                        display_name: u.display_name,
                        avatar: u.avatar,
                        is_verified: u.is_verified,
                    },
                )
            })
            .collect();
        let mut shoutouts = self.shoutout_lookup(&orders).await?;

        Ok(orders
            .into_iter()
            .map(|order| CreatorOrder {
                user: users.get(&order.user_id).cloned(),
                shoutout: shoutouts.remove(&order.shoutout_id),
                id: order.id,
                order_number: order.order_number,
                instructions: order.instructions,
                price: order.price,
                creator_earnings: order.creator_earnings,
                status: order.status,
                payment_status: order.payment_status,
                delivery_file: order.delivery_file,
                creator_message: order.creator_message,
                user_response: order.user_response,
                accepted_at: order.accepted_at,
                completed_at: order.completed_at,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
            .collect())
    }

    async fn admin_rows(&self, orders: Vec<order::Model>) -> AppResult<Vec<AdminOrder>> {
        let user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        let creator_ids: Vec<String> = orders.iter().map(|o| o.creator_id.clone()).collect();

        let users: HashMap<String, AdminAccountRef> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id.clone(),
                    AdminAccountRef {
                        id: u.id,
                        display_name: u.display_name,
                        email: u.email,
                        avatar: u.avatar,
                    },
                )
            })
            .collect();
        let creators: HashMap<String, AdminAccountRef> = self
            .creator_repo
            .find_by_ids(&creator_ids)
            .await?
            .into_iter()
            .map(|c| {
                (
                    c.id.clone(),
                    AdminAccountRef {
                        id: c.id,
                        display_name: c.display_name,
                        email: c.email,
                        avatar: c.avatar,
                    },
                )
            })
            .collect();

        let shoutout_ids: Vec<String> = orders.iter().map(|o| o.shoutout_id.clone()).collect();
        let titles: HashMap<String, String> = self
            .shoutout_repo
            .find_by_ids(&shoutout_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s.title))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| AdminOrder {
                user: users.get(&order.user_id).cloned(),
                creator: creators.get(&order.creator_id).cloned(),
                shoutout_title: titles.get(&order.shoutout_id).cloned(),
                id: order.id,
                order_number: order.order_number,
                instructions: order.instructions,
                price: order.price,
                commission_amount: order.commission_amount,
                creator_earnings: order.creator_earnings,
                status: order.status,
                payment_status: order.payment_status,
                payment_id: order.payment_id,
                delivery_file: order.delivery_file,
                creator_message: order.creator_message,
                user_response: order.user_response,
                accepted_at: order.accepted_at,
                completed_at: order.completed_at,
                created_at: order.created_at,
                updated_at: order.updated_at,
            })
            .collect())
    }
}
