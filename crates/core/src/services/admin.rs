//! Admin back-office service: login, first-account bootstrap, the
//! platform dashboard, and user/creator management.
//!
//! Admin accounts are never created through login. The only provisioning
//! path is [`AdminService::bootstrap`], run once at startup with
//! configured credentials while the admin table is empty.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shoutly_common::{AppError, AppResult, AuthTokens, Config, IdGenerator, Role};
use shoutly_db::{
    entities::{
        activity_log::{self, ActorType},
        admin, creator,
        order::{self, OrderStatus, PaymentStatus},
        user,
    },
    repositories::{
        ActivityLogFilter, AdminRepository, CreatorRepository, OrderRepository,
        ShoutoutRepository, UserRepository, WithdrawalRepository,
    },
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};
use crate::services::creator::{CreatorProfile, DashboardWithdrawal};
use crate::services::password::{hash_password, verify_password};
use crate::services::user::UserProfile;

const DEFAULT_DASHBOARD_PERIOD_DAYS: i64 = 30;
const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;
const DEFAULT_LOG_PAGE_SIZE: u64 = 50;
const MAX_LOG_PAGE_SIZE: u64 = 200;
const DEFAULT_LOG_WINDOW_DAYS: i64 = 30;
const RECENT_ACTIVITY_LIMIT: u64 = 20;
const RECENT_ORDERS_LIMIT: u64 = 10;
const RECENT_WITHDRAWALS_LIMIT: u64 = 5;

/// Admin back-office service.
#[derive(Clone)]
pub struct AdminService {
    admin_repo: AdminRepository,
    user_repo: UserRepository,
    creator_repo: CreatorRepository,
    order_repo: OrderRepository,
    shoutout_repo: ShoutoutRepository,
    withdrawal_repo: WithdrawalRepository,
    activity: ActivityLogService,
    tokens: AuthTokens,
    id_gen: IdGenerator,
}

/// Input for admin login.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Page and search parameters for the user and creator lists.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

/// Filter parameters for the activity log list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub user_type: Option<String>,
    pub action: Option<String>,
    pub days: Option<i64>,
}

/// Admin-editable user fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserUpdateInput {
    #[validate(length(min = 1, max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

/// Admin-editable creator fields, including the commission and
/// withdrawal switches that govern the money flow.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreatorUpdateInput {
    #[validate(length(min = 1, max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_sponsored: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_permission: Option<bool>,
}

/// An admin account as exposed to its owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<admin::Model> for AdminProfile {
    fn from(admin: admin::Model) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            first_name: admin.first_name,
            last_name: admin.last_name,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

/// Token plus account snapshot returned by admin login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuthResponse {
    pub token: String,
    pub account: AdminProfile,
}

/// Page cursor echoed on every admin list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub(crate) fn new(page: u64, limit: u64, offset: u64, fetched: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            has_next: offset + fetched < total,
            has_prev: page > 1,
        }
    }
}

/// User row in the admin list, annotated with paid-order stats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    pub country: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub order_count: u64,
    pub total_spent: Decimal,
}

/// Admin user list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserList {
    pub users: Vec<AdminUserSummary>,
    pub pagination: Pagination,
}

/// Order statistics on the admin user detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrderStats {
    pub total_orders: u64,
    /// Spend across paid orders only.
    pub total_spent: Decimal,
    pub completed_orders: u64,
}

/// Compact order row on admin detail pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderRow {
    pub id: String,
    pub order_number: String,
    pub price: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<order::Model> for AdminOrderRow {
    fn from(order: order::Model) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            price: order.price,
            status: order.status,
            payment_status: order.payment_status,
            created_at: order.created_at,
        }
    }
}

/// Admin user detail page: the account plus stats and recent orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub stats: UserOrderStats,
    pub recent_orders: Vec<AdminOrderRow>,
}

/// Creator row in the admin list, annotated with paid-order stats.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreatorSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    pub country: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub is_sponsored: bool,
    pub commission_rate: Decimal,
    pub withdrawal_permission: bool,
    pub total_earnings: Decimal,
    pub available_balance: Decimal,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub order_count: u64,
    pub total_revenue: Decimal,
}

/// Admin creator list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreatorList {
    pub creators: Vec<AdminCreatorSummary>,
    pub pagination: Pagination,
}

/// Statistics on the admin creator detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorAdminStats {
    pub total_orders: u64,
    /// Revenue across paid orders only.
    pub total_revenue: Decimal,
    pub completed_orders: u64,
    /// All of the creator's shoutouts, active or not.
    pub shoutout_count: u64,
    pub total_withdrawals: u64,
    /// Lifetime requested withdrawal volume, any status.
    pub total_withdrawn: Decimal,
}

/// Admin creator detail page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreatorDetail {
    #[serde(flatten)]
    pub profile: CreatorProfile,
    pub stats: CreatorAdminStats,
    pub recent_orders: Vec<AdminOrderRow>,
    pub recent_withdrawals: Vec<DashboardWithdrawal>,
}

/// Activity log entry as exposed to the back office.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogEntry {
    pub id: String,
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub action: String,
    pub description: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<activity_log::Model> for ActivityLogEntry {
    fn from(entry: activity_log::Model) -> Self {
        Self {
            id: entry.id,
            actor_type: entry.actor_type,
            actor_id: entry.actor_id,
            action: entry.action,
            description: entry.description,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            metadata: entry.metadata,
            created_at: entry.created_at,
        }
    }
}

/// Activity log page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogList {
    pub logs: Vec<ActivityLogEntry>,
    pub pagination: Pagination,
}

/// Platform-wide counters at the top of the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardStats {
    pub total_users: u64,
    pub total_creators: u64,
    pub total_orders: u64,
    pub completed_orders: u64,
    pub pending_withdrawals: u64,
    pub period_users: u64,
    pub period_creators: u64,
    pub period_orders: u64,
    /// Platform commission on orders completed within the period.
    pub period_revenue: Decimal,
}

/// Recent order row on the admin dashboard, annotated with the two
/// account display names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOrderRow {
    pub id: String,
    pub order_number: String,
    pub price: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub user_display_name: Option<String>,
    pub creator_display_name: Option<String>,
}

/// Admin dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub stats: AdminDashboardStats,
    pub recent_activities: Vec<ActivityLogEntry>,
    pub recent_orders: Vec<DashboardOrderRow>,
}

fn page_params(
    page: Option<u64>,
    limit: Option<u64>,
    default_limit: u64,
    max_limit: u64,
) -> (u64, u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, max_limit);
    (page, limit, (page - 1) * limit)
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub fn new(
        admin_repo: AdminRepository,
        user_repo: UserRepository,
        creator_repo: CreatorRepository,
        order_repo: OrderRepository,
        shoutout_repo: ShoutoutRepository,
        withdrawal_repo: WithdrawalRepository,
        activity: ActivityLogService,
        config: &Config,
    ) -> Self {
        Self {
            admin_repo,
            user_repo,
            creator_repo,
            order_repo,
            shoutout_repo,
            withdrawal_repo,
            activity,
            tokens: AuthTokens::new(&config.auth),
            id_gen: IdGenerator::new(),
        }
    }

    /// Authenticate an admin by email and password.
    pub async fn login(
        &self,
        input: AdminLoginInput,
        client: &ClientInfo,
    ) -> AppResult<AdminAuthResponse> {
        input.validate()?;

        let admin = self
            .admin_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &admin.password)? {
            return Err(AppError::Unauthorized);
        }

        self.activity
            .admin_action(
                &admin.id,
                actions::LOGIN,
                format!("Admin logged in: {}", admin.email),
                None,
                client,
            )
            .await;

        let token = self.tokens.issue(&admin.id, Role::Admin, &admin.email)?;

        Ok(AdminAuthResponse {
            token,
            account: admin.into(),
        })
    }

    /// Create the first admin account if the table is empty. Returns
    /// whether an account was created, so repeated startups are no-ops.
    pub async fn bootstrap(&self, email: &str, password: &str) -> AppResult<bool> {
        if self.admin_repo.count_all().await? > 0 {
            return Ok(false);
        }

        let now = Utc::now();
        let model = admin::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(email.to_string()),
            password: Set(hash_password(password)?),
            first_name: Set("Admin".to_string()),
            last_name: Set("User".to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let admin = self.admin_repo.create(model).await?;

        self.activity
            .admin_action(
                &admin.id,
                actions::ADMIN_ACCOUNT_CREATED,
                "First admin account created".to_string(),
                None,
                &ClientInfo::default(),
            )
            .await;

        tracing::info!(admin_id = %admin.id, "Bootstrapped first admin account");
        Ok(true)
    }

    /// Assemble the platform dashboard: lifetime and period counters
    /// plus recent activity and orders.
    pub async fn dashboard(&self, period_days: Option<i64>) -> AppResult<AdminDashboard> {
        let period_days = period_days.unwrap_or(DEFAULT_DASHBOARD_PERIOD_DAYS);
        let since = Utc::now() - chrono::Duration::days(period_days);

        let stats = AdminDashboardStats {
            total_users: self.user_repo.count_all().await?,
            total_creators: self.creator_repo.count_all().await?,
            total_orders: self.order_repo.count_all().await?,
            completed_orders: self
                .order_repo
                .count_with_status(OrderStatus::Completed)
                .await?,
            pending_withdrawals: self.withdrawal_repo.count_pending().await?,
            period_users: self.user_repo.count_since(since).await?,
            period_creators: self.creator_repo.count_since(since).await?,
            period_orders: self.order_repo.count_since(since).await?,
            period_revenue: self
                .order_repo
                .sum_commission_completed_since(since)
                .await?,
        };

        let recent_activities = self
            .activity
            .recent(RECENT_ACTIVITY_LIMIT)
            .await?
            .into_iter()
            .map(ActivityLogEntry::from)
            .collect();

        let orders = self.order_repo.recent(RECENT_ORDERS_LIMIT).await?;
        let recent_orders = self.annotate_orders(orders).await?;

        Ok(AdminDashboard {
            stats,
            recent_activities,
            recent_orders,
        })
    }

    /// List users with paid-order stats per row.
    pub async fn list_users(&self, query: PageQuery) -> AppResult<AdminUserList> {
        let (page, limit, offset) =
            page_params(query.page, query.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let search = query.search.as_deref();

        let users = self.user_repo.list(search, limit, offset).await?;
        let total = self.user_repo.count(search).await?;

        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            let order_count = self.order_repo.count_paid_by_user(&user.id).await?;
            let total_spent = self.order_repo.sum_paid_by_user(&user.id).await?;
            summaries.push(AdminUserSummary {
                id: user.id,
                first_name: user.first_name,
                last_name: user.last_name,
                display_name: user.display_name,
                email: user.email,
                country: user.country,
                avatar: user.avatar,
                is_verified: user.is_verified,
                created_at: user.created_at,
                updated_at: user.updated_at,
                order_count,
                total_spent,
            });
        }

        let fetched = summaries.len() as u64;
        Ok(AdminUserList {
            users: summaries,
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    /// Get a user with order stats and recent orders.
    pub async fn user_detail(&self, user_id: &str) -> AppResult<AdminUserDetail> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let stats = UserOrderStats {
            total_orders: self.order_repo.count_by_user(user_id, None).await?,
            total_spent: self.order_repo.sum_paid_by_user(user_id).await?,
            completed_orders: self
                .order_repo
                .count_by_user(user_id, Some(OrderStatus::Completed))
                .await?,
        };

        let recent_orders = self
            .order_repo
            .list_by_user(user_id, None, RECENT_ORDERS_LIMIT, 0)
            .await?
            .into_iter()
            .map(AdminOrderRow::from)
            .collect();

        Ok(AdminUserDetail {
            profile: user.into(),
            stats,
            recent_orders,
        })
    }

    /// Apply admin edits to a user account.
    pub async fn update_user(
        &self,
        admin_id: &str,
        user_id: &str,
        input: AdminUserUpdateInput,
        client: &ClientInfo,
    ) -> AppResult<UserProfile> {
        input.validate()?;
        let changes = serde_json::to_value(&input).unwrap_or_default();

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(is_verified) = input.is_verified {
            active.is_verified = Set(is_verified);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.user_repo.update(active).await?;

        self.activity
            .admin_action(
                admin_id,
                actions::USER_UPDATED,
                format!("Updated user: {}", updated.email),
                Some(json!({ "userId": user_id, "changes": changes })),
                client,
            )
            .await;

        Ok(updated.into())
    }

    /// List creators with paid-order stats per row.
    pub async fn list_creators(&self, query: PageQuery) -> AppResult<AdminCreatorList> {
        let (page, limit, offset) =
            page_params(query.page, query.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let search = query.search.as_deref();

        let creators = self.creator_repo.list(search, limit, offset).await?;
        let total = self.creator_repo.count(search).await?;

        let mut summaries = Vec::with_capacity(creators.len());
        for creator in creators {
            let order_count = self.order_repo.count_paid_by_creator(&creator.id).await?;
            let total_revenue = self.order_repo.sum_paid_by_creator(&creator.id).await?;
            summaries.push(AdminCreatorSummary {
                id: creator.id,
                first_name: creator.first_name,
                last_name: creator.last_name,
                display_name: creator.display_name,
                email: creator.email,
                country: creator.country,
                avatar: creator.avatar,
                is_verified: creator.is_verified,
                is_sponsored: creator.is_sponsored,
                commission_rate: creator.commission_rate,
                withdrawal_permission: creator.withdrawal_permission,
                total_earnings: creator.total_earnings,
                available_balance: creator.available_balance,
                created_at: creator.created_at,
                updated_at: creator.updated_at,
                order_count,
                total_revenue,
            });
        }

        let fetched = summaries.len() as u64;
        Ok(AdminCreatorList {
            creators: summaries,
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    /// Get a creator with order, shoutout, and withdrawal stats.
    pub async fn creator_detail(&self, creator_id: &str) -> AppResult<AdminCreatorDetail> {
        let creator = self.creator_repo.get_by_id(creator_id).await?;

        let stats = CreatorAdminStats {
            total_orders: self.order_repo.count_by_creator(creator_id, None).await?,
            total_revenue: self.order_repo.sum_paid_by_creator(creator_id).await?,
            completed_orders: self
                .order_repo
                .count_by_creator(creator_id, Some(OrderStatus::Completed))
                .await?,
            shoutout_count: self.shoutout_repo.count_by_creator(creator_id).await?,
            total_withdrawals: self.withdrawal_repo.count_by_creator(creator_id).await?,
            total_withdrawn: self
                .withdrawal_repo
                .sum_amount_by_creator(creator_id)
                .await?,
        };

        let recent_orders = self
            .order_repo
            .recent_by_creator(creator_id, RECENT_ORDERS_LIMIT)
            .await?
            .into_iter()
            .map(AdminOrderRow::from)
            .collect();

        let recent_withdrawals = self
            .withdrawal_repo
            .recent_by_creator(creator_id, RECENT_WITHDRAWALS_LIMIT)
            .await?
            .into_iter()
            .map(DashboardWithdrawal::from)
            .collect();

        Ok(AdminCreatorDetail {
            profile: creator.into(),
            stats,
            recent_orders,
            recent_withdrawals,
        })
    }

    /// Apply admin edits to a creator account.
    pub async fn update_creator(
        &self,
        admin_id: &str,
        creator_id: &str,
        input: AdminCreatorUpdateInput,
        client: &ClientInfo,
    ) -> AppResult<CreatorProfile> {
        input.validate()?;

        if let Some(rate) = input.commission_rate {
            if rate < Decimal::ZERO || rate > Decimal::from(50) {
                return Err(AppError::Validation(
                    "Commission rate must be between 0 and 50".to_string(),
                ));
            }
        }

        let changes = serde_json::to_value(&input).unwrap_or_default();

        let creator = self.creator_repo.get_by_id(creator_id).await?;
        let mut active: creator::ActiveModel = creator.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(is_verified) = input.is_verified {
            active.is_verified = Set(is_verified);
        }
        if let Some(is_sponsored) = input.is_sponsored {
            active.is_sponsored = Set(is_sponsored);
        }
        if let Some(commission_rate) = input.commission_rate {
            active.commission_rate = Set(commission_rate);
        }
        if let Some(withdrawal_permission) = input.withdrawal_permission {
            active.withdrawal_permission = Set(withdrawal_permission);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.creator_repo.update(active).await?;

        self.activity
            .admin_action(
                admin_id,
                actions::CREATOR_UPDATED,
                format!("Updated creator: {}", updated.email),
                Some(json!({ "creatorId": creator_id, "changes": changes })),
                client,
            )
            .await;

        Ok(updated.into())
    }

    /// List activity log entries for the back office.
    pub async fn activity_logs(&self, query: ActivityLogQuery) -> AppResult<ActivityLogList> {
        let (page, limit, offset) =
            page_params(query.page, query.limit, DEFAULT_LOG_PAGE_SIZE, MAX_LOG_PAGE_SIZE);

        let actor_type = match query.user_type.as_deref() {
            None | Some("") => None,
            Some("user") => Some(ActorType::User),
            Some("creator") => Some(ActorType::Creator),
            Some("admin") => Some(ActorType::Admin),
            Some("system") => Some(ActorType::System),
            Some(_) => return Err(AppError::BadRequest("Invalid actor type".to_string())),
        };

        let days = query.days.unwrap_or(DEFAULT_LOG_WINDOW_DAYS);
        let filter = ActivityLogFilter {
            since: Some(Utc::now() - chrono::Duration::days(days)),
            actor_type,
            action: query.action,
            search: query.search,
        };

        let (entries, total) = self.activity.list(&filter, limit, offset).await?;
        let fetched = entries.len() as u64;
        let logs = entries.into_iter().map(ActivityLogEntry::from).collect();

        Ok(ActivityLogList {
            logs,
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    async fn annotate_orders(
        &self,
        orders: Vec<order::Model>,
    ) -> AppResult<Vec<DashboardOrderRow>> {
        let user_ids: Vec<String> = orders.iter().map(|o| o.user_id.clone()).collect();
        let creator_ids: Vec<String> = orders.iter().map(|o| o.creator_id.clone()).collect();

        let users: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.display_name))
            .collect();
        let creators: HashMap<String, String> = self
            .creator_repo
            .find_by_ids(&creator_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.display_name))
            .collect();

        Ok(orders
            .into_iter()
            .map(|order| DashboardOrderRow {
                user_display_name: users.get(&order.user_id).cloned(),
                creator_display_name: creators.get(&order.creator_id).cloned(),
                id: order.id,
                order_number: order.order_number,
                price: order.price,
                status: order.status,
                payment_status: order.payment_status,
                created_at: order.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use shoutly_common::config::{
        AuthConfig, BootstrapConfig, BotCheckConfig, DatabaseConfig, PaymentConfig,
        RetentionConfig, ServerConfig, StorageSettings,
    };
    use shoutly_db::repositories::ActivityLogRepository;
    use std::sync::Arc;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            payment: PaymentConfig::default(),
            bot_check: BotCheckConfig::default(),
            storage: StorageSettings::default(),
            retention: RetentionConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }

    fn create_test_admin(id: &str, email: &str) -> admin::Model {
        admin::Model {
            id: id.to_string(),
            email: email.to_string(),
            password: hash_password("Password1").unwrap(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_user(id: &str, email: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            display_name: "test_user".to_string(),
            email: email.to_string(),
            password: hash_password("Password1").unwrap(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            country: "US".to_string(),
            avatar: None,
            is_verified: false,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_order(id: &str) -> order::Model {
        order::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            creator_id: "creator1".to_string(),
            shoutout_id: "shoutout1".to_string(),
            order_number: "SO-0123456789ABCDEF0".to_string(),
            instructions: None,
            price: dec!(50.00),
            commission_rate: dec!(15.00),
            commission_amount: dec!(7.50),
            creator_earnings: dec!(42.50),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            payment_id: None,
            delivery_file: None,
            creator_message: None,
            user_response: None,
            accepted_at: None,
            completed_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_creator_model(id: &str, email: &str) -> creator::Model {
        creator::Model {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "Creator".to_string(),
            display_name: "test_creator".to_string(),
            email: email.to_string(),
            password: hash_password("Password1").unwrap(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            country: "US".to_string(),
            avatar: None,
            bio: None,
            is_verified: false,
            is_sponsored: false,
            commission_rate: dec!(15.00),
            withdrawal_permission: true,
            total_earnings: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            payout_method: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    struct TestDbs {
        admin: Arc<sea_orm::DatabaseConnection>,
        user: Arc<sea_orm::DatabaseConnection>,
        creator: Arc<sea_orm::DatabaseConnection>,
        order: Arc<sea_orm::DatabaseConnection>,
        shoutout: Arc<sea_orm::DatabaseConnection>,
        withdrawal: Arc<sea_orm::DatabaseConnection>,
        activity: Arc<sea_orm::DatabaseConnection>,
    }

    impl Default for TestDbs {
        fn default() -> Self {
            Self {
                admin: empty_mock(),
                user: empty_mock(),
                creator: empty_mock(),
                order: empty_mock(),
                shoutout: empty_mock(),
                withdrawal: empty_mock(),
                activity: empty_mock(),
            }
        }
    }

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn sum_row(value: Decimal) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "total" => sea_orm::Value::Decimal(Some(Box::new(value))) }
    }

    fn create_test_service(dbs: TestDbs) -> AdminService {
        let config = create_test_config();
        AdminService::new(
            AdminRepository::new(dbs.admin),
            UserRepository::new(dbs.user),
            CreatorRepository::new(dbs.creator),
            OrderRepository::new(dbs.order),
            ShoutoutRepository::new(dbs.shoutout),
            WithdrawalRepository::new(dbs.withdrawal),
            ActivityLogService::new(ActivityLogRepository::new(dbs.activity)),
            &config,
        )
    }

    #[tokio::test]
    async fn test_login_issues_admin_token() {
        let admin = create_test_admin("admin1", "admin@example.com");

        let dbs = TestDbs {
            admin: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[admin]])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);
        let config = create_test_config();

        let response = service
            .login(
                AdminLoginInput {
                    email: "admin@example.com".to_string(),
                    password: "Password1".to_string(),
                },
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        let principal = AuthTokens::new(&config.auth).verify(&response.token).unwrap();
        assert_eq!(principal.id, "admin1");
        assert_eq!(principal.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let admin = create_test_admin("admin1", "admin@example.com");

        let dbs = TestDbs {
            admin: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[admin]])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);

        let result = service
            .login(
                AdminLoginInput {
                    email: "admin@example.com".to_string(),
                    password: "WrongPassword1".to_string(),
                },
                &ClientInfo::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_never_provisions_accounts() {
        // Empty admin table: login must fail, not create an account.
        let dbs = TestDbs {
            admin: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<admin::Model>::new()])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);

        let result = service
            .login(
                AdminLoginInput {
                    email: "first@example.com".to_string(),
                    password: "Password1".to_string(),
                },
                &ClientInfo::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bootstrap_creates_first_admin() {
        let created = create_test_admin("admin1", "first@example.com");

        let dbs = TestDbs {
            admin: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(0)]])
                    .append_query_results([[created]])
                    .append_exec_results([MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    }])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);

        let created = service
            .bootstrap("first@example.com", "Password1")
            .await
            .unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let dbs = TestDbs {
            admin: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(1)]])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);

        let created = service
            .bootstrap("first@example.com", "Password1")
            .await
            .unwrap();
        assert!(!created);
    }

    #[tokio::test]
    async fn test_update_creator_rejects_out_of_range_commission() {
        let service = create_test_service(TestDbs::default());

        let result = service
            .update_creator(
                "admin1",
                "creator1",
                AdminCreatorUpdateInput {
                    first_name: None,
                    last_name: None,
                    is_verified: None,
                    is_sponsored: None,
                    commission_rate: Some(dec!(75)),
                    withdrawal_permission: None,
                },
                &ClientInfo::default(),
            )
            .await;
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Commission rate must be between 0 and 50");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_activity_logs_rejects_unknown_actor_type() {
        let service = create_test_service(TestDbs::default());

        let result = service
            .activity_logs(ActivityLogQuery {
                user_type: Some("robot".to_string()),
                ..ActivityLogQuery::default()
            })
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid actor type"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_list_users_attaches_paid_order_stats() {
        let user = create_test_user("user1", "buyer@example.com");

        let dbs = TestDbs {
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[user]])
                    .append_query_results([[count_row(1)]])
                    .into_connection(),
            ),
            order: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(3)]])
                    .append_query_results([[sum_row(dec!(150.00))]])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);

        let list = service.list_users(PageQuery::default()).await.unwrap();

        assert_eq!(list.users.len(), 1);
        assert_eq!(list.users[0].order_count, 3);
        assert_eq!(list.users[0].total_spent, dec!(150.00));
        assert_eq!(
            list.pagination,
            Pagination {
                page: 1,
                limit: 20,
                has_next: false,
                has_prev: false,
            }
        );
    }

    #[tokio::test]
    async fn test_dashboard_aggregates_platform_counters() {
        let order = create_test_order("order1");
        let user = create_test_user("user1", "buyer@example.com");
        let creator = create_test_creator_model("creator1", "creator@example.com");

        let dbs = TestDbs {
            user: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(100)]])
                    .append_query_results([[count_row(5)]])
                    .append_query_results([[user]])
                    .into_connection(),
            ),
            creator: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(40)]])
                    .append_query_results([[count_row(2)]])
                    .append_query_results([[creator]])
                    .into_connection(),
            ),
            order: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(250)]])
                    .append_query_results([[count_row(180)]])
                    .append_query_results([[count_row(9)]])
                    .append_query_results([[sum_row(dec!(320.75))]])
                    .append_query_results([[order]])
                    .into_connection(),
            ),
            withdrawal: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([[count_row(4)]])
                    .into_connection(),
            ),
            activity: Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results([Vec::<activity_log::Model>::new()])
                    .into_connection(),
            ),
            ..TestDbs::default()
        };
        let service = create_test_service(dbs);

        let dashboard = service.dashboard(None).await.unwrap();

        assert_eq!(
            dashboard.stats,
            AdminDashboardStats {
                total_users: 100,
                total_creators: 40,
                total_orders: 250,
                completed_orders: 180,
                pending_withdrawals: 4,
                period_users: 5,
                period_creators: 2,
                period_orders: 9,
                period_revenue: dec!(320.75),
            }
        );
        assert_eq!(dashboard.recent_orders.len(), 1);
        assert_eq!(
            dashboard.recent_orders[0].user_display_name.as_deref(),
            Some("test_user")
        );
        assert_eq!(
            dashboard.recent_orders[0].creator_display_name.as_deref(),
            Some("test_creator")
        );
    }
}
