//! Creator (seller) account service: registration, profile, uploads,
//! and the earnings dashboard.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use shoutly_common::{
    AppError, AppResult, AuthTokens, Config, IdGenerator, Role, SIGNED_URL_TTL_SECS,
    StorageBackend, UploadPurpose, object_key,
};
use shoutly_db::{
    entities::{
        activity_log::ActorType,
        creator,
        order::{OrderStatus, PaymentStatus},
        withdrawal::{self, WithdrawalStatus},
    },
    repositories::{CreatorRepository, OrderRepository, ShoutoutRepository, WithdrawalRepository},
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};
use crate::services::bot_check::BotCheckService;
use crate::services::password::{hash_password, is_strong_password, verify_password};
use crate::services::user::{
    ChangePasswordInput, LoginInput, RegisterInput, SetAvatarInput, UploadUrlResponse,
    is_valid_display_name, validate_registration,
};

/// Dashboard window when the caller does not pass one.
const DEFAULT_DASHBOARD_PERIOD_DAYS: i64 = 30;

const RECENT_ORDERS_LIMIT: u64 = 10;
const RECENT_WITHDRAWALS_LIMIT: u64 = 5;

/// Creator account service.
#[derive(Clone)]
pub struct CreatorService {
    creator_repo: CreatorRepository,
    order_repo: OrderRepository,
    shoutout_repo: ShoutoutRepository,
    withdrawal_repo: WithdrawalRepository,
    activity: ActivityLogService,
    bot_check: BotCheckService,
    storage: Arc<dyn StorageBackend>,
    tokens: AuthTokens,
    id_gen: IdGenerator,
}

/// Input for updating the creator profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCreatorProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,

    #[validate(length(min = 3, max = 50))]
    pub display_name: Option<String>,

    #[validate(length(min = 1))]
    pub country: Option<String>,

    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

/// Input for requesting an upload URL. Creators upload both avatars and
/// order delivery files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorUploadUrlInput {
    pub content_type: String,
    pub purpose: String,
}

/// A creator account as exposed to its owner, including the ledger
/// fields. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    pub date_of_birth: chrono::NaiveDate,
    pub country: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub is_verified: bool,
    pub is_sponsored: bool,
    pub commission_rate: Decimal,
    pub withdrawal_permission: bool,
    pub total_earnings: Decimal,
    pub available_balance: Decimal,
    pub payout_method: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<creator::Model> for CreatorProfile {
    fn from(creator: creator::Model) -> Self {
        Self {
            id: creator.id,
            first_name: creator.first_name,
            last_name: creator.last_name,
            display_name: creator.display_name,
            email: creator.email,
            date_of_birth: creator.date_of_birth,
            country: creator.country,
            avatar: creator.avatar,
            bio: creator.bio,
            is_verified: creator.is_verified,
            is_sponsored: creator.is_sponsored,
            commission_rate: creator.commission_rate,
            withdrawal_permission: creator.withdrawal_permission,
            total_earnings: creator.total_earnings,
            available_balance: creator.available_balance,
            payout_method: creator.payout_method,
            created_at: creator.created_at,
            updated_at: creator.updated_at,
        }
    }
}

/// Token plus account snapshot returned by creator register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorAuthResponse {
    pub token: String,
    pub account: CreatorProfile,
}

/// Aggregate counters shown at the top of the creator dashboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub completed_orders: u64,
    /// Paid orders still waiting for the creator to act.
    pub pending_orders: u64,
    pub active_shoutouts: u64,
    pub period_orders: u64,
    pub period_earnings: Decimal,
}

/// Recent order row on the dashboard, annotated with the shoutout title.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOrder {
    pub id: String,
    pub order_number: String,
    pub price: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub accepted_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub completed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub shoutout_title: Option<String>,
}

/// Recent withdrawal row on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWithdrawal {
    pub id: String,
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub processed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl From<withdrawal::Model> for DashboardWithdrawal {
    fn from(withdrawal: withdrawal::Model) -> Self {
        Self {
            id: withdrawal.id,
            amount: withdrawal.amount,
            status: withdrawal.status,
            created_at: withdrawal.created_at,
            processed_at: withdrawal.processed_at,
        }
    }
}

/// Creator dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorDashboard {
    pub stats: DashboardStats,
    pub recent_orders: Vec<DashboardOrder>,
    pub recent_withdrawals: Vec<DashboardWithdrawal>,
}

/// Commission applied to new creators until an admin changes it.
fn default_commission_rate() -> Decimal {
    Decimal::new(1500, 2)
}

impl CreatorService {
    /// Create a new creator service.
    #[must_use]
    pub fn new(
        creator_repo: CreatorRepository,
        order_repo: OrderRepository,
        shoutout_repo: ShoutoutRepository,
        withdrawal_repo: WithdrawalRepository,
        activity: ActivityLogService,
        bot_check: BotCheckService,
        storage: Arc<dyn StorageBackend>,
        config: &Config,
    ) -> Self {
        Self {
            creator_repo,
            order_repo,
            shoutout_repo,
            withdrawal_repo,
            activity,
            bot_check,
            storage,
            tokens: AuthTokens::new(&config.auth),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new creator account. Fresh accounts start with the
    /// default commission rate, withdrawal permission, and a zeroed
    /// ledger.
    pub async fn register(
        &self,
        input: RegisterInput,
        client: &ClientInfo,
    ) -> AppResult<CreatorAuthResponse> {
        input.validate()?;
        validate_registration(&input)?;

        self.bot_check
            .verify(&input.turnstile_token, client.ip_address.as_deref())
            .await?;

        if self
            .creator_repo
            .find_by_email(&input.email)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        if self
            .creator_repo
            .find_by_display_name(&input.display_name)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Display name already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();

        let model = creator::ActiveModel {
            id: Set(self.id_gen.generate()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            display_name: Set(input.display_name),
            email: Set(input.email),
            password: Set(password_hash),
            date_of_birth: Set(input.date_of_birth),
            country: Set(input.country),
            avatar: Set(None),
            bio: Set(None),
            is_verified: Set(false),
            is_sponsored: Set(false),
            commission_rate: Set(default_commission_rate()),
            withdrawal_permission: Set(true),
            total_earnings: Set(Decimal::ZERO),
            available_balance: Set(Decimal::ZERO),
            payout_method: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let creator = self.creator_repo.create(model).await?;

        self.activity
            .creator_registered(&creator.id, &creator.email, client)
            .await;

        let token = self
            .tokens
            .issue(&creator.id, Role::Creator, &creator.email)?;
        tracing::info!(creator_id = %creator.id, "Creator registered");

        Ok(CreatorAuthResponse {
            token,
            account: creator.into(),
        })
    }

    /// Authenticate by email and password.
    pub async fn login(
        &self,
        input: LoginInput,
        client: &ClientInfo,
    ) -> AppResult<CreatorAuthResponse> {
        input.validate()?;

        self.bot_check
            .verify(&input.turnstile_token, client.ip_address.as_deref())
            .await?;

        let creator = self
            .creator_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &creator.password)? {
            return Err(AppError::Unauthorized);
        }

        self.activity
            .creator_logged_in(&creator.id, &creator.email, client)
            .await;

        let token = self
            .tokens
            .issue(&creator.id, Role::Creator, &creator.email)?;

        Ok(CreatorAuthResponse {
            token,
            account: creator.into(),
        })
    }

    /// Get the owner view of a creator account.
    pub async fn profile(&self, creator_id: &str) -> AppResult<CreatorProfile> {
        Ok(self.creator_repo.get_by_id(creator_id).await?.into())
    }

    /// Update profile fields. A changed display name must stay unique
    /// across creators.
    pub async fn update_profile(
        &self,
        creator_id: &str,
        input: UpdateCreatorProfileInput,
        client: &ClientInfo,
    ) -> AppResult<CreatorProfile> {
        input.validate()?;

        if let Some(ref display_name) = input.display_name {
            if !is_valid_display_name(display_name) {
                return Err(AppError::Validation(
                    "Display name can only contain letters, numbers, and underscores".to_string(),
                ));
            }

            if let Some(existing) = self
                .creator_repo
                .find_by_display_name(display_name)
                .await?
            {
                if existing.id != creator_id {
                    return Err(AppError::BadRequest(
                        "Display name already taken".to_string(),
                    ));
                }
            }
        }

        let creator = self.creator_repo.get_by_id(creator_id).await?;
        let email = creator.email.clone();
        let mut active: creator::ActiveModel = creator.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(display_name) = input.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(country) = input.country {
            active.country = Set(country);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = self.creator_repo.update(active).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::PROFILE_UPDATED,
                format!("Profile updated: {email}"),
                client,
                None,
            )
            .await;

        Ok(updated.into())
    }

    /// Change the password after verifying the current one.
    pub async fn change_password(
        &self,
        creator_id: &str,
        input: ChangePasswordInput,
        client: &ClientInfo,
    ) -> AppResult<()> {
        input.validate()?;

        if !is_strong_password(&input.new_password) {
            return Err(AppError::Validation(
                "Password must contain at least one lowercase letter, one uppercase letter, and one number"
                    .to_string(),
            ));
        }

        let creator = self.creator_repo.get_by_id(creator_id).await?;

        if !verify_password(&input.current_password, &creator.password)? {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let email = creator.email.clone();
        let mut active: creator::ActiveModel = creator.into();
        active.password = Set(hash_password(&input.new_password)?);
        active.updated_at = Set(Utc::now().into());

        self.creator_repo.update(active).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::PASSWORD_CHANGED,
                format!("Password changed: {email}"),
                client,
                None,
            )
            .await;

        Ok(())
    }

    /// Issue a presigned upload URL for an avatar or a delivery file.
    pub async fn upload_url(
        &self,
        creator_id: &str,
        input: CreatorUploadUrlInput,
    ) -> AppResult<UploadUrlResponse> {
        let purpose = UploadPurpose::parse(&input.purpose)?;

        let file_key = object_key(
            purpose,
            creator_id,
            &self.id_gen.generate_object_id(),
            &input.content_type,
        )?;

        let upload_url = self
            .storage
            .signed_upload_url(&file_key, &input.content_type, SIGNED_URL_TTL_SECS)
            .await?;

        Ok(UploadUrlResponse {
            upload_url,
            file_key,
        })
    }

    /// Point the account at an uploaded avatar object.
    pub async fn set_avatar(
        &self,
        creator_id: &str,
        input: SetAvatarInput,
        client: &ClientInfo,
    ) -> AppResult<CreatorProfile> {
        let file_key = match input.file_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AppError::BadRequest("File key is required".to_string())),
        };

        let creator = self.creator_repo.get_by_id(creator_id).await?;
        let email = creator.email.clone();
        let mut active: creator::ActiveModel = creator.into();
        active.avatar = Set(Some(file_key));
        active.updated_at = Set(Utc::now().into());

        let updated = self.creator_repo.update(active).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::AVATAR_UPDATED,
                format!("Avatar updated: {email}"),
                client,
                None,
            )
            .await;

        Ok(updated.into())
    }

    /// Clear the avatar. The stored object is deleted best-effort.
    pub async fn remove_avatar(&self, creator_id: &str, client: &ClientInfo) -> AppResult<()> {
        let creator = self.creator_repo.get_by_id(creator_id).await?;

        if let Some(ref key) = creator.avatar {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(error = %e, key = %key, "Failed to delete avatar object");
            }
        }

        let email = creator.email.clone();
        let mut active: creator::ActiveModel = creator.into();
        active.avatar = Set(None);
        active.updated_at = Set(Utc::now().into());

        self.creator_repo.update(active).await?;

        self.activity
            .record(
                ActorType::Creator,
                Some(creator_id),
                actions::AVATAR_UPDATED,
                format!("Avatar removed: {email}"),
                client,
                None,
            )
            .await;

        Ok(())
    }

    /// Assemble the dashboard: lifetime and period counters plus the
    /// most recent orders and withdrawals.
    pub async fn dashboard(
        &self,
        creator_id: &str,
        period_days: Option<i64>,
    ) -> AppResult<CreatorDashboard> {
        let period_days = period_days.unwrap_or(DEFAULT_DASHBOARD_PERIOD_DAYS);
        let since = Utc::now() - chrono::Duration::days(period_days);

        let stats = DashboardStats {
            total_orders: self.order_repo.count_by_creator(creator_id, None).await?,
            completed_orders: self
                .order_repo
                .count_by_creator(creator_id, Some(OrderStatus::Completed))
                .await?,
            pending_orders: self
                .order_repo
                .count_pending_paid_by_creator(creator_id)
                .await?,
            active_shoutouts: self
                .shoutout_repo
                .count_active_by_creator(creator_id)
                .await?,
            period_orders: self
                .order_repo
                .count_by_creator_since(creator_id, since)
                .await?,
            period_earnings: self
                .order_repo
                .sum_earnings_completed_since(creator_id, since)
                .await?,
        };

        let orders = self
            .order_repo
            .recent_by_creator(creator_id, RECENT_ORDERS_LIMIT)
            .await?;

        let shoutout_ids: Vec<String> = orders.iter().map(|o| o.shoutout_id.clone()).collect();
        let titles: HashMap<String, String> = self
            .shoutout_repo
            .find_by_ids(&shoutout_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s.title))
            .collect();

        let recent_orders = orders
            .into_iter()
            .map(|order| DashboardOrder {
                shoutout_title: titles.get(&order.shoutout_id).cloned(),
                id: order.id,
                order_number: order.order_number,
                price: order.price,
                status: order.status,
                payment_status: order.payment_status,
                created_at: order.created_at,
                accepted_at: order.accepted_at,
                completed_at: order.completed_at,
            })
            .collect();

        let recent_withdrawals = self
            .withdrawal_repo
            .recent_by_creator(creator_id, RECENT_WITHDRAWALS_LIMIT)
            .await?
            .into_iter()
            .map(DashboardWithdrawal::from)
            .collect();

        Ok(CreatorDashboard {
            stats,
            recent_orders,
            recent_withdrawals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use shoutly_common::LocalStorage;
    use shoutly_common::config::{
        AuthConfig, BootstrapConfig, BotCheckConfig, DatabaseConfig, PaymentConfig,
        RetentionConfig, ServerConfig, StorageSettings,
    };
    use shoutly_db::entities::{order, shoutout};
    use shoutly_db::repositories::ActivityLogRepository;

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

    fn create_test_creator(id: &str, email: &str) -> creator::Model {
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

    fn create_test_order(id: &str, creator_id: &str, shoutout_id: &str) -> order::Model {
        order::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            creator_id: creator_id.to_string(),
            shoutout_id: shoutout_id.to_string(),
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

    fn create_test_shoutout(id: &str, creator_id: &str) -> shoutout::Model {
        shoutout::Model {
            id: id.to_string(),
            creator_id: creator_id.to_string(),
            shoutout_type_id: "type1".to_string(),
            title: "Birthday greeting".to_string(),
            description: "A personalized birthday video".to_string(),
            price: dec!(50.00),
            delivery_time: 48,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_withdrawal(id: &str, creator_id: &str) -> withdrawal::Model {
        withdrawal::Model {
            id: id.to_string(),
            creator_id: creator_id.to_string(),
            amount: dec!(25.00),
            status: WithdrawalStatus::Pending,
            payout_method: serde_json::json!({
                "type": "bank",
                "bank_name": "Test Bank",
                "account_number": "12345678",
                "account_holder_name": "Test Creator",
            }),
            admin_notes: None,
            processed_at: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        creator_db: Arc<sea_orm::DatabaseConnection>,
        order_db: Arc<sea_orm::DatabaseConnection>,
        shoutout_db: Arc<sea_orm::DatabaseConnection>,
        withdrawal_db: Arc<sea_orm::DatabaseConnection>,
    ) -> CreatorService {
        let config = create_test_config();
        let activity_db =
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        CreatorService::new(
            CreatorRepository::new(creator_db),
            OrderRepository::new(order_db),
            ShoutoutRepository::new(shoutout_db),
            WithdrawalRepository::new(withdrawal_db),
            ActivityLogService::new(ActivityLogRepository::new(activity_db)),
            BotCheckService::new(&config.bot_check),
            Arc::new(LocalStorage::new(
                std::path::PathBuf::from("/tmp/shoutly-test"),
                "http://localhost:3000/files".to_string(),
            )),
            &config,
        )
    }

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    fn register_input(email: &str, display_name: &str) -> RegisterInput {
        RegisterInput {
            first_name: "Test".to_string(),
            last_name: "Creator".to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            password: "Password1".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            country: "US".to_string(),
            turnstile_token: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_creator_token() {
        let created = create_test_creator("creator1", "new@example.com");

        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<creator::Model>::new()])
                .append_query_results([Vec::<creator::Model>::new()])
                .append_query_results([[created.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = create_test_service(creator_db, empty_mock(), empty_mock(), empty_mock());
        let config = create_test_config();

        let response = service
            .register(
                register_input("new@example.com", "new_creator"),
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        assert_eq!(response.account.commission_rate, dec!(15.00));
        assert_eq!(response.account.available_balance, Decimal::ZERO);

        let principal = AuthTokens::new(&config.auth).verify(&response.token).unwrap();
        assert_eq!(principal.id, "creator1");
        assert_eq!(principal.role, Role::Creator);
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let existing = create_test_creator("creator1", "taken@example.com");

        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = create_test_service(creator_db, empty_mock(), empty_mock(), empty_mock());

        let result = service
            .register(
                register_input("taken@example.com", "new_creator"),
                &ClientInfo::default(),
            )
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Email already registered"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let creator = create_test_creator("creator1", "login@example.com");

        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[creator]])
                .into_connection(),
        );

        let service = create_test_service(creator_db, empty_mock(), empty_mock(), empty_mock());
        let config = create_test_config();

        let response = service
            .login(
                LoginInput {
                    email: "login@example.com".to_string(),
                    password: "Password1".to_string(),
                    turnstile_token: String::new(),
                },
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        let principal = AuthTokens::new(&config.auth).verify(&response.token).unwrap();
        assert_eq!(principal.role, Role::Creator);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let creator = create_test_creator("creator1", "login@example.com");

        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[creator]])
                .into_connection(),
        );

        let service = create_test_service(creator_db, empty_mock(), empty_mock(), empty_mock());

        let result = service
            .login(
                LoginInput {
                    email: "login@example.com".to_string(),
                    password: "WrongPassword1".to_string(),
                    turnstile_token: String::new(),
                },
                &ClientInfo::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_profile_sets_bio() {
        let creator = create_test_creator("creator1", "bio@example.com");
        let mut updated = creator.clone();
        updated.bio = Some("Singer and voice actor".to_string());

        let creator_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[creator]])
                .append_query_results([[updated]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = create_test_service(creator_db, empty_mock(), empty_mock(), empty_mock());

        let profile = service
            .update_profile(
                "creator1",
                UpdateCreatorProfileInput {
                    first_name: None,
                    last_name: None,
                    display_name: None,
                    country: None,
                    bio: Some("Singer and voice actor".to_string()),
                },
                &ClientInfo::default(),
            )
            .await
            .unwrap();

        assert_eq!(profile.bio.as_deref(), Some("Singer and voice actor"));
    }

    #[tokio::test]
    async fn test_upload_url_rejects_unknown_purpose() {
        let service =
            create_test_service(empty_mock(), empty_mock(), empty_mock(), empty_mock());

        let result = service
            .upload_url(
                "creator1",
                CreatorUploadUrlInput {
                    content_type: "video/mp4".to_string(),
                    purpose: "backup".to_string(),
                },
            )
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid upload purpose"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_upload_url_delivery_keys_under_creator() {
        let service =
            create_test_service(empty_mock(), empty_mock(), empty_mock(), empty_mock());

        let response = service
            .upload_url(
                "creator1",
                CreatorUploadUrlInput {
                    content_type: "video/mp4".to_string(),
                    purpose: "delivery".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(response.file_key.starts_with("deliveries/creator1/"));
        assert!(response.file_key.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_dashboard_aggregates_counters_and_recents() {
        let order = create_test_order("order1", "creator1", "shoutout1");
        let shoutout = create_test_shoutout("shoutout1", "creator1");
        let withdrawal = create_test_withdrawal("wd1", "creator1");

        let order_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // total, completed, pending+paid, period counts
                .append_query_results([[count_row(12)]])
                .append_query_results([[count_row(7)]])
                .append_query_results([[count_row(2)]])
                .append_query_results([[count_row(4)]])
                // period earnings sum
                .append_query_results([[maplit::btreemap! {
                    "total" => sea_orm::Value::Decimal(Some(Box::new(dec!(120.50))))
                }]])
                // recent orders
                .append_query_results([[order]])
                .into_connection(),
        );
        let shoutout_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(3)]])
                .append_query_results([[shoutout]])
                .into_connection(),
        );
        let withdrawal_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[withdrawal]])
                .into_connection(),
        );

        let service =
            create_test_service(empty_mock(), order_db, shoutout_db, withdrawal_db);

        let dashboard = service.dashboard("creator1", None).await.unwrap();

        assert_eq!(
            dashboard.stats,
            DashboardStats {
                total_orders: 12,
                completed_orders: 7,
                pending_orders: 2,
                active_shoutouts: 3,
                period_orders: 4,
                period_earnings: dec!(120.50),
            }
        );
        assert_eq!(dashboard.recent_orders.len(), 1);
        assert_eq!(
            dashboard.recent_orders[0].shoutout_title.as_deref(),
            Some("Birthday greeting")
        );
        assert_eq!(dashboard.recent_withdrawals.len(), 1);
        assert_eq!(dashboard.recent_withdrawals[0].amount, dec!(25.00));
    }
}
