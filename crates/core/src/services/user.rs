//! User (purchaser) account service.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use shoutly_common::{
    AppError, AppResult, AuthTokens, Config, IdGenerator, Role, SIGNED_URL_TTL_SECS,
    StorageBackend, UploadPurpose, object_key,
};
use shoutly_db::{
    entities::{activity_log::ActorType, user},
    repositories::UserRepository,
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};
use crate::services::bot_check::BotCheckService;
use crate::services::password::{hash_password, is_strong_password, verify_password};

/// Minimum account-holder age in whole years.
const MIN_AGE_YEARS: u32 = 13;

/// User account service.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    activity: ActivityLogService,
    bot_check: BotCheckService,
    storage: Arc<dyn StorageBackend>,
    tokens: AuthTokens,
    id_gen: IdGenerator,
}

/// Input for registering a user or creator account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(length(min = 3, max = 50))]
    pub display_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    pub date_of_birth: NaiveDate,

    #[validate(length(min = 1))]
    pub country: String,

    /// Bot-check token from the signup form.
    #[serde(default)]
    pub turnstile_token: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,

    /// Bot-check token from the login form.
    #[serde(default)]
    pub turnstile_token: String,
}

/// Input for updating the user profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,

    #[validate(length(min = 3, max = 50))]
    pub display_name: Option<String>,

    #[validate(length(min = 1))]
    pub country: Option<String>,
}

/// Input for changing the account password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Input for requesting an upload URL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlInput {
    pub content_type: String,
}

/// Input for pointing the account at an uploaded avatar object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAvatarInput {
    #[serde(default)]
    pub file_key: Option<String>,
}

/// A user account as exposed to its owner. Never carries the password
/// hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub country: String,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<user::Model> for UserProfile {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            display_name: user.display_name,
            email: user.email,
            date_of_birth: user.date_of_birth,
            country: user.country,
            avatar: user.avatar,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Token plus account snapshot returned by register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub account: UserProfile,
}

/// Presigned upload URL and the key the object will live under.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub file_key: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        activity: ActivityLogService,
        bot_check: BotCheckService,
        storage: Arc<dyn StorageBackend>,
        config: &Config,
    ) -> Self {
        Self {
            user_repo,
            activity,
            bot_check,
            storage,
            tokens: AuthTokens::new(&config.auth),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user account.
    pub async fn register(
        &self,
        input: RegisterInput,
        client: &ClientInfo,
    ) -> AppResult<AuthResponse> {
        input.validate()?;
        validate_registration(&input)?;

        self.bot_check
            .verify(&input.turnstile_token, client.ip_address.as_deref())
            .await?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        if self
            .user_repo
            .find_by_display_name(&input.display_name)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Display name already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            display_name: Set(input.display_name),
            email: Set(input.email),
            password: Set(password_hash),
            date_of_birth: Set(input.date_of_birth),
            country: Set(input.country),
            avatar: Set(None),
            is_verified: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let user = self.user_repo.create(model).await?;

        self.activity
            .user_registered(&user.id, &user.email, client)
            .await;

        let token = self.tokens.issue(&user.id, Role::User, &user.email)?;
        tracing::info!(user_id = %user.id, "User registered");

        Ok(AuthResponse {
            token,
            account: user.into(),
        })
    }

    /// Authenticate by email and password.
    pub async fn login(&self, input: LoginInput, client: &ClientInfo) -> AppResult<AuthResponse> {
        input.validate()?;

        self.bot_check
            .verify(&input.turnstile_token, client.ip_address.as_deref())
            .await?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        self.activity
            .user_logged_in(&user.id, &user.email, client)
            .await;

        let token = self.tokens.issue(&user.id, Role::User, &user.email)?;

        Ok(AuthResponse {
            token,
            account: user.into(),
        })
    }

    /// Get the owner view of a user account.
    pub async fn profile(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(self.user_repo.get_by_id(user_id).await?.into())
    }

    /// Update profile fields. A changed display name must stay unique.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
        client: &ClientInfo,
    ) -> AppResult<UserProfile> {
        input.validate()?;

        if let Some(ref display_name) = input.display_name {
            if !is_valid_display_name(display_name) {
                return Err(AppError::Validation(
                    "Display name can only contain letters, numbers, and underscores".to_string(),
                ));
            }

            if let Some(existing) = self.user_repo.find_by_display_name(display_name).await? {
                if existing.id != user_id {
                    return Err(AppError::BadRequest(
                        "Display name already taken".to_string(),
                    ));
                }
            }
        }

        let user = self.user_repo.get_by_id(user_id).await?;
        let email = user.email.clone();
        let mut active: user::ActiveModel = user.into();

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
        active.updated_at = Set(Utc::now().into());

        let updated = self.user_repo.update(active).await?;

        self.activity
            .record(
                ActorType::User,
                Some(user_id),
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
        user_id: &str,
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

        let user = self.user_repo.get_by_id(user_id).await?;

        if !verify_password(&input.current_password, &user.password)? {
            return Err(AppError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let email = user.email.clone();
        let mut active: user::ActiveModel = user.into();
        active.password = Set(hash_password(&input.new_password)?);
        active.updated_at = Set(Utc::now().into());

        self.user_repo.update(active).await?;

        self.activity
            .record(
                ActorType::User,
                Some(user_id),
                actions::PASSWORD_CHANGED,
                format!("Password changed: {email}"),
                client,
                None,
            )
            .await;

        Ok(())
    }

    /// Issue a presigned upload URL for a new avatar image.
    pub async fn avatar_upload_url(
        &self,
        user_id: &str,
        input: UploadUrlInput,
    ) -> AppResult<UploadUrlResponse> {
        let file_key = object_key(
            UploadPurpose::Avatar,
            user_id,
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
        user_id: &str,
        input: SetAvatarInput,
        client: &ClientInfo,
    ) -> AppResult<UserProfile> {
        let file_key = match input.file_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AppError::BadRequest("File key is required".to_string())),
        };

        let user = self.user_repo.get_by_id(user_id).await?;
        let email = user.email.clone();
        let mut active: user::ActiveModel = user.into();
        active.avatar = Set(Some(file_key));
        active.updated_at = Set(Utc::now().into());

        let updated = self.user_repo.update(active).await?;

        self.activity
            .record(
                ActorType::User,
                Some(user_id),
                actions::AVATAR_UPDATED,
                format!("Avatar updated: {email}"),
                client,
                None,
            )
            .await;

        Ok(updated.into())
    }

    /// Clear the avatar. The stored object is deleted best-effort; a
    /// failed delete never blocks the profile update.
    pub async fn remove_avatar(&self, user_id: &str, client: &ClientInfo) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(ref key) = user.avatar {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(error = %e, key = %key, "Failed to delete avatar object");
            }
        }

        let email = user.email.clone();
        let mut active: user::ActiveModel = user.into();
        active.avatar = Set(None);
        active.updated_at = Set(Utc::now().into());

        self.user_repo.update(active).await?;

        self.activity
            .record(
                ActorType::User,
                Some(user_id),
                actions::AVATAR_UPDATED,
                format!("Avatar removed: {email}"),
                client,
                None,
            )
            .await;

        Ok(())
    }
}

/// Checks shared by user and creator registration that the derive-level
/// validators cannot express.
pub(crate) fn validate_registration(input: &RegisterInput) -> AppResult<()> {
    if !is_valid_display_name(&input.display_name) {
        return Err(AppError::Validation(
            "Display name can only contain letters, numbers, and underscores".to_string(),
        ));
    }

    if !is_strong_password(&input.password) {
        return Err(AppError::Validation(
            "Password must contain at least one lowercase letter, one uppercase letter, and one number"
                .to_string(),
        ));
    }

    let age = Utc::now()
        .date_naive()
        .years_since(input.date_of_birth)
        .unwrap_or(0);
    if age < MIN_AGE_YEARS {
        return Err(AppError::Validation(
            "You must be at least 13 years old".to_string(),
        ));
    }

    Ok(())
}

/// Display names are limited to letters, numbers, and underscores.
pub(crate) fn is_valid_display_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use shoutly_common::LocalStorage;
    use shoutly_common::config::{
        AuthConfig, BootstrapConfig, BotCheckConfig, DatabaseConfig, PaymentConfig,
        RetentionConfig, ServerConfig, StorageSettings,
    };
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

    fn create_test_service(
        user_db: Arc<sea_orm::DatabaseConnection>,
        activity_db: Arc<sea_orm::DatabaseConnection>,
    ) -> UserService {
        let config = create_test_config();
        UserService::new(
            UserRepository::new(user_db),
            ActivityLogService::new(ActivityLogRepository::new(activity_db)),
            BotCheckService::new(&config.bot_check),
            Arc::new(LocalStorage::new(
                std::path::PathBuf::from("/tmp/shoutly-test"),
                "http://localhost:3000/files".to_string(),
            )),
            &config,
        )
    }

    fn register_input(email: &str, display_name: &str) -> RegisterInput {
        RegisterInput {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            password: "Password1".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            country: "US".to_string(),
            turnstile_token: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_token_for_new_account() {
        let created = create_test_user("user1", "new@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // email free, display name free
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                // insert returning
                .append_query_results([[created.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);
        let config = create_test_config();

        let response = service
            .register(register_input("new@example.com", "new_user"), &ClientInfo::default())
            .await
            .unwrap();

        assert_eq!(response.account.email, "new@example.com");

        let principal = AuthTokens::new(&config.auth).verify(&response.token).unwrap();
        assert_eq!(principal.id, "user1");
        assert_eq!(principal.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let existing = create_test_user("user1", "taken@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

        let result = service
            .register(register_input("taken@example.com", "new_user"), &ClientInfo::default())
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Email already registered"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_taken_display_name() {
        let existing = create_test_user("user1", "other@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[existing]])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

        let result = service
            .register(register_input("new@example.com", "test_user"), &ClientInfo::default())
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Display name already taken"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_weak_password() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, activity_db);

        let mut input = register_input("new@example.com", "new_user");
        input.password = "alllowercase1".to_string();

        let result = service.register(input, &ClientInfo::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_underage() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, activity_db);

        let mut input = register_input("kid@example.com", "young_user");
        input.date_of_birth = Utc::now().date_naive() - chrono::Duration::days(10 * 365);

        let result = service.register(input, &ClientInfo::default()).await;
        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "You must be at least 13 years old");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_display_name() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, activity_db);

        let result = service
            .register(register_input("new@example.com", "bad name!"), &ClientInfo::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_success() {
        let user = create_test_user("user1", "login@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

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

        assert_eq!(response.account.id, "user1");
        assert!(!response.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let user = create_test_user("user1", "login@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

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
    async fn test_login_unknown_email() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

        let result = service
            .login(
                LoginInput {
                    email: "nobody@example.com".to_string(),
                    password: "Password1".to_string(),
                    turnstile_token: String::new(),
                },
                &ClientInfo::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_display_name() {
        let other = create_test_user("user2", "other@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[other]])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

        let result = service
            .update_profile(
                "user1",
                UpdateProfileInput {
                    first_name: None,
                    last_name: None,
                    display_name: Some("test_user".to_string()),
                    country: None,
                },
                &ClientInfo::default(),
            )
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Display name already taken"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_change_password_wrong_current() {
        let user = create_test_user("user1", "login@example.com");

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, activity_db);

        let result = service
            .change_password(
                "user1",
                ChangePasswordInput {
                    current_password: "NotThePassword1".to_string(),
                    new_password: "NewPassword1".to_string(),
                },
                &ClientInfo::default(),
            )
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Current password is incorrect"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_set_avatar_requires_file_key() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, activity_db);

        let result = service
            .set_avatar(
                "user1",
                SetAvatarInput { file_key: None },
                &ClientInfo::default(),
            )
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "File key is required"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_avatar_upload_url_rejects_unsupported_type() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, activity_db);

        let result = service
            .avatar_upload_url(
                "user1",
                UploadUrlInput {
                    content_type: "application/pdf".to_string(),
                },
            )
            .await;
        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Unsupported file format"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_avatar_upload_url_keys_under_owner() {
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let activity_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(user_db, activity_db);

        let response = service
            .avatar_upload_url(
                "user1",
                UploadUrlInput {
                    content_type: "image/png".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(response.file_key.starts_with("avatars/user1/"));
        assert!(response.file_key.ends_with(".png"));
        assert!(!response.upload_url.is_empty());
    }
}
