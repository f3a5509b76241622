//! Activity log service.
//!
//! Records audit trail entries for account, order, and admin actions.
//! Recording is best-effort: a failed insert is logged and swallowed so
//! the calling flow is never broken by the audit trail.

use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde_json::json;
use shoutly_common::config::RetentionConfig;
use shoutly_common::{AppResult, IdGenerator};
use shoutly_db::{
    entities::activity_log::{self, ActorType},
    repositories::{ActivityLogFilter, ActivityLogRepository},
};
use tokio::time::interval;

/// Action codes stored in the `action` column.
pub mod actions {
    pub const REGISTRATION: &str = "REGISTRATION";
    pub const LOGIN: &str = "LOGIN";
    pub const PROFILE_UPDATED: &str = "PROFILE_UPDATED";
    pub const PASSWORD_CHANGED: &str = "PASSWORD_CHANGED";
    pub const AVATAR_UPDATED: &str = "AVATAR_UPDATED";
    pub const SHOUTOUT_CREATED: &str = "SHOUTOUT_CREATED";
    pub const SHOUTOUT_UPDATED: &str = "SHOUTOUT_UPDATED";
    pub const SHOUTOUT_DELETED: &str = "SHOUTOUT_DELETED";
    pub const ORDER_CREATED: &str = "ORDER_CREATED";
    pub const ORDER_ACCEPTED: &str = "ORDER_ACCEPTED";
    pub const ORDER_REJECTED: &str = "ORDER_REJECTED";
    pub const ORDER_COMPLETED: &str = "ORDER_COMPLETED";
    pub const PAYMENT_CONFIRMED: &str = "PAYMENT_CONFIRMED";
    pub const PAYMENT_CANCELLED: &str = "PAYMENT_CANCELLED";
    pub const WITHDRAWAL_REQUESTED: &str = "WITHDRAWAL_REQUESTED";
    pub const WITHDRAWAL_APPROVED: &str = "WITHDRAWAL_APPROVED";
    pub const WITHDRAWAL_REJECTED: &str = "WITHDRAWAL_REJECTED";
    pub const ADMIN_ACCOUNT_CREATED: &str = "ADMIN_ACCOUNT_CREATED";
    pub const USER_UPDATED: &str = "USER_UPDATED";
    pub const CREATOR_UPDATED: &str = "CREATOR_UPDATED";
    pub const SETTING_UPDATED: &str = "SETTING_UPDATED";
}

/// Request metadata captured from the client connection.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// How many rows a pruning run removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneOutcome {
    /// Rows older than the retention window.
    pub expired: u64,
    /// Rows dropped to enforce the entry cap.
    pub capped: u64,
}

/// Activity log service for recording and querying the audit trail.
#[derive(Clone)]
pub struct ActivityLogService {
    log_repo: ActivityLogRepository,
    id_gen: IdGenerator,
}

impl ActivityLogService {
    #[must_use]
    pub fn new(log_repo: ActivityLogRepository) -> Self {
        Self {
            log_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record an entry. Insert failures are logged and swallowed.
    pub async fn record(
        &self,
        actor_type: ActorType,
        actor_id: Option<&str>,
        action: &str,
        description: String,
        client: &ClientInfo,
        metadata: Option<serde_json::Value>,
    ) {
        let entry = activity_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            actor_type: Set(actor_type),
            actor_id: Set(actor_id.map(ToString::to_string)),
            action: Set(action.to_string()),
            description: Set(description),
            ip_address: Set(client.ip_address.clone()),
            user_agent: Set(client.user_agent.clone()),
            metadata: Set(metadata),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = self.log_repo.create(entry).await {
            tracing::warn!(error = %e, action, "Failed to record activity log entry");
        }
    }

    pub async fn user_registered(&self, user_id: &str, email: &str, client: &ClientInfo) {
        self.record(
            ActorType::User,
            Some(user_id),
            actions::REGISTRATION,
            format!("User registered with email: {email}"),
            client,
            None,
        )
        .await;
    }

    pub async fn creator_registered(&self, creator_id: &str, email: &str, client: &ClientInfo) {
        self.record(
            ActorType::Creator,
            Some(creator_id),
            actions::REGISTRATION,
            format!("Creator registered with email: {email}"),
            client,
            None,
        )
        .await;
    }

    pub async fn user_logged_in(&self, user_id: &str, email: &str, client: &ClientInfo) {
        self.record(
            ActorType::User,
            Some(user_id),
            actions::LOGIN,
            format!("User logged in: {email}"),
            client,
            None,
        )
        .await;
    }

    pub async fn creator_logged_in(&self, creator_id: &str, email: &str, client: &ClientInfo) {
        self.record(
            ActorType::Creator,
            Some(creator_id),
            actions::LOGIN,
            format!("Creator logged in: {email}"),
            client,
            None,
        )
        .await;
    }

    pub async fn order_created(
        &self,
        user_id: &str,
        order_id: &str,
        amount: Decimal,
        client: &ClientInfo,
    ) {
        self.record(
            ActorType::User,
            Some(user_id),
            actions::ORDER_CREATED,
            format!("Order created: {order_id} for ${amount}"),
            client,
            Some(json!({ "orderId": order_id, "amount": amount })),
        )
        .await;
    }

    pub async fn order_accepted(&self, creator_id: &str, order_id: &str, client: &ClientInfo) {
        self.record(
            ActorType::Creator,
            Some(creator_id),
            actions::ORDER_ACCEPTED,
            format!("Order accepted: {order_id}"),
            client,
            Some(json!({ "orderId": order_id })),
        )
        .await;
    }

    pub async fn order_completed(&self, creator_id: &str, order_id: &str, client: &ClientInfo) {
        self.record(
            ActorType::Creator,
            Some(creator_id),
            actions::ORDER_COMPLETED,
            format!("Order completed: {order_id}"),
            client,
            Some(json!({ "orderId": order_id })),
        )
        .await;
    }

    pub async fn withdrawal_requested(
        &self,
        creator_id: &str,
        withdrawal_id: &str,
        amount: Decimal,
        client: &ClientInfo,
    ) {
        self.record(
            ActorType::Creator,
            Some(creator_id),
            actions::WITHDRAWAL_REQUESTED,
            format!("Withdrawal requested: ${amount}"),
            client,
            Some(json!({ "withdrawalId": withdrawal_id, "amount": amount })),
        )
        .await;
    }

    pub async fn admin_action(
        &self,
        admin_id: &str,
        action: &str,
        description: String,
        metadata: Option<serde_json::Value>,
        client: &ClientInfo,
    ) {
        self.record(ActorType::Admin, Some(admin_id), action, description, client, metadata)
            .await;
    }

    /// List entries for the admin back office, newest first.
    pub async fn list(
        &self,
        filter: &ActivityLogFilter,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<activity_log::Model>, u64)> {
        let entries = self.log_repo.list(filter, limit, offset).await?;
        let total = self.log_repo.count(filter).await?;
        Ok((entries, total))
    }

    /// Most recent entries, newest first.
    pub async fn recent(&self, limit: u64) -> AppResult<Vec<activity_log::Model>> {
        self.log_repo.recent(limit).await
    }

    /// Delete entries older than `max_age_days`, then enforce the
    /// `max_entries` cap by dropping the oldest rows beyond it.
    pub async fn prune(&self, max_age_days: i64, max_entries: u64) -> AppResult<PruneOutcome> {
        let cutoff = Utc::now() - chrono::Duration::days(max_age_days);
        let expired = self.log_repo.delete_older_than(cutoff).await?;

        let mut capped = 0;
        let total = self.log_repo.count_all().await?;
        if total > max_entries {
            if let Some(boundary) = self.log_repo.nth_newest_created_at(max_entries).await? {
                capped = self
                    .log_repo
                    .delete_older_than(boundary.with_timezone(&Utc))
                    .await?;
            }
        }

        Ok(PruneOutcome { expired, capped })
    }
}

/// Spawn the background task that periodically prunes the activity log.
pub fn spawn_retention_task(
    service: ActivityLogService,
    config: RetentionConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(config.interval_secs));
        loop {
            interval.tick().await;
            match service.prune(config.max_age_days, config.max_entries).await {
                Ok(outcome) => {
                    if outcome.expired > 0 || outcome.capped > 0 {
                        tracing::info!(
                            expired = outcome.expired,
                            capped = outcome.capped,
                            "Pruned activity log"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to prune activity log");
                }
            }
        }
    })
}
