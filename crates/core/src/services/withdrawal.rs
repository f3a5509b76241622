//! Withdrawal request and decision service.
//!
//! Requesting a withdrawal moves money out of the creator's withdrawable
//! balance immediately: the debit and the pending request are written in
//! one transaction, with the sufficient-funds guard inside the debit
//! itself. Admin decisions flip the request to `completed` (money already
//! left at request time) or `rejected`, which credits the amount back in
//! the same transaction as the status flip.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shoutly_common::{AppError, AppResult, IdGenerator};
use shoutly_db::{
    entities::withdrawal::{self, WithdrawalStatus},
    repositories::{CreatorRepository, WithdrawalRepository},
};
use validator::Validate;

use crate::services::activity::{ActivityLogService, ClientInfo, actions};
use crate::services::admin::Pagination;

const MIN_WITHDRAWAL_AMOUNT: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 50;
const MAX_ADMIN_PAGE_SIZE: u64 = 100;

/// Withdrawal request and decision service.
#[derive(Clone)]
pub struct WithdrawalService {
    db: Arc<DatabaseConnection>,
    withdrawal_repo: WithdrawalRepository,
    creator_repo: CreatorRepository,
    activity: ActivityLogService,
    id_gen: IdGenerator,
}

/// Payout destination submitted with a withdrawal request. Snapshotted
/// onto the request as JSON; later edits to the creator's payout method
/// never touch past requests.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayoutMethodInput {
    /// Only bank transfers are supported.
    #[serde(rename = "type")]
    pub method_type: String,

    #[validate(length(min = 1, message = "Bank name is required"))]
    pub bank_name: String,

    #[validate(length(min = 1, message = "Account number is required"))]
    pub account_number: String,

    pub routing_number: Option<String>,

    #[validate(length(min = 1, message = "Account holder name is required"))]
    pub account_holder_name: String,
}

/// Input for requesting a withdrawal.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestWithdrawalInput {
    pub amount: Decimal,

    #[validate(nested)]
    pub payout_method: PayoutMethodInput,
}

/// An admin's decision on a pending withdrawal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalDecisionInput {
    /// One of `approve`, `reject`.
    pub action: String,
    pub admin_notes: Option<String>,
}

/// Page parameters for the creator's withdrawal list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Page, status, and search parameters for the admin withdrawal list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminWithdrawalQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    /// Matches creator display names.
    pub search: Option<String>,
}

/// Withdrawal row returned to the requesting creator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRow {
    pub id: String,
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    pub payout_method: serde_json::Value,
    pub admin_notes: Option<String>,
    pub processed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<withdrawal::Model> for WithdrawalRow {
    fn from(model: withdrawal::Model) -> Self {
        Self {
            id: model.id,
            amount: model.amount,
            status: model.status,
            payout_method: model.payout_method,
            admin_notes: model.admin_notes,
            processed_at: model.processed_at,
            created_at: model.created_at,
        }
    }
}

/// Creator's withdrawal list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalList {
    pub withdrawals: Vec<WithdrawalRow>,
    pub pagination: Pagination,
}

/// Creator snippet attached to admin withdrawal rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalCreatorRef {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub available_balance: Decimal,
}

/// Withdrawal row in the admin list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminWithdrawal {
    pub id: String,
    pub amount: Decimal,
    pub status: WithdrawalStatus,
    pub payout_method: serde_json::Value,
    pub admin_notes: Option<String>,
    pub processed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub creator: Option<WithdrawalCreatorRef>,
}

/// Admin withdrawal list page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminWithdrawalList {
    pub withdrawals: Vec<AdminWithdrawal>,
    pub pagination: Pagination,
}

fn page_params(page: Option<u64>, limit: Option<u64>, max_limit: u64) -> (u64, u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, max_limit);
    (page, limit, (page - 1) * limit)
}

fn parse_status(value: Option<&str>) -> AppResult<Option<WithdrawalStatus>> {
    match value {
        None | Some("") => Ok(None),
        Some("pending") => Ok(Some(WithdrawalStatus::Pending)),
        Some("processing") => Ok(Some(WithdrawalStatus::Processing)),
        Some("completed") => Ok(Some(WithdrawalStatus::Completed)),
        Some("rejected") => Ok(Some(WithdrawalStatus::Rejected)),
        Some(_) => Err(AppError::BadRequest(
            "Invalid withdrawal status".to_string(),
        )),
    }
}

impl WithdrawalService {
    /// Create a new withdrawal service.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        withdrawal_repo: WithdrawalRepository,
        creator_repo: CreatorRepository,
        activity: ActivityLogService,
    ) -> Self {
        Self {
            db,
            withdrawal_repo,
            creator_repo,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Request a withdrawal: debit the creator's withdrawable balance and
    /// record the pending request in one transaction. The debit's own
    /// guard decides whether the balance covers the amount.
    pub async fn request(
        &self,
        creator_id: &str,
        input: RequestWithdrawalInput,
        client: &ClientInfo,
    ) -> AppResult<WithdrawalRow> {
        input.validate()?;
        if input.payout_method.method_type != "bank" {
            return Err(AppError::Validation(
                "Only bank payout methods are supported".to_string(),
            ));
        }
        if input.amount < MIN_WITHDRAWAL_AMOUNT {
            return Err(AppError::Validation(
                "Minimum withdrawal amount is $10".to_string(),
            ));
        }

        let creator = self
            .creator_repo
            .find_by_id(creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))?;
        if !creator.withdrawal_permission {
            return Err(AppError::Forbidden(
                "Withdrawal permission is disabled".to_string(),
            ));
        }

        let payout_snapshot = serde_json::to_value(&input.payout_method)
            .map_err(|e| AppError::Internal(format!("Failed to serialize payout method: {e}")))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let debited = self
            .creator_repo
            .debit_available_balance(&txn, creator_id, input.amount)
            .await?;
        if !debited {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::BadRequest("Insufficient balance".to_string()));
        }

        let now = Utc::now();
        let model = withdrawal::ActiveModel {
            id: Set(self.id_gen.generate()),
            creator_id: Set(creator_id.to_string()),
            amount: Set(input.amount),
            status: Set(WithdrawalStatus::Pending),
            payout_method: Set(payout_snapshot),
            admin_notes: Set(None),
            processed_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let created = self.withdrawal_repo.create(&txn, model).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            creator_id = %creator_id,
            withdrawal_id = %created.id,
            amount = %created.amount,
            "Withdrawal requested, balance debited"
        );
        self.activity
            .withdrawal_requested(creator_id, &created.id, created.amount, client)
            .await;

        Ok(created.into())
    }

    /// List the creator's own withdrawal requests, newest first.
    pub async fn creator_withdrawals(
        &self,
        creator_id: &str,
        query: WithdrawalListQuery,
    ) -> AppResult<WithdrawalList> {
        let (page, limit, offset) = page_params(query.page, query.limit, MAX_PAGE_SIZE);

        let rows = self
            .withdrawal_repo
            .list_by_creator(creator_id, limit, offset)
            .await?;
        let total = self.withdrawal_repo.count_by_creator(creator_id).await?;

        let fetched = rows.len() as u64;
        Ok(WithdrawalList {
            withdrawals: rows.into_iter().map(WithdrawalRow::from).collect(),
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    /// List all withdrawal requests for the admin back office, with
    /// optional status filter and creator display-name search.
    pub async fn admin_withdrawals(
        &self,
        query: AdminWithdrawalQuery,
    ) -> AppResult<AdminWithdrawalList> {
        let (page, limit, offset) = page_params(query.page, query.limit, MAX_ADMIN_PAGE_SIZE);
        let status = parse_status(query.status.as_deref())?;

        let creator_ids = match query.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
        {
            Some(term) => Some(
                self.creator_repo
                    .find_ids_by_display_name_like(term)
                    .await?,
            ),
            None => None,
        };

        let rows = self
            .withdrawal_repo
            .list_admin(status, creator_ids.as_deref(), limit, offset)
            .await?;
        let total = self
            .withdrawal_repo
            .count_admin(status, creator_ids.as_deref())
            .await?;

        let referenced: Vec<String> = rows.iter().map(|w| w.creator_id.clone()).collect();
        let creators: HashMap<String, WithdrawalCreatorRef> = self
            .creator_repo
            .find_by_ids(&referenced)
            .await?
            .into_iter()
            .map(|c| {
                (
                    c.id.clone(),
                    WithdrawalCreatorRef {
                        id: c.id,
                        display_name: c.display_name,
                        email: c.email,
                        avatar: c.avatar,
                        available_balance: c.available_balance,
                    },
                )
            })
            .collect();

        let fetched = rows.len() as u64;
        Ok(AdminWithdrawalList {
            withdrawals: rows
                .into_iter()
                .map(|w| AdminWithdrawal {
                    creator: creators.get(&w.creator_id).cloned(),
                    id: w.id,
                    amount: w.amount,
                    status: w.status,
                    payout_method: w.payout_method,
                    admin_notes: w.admin_notes,
                    processed_at: w.processed_at,
                    created_at: w.created_at,
                })
                .collect(),
            pagination: Pagination::new(page, limit, offset, fetched, total),
        })
    }

    /// Decide a pending withdrawal. Approving completes it; the money
    /// already left the balance at request time. Rejecting flips it to
    /// rejected and credits the amount back, in the same transaction as
    /// the status change so the ledger can never lose the refund.
    pub async fn decide(
        &self,
        admin_id: &str,
        withdrawal_id: &str,
        input: WithdrawalDecisionInput,
        client: &ClientInfo,
    ) -> AppResult<WithdrawalRow> {
        let target_status = match input.action.as_str() {
            "approve" => WithdrawalStatus::Completed,
            "reject" => WithdrawalStatus::Rejected,
            _ => return Err(AppError::BadRequest("Invalid action".to_string())),
        };

        let request = self
            .withdrawal_repo
            .find_by_id(withdrawal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let applied = self
            .withdrawal_repo
            .decide(
                &txn,
                withdrawal_id,
                target_status,
                input.admin_notes.clone(),
            )
            .await?;
        if !applied {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::InvalidState(
                "Withdrawal is not in pending status".to_string(),
            ));
        }
        if target_status == WithdrawalStatus::Rejected {
            self.creator_repo
                .credit_available_balance(&txn, &request.creator_id, request.amount)
                .await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let creator_email = self
            .creator_repo
            .find_by_id(&request.creator_id)
            .await?
            .map_or_else(|| request.creator_id.clone(), |c| c.email);

        let (action, verb) = match target_status {
            WithdrawalStatus::Rejected => (actions::WITHDRAWAL_REJECTED, "Rejected"),
            _ => (actions::WITHDRAWAL_APPROVED, "Approved"),
        };
        tracing::info!(
            withdrawal_id = %withdrawal_id,
            creator_id = %request.creator_id,
            amount = %request.amount,
            decision = %input.action,
            "Withdrawal decided"
        );
        self.activity
            .admin_action(
                admin_id,
                action,
                format!(
                    "{verb} withdrawal of ${} for creator: {creator_email}",
                    request.amount
                ),
                Some(json!({
                    "withdrawalId": withdrawal_id,
                    "amount": request.amount,
                    "creatorId": request.creator_id,
                    "adminNotes": input.admin_notes,
                })),
                client,
            )
            .await;

        let decided = self.withdrawal_repo.get_by_id(withdrawal_id).await?;
        Ok(decided.into())
    }
}
