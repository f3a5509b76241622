//! Admin back-office endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use shoutly_common::AppResult;
use shoutly_core::{
    ActivityLogQuery, AdminAuthResponse, AdminCreatorUpdateInput, AdminDashboard, AdminLoginInput,
    AdminOrderList, AdminOrderQuery, AdminUserUpdateInput, AdminWithdrawalList,
    AdminWithdrawalQuery, CreatorProfile, PageQuery, SettingRow, UpsertSettingInput, UserProfile,
    WithdrawalDecisionInput, WithdrawalRow,
    admin::{ActivityLogList, AdminCreatorDetail, AdminCreatorList, AdminUserDetail, AdminUserList},
};

use crate::{
    extractors::{AuthAdmin, Client},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardQuery {
    /// Stats window in days.
    period: Option<i64>,
}

/// Sign in to the back office.
async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<AdminLoginInput>,
) -> AppResult<ApiResponse<AdminAuthResponse>> {
    let auth = state.admin_service.login(req, &client).await?;
    Ok(ApiResponse::ok(auth))
}

/// Platform stats plus recent activity and orders.
async fn dashboard(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<ApiResponse<AdminDashboard>> {
    let dashboard = state.admin_service.dashboard(query.period).await?;
    Ok(ApiResponse::ok(dashboard))
}

/// List user accounts.
async fn list_users(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<AdminUserList>> {
    let users = state.admin_service.list_users(query).await?;
    Ok(ApiResponse::ok(users))
}

/// User account detail with order stats.
async fn user_detail(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<AdminUserDetail>> {
    let detail = state.admin_service.user_detail(&user_id).await?;
    Ok(ApiResponse::ok(detail))
}

/// Update a user account.
async fn update_user(
    AuthAdmin(principal): AuthAdmin,
    State(state): State<AppState>,
    Client(client): Client,
    Path(user_id): Path<String>,
    Json(req): Json<AdminUserUpdateInput>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .admin_service
        .update_user(&principal.id, &user_id, req, &client)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// List creator accounts.
async fn list_creators(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<AdminCreatorList>> {
    let creators = state.admin_service.list_creators(query).await?;
    Ok(ApiResponse::ok(creators))
}

/// Creator account detail with order and withdrawal stats.
async fn creator_detail(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
) -> AppResult<ApiResponse<AdminCreatorDetail>> {
    let detail = state.admin_service.creator_detail(&creator_id).await?;
    Ok(ApiResponse::ok(detail))
}

/// Update a creator account (commission, verification, permissions).
async fn update_creator(
    AuthAdmin(principal): AuthAdmin,
    State(state): State<AppState>,
    Client(client): Client,
    Path(creator_id): Path<String>,
    Json(req): Json<AdminCreatorUpdateInput>,
) -> AppResult<ApiResponse<CreatorProfile>> {
    let profile = state
        .admin_service
        .update_creator(&principal.id, &creator_id, req, &client)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// List all orders with status filter and search.
async fn list_orders(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminOrderQuery>,
) -> AppResult<ApiResponse<AdminOrderList>> {
    let orders = state.order_service.admin_orders(query).await?;
    Ok(ApiResponse::ok(orders))
}

/// List all withdrawal requests.
async fn list_withdrawals(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminWithdrawalQuery>,
) -> AppResult<ApiResponse<AdminWithdrawalList>> {
    let withdrawals = state.withdrawal_service.admin_withdrawals(query).await?;
    Ok(ApiResponse::ok(withdrawals))
}

/// Approve or reject a pending withdrawal.
async fn decide_withdrawal(
    AuthAdmin(principal): AuthAdmin,
    State(state): State<AppState>,
    Client(client): Client,
    Path(withdrawal_id): Path<String>,
    Json(req): Json<WithdrawalDecisionInput>,
) -> AppResult<ApiResponse<WithdrawalRow>> {
    let row = state
        .withdrawal_service
        .decide(&principal.id, &withdrawal_id, req, &client)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// Browse the activity log.
async fn activity_logs(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<ActivityLogQuery>,
) -> AppResult<ApiResponse<ActivityLogList>> {
    let logs = state.admin_service.activity_logs(query).await?;
    Ok(ApiResponse::ok(logs))
}

/// List all site settings.
async fn list_settings(
    AuthAdmin(_): AuthAdmin,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SettingRow>>> {
    let settings = state.settings_service.list().await?;
    Ok(ApiResponse::ok(settings))
}

/// Create or update a site setting by key.
async fn upsert_setting(
    AuthAdmin(principal): AuthAdmin,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<UpsertSettingInput>,
) -> AppResult<ApiResponse<SettingRow>> {
    let setting = state
        .settings_service
        .upsert(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(setting))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/users/{id}", get(user_detail).put(update_user))
        .route("/creators", get(list_creators))
        .route("/creators/{id}", get(creator_detail).put(update_creator))
        .route("/orders", get(list_orders))
        .route("/withdrawals", get(list_withdrawals))
        .route("/withdrawals/{id}", put(decide_withdrawal))
        .route("/activity-logs", get(activity_logs))
        .route("/settings", get(list_settings).put(upsert_setting))
}
