//! Creator endpoints: public catalog plus the authenticated
//! `/api/creators/me` surface.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use shoutly_common::AppResult;
use shoutly_core::{
    CreatorAuthResponse, CreatorDashboard, CreatorProfile, CreatorUploadUrlInput, LoginInput,
    RegisterInput, UpdateCreatorProfileInput,
    catalog::{CatalogPage, CatalogQuery, CreatorCard},
    user::{ChangePasswordInput, SetAvatarInput, UploadUrlResponse},
};

use crate::{
    endpoints::{orders, shoutouts, withdrawals},
    extractors::{AuthCreator, Client},
    middleware::AppState,
    response::{ApiResponse, ok},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardQuery {
    /// Stats window in days.
    period: Option<i64>,
}

/// Register a new creator account.
async fn register(
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<CreatorAuthResponse>> {
    let auth = state.creator_service.register(req, &client).await?;
    Ok(ApiResponse::ok(auth))
}

/// Sign in to an existing creator account.
async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<CreatorAuthResponse>> {
    let auth = state.creator_service.login(req, &client).await?;
    Ok(ApiResponse::ok(auth))
}

/// Search the public catalog.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<ApiResponse<CatalogPage>> {
    let page = state.catalog_service.search(query).await?;
    Ok(ApiResponse::ok(page))
}

/// Public creator profile with their active shoutouts.
async fn public_profile(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
) -> AppResult<ApiResponse<CreatorCard>> {
    let card = state.catalog_service.creator_profile(&creator_id).await?;
    Ok(ApiResponse::ok(card))
}

/// Get the authenticated creator's profile.
async fn me(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CreatorProfile>> {
    let profile = state.creator_service.profile(&principal.id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Update the authenticated creator's profile.
async fn update_me(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<UpdateCreatorProfileInput>,
) -> AppResult<ApiResponse<CreatorProfile>> {
    let profile = state
        .creator_service
        .update_profile(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// Change the authenticated creator's password.
async fn change_password(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<ChangePasswordInput>,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .creator_service
        .change_password(&principal.id, req, &client)
        .await?;
    Ok(ok())
}

/// Issue a presigned upload URL for an avatar or a delivery file.
async fn upload_url(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Json(req): Json<CreatorUploadUrlInput>,
) -> AppResult<ApiResponse<UploadUrlResponse>> {
    let upload = state.creator_service.upload_url(&principal.id, req).await?;
    Ok(ApiResponse::ok(upload))
}

/// Point the account at an uploaded avatar object.
async fn set_avatar(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<SetAvatarInput>,
) -> AppResult<ApiResponse<CreatorProfile>> {
    let profile = state
        .creator_service
        .set_avatar(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// Remove the current avatar.
async fn remove_avatar(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .creator_service
        .remove_avatar(&principal.id, &client)
        .await?;
    Ok(ok())
}

/// Earnings and order overview for the creator dashboard.
async fn dashboard(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<ApiResponse<CreatorDashboard>> {
    let dashboard = state
        .creator_service
        .dashboard(&principal.id, query.period)
        .await?;
    Ok(ApiResponse::ok(dashboard))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).put(update_me))
        .route("/me/password", put(change_password))
        .route("/me/upload-url", post(upload_url))
        .route("/me/avatar", put(set_avatar).delete(remove_avatar))
        .route("/me/dashboard", get(dashboard))
        .nest("/me/shoutouts", shoutouts::creator_router())
        .nest("/me/orders", orders::creator_router())
        .nest("/me/withdrawals", withdrawals::creator_router())
        .route("/{id}", get(public_profile))
}
