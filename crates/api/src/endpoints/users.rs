//! User profile endpoints (`/api/users/me`).

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use shoutly_common::AppResult;
use shoutly_core::{
    ChangePasswordInput, SetAvatarInput, UpdateProfileInput, UploadUrlInput, UploadUrlResponse,
    UserProfile,
};

use crate::{
    extractors::{AuthUser, Client},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Get the authenticated user's profile.
async fn me(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state.user_service.profile(&principal.id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Update the authenticated user's profile.
async fn update_me(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .user_service
        .update_profile(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// Change the authenticated user's password.
async fn change_password(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<ChangePasswordInput>,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .user_service
        .change_password(&principal.id, req, &client)
        .await?;
    Ok(ok())
}

/// Issue a presigned upload URL for a new avatar.
async fn avatar_upload_url(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UploadUrlInput>,
) -> AppResult<ApiResponse<UploadUrlResponse>> {
    let upload = state
        .user_service
        .avatar_upload_url(&principal.id, req)
        .await?;
    Ok(ApiResponse::ok(upload))
}

/// Point the account at an uploaded avatar object.
async fn set_avatar(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<SetAvatarInput>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .user_service
        .set_avatar(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// Remove the current avatar.
async fn remove_avatar(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Client(client): Client,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .user_service
        .remove_avatar(&principal.id, &client)
        .await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).put(update_me))
        .route("/me/password", put(change_password))
        .route("/me/avatar/upload-url", post(avatar_upload_url))
        .route("/me/avatar", put(set_avatar).delete(remove_avatar))
}
