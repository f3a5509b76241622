//! User authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use shoutly_common::AppResult;
use shoutly_core::{AuthResponse, LoginInput, RegisterInput};

use crate::{extractors::Client, middleware::AppState, response::ApiResponse};

/// Register a new user account.
async fn register(
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<RegisterInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let auth = state.user_service.register(req, &client).await?;
    Ok(ApiResponse::ok(auth))
}

/// Sign in to an existing user account.
async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let auth = state.user_service.login(req, &client).await?;
    Ok(ApiResponse::ok(auth))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
