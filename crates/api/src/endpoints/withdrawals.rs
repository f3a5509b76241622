//! Creator withdrawal endpoints, nested under
//! `/api/creators/me/withdrawals`.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use shoutly_common::AppResult;
use shoutly_core::{RequestWithdrawalInput, WithdrawalList, WithdrawalListQuery, WithdrawalRow};

use crate::{
    extractors::{AuthCreator, Client},
    middleware::AppState,
    response::ApiResponse,
};

/// Request a withdrawal from the available balance.
async fn request(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<RequestWithdrawalInput>,
) -> AppResult<ApiResponse<WithdrawalRow>> {
    let row = state
        .withdrawal_service
        .request(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// List the authenticated creator's withdrawal requests.
async fn list(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Query(query): Query<WithdrawalListQuery>,
) -> AppResult<ApiResponse<WithdrawalList>> {
    let withdrawals = state
        .withdrawal_service
        .creator_withdrawals(&principal.id, query)
        .await?;
    Ok(ApiResponse::ok(withdrawals))
}

pub fn creator_router() -> Router<AppState> {
    Router::new().route("/", get(list).post(request))
}
