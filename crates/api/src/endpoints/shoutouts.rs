//! Shoutout listing endpoints: the public type taxonomy and the
//! creator's own listing management nested under
//! `/api/creators/me/shoutouts`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use shoutly_common::AppResult;
use shoutly_core::{
    ShoutoutDetail, ShoutoutInput, ShoutoutList,
    catalog::ShoutoutTypeInfo,
};

use crate::{
    extractors::{AuthCreator, Client},
    middleware::AppState,
    response::{ApiResponse, ok},
};

#[derive(Debug, Default, Deserialize)]
struct PageQuery {
    page: Option<u64>,
    limit: Option<u64>,
}

/// List the shoutout type taxonomy.
async fn list_types(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ShoutoutTypeInfo>>> {
    let types = state.catalog_service.list_types().await?;
    Ok(ApiResponse::ok(types))
}

/// List the authenticated creator's shoutouts.
async fn list(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<ShoutoutList>> {
    let listings = state
        .catalog_service
        .list_shoutouts(&principal.id, query.page, query.limit)
        .await?;
    Ok(ApiResponse::ok(listings))
}

/// Create a new shoutout listing.
async fn create(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<ShoutoutInput>,
) -> AppResult<ApiResponse<ShoutoutDetail>> {
    let listing = state
        .catalog_service
        .create_shoutout(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Get one of the authenticated creator's shoutouts.
async fn detail(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Path(shoutout_id): Path<String>,
) -> AppResult<ApiResponse<ShoutoutDetail>> {
    let listing = state
        .catalog_service
        .shoutout_detail(&principal.id, &shoutout_id)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Update a shoutout listing.
async fn update(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Path(shoutout_id): Path<String>,
    Json(req): Json<ShoutoutInput>,
) -> AppResult<ApiResponse<ShoutoutDetail>> {
    let listing = state
        .catalog_service
        .update_shoutout(&principal.id, &shoutout_id, req, &client)
        .await?;
    Ok(ApiResponse::ok(listing))
}

/// Soft-delete a shoutout listing.
async fn remove(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Path(shoutout_id): Path<String>,
) -> AppResult<impl axum::response::IntoResponse> {
    state
        .catalog_service
        .delete_shoutout(&principal.id, &shoutout_id, &client)
        .await?;
    Ok(ok())
}

pub fn types_router() -> Router<AppState> {
    Router::new().route("/", get(list_types))
}

pub fn creator_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(detail).put(update).delete(remove))
}
