//! Order endpoints: the buyer's `/api/orders` surface and the creator's
//! decision surface nested under `/api/creators/me/orders`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use shoutly_common::AppResult;
use shoutly_core::{
    CreateOrderInput, CreatorOrder, CreatorOrderList, OrderCreated, OrderDecisionInput,
    OrderListQuery, UserOrderDetail, UserOrderList,
};

use crate::{
    extractors::{AuthCreator, AuthUser, Client},
    middleware::AppState,
    response::ApiResponse,
};

/// Create an order and initiate its payment.
async fn create(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Client(client): Client,
    Json(req): Json<CreateOrderInput>,
) -> AppResult<ApiResponse<OrderCreated>> {
    let created = state
        .order_service
        .create(&principal.id, req, &client)
        .await?;
    Ok(ApiResponse::ok(created))
}

/// List the authenticated user's orders.
async fn list(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<ApiResponse<UserOrderList>> {
    let orders = state.order_service.user_orders(&principal.id, query).await?;
    Ok(ApiResponse::ok(orders))
}

/// Get one of the authenticated user's orders.
async fn detail(
    AuthUser(principal): AuthUser,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> AppResult<ApiResponse<UserOrderDetail>> {
    let order = state
        .order_service
        .user_order_detail(&principal.id, &order_id)
        .await?;
    Ok(ApiResponse::ok(order))
}

/// List the authenticated creator's orders.
async fn creator_list(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<ApiResponse<CreatorOrderList>> {
    let orders = state
        .order_service
        .creator_orders(&principal.id, query)
        .await?;
    Ok(ApiResponse::ok(orders))
}

/// Get one of the authenticated creator's orders.
async fn creator_detail(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> AppResult<ApiResponse<CreatorOrder>> {
    let order = state
        .order_service
        .creator_order_detail(&principal.id, &order_id)
        .await?;
    Ok(ApiResponse::ok(order))
}

/// Apply an accept/reject/complete decision to an order.
async fn decide(
    AuthCreator(principal): AuthCreator,
    State(state): State<AppState>,
    Client(client): Client,
    Path(order_id): Path<String>,
    Json(req): Json<OrderDecisionInput>,
) -> AppResult<ApiResponse<CreatorOrder>> {
    let order = state
        .order_service
        .decide(&principal.id, &order_id, req, &client)
        .await?;
    Ok(ApiResponse::ok(order))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", get(detail))
}

pub fn creator_router() -> Router<AppState> {
    Router::new()
        .route("/", get(creator_list))
        .route("/{id}", get(creator_detail).put(decide))
}
