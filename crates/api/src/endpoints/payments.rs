//! Payment provider callback endpoints.
//!
//! The provider sends the buyer's browser here after the hosted payment
//! flow. Both handlers are infallible from the provider's point of view:
//! every outcome is a redirect back into the frontend.

use axum::{
    Router,
    extract::{Query, State},
    response::Redirect,
    routing::get,
};
use shoutly_core::PaymentCallbackQuery;

use crate::{extractors::Client, middleware::AppState};

/// Success callback: verify and settle the payment, then send the buyer
/// to the matching frontend page.
async fn success(
    State(state): State<AppState>,
    Client(client): Client,
    Query(query): Query<PaymentCallbackQuery>,
) -> Redirect {
    let target = state.order_service.payment_success(query, &client).await;
    Redirect::to(&target)
}

/// Cancel callback: cancel the order and send the buyer back.
async fn cancel(
    State(state): State<AppState>,
    Client(client): Client,
    Query(query): Query<PaymentCallbackQuery>,
) -> Redirect {
    let target = state.order_service.payment_cancel(query, &client).await;
    Redirect::to(&target)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/success", get(success))
        .route("/cancel", get(cancel))
}
