//! API endpoints.

mod admin;
mod auth;
mod creators;
mod orders;
mod payments;
mod shoutouts;
mod users;
mod withdrawals;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, mounted under `/api` by the server.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/creators", creators::router())
        .nest("/shoutout-types", shoutouts::types_router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
        .nest("/admin", admin::router())
}
