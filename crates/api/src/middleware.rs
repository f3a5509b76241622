//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use shoutly_common::AuthTokens;
use shoutly_core::{
    AdminService, CatalogService, CreatorService, OrderService, SettingsService, UserService,
    WithdrawalService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub creator_service: CreatorService,
    pub catalog_service: CatalogService,
    pub order_service: OrderService,
    pub withdrawal_service: WithdrawalService,
    pub admin_service: AdminService,
    pub settings_service: SettingsService,
    pub tokens: AuthTokens,
}

/// Authentication middleware: decode a bearer token into a
/// [`shoutly_common::Principal`] request extension. Invalid or absent
/// tokens are not an error here; the role extractors reject later.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(principal) = state.tokens.verify(token)
    {
        req.extensions_mut().insert(principal);
    }

    next.run(req).await
}
