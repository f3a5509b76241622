//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use shoutly_common::{AppError, Principal, Role};
use shoutly_core::ClientInfo;

fn principal_with_role(parts: &Parts, role: Role) -> Result<Principal, AppError> {
    let principal = parts
        .extensions
        .get::<Principal>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    if principal.role != role {
        return Err(AppError::Forbidden(format!("Requires {role} access")));
    }
    Ok(principal)
}

/// Authenticated user extractor. 401 when no principal was decoded,
/// 403 when the token belongs to another role.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_with_role(parts, Role::User).map(Self)
    }
}

/// Authenticated creator extractor.
#[derive(Debug, Clone)]
pub struct AuthCreator(pub Principal);

impl<S> FromRequestParts<S> for AuthCreator
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_with_role(parts, Role::Creator).map(Self)
    }
}

/// Authenticated admin extractor.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Principal);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_with_role(parts, Role::Admin).map(Self)
    }
}

/// Client metadata extractor for activity logging. Never rejects; a
/// request without usable headers logs as "unknown".
#[derive(Debug, Clone)]
pub struct Client(pub ClientInfo);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        // Proxy chain order matters: the CDN header is the most
        // trustworthy, the socket-adjacent ones are fallbacks.
        let ip_address = header("cf-connecting-ip")
            .or_else(|| {
                header("x-forwarded-for").map(|v| v.split(',').next().unwrap_or(v).trim())
            })
            .or_else(|| header("x-real-ip"))
            .unwrap_or("unknown")
            .to_string();

        Ok(Self(ClientInfo {
            ip_address: Some(ip_address),
            user_agent: header("user-agent").map(ToString::to_string),
        }))
    }
}
