//! Bearer-token issuance and verification.
//!
//! Identity is carried as an HS256 JWT with `{sub, role, email}` claims.
//! The rest of the system consumes only the decoded [`Principal`]; token
//! mechanics stay inside this module.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, config::AuthConfig};

/// Principal role carried in the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Purchaser account.
    User,
    /// Seller account.
    Creator,
    /// Back-office operator.
    Admin,
}

impl Role {
    /// Stable lowercase name, matching the wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Creator => "creator",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded request identity: the shared "account" view over the three
/// principal tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Row id in the role's table.
    pub id: String,
    /// Which principal table the id refers to.
    pub role: Role,
    /// Email at issuance time.
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    email: String,
    iat: i64,
    exp: i64,
}

/// Token codec configured from [`AuthConfig`].
#[derive(Clone)]
pub struct AuthTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AuthTokens {
    /// Build a codec from configuration.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::days(config.token_ttl_days),
        }
    }

    /// Issue a signed token for a principal.
    pub fn issue(&self, id: &str, role: Role, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: id.to_string(),
            role,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return the principal it names.
    ///
    /// Any failure (bad signature, expiry, malformed claims) collapses to
    /// [`AppError::Unauthorized`]; callers never learn why a token was bad.
    pub fn verify(&self, token: &str) -> AppResult<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;

        Ok(Principal {
            id: data.claims.sub,
            role: data.claims.role,
            email: data.claims.email,
        })
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> AuthTokens {
        AuthTokens::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
        })
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = test_codec();
        let token = tokens
            .issue("01hq3k5v8n2m4p6r8t0w2y4a6c", Role::Creator, "creator@example.com")
            .unwrap();

        let principal = tokens.verify(&token).unwrap();
        assert_eq!(principal.id, "01hq3k5v8n2m4p6r8t0w2y4a6c");
        assert_eq!(principal.role, Role::Creator);
        assert_eq!(principal.email, "creator@example.com");
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = test_codec();
        let err = tokens.verify("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let tokens = test_codec();
        let other = AuthTokens::new(&AuthConfig {
            jwt_secret: "other-secret".to_string(),
            token_ttl_days: 7,
        });

        let token = tokens.issue("id", Role::User, "user@example.com").unwrap();
        assert!(matches!(other.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let tokens = AuthTokens::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: -1,
        });

        let token = tokens.issue("id", Role::Admin, "admin@example.com").unwrap();
        assert!(matches!(tokens.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Creator.to_string(), "creator");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
