//! Authentication
//!
//! JWT issuance/verification, password hashing, and the axum
//! extractors that resolve a bearer token into a user id.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::api::AppState;
use crate::error::{ApiError, Result};
use crate::models::user::User;

// == Claims ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

// == Tokens ==
pub fn issue_token(user_id: i32, kind: TokenKind, secret: &str, ttl_secs: u64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        kind,
        iat: now,
        exp: now + ttl_secs as i64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
}

/// Verifies signature, expiry and token kind, returning the user id.
pub fn verify_token(token: &str, secret: &str, expected: TokenKind) -> Result<i32> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("invalid or expired token".to_string()))?;

    if data.claims.kind != expected {
        return Err(ApiError::Unauthorized("wrong token type".to_string()));
    }
    data.claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("invalid token subject".to_string()))
}

// == Passwords ==
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// == Admin Gate ==
/// Loads the caller and rejects non-admins.
pub async fn require_admin(pool: &PgPool, user_id: i32) -> Result<User> {
    let user = crate::db::users::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?;
    if !user.is_admin {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(user)
}

// == Extractors ==
/// Rejecting extractor: the request must carry a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
}

/// Non-rejecting extractor: resolves to `None` on a missing or invalid
/// token. Used where identity only partitions the result (favorites
/// sorting) rather than gating access.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<i32>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let id = verify_token(token, &state.config.jwt_secret, TokenKind::Access)?;
        Ok(AuthUser { id })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let id = bearer_token(parts)
            .and_then(|token| verify_token(token, &state.config.jwt_secret, TokenKind::Access).ok());
        Ok(MaybeAuthUser(id))
    }
}
