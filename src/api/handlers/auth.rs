//! Auth Handlers
//!
//! Registration, login, token refresh and profile management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::auth::{
    hash_password, issue_token, verify_password, verify_token, AuthUser, TokenKind,
};
use crate::db;
use crate::error::{ApiError, Result};
use crate::models::requests::{LoginRequest, RefreshRequest, RegisterRequest, UpdateUserRequest};
use crate::models::responses::{AuthResponse, TokenResponse};
use crate::models::user::User;

use super::AppState;

fn token_pair(state: &AppState, user_id: i32) -> Result<(String, String)> {
    let access = issue_token(
        user_id,
        TokenKind::Access,
        &state.config.jwt_secret,
        state.config.access_token_ttl,
    )?;
    let refresh = issue_token(
        user_id,
        TokenKind::Refresh,
        &state.config.jwt_secret,
        state.config.refresh_token_ttl,
    )?;
    Ok((access, refresh))
}

/// Handler for POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    if let Some(message) = req.validate() {
        return Err(ApiError::InvalidRequest(message));
    }

    let taken = db::users::username_or_email_taken(
        &state.db,
        Some(req.username.as_str()),
        Some(req.email.as_str()),
        None,
    )
    .await?;
    if taken {
        return Err(ApiError::Conflict("Username or email already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = db::users::create(&state.db, req.username.trim(), req.email.trim(), &password_hash)
        .await?;
    let (access_token, refresh_token) = token_pair(&state, user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user,
            access_token,
            refresh_token,
        }),
    ))
}

/// Handler for POST /auth/login
///
/// The identifier matches either username or email.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = db::users::find_by_username_or_email(&state.db, req.username.trim()).await?;

    // Verify against a found user only; a missing user gets the same
    // rejection so the response does not leak which accounts exist.
    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => return Err(ApiError::Unauthorized("Invalid username or password".to_string())),
    };

    let (access_token, refresh_token) = token_pair(&state, user.id)?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        access_token,
        refresh_token,
    }))
}

/// Handler for POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>> {
    let user_id = verify_token(&req.refresh_token, &state.config.jwt_secret, TokenKind::Refresh)?;

    // The account may have been deleted since the token was issued.
    if db::users::find_by_id(&state.db, user_id).await?.is_none() {
        return Err(ApiError::Unauthorized("user not found".to_string()));
    }

    let access_token = issue_token(
        user_id,
        TokenKind::Access,
        &state.config.jwt_secret,
        state.config.access_token_ttl,
    )?;
    Ok(Json(TokenResponse { access_token }))
}

/// Handler for GET /auth/profile
pub async fn get_profile(State(state): State<AppState>, caller: AuthUser) -> Result<Json<User>> {
    let user = db::users::find_by_id(&state.db, caller.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?;
    Ok(Json(user))
}

/// Handler for PUT /auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    if let Some(message) = req.validate() {
        return Err(ApiError::InvalidRequest(message));
    }

    if req.username.is_some() || req.email.is_some() {
        let taken = db::users::username_or_email_taken(
            &state.db,
            req.username.as_deref(),
            req.email.as_deref(),
            Some(caller.id),
        )
        .await?;
        if taken {
            return Err(ApiError::Conflict("Username or email already exists".to_string()));
        }
    }

    let password_hash = match &req.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let user = db::users::update(
        &state.db,
        caller.id,
        req.username.as_deref(),
        req.email.as_deref(),
        password_hash.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?;

    Ok(Json(user))
}
