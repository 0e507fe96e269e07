//! User and Favorites Handlers
//!
//! Users may only read and modify their own data; admins may list and
//! delete accounts. Favorites writes evict the identity-partitioned
//! list cache.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::{require_admin, AuthUser};
use crate::db;
use crate::error::{ApiError, Result};
use crate::models::requests::{FavoriteRequest, PageQuery, UpdateUserRequest};
use crate::models::responses::{
    FavoriteWithPokemon, FavoritesResponse, MessageResponse, Pagination, UserListResponse,
};
use crate::models::user::User;

use super::AppState;

/// Handler for GET /users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserListResponse>> {
    require_admin(&state.db, caller.id).await?;

    let (page, per_page) = query.resolve();
    let (users, total) = db::users::list(&state.db, page, per_page).await?;

    Ok(Json(UserListResponse {
        users,
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Handler for GET /users/:id (own data or admin)
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<User>> {
    let user = db::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with ID {user_id} not found")))?;

    if caller.id != user_id {
        require_admin(&state.db, caller.id).await?;
    }

    Ok(Json(user))
}

/// Handler for PUT /users/:id (own data only)
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    if caller.id != user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    if let Some(message) = req.validate() {
        return Err(ApiError::InvalidRequest(message));
    }

    if req.username.is_some() || req.email.is_some() {
        let taken = db::users::username_or_email_taken(
            &state.db,
            req.username.as_deref(),
            req.email.as_deref(),
            Some(user_id),
        )
        .await?;
        if taken {
            return Err(ApiError::Conflict("Username or email already exists".to_string()));
        }
    }

    let password_hash = match &req.password {
        Some(password) => Some(crate::auth::hash_password(password)?),
        None => None,
    };
    let user = db::users::update(
        &state.db,
        user_id,
        req.username.as_deref(),
        req.email.as_deref(),
        password_hash.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("User with ID {user_id} not found")))?;

    Ok(Json(user))
}

/// Handler for DELETE /users/:id (admin only; removes favorites first)
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    require_admin(&state.db, caller.id).await?;

    if !db::users::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound(format!("User with ID {user_id} not found")));
    }
    // The deleted user's favorites are gone; their partitioned list
    // entries age out with the lists they belong to.
    state.invalidator.on_favorites_change().await;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Handler for GET /users/:id/favorites (own data only)
///
/// Embeds the full Pokemon for each favorite.
pub async fn get_favorites(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<FavoritesResponse>> {
    if caller.id != user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    let favorites = db::favorites::list_for_user(&state.db, user_id).await?;
    let ids: Vec<i32> = favorites.iter().map(|f| f.pokemon_id).collect();
    let pokemon = db::favorites::pokemon_for_ids(&state.db, &ids).await?;

    let favorites = favorites
        .into_iter()
        .map(|favorite| {
            let matching = pokemon
                .iter()
                .find(|p| p.pokemon_id == favorite.pokemon_id)
                .cloned();
            FavoriteWithPokemon::new(favorite, matching)
        })
        .collect();

    Ok(Json(FavoritesResponse { user_id, favorites }))
}

/// Handler for POST /users/:id/favorites (own data only)
pub async fn add_favorite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
    Json(req): Json<FavoriteRequest>,
) -> Result<(StatusCode, Json<crate::models::user::Favorite>)> {
    if caller.id != user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    if !db::pokemon::exists(&state.db, req.pokemon_id).await? {
        return Err(ApiError::NotFound("Pokemon not found".to_string()));
    }
    if db::favorites::exists(&state.db, user_id, req.pokemon_id).await? {
        return Err(ApiError::Conflict("Pokemon already in favorites".to_string()));
    }

    let favorite = db::favorites::add(&state.db, user_id, req.pokemon_id).await?;
    // Favorites feed identity-partitioned sorts; their cached pages are
    // now stale.
    state.invalidator.on_favorites_change().await;

    Ok((StatusCode::CREATED, Json(favorite)))
}

/// Handler for DELETE /users/:id/favorites (own data only)
pub async fn remove_favorite(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(user_id): Path<i32>,
    Json(req): Json<FavoriteRequest>,
) -> Result<Json<MessageResponse>> {
    if caller.id != user_id {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }
    if !db::favorites::remove(&state.db, user_id, req.pokemon_id).await? {
        return Err(ApiError::NotFound("Pokemon not in favorites".to_string()));
    }
    state.invalidator.on_favorites_change().await;

    Ok(Json(MessageResponse::new("Pokemon removed from favorites")))
}
