//! Response DTOs for the API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, ClearReport};
use crate::models::pokemon::Pokemon;
use crate::models::user::Favorite;

/// Pagination metadata for list envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// Derives the metadata from the query window and the total row count.
    pub fn new(page: u32, per_page: u32, total: i64) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            ((total as u64).div_ceil(per_page.max(1) as u64)) as u32
        };
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1 && pages > 0,
        }
    }
}

/// Envelope for GET /pokemon. Cached whole, pagination included, so a
/// hit never re-derives metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonListResponse {
    pub pokemon: Vec<Pokemon>,
    pub pagination: Pagination,
}

/// Envelope for search and type-filter results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokemonResultsResponse {
    pub pokemon: Vec<Pokemon>,
    pub count: usize,
}

impl PokemonResultsResponse {
    pub fn new(pokemon: Vec<Pokemon>) -> Self {
        let count = pokemon.len();
        Self { pokemon, count }
    }
}

/// A favorite with its full Pokemon embedded (when still in the catalog).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteWithPokemon {
    pub id: i32,
    pub user_id: i32,
    pub pokemon_id: i32,
    pub created_at: DateTime<Utc>,
    pub pokemon: Option<Pokemon>,
}

impl FavoriteWithPokemon {
    pub fn new(favorite: Favorite, pokemon: Option<Pokemon>) -> Self {
        Self {
            id: favorite.id,
            user_id: favorite.user_id,
            pokemon_id: favorite.pokemon_id,
            created_at: favorite.created_at,
            pokemon,
        }
    }
}

/// Envelope for GET /users/:id/favorites.
#[derive(Debug, Clone, Serialize)]
pub struct FavoritesResponse {
    pub user_id: i32,
    pub favorites: Vec<FavoriteWithPokemon>,
}

/// Generic success message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub cache_status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn new(cache_available: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            cache_status: if cache_available {
                "available".to_string()
            } else {
                "unavailable".to_string()
            },
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /cache/stats.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub status: String,
    pub available: bool,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub total_keys: u64,
    pub used_memory: Option<String>,
}

impl CacheStatsResponse {
    pub fn new(stats: CacheStats) -> Self {
        Self {
            status: if stats.available {
                "available".to_string()
            } else {
                "unavailable".to_string()
            },
            available: stats.available,
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            total_keys: stats.total_keys,
            used_memory: stats.used_memory,
        }
    }
}

/// Response body for the cache clear endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CacheClearResponse {
    pub status: String,
    pub message: String,
    pub results: ClearReport,
}

impl CacheClearResponse {
    pub fn new(message: impl Into<String>, results: ClearReport) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            results,
        }
    }
}

/// Response body for GET /cache/health.
#[derive(Debug, Clone, Serialize)]
pub struct CacheHealthResponse {
    pub status: String,
    pub message: String,
    pub available: bool,
}

impl CacheHealthResponse {
    pub fn new(available: bool) -> Self {
        if available {
            Self {
                status: "healthy".to_string(),
                message: "cache backend is available and responding".to_string(),
                available,
            }
        } else {
            Self {
                status: "unhealthy".to_string(),
                message: "cache backend is not available".to_string(),
                available,
            }
        }
    }
}

/// Response body for register and login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: crate::models::user::User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response body for POST /auth/refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Envelope for GET /users.
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<crate::models::user::User>,
    pub pagination: Pagination,
}
