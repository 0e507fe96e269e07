//! API Handlers
//!
//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod cache;
pub mod pokemon;
pub mod users;

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use sqlx::PgPool;

use crate::cache::{CacheInvalidator, CacheStore, PokeApiCache, PokemonCache};
use crate::config::Config;
use crate::models::responses::HealthResponse;
use crate::pokeapi::PokeApiClient;

/// Application state shared across all handlers.
///
/// Every dependency is constructed once at startup and injected here;
/// nothing lives in globals. Cloning is cheap (everything is Arc-backed
/// or a pool handle).
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache_store: Arc<CacheStore>,
    pub pokemon_cache: PokemonCache,
    pub invalidator: CacheInvalidator,
    pub pokeapi: Arc<PokeApiClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the caches and upstream client over an existing pool and
    /// store.
    pub fn new(db: PgPool, cache_store: Arc<CacheStore>, config: Config) -> crate::error::Result<Self> {
        let pokemon_cache = PokemonCache::new(cache_store.clone());
        let pokeapi_cache = PokeApiCache::new(cache_store.clone());
        let invalidator = CacheInvalidator::new(
            cache_store.clone(),
            pokemon_cache.clone(),
            pokeapi_cache.clone(),
        );
        let pokeapi = Arc::new(PokeApiClient::new(&config, pokeapi_cache)?);
        Ok(Self {
            db,
            cache_store,
            pokemon_cache,
            invalidator,
            pokeapi,
            config: Arc::new(config),
        })
    }
}

/// Handler for GET /health
///
/// Reports service health including cache availability. The cache being
/// down does not make the service unhealthy, it only degrades reads.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::new(state.cache_store.available().await))
}
