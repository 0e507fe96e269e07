//! Cache Admin Handlers
//!
//! Thin passthroughs to the cache layer: stats, bulk clears, health.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::responses::{CacheClearResponse, CacheHealthResponse, CacheStatsResponse};

use super::AppState;

/// Handler for GET /cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse::new(state.cache_store.stats().await))
}

/// Handler for DELETE /cache/clear
///
/// Clears every namespace and reports per-namespace eviction counts.
pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let report = state.invalidator.clear_all().await;
    Json(CacheClearResponse::new("Cache cleared successfully", report))
}

/// Handler for DELETE /cache/pokemon/clear
///
/// Clears the catalog-side namespaces, keeping upstream payloads.
pub async fn clear_pokemon_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let report = state.invalidator.clear_entities().await;
    Json(CacheClearResponse::new(
        "Pokemon cache cleared successfully",
        report,
    ))
}

/// Handler for GET /cache/health
///
/// 200 when the backend answers the probe, 503 otherwise.
pub async fn cache_health(
    State(state): State<AppState>,
) -> (StatusCode, Json<CacheHealthResponse>) {
    let available = state.invalidator.health().await;
    let status = if available {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(CacheHealthResponse::new(available)))
}
