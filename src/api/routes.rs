//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{auth, cache, health_handler, pokemon, users, AppState};

/// Creates the main router with all endpoints under `/api/v1`.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(health_handler))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/profile", get(auth::get_profile).put(auth::update_profile))
        // Pokemon catalog
        .route("/pokemon", get(pokemon::list_pokemon).post(pokemon::create_pokemon))
        .route("/pokemon/search", get(pokemon::search_pokemon))
        .route("/pokemon/types/:type", get(pokemon::pokemon_by_type))
        .route(
            "/pokemon/:id",
            get(pokemon::get_pokemon)
                .put(pokemon::update_pokemon)
                .delete(pokemon::delete_pokemon),
        )
        .route("/pokemon/:id/species", get(pokemon::get_species))
        .route("/pokemon/:id/evolution", get(pokemon::get_evolution))
        // Users and favorites
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route(
            "/users/:id/favorites",
            get(users::get_favorites)
                .post(users::add_favorite)
                .delete(users::remove_favorite),
        )
        // Cache admin
        .route("/cache/stats", get(cache::cache_stats))
        .route("/cache/clear", delete(cache::clear_cache))
        .route("/cache/pokemon/clear", delete(cache::clear_pokemon_cache))
        .route("/cache/health", get(cache::cache_health));

    Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
