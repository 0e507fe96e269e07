//! Pokedex API - A Pokemon catalog REST backend
//!
//! JWT-authenticated CRUD over a PostgreSQL catalog with a Redis-backed
//! read-through caching layer and an upstream PokeAPI client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokedex_api::api::create_router;
use pokedex_api::cache::CacheStore;
use pokedex_api::{db, AppState, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the database pool and ensure the schema exists
/// 4. Connect the cache store (degraded start is fine; reads just miss)
/// 5. Create the Axum router with all endpoints
/// 6. Start the HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pokedex_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pokedex API");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        port = config.server_port,
        pokeapi = %config.pokeapi_base_url,
        cache_configured = config.redis_url.is_some(),
        "Configuration loaded"
    );

    // Connect the authoritative store and make sure the schema exists
    let pool = db::connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    db::ensure_schema(&pool)
        .await
        .context("failed to ensure the database schema")?;
    info!("Database connected");

    // Connect the cache store; an unreachable backend degrades reads to
    // misses instead of failing startup
    let cache_store = Arc::new(CacheStore::connect(
        config.redis_url.as_deref(),
        Duration::from_millis(config.cache_op_timeout_ms),
    ));
    if cache_store.available().await {
        info!("Cache backend connected");
    } else {
        info!("Cache backend unavailable, serving without cache");
    }

    // Wire the application state and router
    let server_port = config.server_port;
    let state = AppState::new(pool, cache_store, config)?;
    let app = create_router(state);

    // Bind to the configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
