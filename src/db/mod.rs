//! Database Layer
//!
//! Connection pool setup plus repositories as plain async functions
//! over `&PgPool`. The relational store is the single source of truth;
//! every cache entry is a disposable projection of what lives here.

pub mod favorites;
pub mod pokemon;
pub mod users;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Connects the process-wide pool.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Creates the tables and indexes if they do not exist. Schema
/// migration tooling is out of scope; this keeps a fresh database
/// runnable.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    const SCHEMA: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY,
            username VARCHAR(80) NOT NULL UNIQUE,
            email VARCHAR(120) NOT NULL UNIQUE,
            password_hash VARCHAR(128) NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS pokemon (
            id SERIAL PRIMARY KEY,
            pokemon_id INTEGER NOT NULL UNIQUE,
            name VARCHAR(100) NOT NULL,
            height INTEGER,
            weight INTEGER,
            base_experience INTEGER,
            types JSONB NOT NULL DEFAULT '[]',
            abilities JSONB NOT NULL DEFAULT '[]',
            stats JSONB NOT NULL DEFAULT '{}',
            sprites JSONB NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS user_pokemon (
            id SERIAL PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            pokemon_id INTEGER NOT NULL REFERENCES pokemon(pokemon_id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE (user_id, pokemon_id)
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_pokemon_name ON pokemon (name)",
        "CREATE INDEX IF NOT EXISTS idx_user_pokemon_user ON user_pokemon (user_id)",
    ];

    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
