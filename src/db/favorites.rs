//! Favorites Repository

use sqlx::PgPool;

use crate::models::pokemon::Pokemon;
use crate::models::user::Favorite;

pub async fn list_for_user(pool: &PgPool, user_id: i32) -> Result<Vec<Favorite>, sqlx::Error> {
    sqlx::query_as::<_, Favorite>(
        "SELECT * FROM user_pokemon WHERE user_id = $1 ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Catalog rows for a set of favorites, for embedding in the response.
pub async fn pokemon_for_ids(
    pool: &PgPool,
    pokemon_ids: &[i32],
) -> Result<Vec<Pokemon>, sqlx::Error> {
    sqlx::query_as::<_, Pokemon>("SELECT * FROM pokemon WHERE pokemon_id = ANY($1)")
        .bind(pokemon_ids)
        .fetch_all(pool)
        .await
}

pub async fn exists(pool: &PgPool, user_id: i32, pokemon_id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM user_pokemon WHERE user_id = $1 AND pokemon_id = $2)",
    )
    .bind(user_id)
    .bind(pokemon_id)
    .fetch_one(pool)
    .await
}

pub async fn add(pool: &PgPool, user_id: i32, pokemon_id: i32) -> Result<Favorite, sqlx::Error> {
    sqlx::query_as::<_, Favorite>(
        r#"
        INSERT INTO user_pokemon (user_id, pokemon_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(pokemon_id)
    .fetch_one(pool)
    .await
}

pub async fn remove(pool: &PgPool, user_id: i32, pokemon_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_pokemon WHERE user_id = $1 AND pokemon_id = $2")
        .bind(user_id)
        .bind(pokemon_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
