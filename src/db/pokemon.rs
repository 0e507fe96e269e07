//! Pokemon Repository
//!
//! Catalog queries. The list query mirrors the shape the cache keys on:
//! {page, per_page, search, type, sort, user}.

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::cache::{Identity, ListParams, SortMode};
use crate::models::pokemon::{NewPokemon, Pokemon};

/// Result cap for the dedicated search and type-filter queries.
const MAX_RESULTS: i64 = 100;

/// Fetches a page of the catalog plus the total row count for the same
/// filters.
pub async fn list(pool: &PgPool, params: &ListParams) -> Result<(Vec<Pokemon>, i64), sqlx::Error> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT p.* FROM pokemon p");

    // Favorites ordering needs the caller's join row; anonymous callers
    // have none and fall back to id order.
    let favorites_user = match (params.sort, params.user) {
        (SortMode::Favorites, Identity::User(id)) => Some(id),
        _ => None,
    };
    if let Some(user_id) = favorites_user {
        query.push(" LEFT JOIN user_pokemon f ON f.pokemon_id = p.pokemon_id AND f.user_id = ");
        query.push_bind(user_id);
    }

    query.push(" WHERE 1=1");
    push_filters(&mut query, params);

    match params.sort {
        SortMode::Id => {
            query.push(" ORDER BY p.pokemon_id");
        }
        SortMode::Name => {
            query.push(" ORDER BY p.name, p.pokemon_id");
        }
        SortMode::Favorites => {
            if favorites_user.is_some() {
                query.push(" ORDER BY (f.user_id IS NOT NULL) DESC, p.pokemon_id");
            } else {
                query.push(" ORDER BY p.pokemon_id");
            }
        }
    }

    query.push(" LIMIT ");
    query.push_bind(params.per_page as i64);
    query.push(" OFFSET ");
    query.push_bind(params.page.saturating_sub(1) as i64 * params.per_page as i64);

    let rows = query.build_query_as::<Pokemon>().fetch_all(pool).await?;

    let mut count: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM pokemon p WHERE 1=1");
    push_filters(&mut count, params);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok((rows, total))
}

fn push_filters(query: &mut QueryBuilder<Postgres>, params: &ListParams) {
    if let Some(search) = &params.search {
        query.push(" AND p.name ILIKE ");
        query.push_bind(format!("%{}%", search.trim()));
    }
    if let Some(type_filter) = &params.type_filter {
        query.push(" AND p.types @> ");
        query.push_bind(Json(vec![type_filter.trim().to_lowercase()]));
    }
}

pub async fn get_by_pokemon_id(
    pool: &PgPool,
    pokemon_id: i32,
) -> Result<Option<Pokemon>, sqlx::Error> {
    sqlx::query_as::<_, Pokemon>("SELECT * FROM pokemon WHERE pokemon_id = $1")
        .bind(pokemon_id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, pokemon_id: i32) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pokemon WHERE pokemon_id = $1)")
        .bind(pokemon_id)
        .fetch_one(pool)
        .await
}

/// Case-insensitive substring search on name.
pub async fn search_by_name(pool: &PgPool, term: &str) -> Result<Vec<Pokemon>, sqlx::Error> {
    sqlx::query_as::<_, Pokemon>(
        "SELECT * FROM pokemon WHERE name ILIKE $1 ORDER BY pokemon_id LIMIT $2",
    )
    .bind(format!("%{}%", term.trim()))
    .bind(MAX_RESULTS)
    .fetch_all(pool)
    .await
}

/// All Pokemon carrying the given type.
pub async fn filter_by_type(pool: &PgPool, type_name: &str) -> Result<Vec<Pokemon>, sqlx::Error> {
    sqlx::query_as::<_, Pokemon>(
        "SELECT * FROM pokemon WHERE types @> $1 ORDER BY pokemon_id LIMIT $2",
    )
    .bind(Json(vec![type_name.trim().to_lowercase()]))
    .bind(MAX_RESULTS)
    .fetch_all(pool)
    .await
}

pub async fn insert(pool: &PgPool, record: &NewPokemon) -> Result<Pokemon, sqlx::Error> {
    sqlx::query_as::<_, Pokemon>(
        r#"
        INSERT INTO pokemon
            (pokemon_id, name, height, weight, base_experience, types, abilities, stats, sprites)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(record.pokemon_id)
    .bind(&record.name)
    .bind(record.height)
    .bind(record.weight)
    .bind(record.base_experience)
    .bind(Json(&record.types))
    .bind(Json(&record.abilities))
    .bind(Json(&record.stats))
    .bind(Json(&record.sprites))
    .fetch_one(pool)
    .await
}

/// Overwrites a row with fresh upstream data. Returns the updated row,
/// or `None` when the id is not in the catalog.
pub async fn update_from(
    pool: &PgPool,
    pokemon_id: i32,
    record: &NewPokemon,
) -> Result<Option<Pokemon>, sqlx::Error> {
    sqlx::query_as::<_, Pokemon>(
        r#"
        UPDATE pokemon SET
            name = $2, height = $3, weight = $4, base_experience = $5,
            types = $6, abilities = $7, stats = $8, sprites = $9,
            updated_at = now()
        WHERE pokemon_id = $1
        RETURNING *
        "#,
    )
    .bind(pokemon_id)
    .bind(&record.name)
    .bind(record.height)
    .bind(record.weight)
    .bind(record.base_experience)
    .bind(Json(&record.types))
    .bind(Json(&record.abilities))
    .bind(Json(&record.stats))
    .bind(Json(&record.sprites))
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, pokemon_id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pokemon WHERE pokemon_id = $1")
        .bind(pokemon_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
