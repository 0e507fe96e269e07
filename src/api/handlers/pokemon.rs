//! Pokemon Handlers
//!
//! The read path is read-through cached: derive the parameter tuple,
//! try the cache, fall through to the database and write the envelope
//! back. Writes bypass the cache entirely and evict the affected key
//! classes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::MaybeAuthUser;
use crate::cache::{memoize, Identity};
use crate::db;
use crate::error::{ApiError, Result};
use crate::models::pokemon::NewPokemon;
use crate::models::requests::{CreatePokemonRequest, ListQuery, SearchQuery};
use crate::models::responses::{
    MessageResponse, Pagination, PokemonListResponse, PokemonResultsResponse,
};
use crate::pokeapi::{ApiEvolutionChain, ApiSpecies};

use super::AppState;

/// Handler for GET /pokemon
///
/// Paginated catalog listing with search, type filter and sort. The
/// whole response envelope is cached under the canonical parameter
/// digest; a hit returns it without touching the database or
/// re-deriving pagination.
pub async fn list_pokemon(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<PokemonListResponse>> {
    let identity = user.map(Identity::User).unwrap_or(Identity::Anonymous);
    let params = query.into_params(identity);

    if let Some(cached) = state.pokemon_cache.get_list::<PokemonListResponse>(&params).await {
        return Ok(Json(cached));
    }

    let (rows, total) = db::pokemon::list(&state.db, &params).await?;
    let envelope = PokemonListResponse {
        pokemon: rows,
        pagination: Pagination::new(params.page, params.per_page, total),
    };
    state
        .pokemon_cache
        .cache_list(&params, &envelope, state.config.query_cache_ttl)
        .await;

    Ok(Json(envelope))
}

/// Handler for GET /pokemon/:id
pub async fn get_pokemon(
    State(state): State<AppState>,
    Path(pokemon_id): Path<i32>,
) -> Result<Json<crate::models::pokemon::Pokemon>> {
    if let Some(cached) = state.pokemon_cache.get_pokemon(pokemon_id).await {
        return Ok(Json(cached));
    }

    let pokemon = db::pokemon::get_by_pokemon_id(&state.db, pokemon_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pokemon with ID {pokemon_id} not found")))?;
    state
        .pokemon_cache
        .cache_pokemon(pokemon_id, &pokemon, state.config.entity_cache_ttl)
        .await;

    Ok(Json(pokemon))
}

/// Handler for GET /pokemon/search?q=
///
/// Results are memoized under the lower-cased term, so `Char` and
/// `char` share one entry.
pub async fn search_pokemon(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PokemonResultsResponse>> {
    let term = query.q.trim().to_string();
    if term.is_empty() {
        return Err(ApiError::InvalidRequest("Search term cannot be empty".to_string()));
    }

    let key = state.pokemon_cache.search_key(&term);
    let results = memoize(
        state.pokemon_cache.store(),
        &key,
        state.config.query_cache_ttl,
        || async { db::pokemon::search_by_name(&state.db, &term).await },
    )
    .await?;

    Ok(Json(PokemonResultsResponse::new(results)))
}

/// Handler for GET /pokemon/types/:type
pub async fn pokemon_by_type(
    State(state): State<AppState>,
    Path(type_name): Path<String>,
) -> Result<Json<PokemonResultsResponse>> {
    let key = state.pokemon_cache.type_key(&type_name);
    let results = memoize(
        state.pokemon_cache.store(),
        &key,
        state.config.query_cache_ttl,
        || async { db::pokemon::filter_by_type(&state.db, &type_name).await },
    )
    .await?;

    Ok(Json(PokemonResultsResponse::new(results)))
}

/// Handler for POST /pokemon
///
/// Imports a Pokemon from the upstream provider into the catalog, then
/// evicts the derived namespaces so stale pages cannot outlive the
/// write.
pub async fn create_pokemon(
    State(state): State<AppState>,
    Json(req): Json<CreatePokemonRequest>,
) -> Result<(StatusCode, Json<crate::models::pokemon::Pokemon>)> {
    if db::pokemon::exists(&state.db, req.pokemon_id).await? {
        return Err(ApiError::Conflict("Pokemon already exists".to_string()));
    }

    let upstream = state.pokeapi.get_pokemon(req.pokemon_id).await?;
    let pokemon = db::pokemon::insert(&state.db, &NewPokemon::from(upstream)).await?;
    state.invalidator.on_pokemon_write(None).await;

    Ok((StatusCode::CREATED, Json(pokemon)))
}

/// Handler for PUT /pokemon/:id
///
/// Refreshes a catalog row from the upstream provider.
pub async fn update_pokemon(
    State(state): State<AppState>,
    Path(pokemon_id): Path<i32>,
) -> Result<Json<crate::models::pokemon::Pokemon>> {
    let upstream = state.pokeapi.get_pokemon(pokemon_id).await?;
    let pokemon = db::pokemon::update_from(&state.db, pokemon_id, &NewPokemon::from(upstream))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Pokemon with ID {pokemon_id} not found")))?;
    state.invalidator.on_pokemon_write(Some(pokemon_id)).await;

    Ok(Json(pokemon))
}

/// Handler for DELETE /pokemon/:id
pub async fn delete_pokemon(
    State(state): State<AppState>,
    Path(pokemon_id): Path<i32>,
) -> Result<Json<MessageResponse>> {
    if !db::pokemon::delete(&state.db, pokemon_id).await? {
        return Err(ApiError::NotFound(format!(
            "Pokemon with ID {pokemon_id} not found"
        )));
    }
    state.invalidator.on_pokemon_write(Some(pokemon_id)).await;

    Ok(Json(MessageResponse::new("Pokemon deleted successfully")))
}

/// Handler for GET /pokemon/:id/species
///
/// Passthrough to the upstream species payload, served from the
/// long-TTL upstream cache when possible.
pub async fn get_species(
    State(state): State<AppState>,
    Path(pokemon_id): Path<i32>,
) -> Result<Json<ApiSpecies>> {
    Ok(Json(state.pokeapi.get_species(pokemon_id).await?))
}

/// Handler for GET /pokemon/:id/evolution
pub async fn get_evolution(
    State(state): State<AppState>,
    Path(pokemon_id): Path<i32>,
) -> Result<Json<ApiEvolutionChain>> {
    Ok(Json(state.pokeapi.get_evolution_for_pokemon(pokemon_id).await?))
}
