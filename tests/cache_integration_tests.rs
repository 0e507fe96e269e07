//! Integration Tests for the Caching Layer
//!
//! Exercises the store, entity caches and invalidation together against
//! the in-memory backend, which shares TTL and namespace semantics with
//! the Redis backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use pokedex_api::cache::{
    CacheInvalidator, CacheStore, Identity, ListParams, PokeApiCache, PokemonCache, SortMode,
};

fn build_caches() -> (Arc<CacheStore>, PokemonCache, PokeApiCache, CacheInvalidator) {
    let store = Arc::new(CacheStore::in_memory());
    let pokemon = PokemonCache::new(store.clone());
    let pokeapi = PokeApiCache::new(store.clone());
    let invalidator = CacheInvalidator::new(store.clone(), pokemon.clone(), pokeapi.clone());
    (store, pokemon, pokeapi, invalidator)
}

// == TTL ==

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let (store, pokemon, _, _) = build_caches();

    pokemon.cache_pokemon(25, &json!({"name": "pikachu"}), 1).await;
    assert!(pokemon.get_pokemon::<Value>(25).await.is_some());
    assert!(store.ttl_remaining("pokemon:25").await >= 0);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(pokemon.get_pokemon::<Value>(25).await, None);
    assert_eq!(store.ttl_remaining("pokemon:25").await, -2);
}

// == Namespace Isolation ==

#[tokio::test]
async fn test_clear_list_does_not_touch_entities() {
    let (_, pokemon, _, _) = build_caches();

    pokemon.cache_pokemon(25, &json!({"name": "pikachu"}), 3600).await;
    pokemon
        .cache_list(&ListParams::default(), &json!({"pokemon": []}), 300)
        .await;

    assert_eq!(pokemon.clear_list().await, 1);
    assert!(pokemon.get_pokemon::<Value>(25).await.is_some());

    // And the other direction: clearing entities leaves lists alone.
    pokemon
        .cache_list(&ListParams::default(), &json!({"pokemon": []}), 300)
        .await;
    assert_eq!(pokemon.clear_pokemon(None).await, 1);
    assert!(pokemon.get_list::<Value>(&ListParams::default()).await.is_some());
}

#[tokio::test]
async fn test_upstream_namespaces_isolated_from_catalog() {
    let (_, pokemon, pokeapi, _) = build_caches();

    pokemon.cache_pokemon(25, &json!({}), 3600).await;
    pokeapi.cache_pokemon_data(25, &json!({}), 86_400).await;

    assert_eq!(pokemon.clear_all().await, 1);
    assert!(pokeapi.get_pokemon_data::<Value>(25).await.is_some());
}

// == Case-Insensitive Search Keys ==

#[tokio::test]
async fn test_search_cache_collapses_case() {
    let (_, pokemon, _, _) = build_caches();
    let results = json!([{"name": "charmander"}, {"name": "charizard"}]);

    pokemon.cache_search("Char", &results, 300).await;
    assert_eq!(pokemon.get_search::<Value>("char").await, Some(results));
}

// == Single Entity Scenario ==

#[tokio::test]
async fn test_single_entity_cache_lifecycle() {
    let (_, pokemon, _, _) = build_caches();
    let pikachu = json!({
        "pokemon_id": 25,
        "name": "pikachu",
        "types": ["electric"],
    });

    assert!(pokemon.cache_pokemon(25, &pikachu, 3600).await);
    assert_eq!(pokemon.get_pokemon::<Value>(25).await, Some(pikachu));

    assert_eq!(pokemon.clear_pokemon(Some(25)).await, 1);
    assert_eq!(pokemon.get_pokemon::<Value>(25).await, None);
}

// == List Parameter Sensitivity ==

#[tokio::test]
async fn test_list_cache_distinguishes_pages() {
    let (_, pokemon, _, _) = build_caches();
    let page1 = ListParams::default();
    let page2 = ListParams {
        page: 2,
        ..Default::default()
    };

    pokemon
        .cache_list(&page1, &json!({"pagination": {"page": 1}}), 300)
        .await;

    assert!(pokemon.get_list::<Value>(&page1).await.is_some());
    assert_eq!(pokemon.get_list::<Value>(&page2).await, None);
}

#[tokio::test]
async fn test_list_cache_partitions_identity_dependent_sorts() {
    let (_, pokemon, _, _) = build_caches();
    let user_params = ListParams {
        sort: SortMode::Favorites,
        user: Identity::User(1),
        ..Default::default()
    };
    let anon_params = ListParams {
        sort: SortMode::Favorites,
        user: Identity::Anonymous,
        ..Default::default()
    };

    pokemon
        .cache_list(&user_params, &json!({"pokemon": ["user 1 ordering"]}), 300)
        .await;

    // A failed or missing identity lands in the anon partition and must
    // never see another user's favorites-ordered page.
    assert_eq!(pokemon.get_list::<Value>(&anon_params).await, None);
}

// == Bulk Invalidation ==

#[tokio::test]
async fn test_bulk_invalidation_counts_everything() {
    let (_, pokemon, _, invalidator) = build_caches();

    for page in 1..=5u32 {
        let params = ListParams {
            page,
            ..Default::default()
        };
        pokemon.cache_list(&params, &json!({"page": page}), 300).await;
    }
    for term in ["pika", "char", "bulba"] {
        pokemon.cache_search(term, &json!([]), 300).await;
    }

    let report = invalidator.clear_all().await;
    assert_eq!(report.pokemon_list, 5);
    assert_eq!(report.pokemon_search, 3);
    assert_eq!(report.total, 8);

    for page in 1..=5u32 {
        let params = ListParams {
            page,
            ..Default::default()
        };
        assert_eq!(pokemon.get_list::<Value>(&params).await, None);
    }
    for term in ["pika", "char", "bulba"] {
        assert_eq!(pokemon.get_search::<Value>(term).await, None);
    }
}

#[tokio::test]
async fn test_repeated_clear_reports_zero() {
    let (_, pokemon, _, invalidator) = build_caches();

    pokemon.cache_search("pika", &json!([]), 300).await;
    assert_eq!(invalidator.clear_all().await.total, 1);
    assert_eq!(invalidator.clear_all().await.total, 0);
}

// == Fail-Open ==

#[tokio::test]
async fn test_caches_fail_open_without_backend() {
    let store = Arc::new(CacheStore::connect(None, Duration::from_millis(250)));
    let pokemon = PokemonCache::new(store.clone());
    let pokeapi = PokeApiCache::new(store.clone());
    let invalidator = CacheInvalidator::new(store, pokemon.clone(), pokeapi.clone());

    // Writes report failure, reads report misses, clears report zero;
    // nothing panics or errors.
    assert!(!pokemon.cache_pokemon(25, &json!({}), 3600).await);
    assert_eq!(pokemon.get_pokemon::<Value>(25).await, None);
    assert!(!pokeapi.cache_pokemon_data(25, &json!({}), 86_400).await);
    assert_eq!(invalidator.clear_all().await.total, 0);
    assert!(!invalidator.health().await);
}
