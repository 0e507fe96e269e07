//! Cache Invalidation
//!
//! Pattern-based bulk eviction triggered by writes and by the admin
//! clear endpoints. Best effort: a mid-flight backend failure shows up
//! as a lower eviction count, never an error — remaining entries age
//! out on their TTLs.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::cache::pokeapi::PokeApiCache;
use crate::cache::pokemon::PokemonCache;
use crate::cache::store::CacheStore;

/// Per-namespace eviction counts reported by a clear operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClearReport {
    pub pokemon: u64,
    pub pokemon_list: u64,
    pub pokemon_search: u64,
    pub pokemon_type: u64,
    pub pokeapi: u64,
    pub total: u64,
}

#[derive(Clone)]
pub struct CacheInvalidator {
    store: Arc<CacheStore>,
    pokemon: PokemonCache,
    pokeapi: PokeApiCache,
}

impl CacheInvalidator {
    pub fn new(store: Arc<CacheStore>, pokemon: PokemonCache, pokeapi: PokeApiCache) -> Self {
        Self {
            store,
            pokemon,
            pokeapi,
        }
    }

    /// Clears every cache namespace. Invoked by the admin clear
    /// endpoint and after any bulk catalog change.
    pub async fn clear_all(&self) -> ClearReport {
        let mut report = self.clear_entities().await;
        report.pokeapi = self.pokeapi.clear().await;
        report.total += report.pokeapi;
        info!(total = report.total, "cache cleared");
        report
    }

    /// Clears the entity-side namespaces only, leaving upstream PokeAPI
    /// payloads in place (reference data that outlives catalog edits).
    pub async fn clear_entities(&self) -> ClearReport {
        let pokemon = self.pokemon.clear_pokemon(None).await;
        let pokemon_list = self.pokemon.clear_list().await;
        let pokemon_search = self.pokemon.clear_search().await;
        let pokemon_type = self.pokemon.clear_type().await;
        ClearReport {
            pokemon,
            pokemon_list,
            pokemon_search,
            pokemon_type,
            pokeapi: 0,
            total: pokemon + pokemon_list + pokemon_search + pokemon_type,
        }
    }

    /// Eviction for a single-entity write: the entity key plus every
    /// derived namespace that could embed it (any cached page, search
    /// term or type filter may include the changed row).
    pub async fn on_pokemon_write(&self, pokemon_id: Option<i32>) -> u64 {
        self.pokemon.clear_pokemon(pokemon_id).await
            + self.pokemon.clear_list().await
            + self.pokemon.clear_search().await
            + self.pokemon.clear_type().await
    }

    /// Eviction for a favorites change: only identity-partitioned list
    /// entries depend on favorites, so the list namespace alone is
    /// cleared.
    pub async fn on_favorites_change(&self) -> u64 {
        self.pokemon.clear_list().await
    }

    /// Availability of the backing store.
    pub async fn health(&self) -> bool {
        self.store.available().await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::ListParams;
    use serde_json::json;

    fn test_invalidator() -> CacheInvalidator {
        let store = Arc::new(CacheStore::in_memory());
        CacheInvalidator::new(
            store.clone(),
            PokemonCache::new(store.clone()),
            PokeApiCache::new(store),
        )
    }

    #[tokio::test]
    async fn test_clear_all_reports_per_namespace_counts() {
        let inv = test_invalidator();

        inv.pokemon.cache_pokemon(25, &json!({}), 3600).await;
        inv.pokemon
            .cache_list(&ListParams::default(), &json!({}), 300)
            .await;
        inv.pokemon.cache_search("pika", &json!([]), 300).await;
        inv.pokeapi.cache_pokemon_data(25, &json!({}), 86_400).await;

        let report = inv.clear_all().await;
        assert_eq!(report.pokemon, 1);
        assert_eq!(report.pokemon_list, 1);
        assert_eq!(report.pokemon_search, 1);
        assert_eq!(report.pokemon_type, 0);
        assert_eq!(report.pokeapi, 1);
        assert_eq!(report.total, 4);
    }

    #[tokio::test]
    async fn test_clear_entities_leaves_upstream_cache() {
        let inv = test_invalidator();

        inv.pokemon.cache_pokemon(25, &json!({}), 3600).await;
        inv.pokeapi.cache_pokemon_data(25, &json!({}), 86_400).await;

        let report = inv.clear_entities().await;
        assert_eq!(report.total, 1);
        assert!(inv
            .pokeapi
            .get_pokemon_data::<serde_json::Value>(25)
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_entity_write_evicts_entity_and_derived() {
        let inv = test_invalidator();

        inv.pokemon.cache_pokemon(25, &json!({}), 3600).await;
        inv.pokemon.cache_pokemon(26, &json!({}), 3600).await;
        inv.pokemon
            .cache_list(&ListParams::default(), &json!({}), 300)
            .await;

        assert_eq!(inv.on_pokemon_write(Some(25)).await, 2);
        assert!(inv.pokemon.get_pokemon::<serde_json::Value>(26).await.is_some());
    }

    #[tokio::test]
    async fn test_favorites_change_clears_lists_only() {
        let inv = test_invalidator();

        inv.pokemon.cache_pokemon(25, &json!({}), 3600).await;
        inv.pokemon
            .cache_list(&ListParams::default(), &json!({}), 300)
            .await;
        inv.pokemon.cache_search("pika", &json!([]), 300).await;

        assert_eq!(inv.on_favorites_change().await, 1);
        assert!(inv.pokemon.get_pokemon::<serde_json::Value>(25).await.is_some());
        assert!(inv.pokemon.get_search::<serde_json::Value>("pika").await.is_some());
    }

    #[tokio::test]
    async fn test_health_reflects_store() {
        let inv = test_invalidator();
        assert!(inv.health().await);
    }
}
