//! Pokemon Entity Cache
//!
//! Read-through cache for catalog data, split across four namespaces:
//!
//! - `pokemon:{id}` — single entities, long TTL (bounded key space,
//!   directly addressable on invalidation)
//! - `pokemon_list:{digest}` — paginated list envelopes keyed by the
//!   canonical parameter digest, short TTL
//! - `pokemon_search:{term}` — name search results, short TTL
//! - `pokemon_type:{type}` — type filter results, short TTL
//!
//! List/search/type entries cannot be invalidated surgically (a write
//! to one entity can affect any cached page), so writes clear whole
//! sub-namespaces and the short TTL bounds staleness.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::key::{make_key, ListParams};
use crate::cache::serializer;
use crate::cache::store::CacheStore;

pub const POKEMON_NS: &str = "pokemon";
pub const LIST_NS: &str = "pokemon_list";
pub const SEARCH_NS: &str = "pokemon_search";
pub const TYPE_NS: &str = "pokemon_type";

#[derive(Clone)]
pub struct PokemonCache {
    store: Arc<CacheStore>,
}

impl PokemonCache {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    // == Key Builders ==
    pub fn entity_key(&self, pokemon_id: i32) -> String {
        make_key(POKEMON_NS, pokemon_id, &[])
    }

    pub fn list_key(&self, params: &ListParams) -> String {
        make_key(LIST_NS, params.digest(), &[])
    }

    /// Search keys collapse case: `Char` and `char` share an entry.
    pub fn search_key(&self, term: &str) -> String {
        make_key(SEARCH_NS, term.trim().to_lowercase(), &[])
    }

    pub fn type_key(&self, type_name: &str) -> String {
        make_key(TYPE_NS, type_name.trim().to_lowercase(), &[])
    }

    // == Single Entity ==
    pub async fn cache_pokemon<T: Serialize>(&self, pokemon_id: i32, data: &T, ttl: u64) -> bool {
        let Some(encoded) = serializer::encode(data) else {
            return false;
        };
        self.store
            .set(&self.entity_key(pokemon_id), &encoded, Some(ttl))
            .await
    }

    pub async fn get_pokemon<T: DeserializeOwned>(&self, pokemon_id: i32) -> Option<T> {
        let raw = self.store.get(&self.entity_key(pokemon_id)).await?;
        serializer::decode_as(&raw)
    }

    // == List Envelopes ==
    /// Caches a full list response envelope (items plus pagination
    /// metadata) under the canonical parameter digest.
    pub async fn cache_list<T: Serialize>(&self, params: &ListParams, result: &T, ttl: u64) -> bool {
        let Some(encoded) = serializer::encode(result) else {
            return false;
        };
        self.store
            .set(&self.list_key(params), &encoded, Some(ttl))
            .await
    }

    pub async fn get_list<T: DeserializeOwned>(&self, params: &ListParams) -> Option<T> {
        let raw = self.store.get(&self.list_key(params)).await?;
        serializer::decode_as(&raw)
    }

    // == Search Results ==
    pub async fn cache_search<T: Serialize>(&self, term: &str, results: &T, ttl: u64) -> bool {
        let Some(encoded) = serializer::encode(results) else {
            return false;
        };
        self.store
            .set(&self.search_key(term), &encoded, Some(ttl))
            .await
    }

    pub async fn get_search<T: DeserializeOwned>(&self, term: &str) -> Option<T> {
        let raw = self.store.get(&self.search_key(term)).await?;
        serializer::decode_as(&raw)
    }

    // == Type Filter Results ==
    pub async fn cache_type_filter<T: Serialize>(
        &self,
        type_name: &str,
        results: &T,
        ttl: u64,
    ) -> bool {
        let Some(encoded) = serializer::encode(results) else {
            return false;
        };
        self.store
            .set(&self.type_key(type_name), &encoded, Some(ttl))
            .await
    }

    pub async fn get_type_filter<T: DeserializeOwned>(&self, type_name: &str) -> Option<T> {
        let raw = self.store.get(&self.type_key(type_name)).await?;
        serializer::decode_as(&raw)
    }

    // == Invalidation ==
    /// Evicts one entity, or the whole entity namespace when no id is
    /// given. Returns the eviction count.
    pub async fn clear_pokemon(&self, pokemon_id: Option<i32>) -> u64 {
        match pokemon_id {
            Some(id) => self.store.delete(&self.entity_key(id)).await as u64,
            None => self.store.delete_matching(&prefix_pattern(POKEMON_NS)).await,
        }
    }

    pub async fn clear_list(&self) -> u64 {
        self.store.delete_matching(&prefix_pattern(LIST_NS)).await
    }

    pub async fn clear_search(&self) -> u64 {
        self.store.delete_matching(&prefix_pattern(SEARCH_NS)).await
    }

    pub async fn clear_type(&self) -> u64 {
        self.store.delete_matching(&prefix_pattern(TYPE_NS)).await
    }

    /// Evicts every Pokemon-related namespace. Called when a write
    /// touches catalog data broadly; per-key invalidation is
    /// intractable for entries keyed by unbounded parameter
    /// combinations.
    pub async fn clear_all(&self) -> u64 {
        self.clear_pokemon(None).await
            + self.clear_list().await
            + self.clear_search().await
            + self.clear_type().await
    }
}

/// `:`-terminated prefix so one namespace can never match another
/// (`pokemon:*` does not cover `pokemon_list:...`).
fn prefix_pattern(namespace: &str) -> String {
    format!("{namespace}:*")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::{Identity, SortMode};
    use serde_json::json;

    fn test_cache() -> PokemonCache {
        PokemonCache::new(Arc::new(CacheStore::in_memory()))
    }

    #[tokio::test]
    async fn test_entity_roundtrip_and_clear() {
        let cache = test_cache();
        let pikachu = json!({"pokemon_id": 25, "name": "pikachu"});

        assert!(cache.cache_pokemon(25, &pikachu, 3600).await);
        assert_eq!(cache.get_pokemon::<serde_json::Value>(25).await, Some(pikachu));

        assert_eq!(cache.clear_pokemon(Some(25)).await, 1);
        assert_eq!(cache.get_pokemon::<serde_json::Value>(25).await, None);
        assert_eq!(cache.clear_pokemon(Some(25)).await, 0);
    }

    #[tokio::test]
    async fn test_list_keyed_by_full_parameter_tuple() {
        let cache = test_cache();
        let page1 = ListParams::default();
        let page2 = ListParams {
            page: 2,
            ..Default::default()
        };
        let envelope = json!({"pokemon": [], "pagination": {"page": 1}});

        cache.cache_list(&page1, &envelope, 300).await;

        assert_eq!(
            cache.get_list::<serde_json::Value>(&page1).await,
            Some(envelope)
        );
        assert_eq!(cache.get_list::<serde_json::Value>(&page2).await, None);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let cache = test_cache();
        let results = json!([{"name": "charmander"}]);

        cache.cache_search("Char", &results, 300).await;

        assert_eq!(
            cache.get_search::<serde_json::Value>("char").await,
            Some(results)
        );
    }

    #[tokio::test]
    async fn test_type_filter_is_case_insensitive() {
        let cache = test_cache();
        let results = json!([{"name": "vulpix"}]);

        cache.cache_type_filter("Fire", &results, 300).await;

        assert_eq!(
            cache.get_type_filter::<serde_json::Value>("fire").await,
            Some(results)
        );
    }

    #[tokio::test]
    async fn test_namespace_isolation() {
        let cache = test_cache();

        cache.cache_pokemon(25, &json!({"name": "pikachu"}), 3600).await;
        cache
            .cache_list(&ListParams::default(), &json!({"pokemon": []}), 300)
            .await;

        assert_eq!(cache.clear_list().await, 1);

        // Entity entry survives a list clear, and vice versa.
        assert!(cache.get_pokemon::<serde_json::Value>(25).await.is_some());
        assert_eq!(cache.clear_pokemon(None).await, 1);
    }

    #[tokio::test]
    async fn test_clear_all_sums_namespaces() {
        let cache = test_cache();

        cache.cache_pokemon(1, &json!({"name": "bulbasaur"}), 3600).await;
        cache.cache_search("bulba", &json!([]), 300).await;
        cache.cache_type_filter("grass", &json!([]), 300).await;
        let favorites = ListParams {
            sort: SortMode::Favorites,
            user: Identity::User(1),
            ..Default::default()
        };
        cache.cache_list(&favorites, &json!({}), 300).await;

        assert_eq!(cache.clear_all().await, 4);
        assert_eq!(cache.clear_all().await, 0);
    }
}
