//! Upstream PokeAPI Cache
//!
//! Long-TTL cache for raw payloads from the external Pokemon data
//! provider, shielding it from repeated lookups. Purely a performance
//! optimization: a miss always falls through to a live fetch.
//!
//! Namespaces: `pokeapi_pokemon:{id}`, `pokeapi_species:{id}`,
//! `pokeapi_evolution:{chain_id}`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::key::make_key;
use crate::cache::store::CacheStore;

pub const UPSTREAM_POKEMON_NS: &str = "pokeapi_pokemon";
pub const UPSTREAM_SPECIES_NS: &str = "pokeapi_species";
pub const UPSTREAM_EVOLUTION_NS: &str = "pokeapi_evolution";

#[derive(Clone)]
pub struct PokeApiCache {
    store: Arc<CacheStore>,
}

impl PokeApiCache {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    // == Pokemon Payloads ==
    pub async fn cache_pokemon_data<T: Serialize>(&self, pokemon_id: i32, data: &T, ttl: u64) -> bool {
        self.write(&make_key(UPSTREAM_POKEMON_NS, pokemon_id, &[]), data, ttl)
            .await
    }

    pub async fn get_pokemon_data<T: DeserializeOwned>(&self, pokemon_id: i32) -> Option<T> {
        self.read(&make_key(UPSTREAM_POKEMON_NS, pokemon_id, &[])).await
    }

    // == Species Payloads ==
    pub async fn cache_species_data<T: Serialize>(&self, pokemon_id: i32, data: &T, ttl: u64) -> bool {
        self.write(&make_key(UPSTREAM_SPECIES_NS, pokemon_id, &[]), data, ttl)
            .await
    }

    pub async fn get_species_data<T: DeserializeOwned>(&self, pokemon_id: i32) -> Option<T> {
        self.read(&make_key(UPSTREAM_SPECIES_NS, pokemon_id, &[])).await
    }

    // == Evolution Chains ==
    pub async fn cache_evolution_chain<T: Serialize>(&self, chain_id: i32, data: &T, ttl: u64) -> bool {
        self.write(&make_key(UPSTREAM_EVOLUTION_NS, chain_id, &[]), data, ttl)
            .await
    }

    pub async fn get_evolution_chain<T: DeserializeOwned>(&self, chain_id: i32) -> Option<T> {
        self.read(&make_key(UPSTREAM_EVOLUTION_NS, chain_id, &[])).await
    }

    // == Invalidation ==
    /// Evicts all upstream payloads, one sub-namespace at a time so no
    /// foreign namespace is ever touched. Returns the total count.
    pub async fn clear(&self) -> u64 {
        let mut total = 0;
        for namespace in [UPSTREAM_POKEMON_NS, UPSTREAM_SPECIES_NS, UPSTREAM_EVOLUTION_NS] {
            total += self.store.delete_matching(&format!("{namespace}:*")).await;
        }
        total
    }

    async fn write<T: Serialize>(&self, key: &str, data: &T, ttl: u64) -> bool {
        let Some(encoded) = crate::cache::serializer::encode(data) else {
            return false;
        };
        self.store.set(key, &encoded, Some(ttl)).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key).await?;
        crate::cache::serializer::decode_as(&raw)
    }
}
