//! Cache Module
//!
//! Redis-backed read-through caching layer: key construction, the
//! fail-open store, value serialization, the Pokemon and upstream
//! caches, and pattern-based invalidation.

mod invalidation;
mod key;
mod memoize;
mod pokeapi;
mod pokemon;
mod serializer;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use invalidation::{CacheInvalidator, ClearReport};
pub use key::{make_key, Identity, ListParams, SortMode};
pub use memoize::memoize;
pub use pokeapi::PokeApiCache;
pub use pokemon::PokemonCache;
pub use serializer::{decode, decode_as, encode};
pub use store::{CacheStats, CacheStore, DEFAULT_OP_TIMEOUT};

// == Default TTLs ==
/// Single-entity lookups: bounded key space, directly addressable on
/// invalidation, so entries may live long.
pub const ENTITY_TTL_SECS: u64 = 3600;

/// List/search/type results: keyed by unbounded parameter combinations,
/// so staleness is bounded by a short TTL instead of per-key eviction.
pub const QUERY_TTL_SECS: u64 = 300;

/// Upstream PokeAPI payloads: reference data that changes rarely.
pub const UPSTREAM_TTL_SECS: u64 = 86_400;
