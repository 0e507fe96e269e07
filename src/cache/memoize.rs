//! Result Memoization
//!
//! Explicit read-through wrapper for async producers: look the key up,
//! return the decoded hit, or run the producer and write the result
//! back with the given TTL. Composed at call sites instead of hiding
//! behind an annotation.
//!
//! Concurrent misses on the same key may each run the producer and both
//! write (last write wins). Accepted tradeoff: fills are idempotent
//! projections of the authoritative store.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::serializer;
use crate::cache::store::CacheStore;

pub async fn memoize<T, E, F, Fut>(
    store: &CacheStore,
    key: &str,
    ttl: u64,
    produce: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(raw) = store.get(key).await {
        if let Some(value) = serializer::decode_as::<T>(&raw) {
            return Ok(value);
        }
        // Unreadable content counts as a miss; the fresh write below
        // replaces it.
        debug!(key, "cached value undecodable, refetching");
    }

    let value = produce().await?;
    if let Some(encoded) = serializer::encode(&value) {
        store.set(key, &encoded, Some(ttl)).await;
    }
    Ok(value)
}
