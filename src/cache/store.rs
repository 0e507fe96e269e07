//! Cache Store Module
//!
//! Key/value store backing the caching layer. The production backend is
//! Redis behind a multiplexed async connection; an in-memory backend
//! with the same semantics exists for tests and cache-less development.
//!
//! Every operation is fail-open: backend errors and timeouts degrade to
//! "miss"/"false"/zero instead of surfacing to callers, so an
//! unavailable cache only costs performance, never correctness.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Upper bound on a single backend round trip. A degraded backend must
/// not stall request handling past this.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(2);

// == Backend ==
enum Backend {
    /// Remote Redis instance.
    Redis(redis::Client),
    /// In-process map with the same expiry semantics.
    Memory(Mutex<MemoryState>),
    /// No backend configured; every read misses, every write is a no-op.
    Disabled,
}

struct MemoryState {
    entries: HashMap<String, MemoryEntry>,
    hits: u64,
    misses: u64,
}

struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn new(value: String, ttl: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }

    /// Expired once the full TTL has elapsed (boundary inclusive).
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// Remaining TTL in whole seconds; -1 when the entry never expires.
    fn ttl_remaining(&self) -> i64 {
        match self.expires_at {
            None => -1,
            Some(at) => at.saturating_duration_since(Instant::now()).as_secs() as i64,
        }
    }
}

// == Cache Stats ==
/// Snapshot of backend counters for the admin surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub available: bool,
    pub hits: u64,
    pub misses: u64,
    pub total_keys: u64,
    pub used_memory: Option<String>,
}

impl CacheStats {
    /// hits / (hits + misses), or 0.0 before any lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Cache Store ==
pub struct CacheStore {
    backend: Backend,
    op_timeout: Duration,
}

impl CacheStore {
    // == Constructors ==
    /// Connects to the cache backend at `url`. A missing URL or an
    /// invalid one yields a disabled store rather than an error; the
    /// system runs fully without a cache.
    pub fn connect(url: Option<&str>, op_timeout: Duration) -> Self {
        let backend = match url {
            None => {
                info!("no cache url configured, running without cache");
                Backend::Disabled
            }
            Some(url) => match redis::Client::open(url) {
                Ok(client) => Backend::Redis(client),
                Err(e) => {
                    warn!(error = %e, url, "failed to create cache client, running without cache");
                    Backend::Disabled
                }
            },
        };
        Self {
            backend,
            op_timeout,
        }
    }

    /// In-process store for tests and cache-less development.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(MemoryState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            })),
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    // == Availability ==
    /// Non-blocking health probe. Never raises: transport errors and
    /// timeouts report `false`.
    pub async fn available(&self) -> bool {
        match &self.backend {
            Backend::Disabled => false,
            Backend::Memory(_) => true,
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return false;
                };
                let ping = redis::cmd("PING");
                let pong: Option<String> = self.bounded("PING", ping.query_async(&mut conn)).await;
                pong.is_some()
            }
        }
    }

    // == Get ==
    /// Returns the stored value, or `None` on miss, expiry, or any
    /// backend failure (fail-open: the caller falls through to the
    /// authoritative store).
    pub async fn get(&self, key: &str) -> Option<String> {
        match &self.backend {
            Backend::Disabled => None,
            Backend::Memory(state) => {
                let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                match state.entries.get(key) {
                    Some(entry) if entry.is_expired() => {
                        state.entries.remove(key);
                        state.misses += 1;
                        debug!(key, "cache MISS (expired)");
                        None
                    }
                    Some(entry) => {
                        let value = entry.value.clone();
                        state.hits += 1;
                        debug!(key, "cache HIT");
                        Some(value)
                    }
                    None => {
                        state.misses += 1;
                        debug!(key, "cache MISS");
                        None
                    }
                }
            }
            Backend::Redis(client) => {
                let mut conn = self.conn(client).await?;
                let value: Option<Option<String>> = self.bounded("GET", conn.get(key)).await;
                let value = value.flatten();
                match &value {
                    Some(_) => debug!(key, "cache HIT"),
                    None => debug!(key, "cache MISS"),
                }
                value
            }
        }
    }

    // == Set ==
    /// Stores a value, self-expiring after `ttl` seconds when given.
    /// Returns `false` (not an error) on any backend failure.
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> bool {
        match &self.backend {
            Backend::Disabled => false,
            Backend::Memory(state) => {
                let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                state
                    .entries
                    .insert(key.to_string(), MemoryEntry::new(value.to_string(), ttl));
                debug!(key, ?ttl, "cache SET");
                true
            }
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return false;
                };
                let ok = match ttl {
                    Some(secs) => {
                        let result: Option<()> =
                            self.bounded("SETEX", conn.set_ex(key, value, secs)).await;
                        result.is_some()
                    }
                    None => {
                        let result: Option<()> = self.bounded("SET", conn.set(key, value)).await;
                        result.is_some()
                    }
                };
                if ok {
                    debug!(key, ?ttl, "cache SET");
                }
                ok
            }
        }
    }

    // == Delete ==
    /// Removes a key. Returns whether a key was actually removed.
    pub async fn delete(&self, key: &str) -> bool {
        match &self.backend {
            Backend::Disabled => false,
            Backend::Memory(state) => {
                let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                state.entries.remove(key).is_some()
            }
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return false;
                };
                let removed: Option<u64> = self.bounded("DEL", conn.del(key)).await;
                removed.unwrap_or(0) > 0
            }
        }
    }

    // == Delete Matching ==
    /// Bulk-evicts all keys matching a glob pattern (a `:`-terminated
    /// namespace prefix plus `*`). Uses SCAN, not KEYS, so the backend
    /// is never blocked. Returns the number of keys evicted; a partial
    /// failure reports the count removed so far.
    pub async fn delete_matching(&self, pattern: &str) -> u64 {
        match &self.backend {
            Backend::Disabled => 0,
            Backend::Memory(state) => {
                let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
                let before = state.entries.len();
                state.entries.retain(|key, _| !glob_match(pattern, key));
                (before - state.entries.len()) as u64
            }
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return 0;
                };
                let mut removed: u64 = 0;
                let mut cursor: u64 = 0;
                loop {
                    let mut scan = redis::cmd("SCAN");
                    scan.arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(100);
                    let scanned: Option<(u64, Vec<String>)> =
                        self.bounded("SCAN", scan.query_async(&mut conn)).await;
                    let Some((next, keys)) = scanned else {
                        return removed;
                    };
                    if !keys.is_empty() {
                        let deleted: Option<u64> = self.bounded("DEL", conn.del(&keys)).await;
                        removed += deleted.unwrap_or(0);
                    }
                    cursor = next;
                    if cursor == 0 {
                        break;
                    }
                }
                if removed > 0 {
                    info!(pattern, removed, "cache CLEAR");
                }
                removed
            }
        }
    }

    // == Exists ==
    pub async fn exists(&self, key: &str) -> bool {
        match &self.backend {
            Backend::Disabled => false,
            Backend::Memory(state) => {
                let state = state.lock().unwrap_or_else(|e| e.into_inner());
                state.entries.get(key).is_some_and(|e| !e.is_expired())
            }
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return false;
                };
                let exists: Option<bool> = self.bounded("EXISTS", conn.exists(key)).await;
                exists.unwrap_or(false)
            }
        }
    }

    // == TTL Remaining ==
    /// Remaining TTL in seconds. Redis semantics: -1 for a key without
    /// expiry, -2 for a missing key; backend failures also report -2
    /// (unknown is indistinguishable from absent to the caller).
    pub async fn ttl_remaining(&self, key: &str) -> i64 {
        match &self.backend {
            Backend::Disabled => -2,
            Backend::Memory(state) => {
                let state = state.lock().unwrap_or_else(|e| e.into_inner());
                match state.entries.get(key) {
                    Some(entry) if !entry.is_expired() => entry.ttl_remaining(),
                    _ => -2,
                }
            }
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return -2;
                };
                let ttl: Option<i64> = self.bounded("TTL", conn.ttl(key)).await;
                ttl.unwrap_or(-2)
            }
        }
    }

    // == Stats ==
    /// Backend counters for the admin surface. An unreachable backend
    /// reports `available: false` with zeroed counters.
    pub async fn stats(&self) -> CacheStats {
        match &self.backend {
            Backend::Disabled => CacheStats::default(),
            Backend::Memory(state) => {
                let state = state.lock().unwrap_or_else(|e| e.into_inner());
                let live = state.entries.values().filter(|e| !e.is_expired()).count();
                CacheStats {
                    available: true,
                    hits: state.hits,
                    misses: state.misses,
                    total_keys: live as u64,
                    used_memory: None,
                }
            }
            Backend::Redis(client) => {
                let Some(mut conn) = self.conn(client).await else {
                    return CacheStats::default();
                };
                let info_cmd = redis::cmd("INFO");
                let raw_info: Option<String> =
                    self.bounded("INFO", info_cmd.query_async(&mut conn)).await;
                let Some(raw_info) = raw_info else {
                    return CacheStats::default();
                };
                let dbsize_cmd = redis::cmd("DBSIZE");
                let total_keys: Option<u64> = self
                    .bounded("DBSIZE", dbsize_cmd.query_async(&mut conn))
                    .await;
                CacheStats {
                    available: true,
                    hits: info_field(&raw_info, "keyspace_hits").unwrap_or(0),
                    misses: info_field(&raw_info, "keyspace_misses").unwrap_or(0),
                    total_keys: total_keys.unwrap_or(0),
                    used_memory: info_text_field(&raw_info, "used_memory_human"),
                }
            }
        }
    }

    // == Internal Helpers ==
    async fn conn(&self, client: &redis::Client) -> Option<MultiplexedConnection> {
        self.bounded("connect", client.get_multiplexed_async_connection())
            .await
    }

    /// Runs a backend future under the operation timeout, degrading
    /// errors and timeouts to `None`.
    async fn bounded<T>(
        &self,
        op: &str,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(error = %e, op, "cache backend error");
                None
            }
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "cache operation timed out"
                );
                None
            }
        }
    }
}

/// Minimal glob matcher for namespace patterns: a literal prefix
/// followed by a single trailing `*`.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

fn info_field(info: &str, field: &str) -> Option<u64> {
    info_text_field(info, field)?.parse().ok()
}

fn info_text_field(info: &str, field: &str) -> Option<String> {
    info.lines().find_map(|line| {
        line.strip_prefix(field)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(|value| value.trim().to_string())
    })
}
