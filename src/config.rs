//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Redis connection string; absent disables the cache entirely
    pub redis_url: Option<String>,
    /// Upper bound in milliseconds for a single cache round trip
    pub cache_op_timeout_ms: u64,
    /// TTL in seconds for single-entity cache entries
    pub entity_cache_ttl: u64,
    /// TTL in seconds for list/search/type cache entries
    pub query_cache_ttl: u64,
    /// TTL in seconds for upstream PokeAPI payloads
    pub upstream_cache_ttl: u64,
    /// HMAC secret for signing JWTs
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub access_token_ttl: u64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: u64,
    /// Base URL of the upstream Pokemon data provider
    pub pokeapi_base_url: String,
    /// Upstream request timeout in seconds
    pub pokeapi_timeout_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DATABASE_URL` - PostgreSQL connection string
    /// - `REDIS_URL` - Redis connection string (unset: cache disabled)
    /// - `CACHE_OP_TIMEOUT_MS` - Cache round-trip bound (default: 2000)
    /// - `ENTITY_CACHE_TTL` - Entity entry TTL in seconds (default: 3600)
    /// - `QUERY_CACHE_TTL` - List/search/type TTL in seconds (default: 300)
    /// - `UPSTREAM_CACHE_TTL` - PokeAPI payload TTL in seconds (default: 86400)
    /// - `JWT_SECRET` - Token signing secret
    /// - `ACCESS_TOKEN_TTL` - Access token lifetime in seconds (default: 3600)
    /// - `REFRESH_TOKEN_TTL` - Refresh token lifetime in seconds (default: 2592000)
    /// - `POKEAPI_BASE_URL` - Upstream base URL
    /// - `POKEAPI_TIMEOUT_SECS` - Upstream request timeout (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_parse("SERVER_PORT", defaults.server_port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            cache_op_timeout_ms: env_parse("CACHE_OP_TIMEOUT_MS", defaults.cache_op_timeout_ms),
            entity_cache_ttl: env_parse("ENTITY_CACHE_TTL", defaults.entity_cache_ttl),
            query_cache_ttl: env_parse("QUERY_CACHE_TTL", defaults.query_cache_ttl),
            upstream_cache_ttl: env_parse("UPSTREAM_CACHE_TTL", defaults.upstream_cache_ttl),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            access_token_ttl: env_parse("ACCESS_TOKEN_TTL", defaults.access_token_ttl),
            refresh_token_ttl: env_parse("REFRESH_TOKEN_TTL", defaults.refresh_token_ttl),
            pokeapi_base_url: env::var("POKEAPI_BASE_URL").unwrap_or(defaults.pokeapi_base_url),
            pokeapi_timeout_secs: env_parse("POKEAPI_TIMEOUT_SECS", defaults.pokeapi_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            database_url: "postgres://localhost/pokedex".to_string(),
            redis_url: None,
            cache_op_timeout_ms: 2000,
            entity_cache_ttl: crate::cache::ENTITY_TTL_SECS,
            query_cache_ttl: crate::cache::QUERY_TTL_SECS,
            upstream_cache_ttl: crate::cache::UPSTREAM_TTL_SECS,
            jwt_secret: "dev-secret-change-me".to_string(),
            access_token_ttl: 3600,
            refresh_token_ttl: 30 * 24 * 3600,
            pokeapi_base_url: "https://pokeapi.co/api/v2".to_string(),
            pokeapi_timeout_secs: 30,
        }
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.entity_cache_ttl, 3600);
        assert_eq!(config.query_cache_ttl, 300);
        assert_eq!(config.upstream_cache_ttl, 86_400);
        assert_eq!(config.cache_op_timeout_ms, 2000);
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        env::set_var("TEST_CONFIG_GARBAGE", "not-a-number");
        assert_eq!(env_parse("TEST_CONFIG_GARBAGE", 42u64), 42);
        env::remove_var("TEST_CONFIG_GARBAGE");
    }

    #[test]
    fn test_env_parse_reads_value() {
        env::set_var("TEST_CONFIG_PORT", "8080");
        assert_eq!(env_parse("TEST_CONFIG_PORT", 3000u16), 8080);
        env::remove_var("TEST_CONFIG_PORT");
    }
}
