//! PokeAPI Client
//!
//! Handles communication with the upstream Pokemon data provider.
//! Every lookup reads through the long-TTL upstream cache; a miss
//! falls through to a live, timeout-bounded request.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::PokeApiCache;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::pokemon::{NewPokemon, SpriteSet};

const USER_AGENT: &str = concat!("pokedex-api/", env!("CARGO_PKG_VERSION"));

// == Upstream Payload Types ==
/// Partial decode of `GET /pokemon/{id}`; unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPokemon {
    pub id: i32,
    pub name: String,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub base_experience: Option<i32>,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub sprites: SpriteSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSlot {
    pub base_stat: i32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Partial decode of `GET /pokemon-species/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSpecies {
    pub id: i32,
    pub name: String,
    pub evolution_chain: Option<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRef {
    pub url: String,
}

impl ResourceRef {
    /// Trailing path segment of a resource URL, e.g.
    /// `.../evolution-chain/10/` → 10.
    pub fn trailing_id(&self) -> Option<i32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()?
            .parse()
            .ok()
    }
}

/// Decode of `GET /evolution-chain/{id}`. The chain itself is an
/// arbitrarily nested structure; it is carried verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEvolutionChain {
    pub id: i32,
    pub chain: serde_json::Value,
}

impl From<ApiPokemon> for NewPokemon {
    fn from(api: ApiPokemon) -> Self {
        NewPokemon {
            pokemon_id: api.id,
            name: api.name,
            height: api.height,
            weight: api.weight,
            base_experience: api.base_experience,
            types: api.types.into_iter().map(|slot| slot.kind.name).collect(),
            abilities: api
                .abilities
                .into_iter()
                .map(|slot| slot.ability.name)
                .collect(),
            stats: api
                .stats
                .into_iter()
                .map(|slot| (slot.stat.name, slot.base_stat))
                .collect::<BTreeMap<_, _>>(),
            sprites: api.sprites,
        }
    }
}

// == Client ==
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
    cache: PokeApiCache,
    upstream_ttl: u64,
}

impl PokeApiClient {
    pub fn new(config: &Config, cache: PokeApiCache) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.pokeapi_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Internal(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.pokeapi_base_url.trim_end_matches('/').to_string(),
            cache,
            upstream_ttl: config.upstream_cache_ttl,
        })
    }

    /// Pokemon payload by PokeAPI id, read through the upstream cache.
    pub async fn get_pokemon(&self, pokemon_id: i32) -> Result<ApiPokemon> {
        if let Some(cached) = self.cache.get_pokemon_data(pokemon_id).await {
            debug!(pokemon_id, "upstream cache hit");
            return Ok(cached);
        }
        let data: ApiPokemon = self.fetch(&format!("pokemon/{pokemon_id}")).await?;
        self.cache
            .cache_pokemon_data(pokemon_id, &data, self.upstream_ttl)
            .await;
        Ok(data)
    }

    /// Species payload by PokeAPI id, read through the upstream cache.
    pub async fn get_species(&self, pokemon_id: i32) -> Result<ApiSpecies> {
        if let Some(cached) = self.cache.get_species_data(pokemon_id).await {
            debug!(pokemon_id, "upstream cache hit");
            return Ok(cached);
        }
        let data: ApiSpecies = self.fetch(&format!("pokemon-species/{pokemon_id}")).await?;
        self.cache
            .cache_species_data(pokemon_id, &data, self.upstream_ttl)
            .await;
        Ok(data)
    }

    /// Evolution chain by chain id, read through the upstream cache.
    pub async fn get_evolution_chain(&self, chain_id: i32) -> Result<ApiEvolutionChain> {
        if let Some(cached) = self.cache.get_evolution_chain(chain_id).await {
            debug!(chain_id, "upstream cache hit");
            return Ok(cached);
        }
        let data: ApiEvolutionChain = self.fetch(&format!("evolution-chain/{chain_id}")).await?;
        self.cache
            .cache_evolution_chain(chain_id, &data, self.upstream_ttl)
            .await;
        Ok(data)
    }

    /// Evolution chain for a Pokemon: resolves the chain id from the
    /// species payload first.
    pub async fn get_evolution_for_pokemon(&self, pokemon_id: i32) -> Result<ApiEvolutionChain> {
        let species = self.get_species(pokemon_id).await?;
        let chain_id = species
            .evolution_chain
            .as_ref()
            .and_then(ResourceRef::trailing_id)
            .ok_or_else(|| {
                ApiError::UpstreamNotFound(format!(
                    "no evolution chain recorded for pokemon {pokemon_id}"
                ))
            })?;
        self.get_evolution_chain(chain_id).await
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "fetching from upstream");

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!(error = %e, %url, "upstream request failed");
            if e.is_timeout() {
                ApiError::Upstream(format!("upstream request timed out: {url}"))
            } else {
                ApiError::Upstream(format!("upstream request failed: {e}"))
            }
        })?;

        match response.status() {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|e| ApiError::Upstream(format!("invalid upstream payload: {e}"))),
            StatusCode::NOT_FOUND => Err(ApiError::UpstreamNotFound(format!(
                "upstream has no resource at {path}"
            ))),
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::UpstreamRateLimited),
            status => Err(ApiError::Upstream(format!(
                "unexpected upstream response: {status}"
            ))),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_pokemon_decodes_partial_payload() {
        let raw = r#"{
            "id": 25,
            "name": "pikachu",
            "height": 4,
            "weight": 60,
            "base_experience": 112,
            "types": [{"slot": 1, "type": {"name": "electric", "url": "https://pokeapi.co/api/v2/type/13/"}}],
            "abilities": [{"ability": {"name": "static", "url": null}, "is_hidden": false}],
            "stats": [{"base_stat": 90, "effort": 2, "stat": {"name": "speed", "url": null}}],
            "sprites": {"front_default": "https://img.test/25.png", "front_female": null},
            "order": 35
        }"#;
        let pokemon: ApiPokemon = serde_json::from_str(raw).unwrap();
        assert_eq!(pokemon.id, 25);
        assert_eq!(pokemon.types[0].kind.name, "electric");
        assert_eq!(pokemon.stats[0].base_stat, 90);
        assert_eq!(
            pokemon.sprites.front_default.as_deref(),
            Some("https://img.test/25.png")
        );
    }

    #[test]
    fn test_new_pokemon_from_api_payload() {
        let api = ApiPokemon {
            id: 25,
            name: "pikachu".to_string(),
            height: Some(4),
            weight: Some(60),
            base_experience: Some(112),
            types: vec![TypeSlot {
                kind: NamedResource {
                    name: "electric".to_string(),
                    url: None,
                },
            }],
            abilities: vec![AbilitySlot {
                ability: NamedResource {
                    name: "static".to_string(),
                    url: None,
                },
            }],
            stats: vec![StatSlot {
                base_stat: 90,
                stat: NamedResource {
                    name: "speed".to_string(),
                    url: None,
                },
            }],
            sprites: SpriteSet::default(),
        };

        let record = NewPokemon::from(api);
        assert_eq!(record.pokemon_id, 25);
        assert_eq!(record.types, vec!["electric"]);
        assert_eq!(record.abilities, vec!["static"]);
        assert_eq!(record.stats.get("speed"), Some(&90));
    }

    #[test]
    fn test_resource_ref_trailing_id() {
        let chain = ResourceRef {
            url: "https://pokeapi.co/api/v2/evolution-chain/10/".to_string(),
        };
        assert_eq!(chain.trailing_id(), Some(10));

        let bad = ResourceRef {
            url: "https://pokeapi.co/api/v2/evolution-chain/x/".to_string(),
        };
        assert_eq!(bad.trailing_id(), None);
    }
}
