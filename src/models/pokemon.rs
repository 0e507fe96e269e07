//! Pokemon Models
//!
//! Catalog row types. JSONB columns carry explicit schemas (string
//! arrays, a name→value stat map, a typed sprite set) rather than
//! open-ended maps, so cached payloads have a stable shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// A catalog Pokemon, sourced from the upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Pokemon {
    /// Database primary key
    pub id: i32,
    /// PokeAPI id, unique across the catalog
    pub pokemon_id: i32,
    pub name: String,
    /// Height in decimeters
    pub height: Option<i32>,
    /// Weight in hectograms
    pub weight: Option<i32>,
    pub base_experience: Option<i32>,
    pub types: Json<Vec<String>>,
    pub abilities: Json<Vec<String>>,
    /// Base stat values keyed by stat name
    pub stats: Json<BTreeMap<String, i32>>,
    pub sprites: Json<SpriteSet>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sprite URLs for a Pokemon. All fields optional; the upstream omits
/// them freely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteSet {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_shiny: Option<String>,
}

/// Field set for inserting or refreshing a catalog row.
#[derive(Debug, Clone)]
pub struct NewPokemon {
    pub pokemon_id: i32,
    pub name: String,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub base_experience: Option<i32>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    pub stats: BTreeMap<String, i32>,
    pub sprites: SpriteSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pokemon_serializes_with_flat_json_columns() {
        let pokemon = Pokemon {
            id: 1,
            pokemon_id: 25,
            name: "pikachu".to_string(),
            height: Some(4),
            weight: Some(60),
            base_experience: Some(112),
            types: Json(vec!["electric".to_string()]),
            abilities: Json(vec!["static".to_string()]),
            stats: Json(BTreeMap::from([("speed".to_string(), 90)])),
            sprites: Json(SpriteSet {
                front_default: Some("https://example.test/25.png".to_string()),
                ..Default::default()
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&pokemon).unwrap();
        // Json<T> wrappers are transparent on the wire.
        assert_eq!(json["types"], serde_json::json!(["electric"]));
        assert_eq!(json["stats"]["speed"], 90);
        assert_eq!(json["sprites"]["front_default"], "https://example.test/25.png");
    }

    #[test]
    fn test_sprite_set_tolerates_missing_fields() {
        let sprites: SpriteSet = serde_json::from_str(r#"{"front_default": null}"#).unwrap();
        assert_eq!(sprites, SpriteSet::default());
    }
}
