//! Cache Key Construction
//!
//! Builds namespaced cache keys and canonicalizes list-query parameters
//! into short, collision-resistant digests.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// == Key Builder ==
/// Builds a colon-joined cache key from a namespace, an identifier and
/// optional extra segments: `namespace:identifier[:extra...]`.
///
/// Pure function: equal inputs always produce equal keys.
pub fn make_key(namespace: &str, identifier: impl Display, extra: &[&str]) -> String {
    let mut key = format!("{namespace}:{identifier}");
    for part in extra {
        key.push(':');
        key.push_str(part);
    }
    key
}

// == Sort Mode ==
/// Sort order for list queries.
///
/// `Favorites` is identity-dependent: the caller's favorites are ordered
/// first, so its cache entries must be partitioned by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Ascending PokeAPI id (the default)
    #[default]
    Id,
    /// Ascending name
    Name,
    /// Caller's favorites first, then ascending PokeAPI id
    Favorites,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Id => "id",
            SortMode::Name => "name",
            SortMode::Favorites => "favorites",
        }
    }

    /// Whether cache entries for this sort depend on the caller's identity.
    pub fn is_identity_dependent(&self) -> bool {
        matches!(self, SortMode::Favorites)
    }
}

// == Identity ==
/// The resolved identity a list query is partitioned by.
///
/// Identity-dependent sorts always carry a partition — either the
/// authenticated user id or the explicit anonymous partition. A failed
/// identity lookup lands in `Anonymous` rather than silently sharing a
/// key with identity-independent entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(i32),
}

impl Identity {
    fn partition(&self) -> String {
        match self {
            Identity::Anonymous => "anon".to_string(),
            Identity::User(id) => id.to_string(),
        }
    }
}

// == List Parameters ==
/// The full parameter tuple a paginated list query is keyed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
    pub search: Option<String>,
    pub type_filter: Option<String>,
    pub sort: SortMode,
    pub user: Identity,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
            type_filter: None,
            sort: SortMode::default(),
            user: Identity::default(),
        }
    }
}

impl ListParams {
    /// Deterministic textual form: fixed field order, normalized text
    /// filters. The `user` segment is present exactly when the sort is
    /// identity-dependent.
    pub fn canonical(&self) -> String {
        let mut canonical = format!(
            "page={}|per_page={}|search={}|sort={}|type={}",
            self.page,
            self.per_page,
            normalize(self.search.as_deref()),
            self.sort.as_str(),
            normalize(self.type_filter.as_deref()),
        );
        if self.sort.is_identity_dependent() {
            canonical.push_str("|user=");
            canonical.push_str(&self.user.partition());
        }
        canonical
    }

    /// First 8 hex chars of the SHA-256 of the canonical form. Keeps
    /// keys short without leaking raw query text.
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.canonical().as_bytes());
        hex::encode(&hash[..4])
    }
}

/// Lower-case and trim a text filter so equivalent spellings collapse
/// onto one key.
fn normalize(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}
