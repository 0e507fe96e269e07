//! Request DTOs for the API
//!
//! Defines the structure of incoming HTTP request bodies and query
//! strings.

use serde::Deserialize;

use crate::cache::{Identity, ListParams, SortMode};

/// Hard ceiling on page size, whatever the client asks for.
pub const MAX_PER_PAGE: u32 = 100;

/// Query string for GET /pokemon.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
    pub sort: Option<SortMode>,
}

impl ListQuery {
    /// Resolves the raw query into the parameter tuple list queries are
    /// keyed and executed by. `identity` is the caller's resolved
    /// identity; it only partitions the result when the sort depends on
    /// it.
    pub fn into_params(self, identity: Identity) -> ListParams {
        let sort = self.sort.unwrap_or_default();
        ListParams {
            page: self.page.unwrap_or(1).max(1),
            per_page: self.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE),
            search: self.search.filter(|s| !s.trim().is_empty()),
            type_filter: self.type_filter.filter(|s| !s.trim().is_empty()),
            sort,
            user: if sort.is_identity_dependent() {
                identity
            } else {
                Identity::Anonymous
            },
        }
    }
}

/// Query string for GET /pokemon/search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Body for POST /auth/register.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.username.trim().is_empty() {
            return Some("Username is required".to_string());
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Some("A valid email is required".to_string());
        }
        if self.password.len() < 6 {
            return Some("Password must be at least 6 characters long".to_string());
        }
        None
    }
}

/// Body for POST /auth/login. `username` also accepts an email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body for POST /auth/refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body for PUT /auth/profile and PUT /users/:id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Option<String> {
        if let Some(username) = &self.username {
            if username.trim().is_empty() {
                return Some("Username cannot be empty".to_string());
            }
        }
        if let Some(email) = &self.email {
            if email.trim().is_empty() || !email.contains('@') {
                return Some("A valid email is required".to_string());
            }
        }
        if let Some(password) = &self.password {
            if password.len() < 6 {
                return Some("Password must be at least 6 characters long".to_string());
            }
        }
        None
    }
}

/// Body for POST /pokemon.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePokemonRequest {
    pub pokemon_id: i32,
}

/// Body for POST and DELETE /users/:id/favorites.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRequest {
    pub pokemon_id: i32,
}

/// Query string for GET /users.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn resolve(&self) -> (u32, u32) {
        (
            self.page.unwrap_or(1).max(1),
            self.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let params = ListQuery::default().into_params(Identity::Anonymous);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
        assert_eq!(params.sort, SortMode::Id);
        assert_eq!(params.search, None);
    }

    #[test]
    fn test_list_query_clamps_per_page() {
        let query = ListQuery {
            per_page: Some(500),
            ..Default::default()
        };
        assert_eq!(query.into_params(Identity::Anonymous).per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_list_query_drops_identity_for_default_sort() {
        let params = ListQuery::default().into_params(Identity::User(7));
        assert_eq!(params.user, Identity::Anonymous);
    }

    #[test]
    fn test_list_query_keeps_identity_for_favorites_sort() {
        let query = ListQuery {
            sort: Some(SortMode::Favorites),
            ..Default::default()
        };
        assert_eq!(query.into_params(Identity::User(7)).user, Identity::User(7));
    }

    #[test]
    fn test_sort_deserializes_from_query_value() {
        let query: ListQuery = serde_json::from_str(r#"{"sort": "favorites"}"#).unwrap();
        assert_eq!(query.sort, Some(SortMode::Favorites));
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let query = ListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_params(Identity::Anonymous).search, None);
    }

    #[test]
    fn test_register_validation() {
        let valid = RegisterRequest {
            username: "ash".to_string(),
            email: "ash@example.test".to_string(),
            password: "pikapika".to_string(),
        };
        assert!(valid.validate().is_none());

        let short_password = RegisterRequest {
            password: "pika".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_some());

        let bad_email = RegisterRequest {
            email: "nope".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_some());
    }

    #[test]
    fn test_update_request_validates_only_present_fields() {
        assert!(UpdateUserRequest::default().validate().is_none());

        let bad = UpdateUserRequest {
            password: Some("x".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_some());
    }
}
