//! User Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account holder. The password hash never serializes.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A favorites join row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub id: i32,
    pub user_id: i32,
    pub pokemon_id: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serializes() {
        let user = User {
            id: 1,
            username: "ash".to_string(),
            email: "ash@example.test".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
        assert!(json.contains("ash"));
    }
}
