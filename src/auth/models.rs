//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// User database model
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub created_at: String,
}

impl User {
    /// Find a user by email. Emails are compared exactly as stored.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, hashed_password, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, hashed_password, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl AccessTokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub deleted_user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_hides_password_hash() {
        let user = User {
            id: 7,
            email: "test@example.com".to_string(),
            hashed_password: "$2b$12$secret".to_string(),
            created_at: "2026-01-01 00:00:00".to_string(),
        };
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn access_token_response_is_bearer() {
        let response = AccessTokenResponse::bearer("abc".to_string());
        assert_eq!(response.token_type, "bearer");
    }
}
