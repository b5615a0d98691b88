//! Tests for the auth module
//!
//! Service-level tests run against an in-memory SQLite pool with the real
//! schema, so uniqueness and cascade behavior come from the store itself.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use super::models::User;
use super::service::{authenticate_user, delete_user, register_user, AuthError};
use super::tokens::TokenService;
use crate::common::migrations::run_migrations;
use crate::interests::models::{ContentItem, Interest, Newsletter};

async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("connect options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[tokio::test]
async fn register_creates_user_with_hashed_password() {
    let pool = test_pool().await;

    let user = register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("register");

    assert_eq!(user.email, "a@example.com");
    assert!(user.id > 0);
    assert_ne!(user.hashed_password, "Password123!");
    assert!(!user.created_at.is_empty());
}

#[tokio::test]
async fn register_duplicate_email_fails_with_user_exists() {
    let pool = test_pool().await;

    register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("first registration");
    let err = register_user(&pool, "a@example.com", "OtherPassword1")
        .await
        .expect_err("second registration must fail");

    assert!(matches!(err, AuthError::UserExists));
}

#[tokio::test]
async fn register_rejects_over_cap_password_without_touching_storage() {
    let pool = test_pool().await;

    let err = register_user(&pool, "a@example.com", &"x".repeat(73))
        .await
        .expect_err("oversized password must fail");
    assert!(matches!(err, AuthError::PasswordTooLong));

    let user = User::find_by_email(&pool, "a@example.com").await.unwrap();
    assert!(user.is_none());
}

#[tokio::test]
async fn authenticate_returns_user_for_correct_credentials() {
    let pool = test_pool().await;
    let registered = register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("register");

    let user = authenticate_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("authenticate");
    assert_eq!(user.id, registered.id);
}

#[tokio::test]
async fn unknown_email_and_wrong_password_fail_identically() {
    let pool = test_pool().await;
    register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("register");

    let unknown = authenticate_user(&pool, "nobody@example.com", "Password123!")
        .await
        .expect_err("unknown email must fail");
    let wrong = authenticate_user(&pool, "a@example.com", "WrongPassword1")
        .await
        .expect_err("wrong password must fail");

    assert!(matches!(unknown, AuthError::InvalidCredentials));
    assert!(matches!(wrong, AuthError::InvalidCredentials));
    assert_eq!(unknown.to_string(), wrong.to_string());
}

#[tokio::test]
async fn authenticate_rejects_over_cap_password_distinctly() {
    let pool = test_pool().await;
    register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("register");

    let err = authenticate_user(&pool, "a@example.com", &"x".repeat(73))
        .await
        .expect_err("oversized password must fail");
    assert!(matches!(err, AuthError::PasswordTooLong));
}

#[tokio::test]
async fn delete_user_cascades_to_owned_rows() {
    let pool = test_pool().await;
    let user = register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("register");

    Interest::create(&pool, user.id, "rust async patterns")
        .await
        .expect("interest");
    let newsletter = Newsletter::create(&pool, user.id, "Weekly digest")
        .await
        .expect("newsletter");
    ContentItem::create(
        &pool,
        newsletter.id,
        "rust async patterns",
        "https://example.com/post",
        "A summary",
    )
    .await
    .expect("content item");

    let deleted_id = delete_user(&pool, user.id).await.expect("delete");
    assert_eq!(deleted_id, user.id);

    assert!(User::find_by_id(&pool, user.id).await.unwrap().is_none());
    assert!(Interest::list_by_user(&pool, user.id)
        .await
        .unwrap()
        .is_empty());
    assert!(Newsletter::list_by_user(&pool, user.id)
        .await
        .unwrap()
        .is_empty());
    assert!(ContentItem::list_by_newsletter(&pool, newsletter.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn register_login_token_delete_flow() {
    let pool = test_pool().await;
    let tokens = TokenService::new("flow-test-secret", 30);

    // Register with an 8-72 byte password.
    let registered = register_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("register");

    // Login with the same credentials and mint a token for the user id.
    let user = authenticate_user(&pool, "a@example.com", "Password123!")
        .await
        .expect("authenticate");
    let token = tokens.issue(&user.id.to_string()).expect("issue");

    // The token verifies back to the same user.
    let claims = tokens.verify(&token).expect("verify");
    let subject_id: i64 = claims.sub.parse().expect("integer subject");
    let resolved = User::find_by_id(&pool, subject_id)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(resolved.email, registered.email);

    // Delete the account; a later lookup by email finds nothing.
    delete_user(&pool, subject_id).await.expect("delete");
    assert!(User::find_by_email(&pool, "a@example.com")
        .await
        .unwrap()
        .is_none());
}
