// User service layer - business logic for register/login/delete

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::User;
use super::password::{hash_password, verify_password, PasswordError};
use crate::common::safe_email_log;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email already registered")]
    UserExists,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Password must not exceed 72 bytes when UTF-8 encoded")]
    PasswordTooLong,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("password hash error: {0}")]
    Hash(String),
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        match e {
            PasswordError::TooLong => AuthError::PasswordTooLong,
            PasswordError::Hash(e) => AuthError::Hash(e.to_string()),
        }
    }
}

/// Register a new user.
///
/// The existence check is advisory: two concurrent registrations for the
/// same email can both pass it, so a uniqueness violation at commit time is
/// caught and translated to `UserExists` instead of surfacing as a raw
/// storage error. Any other storage error propagates unchanged.
pub async fn register_user(
    db: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let mut tx = db.begin().await?;

    let existing = sqlx::query_as::<_, User>(
        "SELECT id, email, hashed_password, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(&mut *tx)
    .await?;

    if existing.is_some() {
        warn!(email = %safe_email_log(email), "registration for existing email");
        return Err(AuthError::UserExists);
    }

    let hashed_password = hash_password(password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, hashed_password)
        VALUES (?, ?)
        RETURNING id, email, hashed_password, created_at
        "#,
    )
    .bind(email)
    .bind(&hashed_password)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AuthError::UserExists
        } else {
            AuthError::Database(e)
        }
    })?;

    tx.commit().await?;

    info!(user_id = user.id, email = %safe_email_log(&user.email), "user registered");
    Ok(user)
}

/// Authenticate a user with email and password.
///
/// Unknown email and wrong password both return `InvalidCredentials` so an
/// attacker cannot enumerate accounts. `PasswordTooLong` stays distinct: it
/// is a client-input defect, not a credential probe.
pub async fn authenticate_user(
    db: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = match User::find_by_email(db, email).await? {
        Some(user) => user,
        None => {
            warn!(email = %safe_email_log(email), "login for unknown email");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let password_valid = verify_password(password, &user.hashed_password)?;
    if !password_valid {
        warn!(user_id = user.id, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    info!(user_id = user.id, "user authenticated");
    Ok(user)
}

/// Hard-delete a user; owned interests, newsletters, and content items go
/// with it via the storage layer's cascading delete. Returns the deleted id.
/// Deleting an already-deleted id is the caller's concern.
pub async fn delete_user(db: &SqlitePool, user_id: i64) -> Result<i64, AuthError> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(user_id = user_id, "user deleted");
    Ok(user_id)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
