//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::models::User;
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor.
///
/// Validates the bearer token and loads the user from the database. Every
/// failure - missing header, malformed header, bad signature, expiry,
/// non-integer subject, unknown user - collapses to the same `unauthorized`
/// rejection so callers cannot tell which step failed.
#[derive(Debug)]
pub struct AuthedUser {
    pub id: i64,
    pub email: String,
}

const CREDENTIALS_MESSAGE: &str = "Could not validate credentials";

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => {
                warn!("authentication failed: missing bearer token");
                return Err(ApiError::Unauthorized(CREDENTIALS_MESSAGE.to_string()));
            }
        };

        let claims = match app_state.tokens.verify(&token) {
            Some(c) => c,
            None => {
                warn!("authentication failed: token did not verify");
                return Err(ApiError::Unauthorized(CREDENTIALS_MESSAGE.to_string()));
            }
        };

        let user_id: i64 = match claims.sub.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!("authentication failed: non-integer subject");
                return Err(ApiError::Unauthorized(CREDENTIALS_MESSAGE.to_string()));
            }
        };

        let user: Option<User> = User::find_by_id(&app_state.db, user_id)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = user_id, "database error during user lookup");
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                debug!(user_id = u.id, email = %safe_email_log(&u.email), "user authenticated via extractor");
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                })
            }
            None => {
                warn!(user_id = user_id, "authentication failed: user not found");
                Err(ApiError::Unauthorized(CREDENTIALS_MESSAGE.to_string()))
            }
        }
    }
}
