//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{error, info};

use super::extractors::AuthedUser;
use super::models::{
    AccessTokenResponse, DeleteUserResponse, LoginRequest, RegisterRequest, UserResponse,
};
use super::service;
use super::validators::CredentialsValidator;
use crate::common::{safe_email_log, ApiError, AppState, Validator};

/// POST /api/auth/register
///
/// Creates a user and returns its public representation with 201.
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let validation = CredentialsValidator::new().validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let user = service::register_user(&state.db, &payload.email, &payload.password).await?;

    info!(user_id = user.id, email = %safe_email_log(&user.email), "registration completed");
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/auth/login
///
/// Authenticates the credentials and returns a bearer token whose subject is
/// the user id.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let validation = CredentialsValidator::new().validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let user = service::authenticate_user(&state.db, &payload.email, &payload.password).await?;

    let access_token = state.tokens.issue(&user.id.to_string()).map_err(|e| {
        error!(error = %e, user_id = user.id, "token issuance failed");
        ApiError::InternalServer("token issuance failed".to_string())
    })?;

    info!(user_id = user.id, "login completed");
    Ok(Json(AccessTokenResponse::bearer(access_token)))
}

/// GET /api/auth/me
pub async fn get_me(user: AuthedUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: user.id,
        email: user.email,
    })
}

/// DELETE /api/auth/me
///
/// Hard-deletes the authenticated user; owned rows are removed by the
/// storage layer's cascade.
pub async fn delete_me(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let deleted_user_id = service::delete_user(&state.db, user.id).await?;
    Ok(Json(DeleteUserResponse { deleted_user_id }))
}
