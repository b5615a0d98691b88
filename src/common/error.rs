// Error handling types for the API

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::auth::service::AuthError;
use crate::interests::sanitizer::PromptValidationError;
use crate::services::llm::LlmError;

/// API error types.
///
/// Every rejected operation maps to one of these; the `error` field in the
/// response body is a stable machine-readable code so clients never need to
/// pattern-match on the human message.
#[derive(Debug)]
pub enum ApiError {
    UserExists(String),
    PasswordTooLong(String),
    InvalidCredentials(String),
    Unauthorized(String),
    InvalidPrompt(String),
    ValidationFailed {
        message: String,
        details: serde_json::Value,
    },
    RateLimited {
        retry_after: u32,
    },
    LlmUnavailable(String),
    LlmAuthFailed(String),
    LlmResponseInvalid(String),
    DatabaseError(sqlx::Error),
    InternalServer(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UserExists(msg) => write!(f, "User Exists: {}", msg),
            ApiError::PasswordTooLong(msg) => write!(f, "Password Too Long: {}", msg),
            ApiError::InvalidCredentials(msg) => write!(f, "Invalid Credentials: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::InvalidPrompt(msg) => write!(f, "Invalid Prompt: {}", msg),
            ApiError::ValidationFailed { message, .. } => {
                write!(f, "Validation Error: {}", message)
            }
            ApiError::RateLimited { retry_after } => {
                write!(f, "Rate Limited: retry after {}s", retry_after)
            }
            ApiError::LlmUnavailable(msg) => write!(f, "LLM Unavailable: {}", msg),
            ApiError::LlmAuthFailed(msg) => write!(f, "LLM Auth Failed: {}", msg),
            ApiError::LlmResponseInvalid(msg) => write!(f, "LLM Response Invalid: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

/// JSON error response structure: `{error, message, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::UserExists(_) => "user_exists",
            ApiError::PasswordTooLong(_) => "password_too_long",
            ApiError::InvalidCredentials(_) => "invalid_credentials",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::InvalidPrompt(_) => "invalid_prompt",
            ApiError::ValidationFailed { .. } => "validation_error",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::LlmUnavailable(_) => "llm_unavailable",
            ApiError::LlmAuthFailed(_) => "llm_auth_failed",
            ApiError::LlmResponseInvalid(_) => "llm_response_invalid",
            ApiError::DatabaseError(_) | ApiError::InternalServer(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UserExists(_) | ApiError::InvalidPrompt(_) => StatusCode::BAD_REQUEST,
            ApiError::PasswordTooLong(_) | ApiError::ValidationFailed { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::InvalidCredentials(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::LlmUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::LlmAuthFailed(_) | ApiError::LlmResponseInvalid(_) => StatusCode::BAD_GATEWAY,
            ApiError::DatabaseError(_) | ApiError::InternalServer(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let code = self.error_code();

        let (message, details) = match &self {
            ApiError::ValidationFailed { message, details } => {
                (message.clone(), Some(details.clone()))
            }
            ApiError::RateLimited { .. } => ("Too many requests".to_string(), None),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                ("Database operation failed".to_string(), None)
            }
            ApiError::InternalServer(msg) => {
                error!(message = %msg, "Internal server error");
                ("Internal Server Error".to_string(), None)
            }
            ApiError::UserExists(msg)
            | ApiError::PasswordTooLong(msg)
            | ApiError::InvalidCredentials(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::InvalidPrompt(msg)
            | ApiError::LlmUnavailable(msg)
            | ApiError::LlmAuthFailed(msg)
            | ApiError::LlmResponseInvalid(msg) => (msg.clone(), None),
        };

        let body = ErrorBody {
            error: code.to_string(),
            message,
            details,
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer"),
            );
        }
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let message = e.to_string();
        match e {
            AuthError::UserExists => ApiError::UserExists(message),
            AuthError::InvalidCredentials => ApiError::InvalidCredentials(message),
            AuthError::PasswordTooLong => ApiError::PasswordTooLong(message),
            AuthError::Database(e) => ApiError::DatabaseError(e),
            AuthError::Hash(msg) => ApiError::InternalServer(msg),
        }
    }
}

impl From<PromptValidationError> for ApiError {
    fn from(e: PromptValidationError) -> Self {
        ApiError::InvalidPrompt(e.to_string())
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        let message = e.to_string();
        match e {
            LlmError::Unavailable(_) => ApiError::LlmUnavailable(message),
            LlmError::AuthFailed(_) => ApiError::LlmAuthFailed(message),
            LlmError::InvalidResponse(_) => ApiError::LlmResponseInvalid(message),
        }
    }
}

impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            return ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            );
        }
        ApiError::ValidationFailed {
            message: "Request validation failed".to_string(),
            details: result.to_details(),
        }
    }
}
