//! Interest extraction handlers

use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::service;
use super::validators::ExtractionValidator;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Validator};

#[derive(Debug, Deserialize)]
pub struct ExtractInterestsRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractInterestsResponse {
    pub add_interests: Vec<String>,
    pub remove_interests: Vec<String>,
}

/// POST /api/interests/extract
///
/// Authenticated. Validates the request shape, sanitizes the prompt, and
/// hands the cleaned text to the LLM. The extraction result is returned to
/// the caller; it is not written back to interest rows.
pub async fn extract_interests(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Json(payload): Json<ExtractInterestsRequest>,
) -> Result<Json<ExtractInterestsResponse>, ApiError> {
    let validation = ExtractionValidator.validate(&payload);
    if !validation.is_valid {
        return Err(validation.into());
    }

    let sanitized = state.sanitizer.sanitize(&payload.prompt)?;

    info!(user_id = user.id, prompt_length = sanitized.len(), "extracting interests");
    let result = service::extract_interests_from_prompt(&sanitized, state.llm.as_ref()).await?;

    Ok(Json(ExtractInterestsResponse {
        add_interests: result.add_interests,
        remove_interests: result.remove_interests,
    }))
}
