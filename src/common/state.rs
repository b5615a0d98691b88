// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::tokens::TokenService;
use crate::common::AppConfig;
use crate::interests::sanitizer::PromptSanitizer;
use crate::services::llm::LlmClient;
use crate::services::rate_limit::RateLimitService;

/// Application state containing the database pool, services, and
/// configuration. Built once in `main`; immutable afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: TokenService,
    pub sanitizer: Arc<PromptSanitizer>,
    pub llm: Arc<dyn LlmClient>,
    pub rate_limit_service: Arc<RateLimitService>,
}
