// Application configuration loaded once from the environment

use std::env;
use std::fmt;

/// Immutable application configuration.
///
/// Constructed once in `main` and handed to each component; nothing reads
/// environment variables after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub environment: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_access_ttl_minutes: i64,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    /// Shared rate-limit counter store (redis). When unset or unreachable the
    /// service runs on the in-process fallback counters only.
    pub rate_limit_storage_url: Option<String>,
}

/// One or more required environment variables are missing.
#[derive(Debug)]
pub struct MissingSettingsError {
    pub missing: Vec<String>,
}

impl fmt::Display for MissingSettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing required environment variables: {}",
            self.missing.join(", ")
        )
    }
}

impl std::error::Error for MissingSettingsError {}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Required variables are collected and reported together so a broken
    /// deployment fails with one complete message instead of one variable at
    /// a time.
    pub fn from_env() -> Result<Self, MissingSettingsError> {
        let mut missing = Vec::new();

        let database_url = require(&mut missing, "DATABASE_URL");
        let jwt_secret = require(&mut missing, "JWT_SECRET");
        let openai_api_key = require(&mut missing, "OPENAI_API_KEY");
        let jwt_access_ttl_minutes = require(&mut missing, "JWT_ACCESS_TTL_MINUTES")
            .and_then(|v| v.parse::<i64>().ok());
        if jwt_access_ttl_minutes.is_none() && !missing.contains(&"JWT_ACCESS_TTL_MINUTES".to_string())
        {
            missing.push("JWT_ACCESS_TTL_MINUTES".to_string());
        }

        if !missing.is_empty() {
            return Err(MissingSettingsError { missing });
        }

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "newsletter-api".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            database_url: database_url.unwrap(),
            jwt_secret: jwt_secret.unwrap(),
            jwt_access_ttl_minutes: jwt_access_ttl_minutes.unwrap(),
            openai_api_key: openai_api_key.unwrap(),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            rate_limit_storage_url: env::var("RATE_LIMIT_STORAGE_URL").ok().filter(|v| !v.is_empty()),
        })
    }
}

fn require(missing: &mut Vec<String>, key: &str) -> Option<String> {
    match env::var(key) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(key.to_string());
            None
        }
    }
}
