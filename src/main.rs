// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod common;
mod interests;
mod meta;
mod rate_limit_middleware;
mod services;

use auth::TokenService;
use common::{AppConfig, AppState};
use interests::PromptSanitizer;
use rate_limit_middleware::rate_limit_middleware;
use services::llm::{LlmClient, OpenAiClient};
use services::rate_limit::{CounterStore, RateLimitService, RedisCounterStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // CONFIGURATION
    // ========================================================================

    let config = match AppConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!("Please set these in your .env file");
            std::process::exit(1);
        }
    };
    info!(app = %config.app_name, environment = %config.environment, "configuration loaded");

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_options).await?;

    common::migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let tokens = TokenService::new(&config.jwt_secret, config.jwt_access_ttl_minutes);

    let sanitizer = Arc::new(PromptSanitizer::new());

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    ));
    info!(model = %config.openai_model, "LLM client initialized");

    let shared_counters: Option<Arc<dyn CounterStore>> = match &config.rate_limit_storage_url {
        Some(url) => match RedisCounterStore::connect(url).await {
            Ok(store) => {
                info!("shared rate limit counter store connected");
                Some(Arc::new(store))
            }
            Err(e) => {
                warn!(error = %e, "shared counter store unreachable, starting on in-process fallback");
                None
            }
        },
        None => {
            warn!("RATE_LIMIT_STORAGE_URL not set, rate limits are per-instance only");
            None
        }
    };
    let rate_limit_service = Arc::new(RateLimitService::new(shared_counters));
    RateLimitService::start_cleanup_task(rate_limit_service.clone());

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        tokens,
        sanitizer,
        llm,
        rate_limit_service,
    });

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(interests::interests_routes())
        .merge(meta::meta_routes())
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(state))
        .layer({
            let cors_origins = std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
