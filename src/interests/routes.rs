//! Interest routes

use axum::{routing::post, Router};

use super::handlers;

/// Creates and returns the interests router
///
/// # Routes
/// - `POST /api/interests/extract` - Extract interests from a prompt
pub fn interests_routes() -> Router {
    Router::new().route("/api/interests/extract", post(handlers::extract_interests))
}
