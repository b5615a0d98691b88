//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/register` - Register a new user
/// - `POST /api/auth/login` - Authenticate and obtain a bearer token
/// - `GET /api/auth/me` - Get current user information
/// - `DELETE /api/auth/me` - Delete the current user and owned data
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/auth/me",
            get(handlers::get_me).delete(handlers::delete_me),
        )
}
