//! # Auth Module
//!
//! Registration, login, current-user lookup, and account deletion:
//! - bcrypt password hashing with a hard 72-byte input cap
//! - JWT issuance and verification (HS256, stateless)
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;
pub mod tokens;
pub mod validators;

#[cfg(test)]
mod tests;

pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
pub use tokens::TokenService;
