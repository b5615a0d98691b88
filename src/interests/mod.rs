//! # Interests Module
//!
//! Interest extraction from free-text prompts, plus the relational rows
//! (interests, newsletters, content items) owned by users.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod sanitizer;
pub mod service;
pub mod validators;

pub use routes::interests_routes;
pub use sanitizer::PromptSanitizer;
