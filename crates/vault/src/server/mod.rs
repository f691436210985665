//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with the record routes and shared middleware.
//! - Resolve the caller's owner id from the configured header.
//! - Clean input text and map store failures to HTTP responses.
//! - Inject shared application state (`AppState`) into handlers.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod owner;
pub mod router;
pub mod sanitize;
pub mod state;
