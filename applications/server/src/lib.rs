//! Cadence Server Library
//!
//! HTTP surface over the playlist service: bearer-token verification, JSON
//! routes for playlists and catalog browsing, configuration loading.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use api::router;
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use services::auth::TokenVerifier;
pub use state::AppState;
