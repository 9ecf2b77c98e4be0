/// Server services
pub mod auth;

pub use auth::TokenVerifier;
