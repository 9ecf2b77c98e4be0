//! Error types for the catalog client.

use cadence_core::CadenceError;
use thiserror::Error;

/// Subsonic error code for "the requested data was not found".
pub(crate) const NOT_FOUND_CODE: i64 = 70;

/// Errors that can occur when talking to the catalog service.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within its timeout
    #[error("Catalog request timed out: {0}")]
    Timeout(String),

    /// Catalog is offline or unreachable
    #[error("Catalog unreachable: {0}")]
    Unreachable(String),

    /// Catalog returned a non-success HTTP status
    #[error("Catalog HTTP error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Catalog rejected the configured credentials
    #[error("Catalog authentication failed: {0}")]
    AuthFailed(String),

    /// Catalog answered with `status: failed`
    #[error("Catalog API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Failed to parse catalog response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid catalog URL
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether the catalog reported that the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == NOT_FOUND_CODE)
            || matches!(self, Self::ServerError { status: 404, .. })
    }

    /// Whether the failure means the catalog could not be reached at all
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Request(_) | Self::Timeout(_) | Self::Unreachable(_) => true,
            Self::ServerError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<CatalogError> for CadenceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidUrl(msg) => CadenceError::Internal(msg),
            err if err.is_transport() => CadenceError::RemoteUnavailable(err.to_string()),
            err => CadenceError::RemoteRejected(err.to_string()),
        }
    }
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
