/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Core error type for Cadence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// The catalog service could not be reached or timed out
    #[error("Catalog unavailable: {0}")]
    RemoteUnavailable(String),

    /// The catalog service answered but refused the request
    #[error("Catalog rejected request: {0}")]
    RemoteRejected(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Requester may not access or modify the entity
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The metadata store rejected an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// Other internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Create a remote-unavailable error
    pub fn remote_unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error came from talking to the catalog service
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteUnavailable(_) | Self::RemoteRejected(_))
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for CadenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
