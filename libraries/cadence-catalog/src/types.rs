//! Types for the catalog client configuration and browse responses.

use cadence_core::TrackProjection;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Subsonic REST API version requested by default.
pub const DEFAULT_API_VERSION: &str = "1.16.1";

/// Client name reported to the catalog by default.
pub const DEFAULT_CLIENT_NAME: &str = "cadence";

/// Configuration for connecting to the catalog service.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog (e.g., "http://localhost:4533")
    pub url: String,
    /// Catalog account used for every request
    pub username: String,
    /// Password of the catalog account, only ever sent as a salted token
    pub password: String,
    /// Value of the `c` parameter
    pub client_name: String,
    /// Value of the `v` parameter
    pub api_version: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Timeout for the health ping
    pub health_timeout: Duration,
}

impl CatalogConfig {
    /// Create a config with default client name, version and timeouts.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(10),
            health_timeout: Duration::from_secs(5),
        }
    }
}

// =============================================================================
// Browse Types
// =============================================================================

/// Artist entry in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSummary {
    pub id: String,
    pub name: String,
    pub album_count: u32,
    pub cover_art: Option<String>,
}

/// Album entry in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumSummary {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub song_count: u32,
    pub duration: u32,
    pub year: Option<i32>,
}

/// Combined search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub tracks: Vec<TrackProjection>,
    pub artists: Vec<ArtistSummary>,
    pub albums: Vec<AlbumSummary>,
}
