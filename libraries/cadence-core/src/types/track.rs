/// Track domain types
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Per-track view fetched from the catalog service.
///
/// Ephemeral: looked up to compute aggregates or to render a playlist's
/// detail list, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProjection {
    /// Catalog track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Duration in seconds
    pub duration: u32,

    /// Genres reported by the catalog
    #[serde(default)]
    pub genre: Vec<String>,
}

impl TrackProjection {
    /// Create a track projection without genre information
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration,
            genre: Vec::new(),
        }
    }
}
