//! Catalog client trait
//!
//! The catalog service owns track membership and order. It only supports
//! whole-list replacement, so every track-level mutation is expressed as a
//! fetch, a local computation and a replace.

use crate::error::Result;
use crate::types::{RemotePlaylistId, TrackId, TrackProjection};
use async_trait::async_trait;

/// Outcome of a single track lookup.
///
/// Lookups never fail with an error: an unreachable catalog is a value so
/// callers can degrade (zero duration, placeholder rows) instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackLookup {
    /// The catalog returned the track
    Found(TrackProjection),
    /// The catalog has no such track
    NotFound,
    /// The catalog could not be reached or answered with an error
    Unavailable,
}

impl TrackLookup {
    /// Duration contributed to a playlist aggregate; zero unless found
    pub fn duration(&self) -> u64 {
        match self {
            Self::Found(track) => u64::from(track.duration),
            Self::NotFound | Self::Unavailable => 0,
        }
    }

    /// The track, if found
    pub fn into_track(self) -> Option<TrackProjection> {
        match self {
            Self::Found(track) => Some(track),
            Self::NotFound | Self::Unavailable => None,
        }
    }

    /// Whether the track was found
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Client for the external catalog service
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Look up one track
    async fn get_track(&self, track_id: &TrackId) -> TrackLookup;

    /// Current ordered track ids of a remote playlist
    ///
    /// # Errors
    /// Returns `RemoteUnavailable` when the catalog cannot be reached, so
    /// mutations can abort instead of overwriting the remote list with a
    /// partial view.
    async fn get_playlist_tracks(&self, remote_id: &RemotePlaylistId) -> Result<Vec<TrackId>>;

    /// Replace the remote playlist's entire track list
    ///
    /// # Errors
    /// Returns an error if the catalog did not confirm the replacement.
    async fn replace_playlist_tracks(
        &self,
        remote_id: &RemotePlaylistId,
        track_ids: &[TrackId],
    ) -> Result<()>;

    /// Create an empty remote playlist
    ///
    /// # Errors
    /// Returns an error if the catalog did not create the playlist.
    async fn create_playlist(&self, name: &str) -> Result<RemotePlaylistId>;

    /// Whether the most recent call succeeded. Advisory only.
    fn is_healthy(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_found_tracks_contribute_duration() {
        let found = TrackLookup::Found(TrackProjection::new("t1", "A", "B", "C", 200));
        assert_eq!(found.duration(), 200);
        assert_eq!(TrackLookup::NotFound.duration(), 0);
        assert_eq!(TrackLookup::Unavailable.duration(), 0);
    }

    #[test]
    fn into_track_discards_misses() {
        assert!(TrackLookup::Unavailable.into_track().is_none());
        let found = TrackLookup::Found(TrackProjection::new("t1", "A", "B", "C", 1));
        assert!(found.is_found());
        assert_eq!(found.into_track().map(|t| t.id), Some(TrackId::new("t1")));
    }
}
