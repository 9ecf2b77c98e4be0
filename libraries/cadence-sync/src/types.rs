use cadence_core::{PlaylistRecord, TrackProjection};
use serde::{Deserialize, Serialize};

/// Outcome of syncing every playlist of one owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Playlists considered
    pub total: usize,
    /// Refreshed from the catalog
    pub synced: usize,
    /// Still fresh and left alone
    pub skipped: usize,
    /// Refresh failed; cached copy kept
    pub failed: usize,
}

/// A playlist record joined with live track details
///
/// Tracks the catalog cannot resolve are left out of `tracks` but stay in
/// `playlist.track_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    #[serde(flatten)]
    pub playlist: PlaylistRecord,
    pub tracks: Vec<TrackProjection>,
}
