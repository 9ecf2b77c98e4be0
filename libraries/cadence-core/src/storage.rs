//! Metadata store trait
//!
//! Pure persistence of playlist records. Implementations hold no business
//! logic; every method either succeeds or fails with a storage error.

use crate::error::Result;
use crate::types::{
    NewPlaylist, PlaylistId, PlaylistPage, PlaylistRecord, Projection, RemotePlaylistId,
    UpdatePlaylist, UserId,
};
use async_trait::async_trait;

/// Storage of playlist records and the owner profile counters
#[async_trait]
pub trait MetadataStore: Send + Sync {
    // ========================================================================
    // Playlists
    // ========================================================================

    /// Insert a new playlist with an empty projection
    async fn insert_playlist(&self, playlist: NewPlaylist) -> Result<PlaylistRecord>;

    /// Get playlist by ID
    async fn get_playlist(&self, id: &PlaylistId) -> Result<Option<PlaylistRecord>>;

    /// Get playlist by its catalog ID
    async fn get_by_remote_id(&self, remote_id: &RemotePlaylistId)
        -> Result<Option<PlaylistRecord>>;

    /// Apply a metadata update, returning the updated record
    async fn update_metadata(
        &self,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Option<PlaylistRecord>>;

    /// Write `track_ids`, `track_count`, `duration` and `synced_at` in one
    /// conditional write
    ///
    /// The write only applies when the stored `synced_at` is older than the
    /// projection's; otherwise the current record is returned unchanged.
    async fn write_projection(
        &self,
        id: &PlaylistId,
        projection: &Projection,
    ) -> Result<PlaylistRecord>;

    /// Increment the play counter, returning the updated record
    async fn record_play(&self, id: &PlaylistId) -> Result<Option<PlaylistRecord>>;

    /// Delete a playlist, returning whether it existed
    async fn delete_playlist(&self, id: &PlaylistId) -> Result<bool>;

    // ========================================================================
    // Queries
    // ========================================================================

    /// Playlists owned by a user, newest first
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PlaylistRecord>>;

    /// Public playlists ordered by like count, then recency
    async fn list_public(&self, limit: u32, page: u32) -> Result<PlaylistPage>;

    /// Public playlists whose name, description or tags contain `query`
    /// (case-insensitive)
    async fn search_public(&self, query: &str, limit: u32) -> Result<Vec<PlaylistRecord>>;

    // ========================================================================
    // Likes and counters
    // ========================================================================

    /// Add or remove a like, returning the like count afterwards
    async fn set_like(&self, id: &PlaylistId, user: &UserId, liked: bool) -> Result<u32>;

    /// Atomically adjust a user's playlist counter, returning the new value
    async fn adjust_playlist_count(&self, user: &UserId, delta: i64) -> Result<i64>;

    /// Current playlist counter of a user
    async fn playlist_count(&self, user: &UserId) -> Result<i64>;
}
