//! Playlist service
//!
//! Authorization and input validation in front of the sync engine. Owners
//! may do anything with their playlists; everyone may read public ones.

use crate::engine::SyncEngine;
use crate::types::{PlaylistView, SyncSummary};
use cadence_core::{
    CadenceError, CreatePlaylist, LikeStatus, PlaylistId, PlaylistPage, PlaylistRecord, Result,
    TrackId, UpdatePlaylist, UserId,
};
use futures_util::{stream, StreamExt};
use tracing::info;

/// Longest playlist name, in characters
pub const MAX_NAME_LEN: usize = 100;

/// Longest description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Largest page or result size a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Concurrent resyncs when a read returns many playlists
const LIST_RESYNC_CONCURRENCY: usize = 4;

/// Playlist service configuration
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Answer `NotFound` instead of `Forbidden` when a non-owner touches a
    /// private playlist, hiding whether it exists
    pub hide_private_playlists: bool,
}

/// Authorization gate over the sync engine
pub struct PlaylistService {
    engine: SyncEngine,
    config: ServiceConfig,
}

impl PlaylistService {
    pub fn new(engine: SyncEngine, config: ServiceConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub async fn create_playlist(
        &self,
        requester: &UserId,
        mut request: CreatePlaylist,
    ) -> Result<PlaylistRecord> {
        request.name = validate_name(&request.name)?;
        validate_description(request.description.as_deref())?;

        self.engine.create_playlist(requester, request).await
    }

    /// A readable playlist, resynced if stale
    pub async fn get_playlist(&self, requester: &UserId, id: &PlaylistId) -> Result<PlaylistRecord> {
        let record = self.load(id).await?;
        self.check_read(&record, requester)?;
        Ok(self.engine.resync(record).await)
    }

    /// A readable playlist with live details of its tracks
    pub async fn get_playlist_with_tracks(
        &self,
        requester: &UserId,
        id: &PlaylistId,
    ) -> Result<PlaylistView> {
        let playlist = self.get_playlist(requester, id).await?;
        let tracks = self.engine.track_details(&playlist.track_ids).await;
        Ok(PlaylistView { playlist, tracks })
    }

    /// The requester's own playlists, newest first
    pub async fn list_user_playlists(&self, requester: &UserId) -> Result<Vec<PlaylistRecord>> {
        let records = self.engine.store().list_by_owner(requester).await?;
        Ok(self.resync_all(records).await)
    }

    /// Public playlists, most liked first
    pub async fn list_public_playlists(&self, limit: u32, page: u32) -> Result<PlaylistPage> {
        let limit = validate_limit(limit)?;
        if page == 0 {
            return Err(CadenceError::bad_request("page must be at least 1"));
        }

        let mut result = self.engine.store().list_public(limit, page).await?;
        result.playlists = self.resync_all(result.playlists).await;
        Ok(result)
    }

    /// Public playlists matching `query` in name, description or tags
    pub async fn search_playlists(&self, query: &str, limit: u32) -> Result<Vec<PlaylistRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CadenceError::bad_request("search query is required"));
        }
        let limit = validate_limit(limit)?;

        let records = self.engine.store().search_public(query, limit).await?;
        Ok(self.resync_all(records).await)
    }

    /// Change name, description, visibility, tags or cover art
    pub async fn update_playlist(
        &self,
        requester: &UserId,
        id: &PlaylistId,
        mut update: UpdatePlaylist,
    ) -> Result<PlaylistRecord> {
        if let Some(name) = &update.name {
            update.name = Some(validate_name(name)?);
        }
        validate_description(update.description.as_deref())?;

        let record = self.load(id).await?;
        self.check_owner(&record, requester)?;

        if update.is_empty() {
            return Ok(record);
        }

        let updated = self
            .engine
            .store()
            .update_metadata(id, update)
            .await?
            .ok_or_else(|| CadenceError::not_found("Playlist", id.as_str()))?;

        info!(playlist_id = %id, "Playlist metadata updated");
        Ok(updated)
    }

    pub async fn delete_playlist(&self, requester: &UserId, id: &PlaylistId) -> Result<()> {
        let record = self.load(id).await?;
        self.check_owner(&record, requester)?;
        self.engine.delete(&record).await
    }

    pub async fn add_track(
        &self,
        requester: &UserId,
        id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<PlaylistRecord> {
        validate_track_id(track_id)?;
        let record = self.load(id).await?;
        self.check_owner(&record, requester)?;
        self.engine.add_track(&record, track_id).await
    }

    pub async fn remove_track(
        &self,
        requester: &UserId,
        id: &PlaylistId,
        track_id: &TrackId,
    ) -> Result<PlaylistRecord> {
        validate_track_id(track_id)?;
        let record = self.load(id).await?;
        self.check_owner(&record, requester)?;
        self.engine.remove_track(&record, track_id).await
    }

    pub async fn reorder_tracks(
        &self,
        requester: &UserId,
        id: &PlaylistId,
        from: usize,
        to: usize,
    ) -> Result<PlaylistRecord> {
        let record = self.load(id).await?;
        self.check_owner(&record, requester)?;
        self.engine.reorder_tracks(&record, from, to).await
    }

    /// Like a readable playlist, or take the like back
    pub async fn toggle_like(&self, requester: &UserId, id: &PlaylistId) -> Result<LikeStatus> {
        let record = self.load(id).await?;
        self.check_read(&record, requester)?;

        let liked = !record.likes.contains(requester);
        let likes = self.engine.store().set_like(id, requester, liked).await?;

        Ok(LikeStatus { liked, likes })
    }

    /// Count one play of a readable playlist
    pub async fn record_play(&self, requester: &UserId, id: &PlaylistId) -> Result<PlaylistRecord> {
        let record = self.load(id).await?;
        self.check_read(&record, requester)?;

        let played = self
            .engine
            .store()
            .record_play(id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Playlist", id.as_str()))?;

        info!(playlist_id = %id, user = %requester, plays = played.plays, "Playlist played");
        Ok(played)
    }

    /// Force-refresh all of the requester's playlists
    pub async fn sync_playlists(&self, requester: &UserId) -> Result<SyncSummary> {
        self.engine.sync_owner_playlists(requester, true).await
    }

    async fn load(&self, id: &PlaylistId) -> Result<PlaylistRecord> {
        self.engine
            .store()
            .get_playlist(id)
            .await?
            .ok_or_else(|| CadenceError::not_found("Playlist", id.as_str()))
    }

    async fn resync_all(&self, records: Vec<PlaylistRecord>) -> Vec<PlaylistRecord> {
        stream::iter(records)
            .map(|record| self.engine.resync(record))
            .buffered(LIST_RESYNC_CONCURRENCY)
            .collect()
            .await
    }

    fn check_read(&self, record: &PlaylistRecord, requester: &UserId) -> Result<()> {
        if record.is_readable_by(requester) {
            Ok(())
        } else {
            Err(self.denied(record))
        }
    }

    fn check_owner(&self, record: &PlaylistRecord, requester: &UserId) -> Result<()> {
        if record.is_owned_by(requester) {
            Ok(())
        } else if !record.is_public && self.config.hide_private_playlists {
            Err(self.denied(record))
        } else {
            Err(CadenceError::forbidden("only the owner may modify this playlist"))
        }
    }

    fn denied(&self, record: &PlaylistRecord) -> CadenceError {
        if self.config.hide_private_playlists {
            CadenceError::not_found("Playlist", record.id.as_str())
        } else {
            CadenceError::forbidden("playlist is private")
        }
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CadenceError::bad_request("playlist name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CadenceError::bad_request(format!(
            "playlist name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_description(description: Option<&str>) -> Result<()> {
    match description {
        Some(d) if d.chars().count() > MAX_DESCRIPTION_LEN => Err(CadenceError::bad_request(
            format!("description cannot exceed {MAX_DESCRIPTION_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

fn validate_track_id(track_id: &TrackId) -> Result<()> {
    if track_id.is_blank() {
        Err(CadenceError::bad_request("track id is required"))
    } else {
        Ok(())
    }
}

fn validate_limit(limit: u32) -> Result<u32> {
    if limit == 0 {
        Err(CadenceError::bad_request("limit must be at least 1"))
    } else {
        Ok(limit.min(MAX_PAGE_SIZE))
    }
}
