/// Playlists API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_core::{
    CreatePlaylist, LikeStatus, PlaylistId, PlaylistPage, PlaylistRecord, TrackId,
    TrackProjection, UpdatePlaylist,
};
use cadence_sync::{PlaylistView, SyncSummary};
use serde::Deserialize;

/// Body of `POST /playlists`. A missing name is reported by validation, not
/// by the JSON extractor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<CreatePlaylistRequest> for CreatePlaylist {
    fn from(req: CreatePlaylistRequest) -> Self {
        CreatePlaylist {
            name: req.name,
            description: req.description,
            is_public: req.is_public,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTrackRequest {
    #[serde(default)]
    pub track_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page_limit")]
    pub limit: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_page_limit() -> u32 {
    50
}

fn default_page() -> u32 {
    1
}

fn default_search_limit() -> u32 {
    20
}

/// GET /api/playlists
/// The authenticated user's playlists, newest first
pub async fn list_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<PlaylistRecord>>> {
    let playlists = app_state
        .service
        .list_user_playlists(auth.user_id())
        .await?;
    Ok(Json(playlists))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<PlaylistRecord>)> {
    let playlist = app_state
        .service
        .create_playlist(auth.user_id(), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

/// GET /api/playlists/public?limit=&page=
pub async fn list_public_playlists(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<PlaylistPage>> {
    let page = app_state
        .service
        .list_public_playlists(query.limit, query.page)
        .await?;
    Ok(Json(page))
}

/// GET /api/playlists/search?q=&limit=
pub async fn search_playlists(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<PlaylistRecord>>> {
    let playlists = app_state
        .service
        .search_playlists(&query.q, query.limit)
        .await?;
    Ok(Json(playlists))
}

/// POST /api/playlists/sync
/// Force-refresh every playlist the user owns
pub async fn sync_playlists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<SyncSummary>> {
    let summary = app_state.service.sync_playlists(auth.user_id()).await?;
    Ok(Json(summary))
}

/// GET /api/playlists/:id
/// Playlist details with tracks
pub async fn get_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<PlaylistView>> {
    let view = app_state
        .service
        .get_playlist_with_tracks(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(view))
}

/// PUT /api/playlists/:id
/// Update playlist metadata
pub async fn update_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<UpdatePlaylist>,
) -> Result<Json<PlaylistRecord>> {
    let playlist = app_state
        .service
        .update_playlist(auth.user_id(), &PlaylistId::new(id), req)
        .await?;
    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    app_state
        .service
        .delete_playlist(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/playlists/:id/tracks
pub async fn get_playlist_tracks(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<TrackProjection>>> {
    let view = app_state
        .service
        .get_playlist_with_tracks(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(view.tracks))
}

/// POST /api/playlists/:id/tracks
pub async fn add_track_to_playlist(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<AddTrackRequest>,
) -> Result<Json<PlaylistRecord>> {
    let playlist = app_state
        .service
        .add_track(
            auth.user_id(),
            &PlaylistId::new(id),
            &TrackId::new(req.track_id),
        )
        .await?;
    Ok(Json(playlist))
}

/// DELETE /api/playlists/:id/tracks/:track_id
pub async fn remove_track_from_playlist(
    Path((id, track_id)): Path<(String, String)>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<PlaylistRecord>> {
    let playlist = app_state
        .service
        .remove_track(
            auth.user_id(),
            &PlaylistId::new(id),
            &TrackId::new(track_id),
        )
        .await?;
    Ok(Json(playlist))
}

/// PUT /api/playlists/:id/reorder
pub async fn reorder_tracks(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<PlaylistRecord>> {
    let playlist = app_state
        .service
        .reorder_tracks(
            auth.user_id(),
            &PlaylistId::new(id),
            req.from_index,
            req.to_index,
        )
        .await?;
    Ok(Json(playlist))
}

/// POST /api/playlists/:id/like
/// Toggle the user's like
pub async fn toggle_like(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<LikeStatus>> {
    let status = app_state
        .service
        .toggle_like(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(status))
}

/// POST /api/playlists/:id/play
pub async fn record_play(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<PlaylistRecord>> {
    let playlist = app_state
        .service
        .record_play(auth.user_id(), &PlaylistId::new(id))
        .await?;
    Ok(Json(playlist))
}
