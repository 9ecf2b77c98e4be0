/// Catalog browsing API routes
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use cadence_catalog::SearchResults;
use cadence_core::{CatalogClient, TrackId, TrackLookup, TrackProjection};
use serde::Deserialize;

/// Largest page of random tracks served at once
const MAX_RANDOM_TRACKS: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct TracksQuery {
    #[serde(default = "default_tracks_limit")]
    pub limit: u32,
}

fn default_search_limit() -> u32 {
    20
}

fn default_tracks_limit() -> u32 {
    50
}

/// GET /api/music/search?q=&limit=
pub async fn search(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ServerError::BadRequest("search query is required".to_string()));
    }

    let results = app_state.catalog.search(q, query.limit).await;
    Ok(Json(results))
}

/// GET /api/music/tracks?limit=
/// A random selection of catalog tracks
pub async fn list_tracks(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Query(query): Query<TracksQuery>,
) -> Result<Json<Vec<TrackProjection>>> {
    let size = query.limit.clamp(1, MAX_RANDOM_TRACKS);
    let tracks = app_state.catalog.random_tracks(size).await;
    Ok(Json(tracks))
}

/// GET /api/music/tracks/:id
pub async fn get_track(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
) -> Result<Json<TrackProjection>> {
    let track_id = TrackId::new(id);
    if track_id.is_blank() {
        return Err(ServerError::BadRequest("track id is required".to_string()));
    }

    match app_state
        .service
        .engine()
        .catalog()
        .get_track(&track_id)
        .await
    {
        TrackLookup::Found(track) => Ok(Json(track)),
        TrackLookup::NotFound => Err(ServerError::NotFound(format!(
            "Track not found: {track_id}"
        ))),
        TrackLookup::Unavailable => Err(ServerError::RemoteUnavailable(format!(
            "lookup of track {track_id} failed"
        ))),
    }
}
