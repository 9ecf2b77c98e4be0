/// API route modules
pub mod health;
pub mod music;
pub mod playlists;

use crate::{middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router, mounted under `/api`
pub fn router(app_state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new().route("/health", get(health::health));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        // Playlists
        .route(
            "/playlists",
            get(playlists::list_playlists).post(playlists::create_playlist),
        )
        .route("/playlists/public", get(playlists::list_public_playlists))
        .route("/playlists/search", get(playlists::search_playlists))
        .route("/playlists/sync", post(playlists::sync_playlists))
        .route(
            "/playlists/:id",
            get(playlists::get_playlist)
                .put(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(
            "/playlists/:id/tracks",
            get(playlists::get_playlist_tracks).post(playlists::add_track_to_playlist),
        )
        .route(
            "/playlists/:id/tracks/:track_id",
            delete(playlists::remove_track_from_playlist),
        )
        .route("/playlists/:id/reorder", put(playlists::reorder_tracks))
        .route("/playlists/:id/like", post(playlists::toggle_like))
        .route("/playlists/:id/play", post(playlists::record_play))
        // Catalog browsing
        .route("/music/search", get(music::search))
        .route("/music/tracks", get(music::list_tracks))
        .route("/music/tracks/:id", get(music::get_track))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&app_state.verifier),
            middleware::auth_middleware,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
