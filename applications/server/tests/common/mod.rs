//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use cadence_catalog::{CatalogConfig, SubsonicCatalog};
use cadence_core::{
    CadenceError, CatalogClient, RemotePlaylistId, Result, TrackId, TrackLookup, TrackProjection,
};
use cadence_server::{api, services::TokenVerifier, state::AppState};
use cadence_storage::SqliteMetadataStore;
use cadence_sync::{PlaylistService, ServiceConfig, SyncConfig, SyncEngine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

/// Catalog that keeps playlists in memory
#[derive(Default)]
pub struct FakeCatalog {
    playlists: Mutex<HashMap<RemotePlaylistId, Vec<TrackId>>>,
    tracks: Mutex<HashMap<TrackId, u32>>,
    offline: Mutex<bool>,
}

impl FakeCatalog {
    pub fn with_tracks(tracks: &[(&str, u32)]) -> Self {
        let catalog = Self::default();
        {
            let mut known = catalog.tracks.lock().unwrap();
            for (id, duration) in tracks {
                known.insert(TrackId::new(*id), *duration);
            }
        }
        catalog
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn remote_order(&self, remote_id: &str) -> Vec<String> {
        self.playlists
            .lock()
            .unwrap()
            .get(&RemotePlaylistId::new(remote_id))
            .map(|ids| ids.iter().map(|id| id.to_string()).collect())
            .unwrap_or_default()
    }

    fn is_offline(&self) -> bool {
        *self.offline.lock().unwrap()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn get_track(&self, track_id: &TrackId) -> TrackLookup {
        if self.is_offline() {
            return TrackLookup::Unavailable;
        }
        match self.tracks.lock().unwrap().get(track_id) {
            Some(duration) => TrackLookup::Found(TrackProjection::new(
                track_id.clone(),
                format!("Song {track_id}"),
                "Queen",
                "A Night at the Opera",
                *duration,
            )),
            None => TrackLookup::NotFound,
        }
    }

    async fn get_playlist_tracks(&self, remote_id: &RemotePlaylistId) -> Result<Vec<TrackId>> {
        if self.is_offline() {
            return Err(CadenceError::remote_unavailable("catalog offline"));
        }
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .get(remote_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_playlist_tracks(
        &self,
        remote_id: &RemotePlaylistId,
        track_ids: &[TrackId],
    ) -> Result<()> {
        if self.is_offline() {
            return Err(CadenceError::remote_unavailable("catalog offline"));
        }
        self.playlists
            .lock()
            .unwrap()
            .insert(remote_id.clone(), track_ids.to_vec());
        Ok(())
    }

    async fn create_playlist(&self, _name: &str) -> Result<RemotePlaylistId> {
        if self.is_offline() {
            return Err(CadenceError::remote_unavailable("catalog offline"));
        }
        let mut playlists = self.playlists.lock().unwrap();
        let remote_id = RemotePlaylistId::new(format!("rp-{}", playlists.len() + 1));
        playlists.insert(remote_id.clone(), Vec::new());
        Ok(remote_id)
    }

    fn is_healthy(&self) -> bool {
        !self.is_offline()
    }
}

/// Mint an HS256 access token for `user`
pub fn token_for(user: &str) -> String {
    token_with(TEST_SECRET, user, Duration::hours(1))
}

pub fn token_with(secret: &str, user: &str, expires_in: Duration) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": user,
        "exp": (now + expires_in).timestamp(),
        "iat": now.timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Router wired to a fake playlist catalog and a real SQLite store
///
/// Browse routes talk to a catalog address nobody listens on, so they serve
/// the built-in fallback data.
pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<FakeCatalog>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(ServiceConfig::default()).await
    }

    pub async fn with_config(service_config: ServiceConfig) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("server.db").display());
        let store = SqliteMetadataStore::connect(&db_url).await.unwrap();

        let catalog = Arc::new(FakeCatalog::with_tracks(&[
            ("t1", 200),
            ("t2", 150),
            ("t3", 100),
        ]));
        let engine = SyncEngine::new(catalog.clone(), Arc::new(store), SyncConfig::default());
        let service = Arc::new(PlaylistService::new(engine, service_config));

        let mut browse_config = CatalogConfig::new("http://127.0.0.1:1", "admin", "admin");
        browse_config.timeout = std::time::Duration::from_millis(500);
        let browse = Arc::new(SubsonicCatalog::new(browse_config).unwrap());

        let verifier = Arc::new(TokenVerifier::new(TEST_SECRET));
        let router = api::router(AppState::new(service, browse, verifier));

        Self {
            router,
            catalog,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request as `user` (or anonymously) and decode the JSON reply
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(user), None).await
    }

    /// Create a playlist through the API and return its id
    pub async fn create_playlist(&self, user: &str, name: &str, is_public: bool) -> String {
        let (status, body) = self
            .post(
                "/api/playlists",
                user,
                json!({ "name": name, "isPublic": is_public }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }
}
