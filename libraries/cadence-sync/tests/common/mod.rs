//! Shared fixtures for sync integration tests
//!
//! `FakeCatalog` is a stateful in-memory catalog; the metadata store is the
//! real SQLite store on a temporary file.

#![allow(dead_code)]

use async_trait::async_trait;
use cadence_core::{
    CadenceError, CatalogClient, RemotePlaylistId, Result, TrackId, TrackLookup, TrackProjection,
    UserId,
};
use cadence_storage::SqliteMetadataStore;
use cadence_sync::{ManualClock, PlaylistService, ServiceConfig, SyncConfig, SyncEngine};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct FakeState {
    playlists: HashMap<RemotePlaylistId, Vec<TrackId>>,
    tracks: HashMap<TrackId, u32>,
    unavailable: HashSet<TrackId>,
    next_id: u32,
    fail_create: bool,
    fail_fetch: bool,
    fail_replace: bool,
    reuse_ids: bool,
    rewrite_on_replace: Option<Vec<TrackId>>,
    fetches: usize,
    replaces: usize,
    lookups: HashMap<TrackId, usize>,
}

/// In-memory catalog with switchable failures
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<FakeState>,
    latency: Option<Duration>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every playlist read and write sleeps first, so concurrent calls interleave
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn add_track(&self, id: &str, duration: u32) {
        self.state().tracks.insert(TrackId::new(id), duration);
    }

    pub fn make_unavailable(&self, id: &str) {
        self.state().unavailable.insert(TrackId::new(id));
    }

    pub fn remote_order(&self, remote_id: &RemotePlaylistId) -> Vec<TrackId> {
        self.state()
            .playlists
            .get(remote_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Edit the remote playlist behind the application's back
    pub fn set_remote_order(&self, remote_id: &RemotePlaylistId, order: &[&str]) {
        self.state()
            .playlists
            .insert(remote_id.clone(), ids(order));
    }

    pub fn fail_create(&self, fail: bool) {
        self.state().fail_create = fail;
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.state().fail_fetch = fail;
    }

    pub fn fail_replace(&self, fail: bool) {
        self.state().fail_replace = fail;
    }

    /// Hand out the previous playlist id again on create
    pub fn reuse_ids(&self, reuse: bool) {
        self.state().reuse_ids = reuse;
    }

    /// Store `order` instead of what the next replace asks for
    pub fn rewrite_next_replace(&self, order: &[&str]) {
        self.state().rewrite_on_replace = Some(ids(order));
    }

    pub fn fetches(&self) -> usize {
        self.state().fetches
    }

    pub fn replaces(&self) -> usize {
        self.state().replaces
    }

    pub fn lookups_of(&self, id: &str) -> usize {
        self.state()
            .lookups
            .get(&TrackId::new(id))
            .copied()
            .unwrap_or(0)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn get_track(&self, track_id: &TrackId) -> TrackLookup {
        let mut state = self.state();
        *state.lookups.entry(track_id.clone()).or_default() += 1;

        if state.unavailable.contains(track_id) {
            return TrackLookup::Unavailable;
        }
        match state.tracks.get(track_id) {
            Some(duration) => TrackLookup::Found(TrackProjection::new(
                track_id.clone(),
                format!("Title {track_id}"),
                "Artist",
                "Album",
                *duration,
            )),
            None => TrackLookup::NotFound,
        }
    }

    async fn get_playlist_tracks(&self, remote_id: &RemotePlaylistId) -> Result<Vec<TrackId>> {
        self.pause().await;
        let mut state = self.state();
        state.fetches += 1;
        if state.fail_fetch {
            return Err(CadenceError::remote_unavailable("fetch timed out"));
        }
        Ok(state.playlists.get(remote_id).cloned().unwrap_or_default())
    }

    async fn replace_playlist_tracks(
        &self,
        remote_id: &RemotePlaylistId,
        track_ids: &[TrackId],
    ) -> Result<()> {
        self.pause().await;
        let mut state = self.state();
        state.replaces += 1;
        if state.fail_replace {
            return Err(CadenceError::remote_unavailable("replace timed out"));
        }
        let stored = state
            .rewrite_on_replace
            .take()
            .unwrap_or_else(|| track_ids.to_vec());
        state.playlists.insert(remote_id.clone(), stored);
        Ok(())
    }

    async fn create_playlist(&self, _name: &str) -> Result<RemotePlaylistId> {
        let mut state = self.state();
        if state.fail_create {
            return Err(CadenceError::remote_unavailable("create timed out"));
        }
        if !state.reuse_ids {
            state.next_id += 1;
        }
        let remote_id = RemotePlaylistId::new(format!("rp-{}", state.next_id));
        state.playlists.insert(remote_id.clone(), Vec::new());
        Ok(remote_id)
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

pub fn ids(raw: &[&str]) -> Vec<TrackId> {
    raw.iter().map(|s| TrackId::new(*s)).collect()
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn alice() -> UserId {
    UserId::new("alice")
}

pub fn bob() -> UserId {
    UserId::new("bob")
}

/// Real SQLite store on a temporary file
pub struct TestDb {
    pub store: Arc<SqliteMetadataStore>,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
        let store = SqliteMetadataStore::connect(&db_url)
            .await
            .expect("Failed to open test database");

        Self {
            store: Arc::new(store),
            _temp_dir: temp_dir,
        }
    }
}

/// Service wired to a fake catalog, a real store and a manual clock
pub struct Harness {
    pub service: Arc<PlaylistService>,
    pub catalog: Arc<FakeCatalog>,
    pub clock: Arc<ManualClock>,
    pub db: TestDb,
}

impl Harness {
    pub async fn new() -> Self {
        Self::build(FakeCatalog::new(), SyncConfig::default(), ServiceConfig::default()).await
    }

    pub async fn build(
        catalog: FakeCatalog,
        sync: SyncConfig,
        service: ServiceConfig,
    ) -> Self {
        let db = TestDb::new().await;
        let catalog = Arc::new(catalog);
        let clock = Arc::new(ManualClock::new(start_time()));

        let engine = SyncEngine::with_clock(
            catalog.clone(),
            db.store.clone(),
            sync,
            clock.clone(),
        );

        Self {
            service: Arc::new(PlaylistService::new(engine, service)),
            catalog,
            clock,
            db,
        }
    }
}
