//! Sync engine
//!
//! Keeps each playlist's cached projection (`track_ids`, `track_count`,
//! `duration`, `synced_at`) consistent with the catalog. Every track mutation
//! follows the same sequence:
//!
//! 1. fetch the remote order (never the cached one)
//! 2. compute the new order
//! 3. replace the remote list wholesale
//! 4. recompute aggregates from per-track lookups
//! 5. persist the projection in one conditional write
//!
//! A failure in steps 1 or 3 aborts before anything local is written.

use crate::clock::{Clock, SystemClock};
use crate::locks::KeyedLocks;
use crate::order;
use crate::types::SyncSummary;
use cadence_core::{
    CadenceError, CatalogClient, CreatePlaylist, MetadataStore, NewPlaylist, PlaylistRecord, Projection,
    Result, TrackId, TrackLookup, TrackProjection, UserId,
};
use chrono::{DateTime, SubsecRound, Utc};
use futures_util::{stream, StreamExt};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

/// Conditional projection writes tried before giving up to a newer copy
const PERSIST_ATTEMPTS: usize = 3;

/// Sync engine configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum age of a cached projection before a read resyncs it
    pub staleness: Duration,

    /// Re-read the remote order after every replace
    pub verify_writes: bool,

    /// Serialize mutations per remote playlist
    ///
    /// Off by default: two concurrent edits of one playlist can then race,
    /// and the last replace wins. Turn on for multi-client deployments.
    pub serialize_mutations: bool,

    /// Maximum concurrent track lookups per operation
    pub lookup_concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            staleness: Duration::from_secs(5 * 60),
            verify_writes: true,
            serialize_mutations: false,
            lookup_concurrency: 8,
        }
    }
}

/// Keeps local playlist projections in step with the catalog
pub struct SyncEngine {
    catalog: Arc<dyn CatalogClient>,
    store: Arc<dyn MetadataStore>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    locks: KeyedLocks,
}

impl SyncEngine {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn MetadataStore>,
        config: SyncConfig,
    ) -> Self {
        Self::with_clock(catalog, store, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        catalog: Arc<dyn CatalogClient>,
        store: Arc<dyn MetadataStore>,
        config: SyncConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            store,
            clock,
            config,
            locks: KeyedLocks::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogClient> {
        &self.catalog
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Create the remote playlist, then the local record
    ///
    /// A remote failure aborts with nothing written locally.
    pub async fn create_playlist(
        &self,
        owner: &UserId,
        request: CreatePlaylist,
    ) -> Result<PlaylistRecord> {
        let remote_id = self.catalog.create_playlist(&request.name).await?;

        if let Some(existing) = self.store.get_by_remote_id(&remote_id).await? {
            warn!(
                remote_id = %remote_id,
                playlist_id = %existing.id,
                "Catalog returned a playlist id that is already cached"
            );
            return Err(CadenceError::RemoteRejected(format!(
                "catalog reused playlist id {remote_id}"
            )));
        }

        let new = NewPlaylist::from_request(remote_id, owner.clone(), request)
            .with_created_at(self.clock.now());
        let record = self.store.insert_playlist(new).await?;

        self.store.adjust_playlist_count(owner, 1).await?;

        info!(
            playlist_id = %record.id,
            remote_id = %record.remote_id,
            owner = %owner,
            "Playlist created"
        );
        Ok(record)
    }

    /// Whether `record` is older than the staleness threshold
    pub fn is_stale(&self, record: &PlaylistRecord) -> bool {
        let threshold = chrono::Duration::from_std(self.config.staleness)
            .unwrap_or_else(|_| chrono::Duration::days(365));
        record.is_stale(self.clock.now(), threshold)
    }

    /// Refresh `record` from the catalog if it is stale
    ///
    /// Never fails: when the refresh does, the cached record is returned.
    pub async fn resync(&self, record: PlaylistRecord) -> PlaylistRecord {
        if !self.is_stale(&record) {
            return record;
        }

        match self.refresh(&record).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(
                    playlist_id = %record.id,
                    error = %e,
                    "Resync failed, serving cached projection"
                );
                record
            }
        }
    }

    /// Refresh `record` from the catalog regardless of its age
    pub async fn refresh(&self, record: &PlaylistRecord) -> Result<PlaylistRecord> {
        let _guard = self.lock(record).await;

        let order = self.catalog.get_playlist_tracks(&record.remote_id).await?;
        let fresh = self.persist(record, order).await?;

        info!(
            playlist_id = %record.id,
            tracks = fresh.track_count,
            duration = fresh.duration,
            "Playlist resynced"
        );
        Ok(fresh)
    }

    /// Append a track to the remote order
    pub async fn add_track(
        &self,
        record: &PlaylistRecord,
        track_id: &TrackId,
    ) -> Result<PlaylistRecord> {
        self.mutate(record, "add_track", |current| {
            Ok(Some(order::append(current, track_id)))
        })
        .await
    }

    /// Remove the first occurrence of a track; absent tracks are a no-op
    pub async fn remove_track(
        &self,
        record: &PlaylistRecord,
        track_id: &TrackId,
    ) -> Result<PlaylistRecord> {
        self.mutate(record, "remove_track", |current| {
            Ok(order::remove_first(current, track_id))
        })
        .await
    }

    /// Move one track within the remote order
    ///
    /// Indices refer to the order fetched inside this call.
    pub async fn reorder_tracks(
        &self,
        record: &PlaylistRecord,
        from: usize,
        to: usize,
    ) -> Result<PlaylistRecord> {
        self.mutate(record, "reorder_tracks", |current| {
            order::move_track(current, from, to)
        })
        .await
    }

    /// Clear the remote playlist, then remove the local record
    ///
    /// The catalog cannot delete playlists. If clearing fails the local record
    /// stays.
    pub async fn delete(&self, record: &PlaylistRecord) -> Result<()> {
        let _guard = self.lock(record).await;

        self.catalog
            .replace_playlist_tracks(&record.remote_id, &[])
            .await?;

        if self.store.delete_playlist(&record.id).await? {
            self.store
                .adjust_playlist_count(&record.owner_id, -1)
                .await?;
        }

        info!(playlist_id = %record.id, remote_id = %record.remote_id, "Playlist deleted");
        Ok(())
    }

    /// Refresh every playlist of `owner`
    ///
    /// Without `force`, fresh playlists are skipped. Individual failures are
    /// counted, not returned.
    pub async fn sync_owner_playlists(&self, owner: &UserId, force: bool) -> Result<SyncSummary> {
        let playlists = self.store.list_by_owner(owner).await?;
        let mut summary = SyncSummary {
            total: playlists.len(),
            ..SyncSummary::default()
        };

        for record in &playlists {
            if !force && !self.is_stale(record) {
                summary.skipped += 1;
                continue;
            }

            match self.refresh(record).await {
                Ok(_) => summary.synced += 1,
                Err(e) => {
                    warn!(playlist_id = %record.id, error = %e, "Playlist sync failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            owner = %owner,
            total = summary.total,
            synced = summary.synced,
            skipped = summary.skipped,
            failed = summary.failed,
            "Owner playlists synced"
        );
        Ok(summary)
    }

    /// Live details for `track_ids`, in order, without unresolvable tracks
    pub async fn track_details(&self, track_ids: &[TrackId]) -> Vec<TrackProjection> {
        let lookups = self.lookup_tracks(track_ids).await;
        track_ids
            .iter()
            .filter_map(|id| match lookups.get(id) {
                Some(TrackLookup::Found(track)) => Some(track.clone()),
                _ => None,
            })
            .collect()
    }

    async fn mutate<F>(
        &self,
        record: &PlaylistRecord,
        operation: &'static str,
        compute: F,
    ) -> Result<PlaylistRecord>
    where
        F: FnOnce(&[TrackId]) -> Result<Option<Vec<TrackId>>> + Send,
    {
        let _guard = self.lock(record).await;

        let current = self.catalog.get_playlist_tracks(&record.remote_id).await?;

        let order = match compute(&current)? {
            Some(next) => {
                self.catalog
                    .replace_playlist_tracks(&record.remote_id, &next)
                    .await?;
                self.verify(record, next).await
            }
            None => {
                debug!(playlist_id = %record.id, operation, "Remote order unchanged");
                current
            }
        };

        let updated = self.persist(record, order).await?;

        info!(
            playlist_id = %record.id,
            operation,
            tracks = updated.track_count,
            duration = updated.duration,
            "Playlist updated"
        );
        Ok(updated)
    }

    async fn verify(&self, record: &PlaylistRecord, written: Vec<TrackId>) -> Vec<TrackId> {
        if !self.config.verify_writes {
            return written;
        }

        match self.catalog.get_playlist_tracks(&record.remote_id).await {
            Ok(actual) if actual == written => written,
            Ok(actual) => {
                warn!(
                    playlist_id = %record.id,
                    remote_id = %record.remote_id,
                    expected = written.len(),
                    actual = actual.len(),
                    "Remote inconsistent after replace, caching remote order"
                );
                actual
            }
            Err(e) => {
                warn!(
                    playlist_id = %record.id,
                    error = %e,
                    "Verification read failed, caching written order"
                );
                written
            }
        }
    }

    async fn persist(&self, record: &PlaylistRecord, order: Vec<TrackId>) -> Result<PlaylistRecord> {
        let lookups = self.lookup_tracks(&order).await;
        let duration: u64 = order
            .iter()
            .map(|id| lookups.get(id).map_or(0, TrackLookup::duration))
            .sum();

        // `record` may predate projections written while this call waited
        let mut previous = match self.store.get_playlist(&record.id).await? {
            Some(stored) => stored.synced_at.max(record.synced_at),
            None => record.synced_at,
        };

        let mut attempt = 1;
        loop {
            let projection = Projection::new(order.clone(), duration, self.next_synced_at(previous));
            let current = self.store.write_projection(&record.id, &projection).await?;

            if current.synced_at == projection.synced_at && current.track_ids == projection.track_ids
            {
                return Ok(current);
            }
            if attempt >= PERSIST_ATTEMPTS {
                warn!(
                    playlist_id = %record.id,
                    attempts = attempt,
                    "Projection kept losing to concurrent writers, serving stored copy"
                );
                return Ok(current);
            }

            debug!(
                playlist_id = %record.id,
                attempt,
                "Projection write lost to a newer copy, retrying"
            );
            previous = current.synced_at;
            attempt += 1;
        }
    }

    /// `now`, or 1 ms past `previous` when the clock has not moved past it
    ///
    /// Truncated to milliseconds, the precision the store keeps.
    fn next_synced_at(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        self.clock
            .now()
            .trunc_subsecs(3)
            .max(previous + chrono::Duration::milliseconds(1))
    }

    async fn lookup_tracks(&self, track_ids: &[TrackId]) -> HashMap<TrackId, TrackLookup> {
        let distinct: BTreeSet<TrackId> = track_ids.iter().cloned().collect();

        stream::iter(distinct)
            .map(|id: TrackId| async move {
                let lookup = self.catalog.get_track(&id).await;
                match &lookup {
                    TrackLookup::Found(_) => {}
                    TrackLookup::NotFound => debug!(track_id = %id, "Track not in catalog"),
                    TrackLookup::Unavailable => {
                        warn!(track_id = %id, "Track lookup unavailable, counting zero duration");
                    }
                }
                (id, lookup)
            })
            .buffer_unordered(self.config.lookup_concurrency.max(1))
            .collect()
            .await
    }

    async fn lock(&self, record: &PlaylistRecord) -> Option<OwnedMutexGuard<()>> {
        if self.config.serialize_mutations {
            Some(self.locks.lock(record.remote_id.as_str()).await)
        } else {
            None
        }
    }
}
