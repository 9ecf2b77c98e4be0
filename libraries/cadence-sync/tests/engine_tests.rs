//! Integration tests for the sync engine through the playlist service
//!
//! Covers the fetch, compute, replace, persist cycle, failure atomicity,
//! aggregate invariants, staleness and remote-inconsistency handling.

mod common;

use cadence_core::{CadenceError, CreatePlaylist, MetadataStore, PlaylistRecord, TrackId};
use cadence_sync::{Clock, ServiceConfig, SyncConfig};
use chrono::Duration;
use common::*;
use std::sync::Arc;

fn road_trip() -> CreatePlaylist {
    CreatePlaylist {
        name: "Road Trip".to_string(),
        ..Default::default()
    }
}

fn assert_invariants(record: &PlaylistRecord) {
    assert_eq!(record.track_count as usize, record.track_ids.len());
}

#[tokio::test]
async fn test_road_trip_scenario() {
    let h = Harness::new().await;
    h.catalog.add_track("t1", 200);
    h.catalog.add_track("t2", 150);
    let t1 = TrackId::new("t1");
    let t2 = TrackId::new("t2");

    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    assert_eq!(playlist.remote_id.as_str(), "rp-1");
    assert_eq!(playlist.track_count, 0);

    let p = h.service.add_track(&alice(), &playlist.id, &t1).await.unwrap();
    assert_eq!(p.track_ids, ids(&["t1"]));
    assert_eq!(p.track_count, 1);
    assert_eq!(p.duration, 200);

    let p = h.service.add_track(&alice(), &playlist.id, &t2).await.unwrap();
    assert_eq!(p.track_ids, ids(&["t1", "t2"]));
    assert_eq!(p.track_count, 2);
    assert_eq!(p.duration, 350);

    let p = h.service.remove_track(&alice(), &playlist.id, &t1).await.unwrap();
    assert_eq!(p.track_ids, ids(&["t2"]));
    assert_eq!(p.track_count, 1);
    assert_eq!(p.duration, 150);

    let p = h.service.reorder_tracks(&alice(), &playlist.id, 0, 0).await.unwrap();
    assert_eq!(p.track_ids, ids(&["t2"]));
    assert_eq!(p.duration, 150);

    h.service.delete_playlist(&alice(), &playlist.id).await.unwrap();
    assert!(h.catalog.remote_order(&playlist.remote_id).is_empty());
    assert!(h.db.store.get_playlist(&playlist.id).await.unwrap().is_none());

    let err = h.service.get_playlist(&alice(), &playlist.id).await.unwrap_err();
    assert!(matches!(err, CadenceError::NotFound { .. }));
}

#[tokio::test]
async fn test_create_counts_playlists_and_delete_uncounts() {
    let h = Harness::new().await;

    let first = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    assert_eq!(h.db.store.playlist_count(&alice()).await.unwrap(), 2);

    h.service.delete_playlist(&alice(), &first.id).await.unwrap();
    assert_eq!(h.db.store.playlist_count(&alice()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_aborts_when_remote_fails() {
    let h = Harness::new().await;
    h.catalog.fail_create(true);

    let err = h.service.create_playlist(&alice(), road_trip()).await.unwrap_err();

    assert!(matches!(err, CadenceError::RemoteUnavailable(_)));
    assert!(h.db.store.list_by_owner(&alice()).await.unwrap().is_empty());
    assert_eq!(h.db.store.playlist_count(&alice()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_reused_remote_id() {
    let h = Harness::new().await;
    let first = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.reuse_ids(true);

    let err = h.service.create_playlist(&alice(), road_trip()).await.unwrap_err();

    assert!(matches!(err, CadenceError::RemoteRejected(_)));
    let owned = h.db.store.list_by_owner(&alice()).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, first.id);
    assert_eq!(h.db.store.playlist_count(&alice()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_replace_leaves_record_untouched() {
    let h = Harness::new().await;
    h.catalog.add_track("t1", 200);
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    let before = h
        .service
        .add_track(&alice(), &playlist.id, &TrackId::new("t1"))
        .await
        .unwrap();

    h.catalog.fail_replace(true);
    h.clock.advance(Duration::seconds(1));

    for result in [
        h.service.add_track(&alice(), &playlist.id, &TrackId::new("t2")).await,
        h.service.remove_track(&alice(), &playlist.id, &TrackId::new("t1")).await,
    ] {
        assert!(matches!(result, Err(CadenceError::RemoteUnavailable(_))));
    }
    let delete = h.service.delete_playlist(&alice(), &playlist.id).await;
    assert!(matches!(delete, Err(CadenceError::RemoteUnavailable(_))));

    let after = h.db.store.get_playlist(&playlist.id).await.unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(h.db.store.playlist_count(&alice()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_fetch_aborts_before_replace() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.fail_fetch(true);

    let err = h
        .service
        .add_track(&alice(), &playlist.id, &TrackId::new("t1"))
        .await
        .unwrap_err();

    assert!(matches!(err, CadenceError::RemoteUnavailable(_)));
    assert_eq!(h.catalog.replaces(), 0);
    let after = h.db.store.get_playlist(&playlist.id).await.unwrap().unwrap();
    assert_eq!(after, playlist);
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let h = Harness::new().await;
    h.catalog.add_track("a", 10);
    h.catalog.add_track("b", 20);
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.set_remote_order(&playlist.remote_id, &["a", "b"]);

    let once = h
        .service
        .remove_track(&alice(), &playlist.id, &TrackId::new("a"))
        .await
        .unwrap();
    let twice = h
        .service
        .remove_track(&alice(), &playlist.id, &TrackId::new("a"))
        .await
        .unwrap();

    assert_eq!(once.track_ids, ids(&["b"]));
    assert_eq!(twice.track_ids, once.track_ids);
    assert_eq!(twice.duration, 20);
    // The second remove had nothing to replace
    assert_eq!(h.catalog.replaces(), 1);
}

#[tokio::test]
async fn test_remove_takes_first_occurrence() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.set_remote_order(&playlist.remote_id, &["a", "b", "a"]);

    let p = h
        .service
        .remove_track(&alice(), &playlist.id, &TrackId::new("a"))
        .await
        .unwrap();

    assert_eq!(p.track_ids, ids(&["b", "a"]));
}

#[tokio::test]
async fn test_reorder_moves_rather_than_swaps() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.set_remote_order(&playlist.remote_id, &["A", "B", "C", "D"]);

    let p = h.service.reorder_tracks(&alice(), &playlist.id, 0, 2).await.unwrap();

    assert_eq!(p.track_ids, ids(&["B", "C", "A", "D"]));
    assert_eq!(h.catalog.remote_order(&playlist.remote_id), ids(&["B", "C", "A", "D"]));
}

#[tokio::test]
async fn test_reorder_out_of_range_is_bad_request() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.set_remote_order(&playlist.remote_id, &["A", "B"]);

    let err = h
        .service
        .reorder_tracks(&alice(), &playlist.id, 0, 2)
        .await
        .unwrap_err();

    assert!(matches!(err, CadenceError::BadRequest(_)));
    assert_eq!(h.catalog.replaces(), 0);
    assert_eq!(h.db.store.get_playlist(&playlist.id).await.unwrap().unwrap(), playlist);
}

#[tokio::test]
async fn test_mutations_start_from_remote_order_not_cache() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();

    // Someone edits the playlist directly in the catalog; the cache still says []
    h.catalog.set_remote_order(&playlist.remote_id, &["x", "y", "z"]);

    let p = h
        .service
        .add_track(&alice(), &playlist.id, &TrackId::new("new"))
        .await
        .unwrap();
    assert_eq!(p.track_ids, ids(&["x", "y", "z", "new"]));

    // Indices refer to the fresh remote order
    h.catalog.set_remote_order(&playlist.remote_id, &["z", "x", "y", "new"]);
    let p = h.service.reorder_tracks(&alice(), &playlist.id, 3, 0).await.unwrap();
    assert_eq!(p.track_ids, ids(&["new", "z", "x", "y"]));
}

#[tokio::test]
async fn test_duration_sums_resolvable_tracks_only() {
    let h = Harness::new().await;
    h.catalog.add_track("t1", 200);
    h.catalog.add_track("t2", 150);
    h.catalog.add_track("flaky", 999);
    h.catalog.make_unavailable("flaky");
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog
        .set_remote_order(&playlist.remote_id, &["t1", "flaky", "gone", "t2"]);

    let p = h
        .service
        .add_track(&alice(), &playlist.id, &TrackId::new("t1"))
        .await
        .unwrap();

    assert_invariants(&p);
    assert_eq!(p.track_count, 5);
    // t1 twice, t2 once; flaky and gone contribute zero
    assert_eq!(p.duration, 200 + 150 + 200);
    // One lookup per distinct track
    assert_eq!(h.catalog.lookups_of("t1"), 1);
    assert_eq!(h.catalog.lookups_of("flaky"), 1);
}

#[tokio::test]
async fn test_inconsistent_remote_is_accepted_as_truth() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.rewrite_next_replace(&["other"]);

    let p = h
        .service
        .add_track(&alice(), &playlist.id, &TrackId::new("t1"))
        .await
        .unwrap();

    assert_eq!(p.track_ids, ids(&["other"]));
    assert_invariants(&p);
}

#[tokio::test]
async fn test_without_verification_written_order_is_cached() {
    let sync = SyncConfig {
        verify_writes: false,
        ..SyncConfig::default()
    };
    let h = Harness::build(FakeCatalog::new(), sync, ServiceConfig::default()).await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.rewrite_next_replace(&["other"]);

    let p = h
        .service
        .add_track(&alice(), &playlist.id, &TrackId::new("t1"))
        .await
        .unwrap();

    assert_eq!(p.track_ids, ids(&["t1"]));
    // One fetch for the mutation, none for verification
    assert_eq!(h.catalog.fetches(), 1);
}

#[tokio::test]
async fn test_synced_at_strictly_increases_on_frozen_clock() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();

    let mut last = playlist.synced_at;
    for track in ["a", "b", "c"] {
        let p = h
            .service
            .add_track(&alice(), &playlist.id, &TrackId::new(track))
            .await
            .unwrap();
        assert!(p.synced_at > last);
        last = p.synced_at;
    }
    assert_eq!(
        h.db.store.get_playlist(&playlist.id).await.unwrap().unwrap().track_ids,
        ids(&["a", "b", "c"])
    );
}

#[tokio::test]
async fn test_mutations_from_one_snapshot_keep_every_projection() {
    let h = Harness::new().await;
    h.catalog.add_track("a", 10);
    h.catalog.add_track("b", 20);
    let snapshot = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    let engine = h.service.engine();

    let first = engine.add_track(&snapshot, &TrackId::new("a")).await.unwrap();
    let second = engine.add_track(&snapshot, &TrackId::new("b")).await.unwrap();

    assert_eq!(first.track_ids, ids(&["a"]));
    assert_eq!(second.track_ids, ids(&["a", "b"]));
    assert_eq!(second.duration, 30);
    assert!(second.synced_at > first.synced_at);

    let cached = h.db.store.get_playlist(&snapshot.id).await.unwrap().unwrap();
    assert_eq!(cached.track_ids, h.catalog.remote_order(&snapshot.remote_id));
}

#[tokio::test]
async fn test_stale_read_resyncs_from_remote() {
    let h = Harness::new().await;
    h.catalog.add_track("t9", 60);
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.set_remote_order(&playlist.remote_id, &["t9"]);

    h.clock.advance(Duration::minutes(4));
    let fresh = h.service.get_playlist(&alice(), &playlist.id).await.unwrap();
    assert!(fresh.track_ids.is_empty());
    assert_eq!(h.catalog.fetches(), 0);

    h.clock.advance(Duration::minutes(1));
    let resynced = h.service.get_playlist(&alice(), &playlist.id).await.unwrap();
    assert_eq!(resynced.track_ids, ids(&["t9"]));
    assert_eq!(resynced.duration, 60);
    assert_eq!(resynced.synced_at, h.clock.now());
    assert_eq!(h.catalog.fetches(), 1);
}

#[tokio::test]
async fn test_read_survives_failed_resync() {
    let h = Harness::new().await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.catalog.fail_fetch(true);
    h.clock.advance(Duration::minutes(10));

    let served = h.service.get_playlist(&alice(), &playlist.id).await.unwrap();

    assert_eq!(served, playlist);
}

#[tokio::test]
async fn test_sync_owner_playlists_summary() {
    let h = Harness::new().await;
    let a = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    let b = h.service.create_playlist(&alice(), road_trip()).await.unwrap();
    h.service.create_playlist(&bob(), road_trip()).await.unwrap();
    h.catalog.set_remote_order(&a.remote_id, &["x"]);
    h.catalog.set_remote_order(&b.remote_id, &["y", "z"]);

    let engine = h.service.engine();

    let skipped = engine.sync_owner_playlists(&alice(), false).await.unwrap();
    assert_eq!(skipped.total, 2);
    assert_eq!(skipped.skipped, 2);
    assert_eq!(skipped.synced, 0);

    let summary = h.service.sync_playlists(&alice()).await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.synced, 2);
    assert_eq!(summary.failed, 0);

    let refreshed = h.db.store.get_playlist(&b.id).await.unwrap().unwrap();
    assert_eq!(refreshed.track_ids, ids(&["y", "z"]));

    h.catalog.fail_fetch(true);
    let failed = h.service.sync_playlists(&alice()).await.unwrap();
    assert_eq!(failed.failed, 2);
}

#[tokio::test]
async fn test_serialized_mutations_do_not_lose_updates() {
    let sync = SyncConfig {
        serialize_mutations: true,
        ..SyncConfig::default()
    };
    let catalog = FakeCatalog::with_latency(std::time::Duration::from_millis(10));
    let h = Harness::build(catalog, sync, ServiceConfig::default()).await;
    let playlist = h.service.create_playlist(&alice(), road_trip()).await.unwrap();

    let mut handles = Vec::new();
    for track in ["a", "b", "c", "d"] {
        let service = Arc::clone(&h.service);
        let id = playlist.id.clone();
        handles.push(tokio::spawn(async move {
            let track = TrackId::new(track);
            let record = service.add_track(&alice(), &id, &track).await.unwrap();
            (track, record)
        }));
    }
    for handle in handles {
        let (track, record) = handle.await.unwrap();
        assert!(record.track_ids.contains(&track), "{track} missing from its own result");
    }

    let remote = h.catalog.remote_order(&playlist.remote_id);
    let mut sorted = remote.clone();
    sorted.sort();
    assert_eq!(sorted, ids(&["a", "b", "c", "d"]));

    let cached = h.db.store.get_playlist(&playlist.id).await.unwrap().unwrap();
    assert_eq!(cached.track_ids, remote);
    assert_eq!(cached.track_count, 4);
}
