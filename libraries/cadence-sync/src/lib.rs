//! Cadence Sync
//!
//! Cache-consistency engine between local playlist records and the catalog.
//!
//! The catalog is the source of truth for playlist contents but only supports
//! replacing a playlist's whole track list. [`SyncEngine`] turns every add,
//! remove and reorder into fetch, compute, replace, and persist, and keeps the
//! cached projection fresh on reads. [`PlaylistService`] puts ownership and
//! visibility checks plus input validation in front of it.
//!
//! # Example
//!
//! ```ignore
//! use cadence_sync::{PlaylistService, ServiceConfig, SyncConfig, SyncEngine};
//!
//! let engine = SyncEngine::new(catalog, store, SyncConfig::default());
//! let service = PlaylistService::new(engine, ServiceConfig::default());
//!
//! let playlist = service.create_playlist(&user, request).await?;
//! let playlist = service.add_track(&user, &playlist.id, &track_id).await?;
//! ```

mod clock;
mod engine;
mod locks;
pub mod order;
mod service;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{SyncConfig, SyncEngine};
pub use service::{
    PlaylistService, ServiceConfig, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_PAGE_SIZE,
};
pub use types::{PlaylistView, SyncSummary};
