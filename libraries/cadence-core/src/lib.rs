//! Cadence Core
//!
//! Domain types, collaborator traits and error handling shared by every
//! Cadence crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `PlaylistRecord`, `TrackProjection`, `Projection`, etc.
//! - **Collaborator Traits**: `CatalogClient` (the remote source of truth for
//!   track order) and `MetadataStore` (local persistence of playlist records)
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::types::{NewPlaylist, RemotePlaylistId, UserId};
//!
//! let owner = UserId::new("user-1");
//! let playlist = NewPlaylist::new(RemotePlaylistId::new("rp-1"), owner, "Road Trip");
//! assert_eq!(playlist.name, "Road Trip");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use catalog::{CatalogClient, TrackLookup};
pub use error::{CadenceError, Result};
pub use storage::MetadataStore;

pub use types::{
    CreatePlaylist, LikeStatus, NewPlaylist, PlaylistId, PlaylistPage, PlaylistRecord, Projection,
    RemotePlaylistId, TrackId, TrackProjection, UpdatePlaylist, UserId,
};
