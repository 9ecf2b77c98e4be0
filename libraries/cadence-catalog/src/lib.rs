//! Cadence Catalog Client
//!
//! HTTP client for the external music catalog, speaking the Subsonic REST
//! dialect (`/rest/<method>.view`, JSON envelope).
//!
//! # Features
//!
//! - **Track lookup**: never fails; unreachable catalogs yield `TrackLookup::Unavailable`
//! - **Playlist track lists**: read the ordered ids of a remote playlist
//! - **Full replace**: overwrite a remote playlist's track list in one call
//! - **Browse**: search and random tracks with built-in fallback data
//! - **Health**: advisory flag tracking whether the last call succeeded
//!
//! # Example
//!
//! ```ignore
//! use cadence_catalog::{CatalogConfig, SubsonicCatalog};
//! use cadence_core::{CatalogClient, TrackId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CatalogConfig::new("http://localhost:4533", "admin", "secret");
//!     let catalog = SubsonicCatalog::new(config)?;
//!
//!     let remote_id = catalog.create_playlist("Road Trip").await?;
//!     catalog
//!         .replace_playlist_tracks(&remote_id, &[TrackId::new("t1")])
//!         .await?;
//!     Ok(())
//! }
//! ```

mod browse;
mod client;
mod error;
mod fallback;
mod types;

pub use client::SubsonicCatalog;
pub use error::{CatalogError, Result};
pub use types::{
    AlbumSummary, ArtistSummary, CatalogConfig, SearchResults, DEFAULT_API_VERSION,
    DEFAULT_CLIENT_NAME,
};
