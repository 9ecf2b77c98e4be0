//! Cadence Storage
//!
//! `SQLite` metadata store for Cadence playlists.
//!
//! Holds the local side of every playlist: identity, ownership, visibility,
//! tags, likes, and the cached projection of the catalog's track list. The
//! store has no business logic; the sync engine decides what to write.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries (`playlists`,
//!   `likes`, `profiles`)
//! - **Conditional projection writes**: the projection quadruple is written in
//!   one `UPDATE` guarded by `synced_at`
//! - **Embedded migrations**: the schema ships inside the binary
//!
//! # Example
//!
//! ```rust,no_run
//! use cadence_storage::{create_pool, run_migrations, SqliteMetadataStore};
//! use cadence_core::{MetadataStore, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cadence.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteMetadataStore::new(pool);
//! let mine = store.list_by_owner(&UserId::new("alice")).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod store;

// Vertical slices
pub mod likes;
pub mod playlists;
pub mod profiles;

pub use error::{Result, StorageError};
pub use store::SqliteMetadataStore;

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before serving any request.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://cadence.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!(url = %database_url, "SQLite pool ready");
    Ok(pool)
}

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(column: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::invalid_data(column, format!("timestamp {millis}")))
}
