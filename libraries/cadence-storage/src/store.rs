use crate::{create_pool, likes, playlists, profiles, run_migrations};
use async_trait::async_trait;
use cadence_core::{
    MetadataStore, NewPlaylist, PlaylistId, PlaylistPage, PlaylistRecord, Projection,
    RemotePlaylistId, Result, UpdatePlaylist, UserId,
};
use sqlx::SqlitePool;

/// Metadata store backed by `SQLite`
#[derive(Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open the database at `database_url` and apply migrations
    pub async fn connect(database_url: &str) -> crate::Result<Self> {
        let pool = create_pool(database_url).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    // Playlists
    async fn insert_playlist(&self, playlist: NewPlaylist) -> Result<PlaylistRecord> {
        Ok(playlists::create(&self.pool, playlist).await?)
    }

    async fn get_playlist(&self, id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
        Ok(playlists::get_by_id(&self.pool, id).await?)
    }

    async fn get_by_remote_id(
        &self,
        remote_id: &RemotePlaylistId,
    ) -> Result<Option<PlaylistRecord>> {
        Ok(playlists::get_by_remote_id(&self.pool, remote_id).await?)
    }

    async fn update_metadata(
        &self,
        id: &PlaylistId,
        update: UpdatePlaylist,
    ) -> Result<Option<PlaylistRecord>> {
        Ok(playlists::update(&self.pool, id, update).await?)
    }

    async fn write_projection(
        &self,
        id: &PlaylistId,
        projection: &Projection,
    ) -> Result<PlaylistRecord> {
        Ok(playlists::write_projection(&self.pool, id, projection).await?)
    }

    async fn record_play(&self, id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
        Ok(playlists::record_play(&self.pool, id).await?)
    }

    async fn delete_playlist(&self, id: &PlaylistId) -> Result<bool> {
        Ok(playlists::delete(&self.pool, id).await?)
    }

    // Queries
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<PlaylistRecord>> {
        Ok(playlists::get_by_owner(&self.pool, owner).await?)
    }

    async fn list_public(&self, limit: u32, page: u32) -> Result<PlaylistPage> {
        Ok(playlists::get_public_page(&self.pool, limit, page).await?)
    }

    async fn search_public(&self, query: &str, limit: u32) -> Result<Vec<PlaylistRecord>> {
        Ok(playlists::search_public(&self.pool, query, limit).await?)
    }

    // Likes and counters
    async fn set_like(&self, id: &PlaylistId, user: &UserId, liked: bool) -> Result<u32> {
        Ok(likes::set(&self.pool, id, user, liked).await?)
    }

    async fn adjust_playlist_count(&self, user: &UserId, delta: i64) -> Result<i64> {
        Ok(profiles::adjust_playlist_count(&self.pool, user, delta).await?)
    }

    async fn playlist_count(&self, user: &UserId) -> Result<i64> {
        Ok(profiles::get_playlist_count(&self.pool, user).await?)
    }
}
