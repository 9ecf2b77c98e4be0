//! Playlist likes.

use crate::error::Result;
use crate::to_millis;
use cadence_core::{PlaylistId, UserId};
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeSet;

/// Add or remove a like, returning the like count afterwards
///
/// Liking twice or unliking a playlist that was never liked changes nothing.
pub async fn set(pool: &SqlitePool, id: &PlaylistId, user: &UserId, liked: bool) -> Result<u32> {
    if liked {
        sqlx::query(
            "INSERT OR IGNORE INTO playlist_likes (playlist_id, user_id, liked_at) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(user)
        .bind(to_millis(Utc::now()))
        .execute(pool)
        .await?;
    } else {
        sqlx::query("DELETE FROM playlist_likes WHERE playlist_id = ? AND user_id = ?")
            .bind(id)
            .bind(user)
            .execute(pool)
            .await?;
    }

    count(pool, id).await
}

/// Number of likes on a playlist
pub async fn count(pool: &SqlitePool, id: &PlaylistId) -> Result<u32> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlist_likes WHERE playlist_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Users who liked a playlist
pub async fn get_likers(pool: &SqlitePool, id: &PlaylistId) -> Result<BTreeSet<UserId>> {
    let users: Vec<UserId> =
        sqlx::query_scalar("SELECT user_id FROM playlist_likes WHERE playlist_id = ?")
            .bind(id)
            .fetch_all(pool)
            .await?;

    Ok(users.into_iter().collect())
}
