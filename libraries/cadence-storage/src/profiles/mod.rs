//! Per-user profile counters.

use crate::error::Result;
use crate::to_millis;
use cadence_core::UserId;
use chrono::Utc;
use sqlx::SqlitePool;

/// Atomically add `delta` to a user's playlist count, never going below zero
///
/// Creates the profile row on first use. Returns the new count.
pub async fn adjust_playlist_count(pool: &SqlitePool, user: &UserId, delta: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO user_profiles (user_id, playlist_count, updated_at)
        VALUES (?, MAX(?, 0), ?)
        ON CONFLICT(user_id) DO UPDATE
        SET playlist_count = MAX(user_profiles.playlist_count + ?, 0),
            updated_at = excluded.updated_at
        RETURNING playlist_count
        "#,
    )
    .bind(user)
    .bind(delta)
    .bind(to_millis(Utc::now()))
    .bind(delta)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Current playlist count of a user, zero when no profile exists
pub async fn get_playlist_count(pool: &SqlitePool, user: &UserId) -> Result<i64> {
    let count: Option<i64> =
        sqlx::query_scalar("SELECT playlist_count FROM user_profiles WHERE user_id = ?")
            .bind(user)
            .fetch_optional(pool)
            .await?;

    Ok(count.unwrap_or(0))
}
