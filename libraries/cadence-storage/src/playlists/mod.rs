//! Playlist rows, their tags, and the cached projection.

use crate::error::{Result, StorageError};
use crate::{from_millis, likes, to_millis};
use cadence_core::{
    NewPlaylist, PlaylistId, PlaylistPage, PlaylistRecord, Projection, RemotePlaylistId,
    TrackId, UpdatePlaylist, UserId,
};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::BTreeSet;

const SELECT_PLAYLIST: &str = r#"
    SELECT p.id, p.remote_id, p.name, p.description, p.owner_id, p.is_public,
           p.cover_art, p.track_ids, p.track_count, p.duration, p.plays,
           p.synced_at, p.created_at, p.updated_at
    FROM playlists p
"#;

/// Insert a playlist with an empty projection
///
/// `synced_at` starts at the creation time: a new remote playlist is empty.
pub async fn create(pool: &SqlitePool, playlist: NewPlaylist) -> Result<PlaylistRecord> {
    let id = PlaylistId::generate();
    let at = to_millis(playlist.created_at);

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO playlists (
            id, remote_id, name, description, owner_id, is_public, cover_art,
            track_ids, track_count, duration, plays, synced_at, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, '[]', 0, 0, 0, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&playlist.remote_id)
    .bind(&playlist.name)
    .bind(&playlist.description)
    .bind(&playlist.owner_id)
    .bind(playlist.is_public)
    .bind(&playlist.cover_art)
    .bind(at)
    .bind(at)
    .bind(at)
    .execute(&mut *tx)
    .await?;

    replace_tags(&mut tx, &id, &playlist.tags).await?;

    tx.commit().await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id.as_str()))
}

/// Get playlist by ID
pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
    let row = sqlx::query(&format!("{SELECT_PLAYLIST} WHERE p.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(hydrate(pool, from_row(&row)?).await?)),
        None => Ok(None),
    }
}

/// Get playlist by its catalog ID
pub async fn get_by_remote_id(
    pool: &SqlitePool,
    remote_id: &RemotePlaylistId,
) -> Result<Option<PlaylistRecord>> {
    let row = sqlx::query(&format!("{SELECT_PLAYLIST} WHERE p.remote_id = ?"))
        .bind(remote_id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(hydrate(pool, from_row(&row)?).await?)),
        None => Ok(None),
    }
}

/// Apply a metadata update
///
/// Returns `None` when the playlist does not exist.
pub async fn update(
    pool: &SqlitePool,
    id: &PlaylistId,
    update: UpdatePlaylist,
) -> Result<Option<PlaylistRecord>> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE playlists
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            is_public = COALESCE(?, is_public),
            cover_art = COALESCE(?, cover_art),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(update.name)
    .bind(update.description)
    .bind(update.is_public)
    .bind(update.cover_art)
    .bind(to_millis(Utc::now()))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    if let Some(tags) = &update.tags {
        replace_tags(&mut tx, id, tags).await?;
    }

    tx.commit().await?;

    get_by_id(pool, id).await
}

/// Write the projection quadruple in one conditional update
///
/// Applies only when the stored `synced_at` is older than the projection's.
/// Either way the current row is returned.
pub async fn write_projection(
    pool: &SqlitePool,
    id: &PlaylistId,
    projection: &Projection,
) -> Result<PlaylistRecord> {
    let track_ids = serde_json::to_string(&projection.track_ids)?;
    let synced_at = to_millis(projection.synced_at);

    let result = sqlx::query(
        r#"
        UPDATE playlists
        SET track_ids = ?, track_count = ?, duration = ?, synced_at = ?
        WHERE id = ? AND synced_at < ?
        "#,
    )
    .bind(track_ids)
    .bind(i64::from(projection.track_count()))
    .bind(i64::try_from(projection.duration).unwrap_or(i64::MAX))
    .bind(synced_at)
    .bind(id)
    .bind(synced_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(playlist_id = %id, "Projection write skipped, stored copy is newer");
    }

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id.as_str()))
}

/// Bump the play counter, returning the updated row
///
/// Leaves `updated_at` alone: a play is not an edit.
pub async fn record_play(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<PlaylistRecord>> {
    let result = sqlx::query("UPDATE playlists SET plays = plays + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, id).await
}

/// Delete playlist, returning whether it existed
///
/// Tags and likes go with it.
pub async fn delete(pool: &SqlitePool, id: &PlaylistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Playlists owned by a user, newest first
pub async fn get_by_owner(pool: &SqlitePool, owner: &UserId) -> Result<Vec<PlaylistRecord>> {
    let rows = sqlx::query(&format!(
        "{SELECT_PLAYLIST} WHERE p.owner_id = ? ORDER BY p.created_at DESC, p.id DESC"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?;

    hydrate_all(pool, &rows).await
}

/// One page of public playlists, most liked first, then newest
///
/// `limit` and `page` are clamped to at least 1.
pub async fn get_public_page(pool: &SqlitePool, limit: u32, page: u32) -> Result<PlaylistPage> {
    let limit = limit.max(1);
    let page = page.max(1);
    let offset = i64::from(page - 1) * i64::from(limit);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlists WHERE is_public = 1")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(&format!(
        r#"
        {SELECT_PLAYLIST}
        LEFT JOIN (
            SELECT playlist_id, COUNT(*) AS like_count
            FROM playlist_likes
            GROUP BY playlist_id
        ) l ON l.playlist_id = p.id
        WHERE p.is_public = 1
        ORDER BY COALESCE(l.like_count, 0) DESC, p.created_at DESC, p.id DESC
        LIMIT ? OFFSET ?
        "#
    ))
    .bind(i64::from(limit))
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = u64::try_from(total).unwrap_or(0);
    Ok(PlaylistPage {
        playlists: hydrate_all(pool, &rows).await?,
        total,
        pages: total.div_ceil(u64::from(limit)),
        page,
    })
}

/// Public playlists whose name or description contains `query`, or that
/// carry a tag containing it. Case-insensitive for ASCII.
pub async fn search_public(
    pool: &SqlitePool,
    query: &str,
    limit: u32,
) -> Result<Vec<PlaylistRecord>> {
    let pattern = format!("%{}%", escape_like(&query.trim().to_lowercase()));

    let rows = sqlx::query(&format!(
        r#"
        {SELECT_PLAYLIST}
        WHERE p.is_public = 1
          AND (
              LOWER(p.name) LIKE ? ESCAPE '\'
              OR LOWER(COALESCE(p.description, '')) LIKE ? ESCAPE '\'
              OR EXISTS (
                  SELECT 1 FROM playlist_tags t
                  WHERE t.playlist_id = p.id AND LOWER(t.tag) LIKE ? ESCAPE '\'
              )
          )
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT ?
        "#
    ))
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(i64::from(limit.max(1)))
    .fetch_all(pool)
    .await?;

    hydrate_all(pool, &rows).await
}

/// Tags of a playlist in insertion order
pub async fn get_tags(pool: &SqlitePool, id: &PlaylistId) -> Result<Vec<String>> {
    let tags = sqlx::query_scalar(
        "SELECT tag FROM playlist_tags WHERE playlist_id = ? ORDER BY position",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

async fn replace_tags(conn: &mut SqliteConnection, id: &PlaylistId, tags: &[String]) -> Result<()> {
    sqlx::query("DELETE FROM playlist_tags WHERE playlist_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    let tags = tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty());
    for (position, tag) in tags.enumerate() {
        sqlx::query("INSERT INTO playlist_tags (playlist_id, position, tag) VALUES (?, ?, ?)")
            .bind(id)
            .bind(position as i64)
            .bind(tag)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn hydrate(pool: &SqlitePool, mut record: PlaylistRecord) -> Result<PlaylistRecord> {
    record.tags = get_tags(pool, &record.id).await?;
    record.likes = likes::get_likers(pool, &record.id).await?;
    Ok(record)
}

async fn hydrate_all(pool: &SqlitePool, rows: &[SqliteRow]) -> Result<Vec<PlaylistRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        records.push(hydrate(pool, from_row(row)?).await?);
    }
    Ok(records)
}

fn from_row(row: &SqliteRow) -> Result<PlaylistRecord> {
    let track_ids: Vec<TrackId> = serde_json::from_str(&row.get::<String, _>("track_ids"))
        .map_err(|e| StorageError::invalid_data("track_ids", e.to_string()))?;

    Ok(PlaylistRecord {
        id: row.get("id"),
        remote_id: row.get("remote_id"),
        name: row.get("name"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        is_public: row.get::<i64, _>("is_public") != 0,
        cover_art: row.get("cover_art"),
        tags: Vec::new(),
        track_ids,
        track_count: u32::try_from(row.get::<i64, _>("track_count")).unwrap_or(0),
        duration: u64::try_from(row.get::<i64, _>("duration")).unwrap_or(0),
        plays: u64::try_from(row.get::<i64, _>("plays")).unwrap_or(0),
        likes: BTreeSet::new(),
        synced_at: from_millis("synced_at", row.get("synced_at"))?,
        created_at: from_millis("created_at", row.get("created_at"))?,
        updated_at: from_millis("updated_at", row.get("updated_at"))?,
    })
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
