/// Playlist domain types
use crate::types::{PlaylistId, RemotePlaylistId, TrackId, UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Playlist metadata plus the cached projection of its catalog track list.
///
/// `track_ids`, `track_count`, `duration` and `synced_at` are a cache of the
/// catalog's state and are only ever written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRecord {
    /// Local identity
    pub id: PlaylistId,

    /// Identity of the playlist inside the catalog service
    pub remote_id: RemotePlaylistId,

    /// Playlist name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owning user
    pub owner_id: UserId,

    /// Whether non-owners may read the playlist
    pub is_public: bool,

    /// Optional cover art reference
    pub cover_art: Option<String>,

    /// User supplied tags
    pub tags: Vec<String>,

    /// Cached catalog track order
    pub track_ids: Vec<TrackId>,

    /// Always `track_ids.len()`
    pub track_count: u32,

    /// Sum of resolvable track durations, in seconds
    pub duration: u64,

    /// Play counter
    pub plays: u64,

    /// Users who liked the playlist
    pub likes: BTreeSet<UserId>,

    /// Last successful sync with the catalog
    pub synced_at: DateTime<Utc>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last metadata change
    pub updated_at: DateTime<Utc>,
}

impl PlaylistRecord {
    /// Whether `user` owns this playlist
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    /// Whether `user` may read this playlist
    pub fn is_readable_by(&self, user: &UserId) -> bool {
        self.is_public || self.is_owned_by(user)
    }

    /// Number of likes
    pub fn like_count(&self) -> u32 {
        self.likes.len() as u32
    }

    /// Whether the cached projection is older than `threshold` at `now`
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        now - self.synced_at >= threshold
    }

    /// The cached projection fields as a value
    pub fn projection(&self) -> Projection {
        Projection {
            track_ids: self.track_ids.clone(),
            duration: self.duration,
            synced_at: self.synced_at,
        }
    }
}

/// The cached track quadruple written atomically by the sync engine.
///
/// `track_count` is derived from `track_ids`, so a projection can never carry
/// a mismatched count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Ordered track ids
    pub track_ids: Vec<TrackId>,

    /// Aggregate duration in seconds
    pub duration: u64,

    /// When this projection was read from the catalog
    pub synced_at: DateTime<Utc>,
}

impl Projection {
    /// Create a projection
    pub fn new(track_ids: Vec<TrackId>, duration: u64, synced_at: DateTime<Utc>) -> Self {
        Self {
            track_ids,
            duration,
            synced_at,
        }
    }

    /// Number of tracks
    pub fn track_count(&self) -> u32 {
        self.track_ids.len() as u32
    }
}

/// User input for creating a playlist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylist {
    /// Playlist name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Visibility, private unless set
    #[serde(default)]
    pub is_public: bool,

    /// Tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A playlist ready to be inserted locally, after the remote one exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    /// Catalog playlist id
    pub remote_id: RemotePlaylistId,

    /// Owning user
    pub owner_id: UserId,

    /// Playlist name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Visibility
    pub is_public: bool,

    /// Tags
    pub tags: Vec<String>,

    /// Optional cover art reference
    pub cover_art: Option<String>,

    /// Creation time, also used as the initial `synced_at`
    pub created_at: DateTime<Utc>,
}

impl NewPlaylist {
    /// Create a private, untagged playlist
    pub fn new(remote_id: RemotePlaylistId, owner_id: UserId, name: impl Into<String>) -> Self {
        Self {
            remote_id,
            owner_id,
            name: name.into(),
            description: None,
            is_public: false,
            tags: Vec::new(),
            cover_art: None,
            created_at: Utc::now(),
        }
    }

    /// Build from user input once the remote playlist has been created
    pub fn from_request(remote_id: RemotePlaylistId, owner_id: UserId, req: CreatePlaylist) -> Self {
        Self {
            remote_id,
            owner_id,
            name: req.name,
            description: req.description,
            is_public: req.is_public,
            tags: req.tags,
            cover_art: None,
            created_at: Utc::now(),
        }
    }

    /// Override the creation time
    #[must_use]
    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }
}

/// Metadata changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylist {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New visibility
    pub is_public: Option<bool>,

    /// Replacement tag list
    pub tags: Option<Vec<String>>,

    /// New cover art reference
    pub cover_art: Option<String>,
}

impl UpdatePlaylist {
    /// Whether the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.tags.is_none()
            && self.cover_art.is_none()
    }
}

/// One page of public playlists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistPage {
    /// Playlists on this page
    pub playlists: Vec<PlaylistRecord>,

    /// Total number of public playlists
    pub total: u64,

    /// Number of pages at the requested page size
    pub pages: u64,

    /// The page returned (1-based)
    pub page: u32,
}

/// Result of toggling a like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    /// Whether the requester now likes the playlist
    pub liked: bool,

    /// Like count after the toggle
    pub likes: u32,
}
