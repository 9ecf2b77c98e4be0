//! Domain types

mod ids;
mod playlist;
mod track;

pub use ids::{PlaylistId, RemotePlaylistId, TrackId, UserId};
pub use playlist::{
    CreatePlaylist, LikeStatus, NewPlaylist, PlaylistPage, PlaylistRecord, Projection,
    UpdatePlaylist,
};
pub use track::TrackProjection;
