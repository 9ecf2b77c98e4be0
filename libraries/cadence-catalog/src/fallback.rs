//! Built-in browse data served when the catalog cannot be reached.

use crate::types::{AlbumSummary, ArtistSummary, SearchResults};
use cadence_core::TrackProjection;

pub(crate) fn tracks() -> Vec<TrackProjection> {
    vec![
        TrackProjection {
            genre: vec!["Rock".into()],
            ..TrackProjection::new("mock-1", "Bohemian Rhapsody", "Queen", "A Night at the Opera", 354)
        },
        TrackProjection {
            genre: vec!["Rock".into(), "Hard Rock".into()],
            ..TrackProjection::new(
                "mock-2",
                "Sweet Child O'Mine",
                "Guns N' Roses",
                "Appetite for Destruction",
                356,
            )
        },
    ]
}

/// Fallback search results whose names contain `query` (case-insensitive).
pub(crate) fn search_results(query: &str) -> SearchResults {
    let needle = query.trim().to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    let mut results = all();
    results
        .tracks
        .retain(|t| matches(&t.title) || matches(&t.artist) || matches(&t.album));
    results.artists.retain(|a| matches(&a.name));
    results
        .albums
        .retain(|a| matches(&a.name) || matches(&a.artist));
    results
}

fn all() -> SearchResults {
    SearchResults {
        tracks: tracks(),
        artists: vec![ArtistSummary {
            id: "artist-1".into(),
            name: "Queen".into(),
            album_count: 15,
            cover_art: None,
        }],
        albums: vec![AlbumSummary {
            id: "album-1".into(),
            name: "A Night at the Opera".into(),
            artist: "Queen".into(),
            song_count: 12,
            duration: 2546,
            year: Some(1975),
        }],
    }
}
