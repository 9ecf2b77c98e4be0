//! Catalog browsing: search and random tracks.
//!
//! Browse calls never fail. When the catalog is unreachable or answers with
//! an error, a small built-in data set is returned so clients can still
//! render something.

use crate::client::{array_or_single, id_string, parse_track, SubsonicCatalog};
use crate::fallback;
use crate::types::{AlbumSummary, ArtistSummary, SearchResults};
use cadence_core::TrackProjection;
use serde_json::Value;
use tracing::warn;

impl SubsonicCatalog {
    /// Search tracks, artists and albums.
    ///
    /// `limit` caps each of the three result lists.
    pub async fn search(&self, query: &str, limit: u32) -> SearchResults {
        let count = limit.max(1).to_string();
        let params = [
            ("query", query.to_string()),
            ("songCount", count.clone()),
            ("artistCount", count.clone()),
            ("albumCount", count),
        ];

        match self.call("search3", &params).await {
            Ok(envelope) => parse_search(envelope.get("searchResult3")),
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed, serving fallback results");
                fallback::search_results(query)
            }
        }
    }

    /// Random tracks from the catalog.
    pub async fn random_tracks(&self, size: u32) -> Vec<TrackProjection> {
        let params = [("size", size.max(1).to_string())];

        match self.call("getRandomSongs", &params).await {
            Ok(envelope) => {
                let songs = envelope.get("randomSongs").and_then(|r| r.get("song"));
                array_or_single(songs)
                    .into_iter()
                    .filter_map(parse_track)
                    .collect()
            }
            Err(e) => {
                warn!(error = %e, "Random tracks failed, serving fallback tracks");
                fallback::tracks()
            }
        }
    }
}

fn parse_search(result: Option<&Value>) -> SearchResults {
    let Some(result) = result else {
        return SearchResults::default();
    };

    let tracks = array_or_single(result.get("song"))
        .into_iter()
        .filter_map(parse_track)
        .collect();

    let artists = array_or_single(result.get("artist"))
        .into_iter()
        .filter_map(|artist| {
            Some(ArtistSummary {
                id: artist.get("id").and_then(id_string)?,
                name: str_field(artist, "name", "Unknown Artist"),
                album_count: u32_field(artist, "albumCount"),
                cover_art: artist
                    .get("coverArt")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned),
            })
        })
        .collect();

    let albums = array_or_single(result.get("album"))
        .into_iter()
        .filter_map(|album| {
            Some(AlbumSummary {
                id: album.get("id").and_then(id_string)?,
                name: str_field(album, "name", "Unknown Album"),
                artist: str_field(album, "artist", "Unknown Artist"),
                song_count: u32_field(album, "songCount"),
                duration: u32_field(album, "duration"),
                year: album
                    .get("year")
                    .and_then(Value::as_i64)
                    .and_then(|y| i32::try_from(y).ok()),
            })
        })
        .collect();

    SearchResults {
        tracks,
        artists,
        albums,
    }
}

fn str_field(value: &Value, key: &str, fallback: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}

fn u32_field(value: &Value, key: &str) -> u32 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_object_results() {
        let result = json!({
            "song": {"id": "s1", "title": "One"},
            "artist": {"id": "ar1", "name": "Queen", "albumCount": 15},
            "album": {"id": "al1", "name": "Jazz", "artist": "Queen", "year": 1978}
        });

        let parsed = parse_search(Some(&result));
        assert_eq!(parsed.tracks.len(), 1);
        assert_eq!(parsed.artists[0].album_count, 15);
        assert_eq!(parsed.albums[0].year, Some(1978));
        assert_eq!(parsed.albums[0].song_count, 0);
    }

    #[test]
    fn missing_result_is_empty() {
        assert_eq!(parse_search(None), SearchResults::default());
    }

    #[test]
    fn fallback_data_is_stable() {
        let tracks = fallback::tracks();
        assert_eq!(tracks[0].title, "Bohemian Rhapsody");
        assert_eq!(tracks[1].genre, vec!["Rock", "Hard Rock"]);
        assert_eq!(fallback::search_results("opera").albums[0].duration, 2546);
    }
}
