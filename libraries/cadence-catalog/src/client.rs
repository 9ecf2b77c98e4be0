//! Subsonic catalog client.

use crate::error::{CatalogError, Result};
use crate::types::CatalogConfig;
use async_trait::async_trait;
use cadence_core::{CatalogClient, RemotePlaylistId, TrackId, TrackLookup, TrackProjection};
use rand::Rng;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Client for a Subsonic-compatible catalog service.
///
/// Every request authenticates with a freshly salted token and carries the
/// configured timeout. The health flag records whether the most recent call
/// reached the catalog; it is advisory and never blocks calls.
///
/// # Example
///
/// ```ignore
/// use cadence_catalog::{CatalogConfig, SubsonicCatalog};
///
/// let catalog = SubsonicCatalog::new(CatalogConfig::new("http://localhost:4533", "admin", "pw"))?;
/// if catalog.ping().await {
///     println!("catalog is up");
/// }
/// ```
pub struct SubsonicCatalog {
    http: Client,
    config: CatalogConfig,
    healthy: AtomicBool,
}

impl SubsonicCatalog {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        // Validate URL
        let url = config.url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(CatalogError::InvalidUrl("URL cannot be empty".into()));
        }

        let parsed = Url::parse(&url).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(5)))
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: CatalogConfig { url, ..config },
            healthy: AtomicBool::new(false),
        })
    }

    /// Get the normalized catalog URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Get the client configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Ping the catalog with the shorter health timeout.
    pub async fn ping(&self) -> bool {
        let healthy = self
            .call_with_timeout("ping", &[], Some(self.config.health_timeout))
            .await
            .is_ok();

        info!(url = %self.config.url, healthy, "Catalog health check");
        healthy
    }

    /// Fetch one track.
    pub async fn fetch_track(&self, track_id: &TrackId) -> Result<TrackProjection> {
        let envelope = self.call("getSong", &[("id", track_id.to_string())]).await?;

        envelope
            .get("song")
            .and_then(parse_track)
            .ok_or_else(|| CatalogError::ParseError("getSong response missing song".into()))
    }

    /// Fetch the ordered track ids of a remote playlist.
    pub async fn fetch_playlist_tracks(&self, remote_id: &RemotePlaylistId) -> Result<Vec<TrackId>> {
        let envelope = self
            .call("getPlaylist", &[("id", remote_id.to_string())])
            .await?;

        let playlist = envelope.get("playlist").ok_or_else(|| {
            CatalogError::ParseError("getPlaylist response missing playlist".into())
        })?;

        let track_ids: Vec<TrackId> = array_or_single(playlist.get("entry"))
            .into_iter()
            .filter_map(|entry| entry.get("id").and_then(id_string))
            .map(TrackId::new)
            .collect();

        debug!(remote_id = %remote_id, tracks = track_ids.len(), "Fetched playlist tracks");
        Ok(track_ids)
    }

    /// Best-effort variant of [`Self::fetch_playlist_tracks`]: an empty list
    /// when the catalog cannot answer.
    pub async fn playlist_tracks_or_empty(&self, remote_id: &RemotePlaylistId) -> Vec<TrackId> {
        match self.fetch_playlist_tracks(remote_id).await {
            Ok(track_ids) => track_ids,
            Err(e) => {
                warn!(remote_id = %remote_id, error = %e, "Falling back to empty track list");
                Vec::new()
            }
        }
    }

    pub(crate) async fn call(&self, method: &str, params: &[(&str, String)]) -> Result<Value> {
        self.call_with_timeout(method, params, None).await
    }

    async fn call_with_timeout(
        &self,
        method: &str,
        params: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let result = self.send(method, params, timeout).await;

        let reached = match &result {
            Ok(_) => true,
            Err(e) => !e.is_transport(),
        };
        self.healthy.store(reached, Ordering::Relaxed);

        if let Err(e) = &result {
            warn!(method = %method, error = %e, "Catalog call failed");
        }
        result
    }

    async fn send(
        &self,
        method: &str,
        params: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Value> {
        let url = format!("{}/rest/{}.view", self.config.url, method);
        debug!(url = %url, "Calling catalog");

        let mut query = self.auth_params();
        query.extend(params.iter().map(|(k, v)| ((*k).to_string(), v.clone())));

        let mut request = self.http.get(&url).query(&query);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| classify(method, e))?;
        let status = response.status();

        if status.as_u16() == 401 {
            return Err(CatalogError::AuthFailed(format!("{method} returned 401")));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout(format!("{method}: {e}"))
            } else {
                CatalogError::ParseError(format!("{method} response: {e}"))
            }
        })?;

        let envelope = payload
            .get("subsonic-response")
            .cloned()
            .ok_or_else(|| CatalogError::ParseError("missing subsonic-response envelope".into()))?;

        let api_status = envelope
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if api_status != "ok" {
            let error = envelope.get("error");
            let code = error
                .and_then(|e| e.get("code"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let message = error
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("Catalog returned an error")
                .to_string();
            return Err(CatalogError::Api { code, message });
        }

        Ok(envelope)
    }

    fn auth_params(&self) -> Vec<(String, String)> {
        let salt = make_salt();
        let token = format!(
            "{:x}",
            md5::compute(format!("{}{}", self.config.password, salt))
        );
        vec![
            ("u".to_string(), self.config.username.clone()),
            ("t".to_string(), token),
            ("s".to_string(), salt),
            ("v".to_string(), self.config.api_version.clone()),
            ("c".to_string(), self.config.client_name.clone()),
            ("f".to_string(), "json".to_string()),
        ]
    }
}

#[async_trait]
impl CatalogClient for SubsonicCatalog {
    async fn get_track(&self, track_id: &TrackId) -> TrackLookup {
        match self.fetch_track(track_id).await {
            Ok(track) => TrackLookup::Found(track),
            Err(e) if e.is_not_found() => {
                debug!(track_id = %track_id, "Track not found in catalog");
                TrackLookup::NotFound
            }
            Err(_) => TrackLookup::Unavailable,
        }
    }

    async fn get_playlist_tracks(
        &self,
        remote_id: &RemotePlaylistId,
    ) -> cadence_core::Result<Vec<TrackId>> {
        Ok(self.fetch_playlist_tracks(remote_id).await?)
    }

    async fn replace_playlist_tracks(
        &self,
        remote_id: &RemotePlaylistId,
        track_ids: &[TrackId],
    ) -> cadence_core::Result<()> {
        // createPlaylist with an existing playlistId overwrites the song list
        let mut params = vec![("playlistId", remote_id.to_string())];
        params.extend(track_ids.iter().map(|id| ("songId", id.to_string())));

        self.call("createPlaylist", &params).await?;

        debug!(remote_id = %remote_id, tracks = track_ids.len(), "Replaced playlist tracks");
        Ok(())
    }

    async fn create_playlist(&self, name: &str) -> cadence_core::Result<RemotePlaylistId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(cadence_core::CadenceError::bad_request(
                "playlist name cannot be empty",
            ));
        }

        let envelope = self.call("createPlaylist", &[("name", name.to_string())]).await?;

        let remote_id = envelope
            .get("playlist")
            .and_then(|playlist| playlist.get("id"))
            .and_then(id_string)
            .map(RemotePlaylistId::new)
            .ok_or_else(|| {
                CatalogError::ParseError("createPlaylist response missing playlist id".into())
            })?;

        info!(remote_id = %remote_id, name = %name, "Created catalog playlist");
        Ok(remote_id)
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}

fn classify(method: &str, err: reqwest::Error) -> CatalogError {
    if err.is_timeout() {
        CatalogError::Timeout(format!("{method}: {err}"))
    } else if err.is_connect() {
        CatalogError::Unreachable(format!("{method}: {err}"))
    } else {
        CatalogError::Request(err)
    }
}

fn make_salt() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    bytes.iter().map(|value| format!("{value:02x}")).collect()
}

/// Subsonic collapses one-element lists into a bare object.
pub(crate) fn array_or_single(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    }
}

/// Ids are strings on Navidrome but numbers on older servers.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn parse_track(song: &Value) -> Option<TrackProjection> {
    let id = song.get("id").and_then(id_string)?;
    let text = |key: &str, fallback: &str| -> String {
        song.get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };

    let duration = song
        .get("duration")
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .min(u64::from(u32::MAX)) as u32;

    let mut genre: Vec<String> = array_or_single(song.get("genres"))
        .into_iter()
        .filter_map(|g| g.get("name").and_then(Value::as_str))
        .map(ToOwned::to_owned)
        .collect();
    if genre.is_empty() {
        if let Some(g) = song.get("genre").and_then(Value::as_str).filter(|g| !g.is_empty()) {
            genre.push(g.to_string());
        }
    }

    Some(TrackProjection {
        id: TrackId::new(id),
        title: text("title", "Unknown Title"),
        artist: text("artist", "Unknown Artist"),
        album: text("album", "Unknown Album"),
        duration,
        genre,
    })
}
