/// Server configuration
use crate::error::{Result, ServerError};
use cadence_catalog::CatalogConfig;
use cadence_sync::{ServiceConfig, SyncConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_health_timeout_secs")]
    pub health_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthSettings {
    /// HS256 secret used to verify bearer tokens
    #[serde(default)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,

    #[serde(default = "default_true")]
    pub verify_writes: bool,

    #[serde(default)]
    pub serialize_mutations: bool,

    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,

    #[serde(default)]
    pub hide_private_playlists: bool,
}

impl ServerConfig {
    /// Load configuration from file and environment
    ///
    /// `path` defaults to `config.toml` in the working directory; a missing
    /// file is not an error. `CADENCE_<SECTION>__<KEY>` variables override it,
    /// e.g. `CADENCE_AUTH__JWT_SECRET`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ServerError::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("CADENCE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set CADENCE_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        let url = self.catalog.url.trim();
        if url.is_empty() {
            return Err(ServerError::Config(
                "Catalog URL is required (set CADENCE_CATALOG__URL)".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerError::Config(format!(
                "Catalog URL must start with http:// or https://, got {url}"
            )));
        }

        if self.sync.staleness_secs == 0 {
            return Err(ServerError::Config(
                "sync.staleness_secs must be greater than zero".to_string(),
            ));
        }

        if self.sync.lookup_concurrency == 0 {
            return Err(ServerError::Config(
                "sync.lookup_concurrency must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            url: self.catalog.url.trim().to_string(),
            username: self.catalog.username.clone(),
            password: self.catalog.password.clone(),
            client_name: self.catalog.client_name.clone(),
            api_version: self.catalog.api_version.clone(),
            timeout: Duration::from_secs(self.catalog.timeout_secs),
            health_timeout: Duration::from_secs(self.catalog.health_timeout_secs),
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            staleness: Duration::from_secs(self.sync.staleness_secs),
            verify_writes: self.sync.verify_writes,
            serialize_mutations: self.sync.serialize_mutations,
            lookup_concurrency: self.sync.lookup_concurrency,
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            hide_private_playlists: self.sync.hide_private_playlists,
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://./data/cadence.db".to_string()
}

fn default_client_name() -> String {
    cadence_catalog::DEFAULT_CLIENT_NAME.to_string()
}

fn default_api_version() -> String {
    cadence_catalog::DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_health_timeout_secs() -> u64 {
    5
}

fn default_staleness_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_lookup_concurrency() -> usize {
    8
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            client_name: default_client_name(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
            health_timeout_secs: default_health_timeout_secs(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            staleness_secs: default_staleness_secs(),
            verify_writes: true,
            serialize_mutations: false,
            lookup_concurrency: default_lookup_concurrency(),
            hide_private_playlists: false,
        }
    }
}
