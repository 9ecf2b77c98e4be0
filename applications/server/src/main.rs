/// Cadence Server - playlist sync backend over a Subsonic catalog
use cadence_catalog::SubsonicCatalog;
use cadence_server::{api, config::ServerConfig, services::TokenVerifier, state::AppState};
use cadence_storage::SqliteMetadataStore;
use cadence_sync::{PlaylistService, SyncEngine};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-server")]
#[command(about = "Cadence playlist server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Ping the configured catalog and report whether it answers
    CheckCatalog {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cadence_server=info,cadence_sync=info,cadence_catalog=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
        }
        Commands::CheckCatalog { config } => {
            check_catalog(config).await?;
        }
    }

    Ok(())
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ServerConfig::load(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Starting Cadence Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let store = SqliteMetadataStore::connect(&config.storage.database_url).await?;
    tracing::info!("Database connected");

    let catalog = Arc::new(SubsonicCatalog::new(config.catalog_config())?);
    tracing::info!(url = %catalog.url(), "Catalog client initialized");
    if !catalog.ping().await {
        tracing::warn!("Catalog did not answer the startup ping; serving anyway");
    }

    let sync_config = config.sync_config();
    tracing::info!(
        staleness_secs = sync_config.staleness.as_secs(),
        verify_writes = sync_config.verify_writes,
        serialize_mutations = sync_config.serialize_mutations,
        "Sync engine configured"
    );
    let engine = SyncEngine::new(catalog.clone(), Arc::new(store), sync_config);
    let service = Arc::new(PlaylistService::new(engine, config.service_config()));

    let verifier = Arc::new(TokenVerifier::new(&config.auth.jwt_secret));

    let app_state = AppState::new(service, catalog, verifier);
    let app = api::router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn check_catalog(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ServerConfig::load(config_path.as_deref())?;
    let catalog = SubsonicCatalog::new(config.catalog_config())?;

    if catalog.ping().await {
        println!("Catalog at {} is reachable", catalog.url());
        Ok(())
    } else {
        anyhow::bail!("Catalog at {} did not answer", catalog.url())
    }
}
