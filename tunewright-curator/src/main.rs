//! tunewright-curator - Playlist Curation Microservice
//!
//! Curates personalized track lists from conversational seeds: resolves
//! seeds against MusicBrainz, pulls candidates from ListenBrainz LB-radio,
//! scores them against stated preferences, maps them into the target
//! catalog, and sequences the result for listening flow.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tunewright_curator::config::CuratorSettings;
use tunewright_curator::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tunewright-curator (Playlist Curation) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = tunewright_common::config::TomlConfig::load();
    let settings = CuratorSettings::from_toml(&config)
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    info!("Session TTL: {:?}", settings.session_ttl);
    info!("Catalog gateway: {}", settings.catalog_base_url);

    let state = AppState::from_settings(&settings)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Listening on http://{}", settings.bind_address);
    info!("Health check: http://{}/health", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
