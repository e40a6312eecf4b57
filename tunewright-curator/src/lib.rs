//! tunewright-curator library interface
//!
//! Exposes the pipeline components and the HTTP boundary for integration
//! testing.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::CuratorSettings;
use crate::services::{
    CandidateGenerator, CatalogClient, CatalogMapper, CurationPipeline, ListenBrainzClient,
    MusicBrainzClient, PreferenceScorer, SeedResolver, SessionStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session store handle, shared with the pipeline
    pub store: SessionStore,
    /// Pipeline orchestrator
    pub pipeline: Arc<CurationPipeline>,
    /// Playlist length when a curate request names none
    pub default_playlist_length: usize,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire the clients, components, and store from settings
    pub fn from_settings(settings: &CuratorSettings) -> anyhow::Result<Self> {
        let mb = Arc::new(MusicBrainzClient::new(
            settings.musicbrainz_base_url.clone(),
            settings.user_agent.clone(),
        )?);
        let lb = Arc::new(ListenBrainzClient::new(
            settings.listenbrainz_base_url.clone(),
            &settings.user_agent,
            settings.listenbrainz_interval,
        )?);
        let catalog = Arc::new(CatalogClient::new(
            settings.catalog_base_url.clone(),
            settings.catalog_api_key.clone(),
            settings.catalog_interval,
        )?);

        let store = SessionStore::new(settings.session_ttl);
        let resolver = SeedResolver::new(mb);
        let pipeline = CurationPipeline::new(
            store.clone(),
            resolver.clone(),
            CandidateGenerator::new(lb),
            PreferenceScorer::new(resolver, settings.tag_lookup_timeout),
            CatalogMapper::new(catalog),
        );

        Ok(Self {
            store,
            pipeline: Arc::new(pipeline),
            default_playlist_length: settings.default_playlist_length,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::session_routes())
        .merge(api::health_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
