//! Service settings derived from the shared configuration
//!
//! Converts the raw `TomlConfig` fields into the typed values the
//! components take (Durations, User-Agent), with validation.

use std::time::Duration;

use tunewright_common::config::TomlConfig;
use tunewright_common::{Error, Result};

/// Typed curator settings
#[derive(Debug, Clone)]
pub struct CuratorSettings {
    pub bind_address: String,
    pub session_ttl: Duration,
    pub default_playlist_length: usize,
    pub tag_lookup_timeout: Duration,
    pub musicbrainz_base_url: String,
    pub listenbrainz_base_url: String,
    pub listenbrainz_interval: Duration,
    pub catalog_base_url: String,
    pub catalog_api_key: Option<String>,
    pub catalog_interval: Duration,
    pub user_agent: String,
}

impl CuratorSettings {
    /// Validate and convert the raw configuration
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        if config.session_ttl_seconds == 0 {
            return Err(Error::Config(
                "session_ttl_seconds must be positive".to_string(),
            ));
        }
        if config.default_playlist_length == 0 {
            return Err(Error::Config(
                "default_playlist_length must be positive".to_string(),
            ));
        }

        Ok(Self {
            bind_address: config.bind_address.clone(),
            session_ttl: Duration::from_secs(config.session_ttl_seconds),
            default_playlist_length: config.default_playlist_length,
            tag_lookup_timeout: Duration::from_millis(config.tag_lookup_timeout_ms),
            musicbrainz_base_url: config.musicbrainz_base_url.clone(),
            listenbrainz_base_url: config.listenbrainz_base_url.clone(),
            listenbrainz_interval: Duration::from_millis(config.listenbrainz_interval_ms),
            catalog_base_url: config.catalog_base_url.clone(),
            catalog_api_key: config.catalog_api_key.clone(),
            catalog_interval: Duration::from_millis(config.catalog_interval_ms),
            user_agent: config.user_agent(),
        })
    }
}
