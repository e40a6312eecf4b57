//! Configuration loading for Tunewright services
//!
//! Resolution priority per field: environment variable, then the TOML config
//! file, then the compiled default. A malformed tier is logged and skipped,
//! never fatal.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Default bind address for the curator service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5741";

/// Service configuration loaded from TOML / environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP bind address ("host:port")
    pub bind_address: String,

    /// Session time-to-live in seconds
    pub session_ttl_seconds: u64,

    /// Default playlist length when a request does not specify one
    pub default_playlist_length: usize,

    /// Per-candidate tag lookup timeout in milliseconds
    pub tag_lookup_timeout_ms: u64,

    /// MusicBrainz API base URL
    pub musicbrainz_base_url: String,

    /// ListenBrainz API base URL
    pub listenbrainz_base_url: String,

    /// Minimum interval between ListenBrainz requests, milliseconds
    pub listenbrainz_interval_ms: u64,

    /// Target catalog search gateway base URL
    pub catalog_base_url: String,

    /// Optional bearer token for the catalog gateway
    pub catalog_api_key: Option<String>,

    /// Minimum interval between catalog requests, milliseconds
    pub catalog_interval_ms: u64,

    /// Contact string embedded in the User-Agent (MusicBrainz policy)
    pub contact: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            session_ttl_seconds: 3600,
            default_playlist_length: 25,
            tag_lookup_timeout_ms: 5000,
            musicbrainz_base_url: "https://musicbrainz.org/ws/2".to_string(),
            listenbrainz_base_url: "https://api.listenbrainz.org/1".to_string(),
            listenbrainz_interval_ms: 1000,
            catalog_base_url: "http://127.0.0.1:5743".to_string(),
            catalog_api_key: None,
            catalog_interval_ms: 250,
            contact: "https://github.com/tunewright/tunewright".to_string(),
        }
    }
}

impl TomlConfig {
    /// Load configuration with ENV then TOML then defaults.
    ///
    /// `TUNEWRIGHT_CONFIG` overrides the config file location.
    pub fn load() -> Self {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => match read_toml_config(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            _ => TomlConfig::default(),
        };

        config.apply_env_overrides();
        config
    }

    /// Apply `TUNEWRIGHT_*` environment overrides on top of this config.
    /// Every field has an override; unparseable values are warned and
    /// skipped, never fatal.
    fn apply_env_overrides(&mut self) {
        override_from_env("TUNEWRIGHT_BIND_ADDRESS", &mut self.bind_address);
        override_from_env(
            "TUNEWRIGHT_SESSION_TTL_SECONDS",
            &mut self.session_ttl_seconds,
        );
        override_from_env(
            "TUNEWRIGHT_DEFAULT_PLAYLIST_LENGTH",
            &mut self.default_playlist_length,
        );
        override_from_env(
            "TUNEWRIGHT_TAG_LOOKUP_TIMEOUT_MS",
            &mut self.tag_lookup_timeout_ms,
        );
        override_from_env(
            "TUNEWRIGHT_MUSICBRAINZ_BASE_URL",
            &mut self.musicbrainz_base_url,
        );
        override_from_env(
            "TUNEWRIGHT_LISTENBRAINZ_BASE_URL",
            &mut self.listenbrainz_base_url,
        );
        override_from_env(
            "TUNEWRIGHT_LISTENBRAINZ_INTERVAL_MS",
            &mut self.listenbrainz_interval_ms,
        );
        override_from_env("TUNEWRIGHT_CATALOG_BASE_URL", &mut self.catalog_base_url);
        if let Ok(v) = std::env::var("TUNEWRIGHT_CATALOG_API_KEY") {
            self.catalog_api_key = Some(v);
        }
        override_from_env(
            "TUNEWRIGHT_CATALOG_INTERVAL_MS",
            &mut self.catalog_interval_ms,
        );
        override_from_env("TUNEWRIGHT_CONTACT", &mut self.contact);
    }

    /// User-Agent string for external API clients.
    ///
    /// MusicBrainz requires "AppName/Version ( contact )".
    pub fn user_agent(&self) -> String {
        format!(
            "Tunewright/{} ({})",
            env!("CARGO_PKG_VERSION"),
            self.contact
        )
    }
}

/// Overwrite `field` from an environment variable when it is set and
/// parses; a malformed value is warned and skipped
fn override_from_env<T: std::str::FromStr>(name: &str, field: &mut T) {
    if let Ok(v) = std::env::var(name) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => warn!("Ignoring unparseable {}: {}", name, v),
        }
    }
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &std::path::Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Config file location: `TUNEWRIGHT_CONFIG` or `~/.config/tunewright/curator.toml`
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TUNEWRIGHT_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("tunewright").join("curator.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.session_ttl_seconds, 3600);
        assert_eq!(config.default_playlist_length, 25);
        assert!(config.catalog_api_key.is_none());
    }

    #[test]
    fn test_user_agent_format() {
        let config = TomlConfig::default();
        let ua = config.user_agent();
        assert!(ua.starts_with("Tunewright/"));
        assert!(ua.contains(&config.contact));
    }

    #[test]
    #[serial]
    fn test_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session_ttl_seconds = 120").unwrap();

        let config = read_toml_config(file.path()).unwrap();
        assert_eq!(config.session_ttl_seconds, 120);
        // Unspecified fields fall back to defaults
        assert_eq!(config.default_playlist_length, 25);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    #[serial]
    fn test_malformed_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session_ttl_seconds = 'not a number").unwrap();

        assert!(read_toml_config(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var("TUNEWRIGHT_SESSION_TTL_SECONDS", "90");
        std::env::set_var("TUNEWRIGHT_CATALOG_BASE_URL", "http://localhost:9999");

        let mut config = TomlConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.session_ttl_seconds, 90);
        assert_eq!(config.catalog_base_url, "http://localhost:9999");

        std::env::remove_var("TUNEWRIGHT_SESSION_TTL_SECONDS");
        std::env::remove_var("TUNEWRIGHT_CATALOG_BASE_URL");
    }

    #[test]
    #[serial]
    fn test_env_override_per_field() {
        std::env::set_var("TUNEWRIGHT_DEFAULT_PLAYLIST_LENGTH", "40");
        std::env::set_var("TUNEWRIGHT_LISTENBRAINZ_INTERVAL_MS", "1500");
        std::env::set_var("TUNEWRIGHT_CONTACT", "ops@example.com");

        let mut config = TomlConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.default_playlist_length, 40);
        assert_eq!(config.listenbrainz_interval_ms, 1500);
        assert_eq!(config.contact, "ops@example.com");

        std::env::remove_var("TUNEWRIGHT_DEFAULT_PLAYLIST_LENGTH");
        std::env::remove_var("TUNEWRIGHT_LISTENBRAINZ_INTERVAL_MS");
        std::env::remove_var("TUNEWRIGHT_CONTACT");
    }

    #[test]
    #[serial]
    fn test_malformed_env_value_skipped() {
        std::env::set_var("TUNEWRIGHT_TAG_LOOKUP_TIMEOUT_MS", "five seconds");

        let mut config = TomlConfig::default();
        config.apply_env_overrides();

        // Unparseable override falls back to the default
        assert_eq!(config.tag_lookup_timeout_ms, 5000);

        std::env::remove_var("TUNEWRIGHT_TAG_LOOKUP_TIMEOUT_MS");
    }
}
