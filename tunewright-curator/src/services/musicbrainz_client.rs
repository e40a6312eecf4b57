//! MusicBrainz API client
//!
//! Identity/tag resolution service for seeds and for scorer tag lookups.
//! MusicBrainz policy is at most 1 request/second with a mandatory
//! User-Agent; the limiter gates every request.
//!
//! API Documentation: https://musicbrainz.org/doc/MusicBrainz_API

use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

use crate::models::Tag;

const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz client errors
#[derive(Debug, Error)]
pub enum MbError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Artist search response
#[derive(Debug, Deserialize)]
struct MbArtistSearch {
    #[serde(default)]
    artists: Vec<MbArtist>,
}

#[derive(Debug, Deserialize)]
pub struct MbArtist {
    pub id: String,
    pub name: String,
}

/// Recording search response
#[derive(Debug, Deserialize)]
struct MbRecordingSearch {
    #[serde(default)]
    recordings: Vec<MbRecording>,
}

#[derive(Debug, Deserialize)]
pub struct MbRecording {
    pub id: String,
    pub title: String,
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<MbArtistCredit>,
}

#[derive(Debug, Deserialize)]
pub struct MbArtistCredit {
    pub name: String,
    pub artist: MbCreditedArtist,
}

#[derive(Debug, Deserialize)]
pub struct MbCreditedArtist {
    pub id: String,
    pub name: String,
}

/// Artist lookup response (inc=tags)
#[derive(Debug, Deserialize)]
struct MbArtistLookup {
    #[serde(default)]
    tags: Vec<MbTag>,
}

#[derive(Debug, Deserialize)]
struct MbTag {
    name: String,
    #[serde(default)]
    count: u32,
}

/// MusicBrainz API client with client-side pacing
pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
    user_agent: String,
    /// 1 request/second per MusicBrainz policy
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl MusicBrainzClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://musicbrainz.org/ws/2"
    /// * `user_agent` - "AppName/Version ( contact )", required by policy
    pub fn new(base_url: impl Into<String>, user_agent: String) -> Result<Self, MbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| MbError::Network(e.to_string()))?;

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(1).expect("1 is non-zero"),
        ));

        Ok(Self {
            client,
            base_url: base_url.into(),
            user_agent,
            rate_limiter,
        })
    }

    /// Client against the public API
    pub fn public(user_agent: String) -> Result<Self, MbError> {
        Self::new(DEFAULT_BASE_URL, user_agent)
    }

    /// Search artists by name, best matches first
    pub async fn search_artist(&self, name: &str, limit: usize) -> Result<Vec<MbArtist>, MbError> {
        let url = format!(
            "{}/artist?query={}&limit={}&fmt=json",
            self.base_url,
            urlencoding::encode(name),
            limit
        );

        let search: MbArtistSearch = self.get_json(&url).await?;
        Ok(search.artists)
    }

    /// Search recordings by free-text query, best matches first
    pub async fn search_recording(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MbRecording>, MbError> {
        let url = format!(
            "{}/recording?query={}&limit={}&fmt=json",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let search: MbRecordingSearch = self.get_json(&url).await?;
        Ok(search.recordings)
    }

    /// Weighted tags for an artist, descending by weight
    pub async fn artist_tags(&self, mbid: &str) -> Result<Vec<Tag>, MbError> {
        let url = format!("{}/artist/{}?inc=tags&fmt=json", self.base_url, mbid);

        let lookup: MbArtistLookup = self.get_json(&url).await?;
        Ok(sort_tags(lookup.tags))
    }

    /// Rate-limited GET with status handling shared by every endpoint
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, MbError> {
        // Blocks (async wait) until a permit is available
        self.rate_limiter.until_ready().await;

        tracing::debug!(url = %url, "Querying MusicBrainz API");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| MbError::Network(e.to_string()))?;

        let status = response.status();

        if status == 503 {
            return Err(MbError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MbError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| MbError::Parse(e.to_string()))
    }
}

/// Convert raw tags to the model type, descending by count
fn sort_tags(tags: Vec<MbTag>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = tags
        .into_iter()
        .map(|t| Tag {
            name: t.name,
            weight: t.count,
        })
        .collect();
    tags.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.name.cmp(&b.name)));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> MusicBrainzClient {
        MusicBrainzClient::public("TestApp/1.0 (test@example.com)".to_string()).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = test_client();
        assert_eq!(client.user_agent, "TestApp/1.0 (test@example.com)");
        assert!(client.base_url.contains("musicbrainz.org"));
        assert!(client.base_url.contains("/ws/2"));
    }

    #[test]
    fn test_search_url_encodes_query() {
        let encoded = urlencoding::encode("Sigur Rós & friends");
        assert!(!encoded.contains(' '));
        assert!(!encoded.contains('&'));
    }

    #[test]
    fn test_sort_tags_descending_with_name_tiebreak() {
        let sorted = sort_tags(vec![
            MbTag { name: "shoegaze".into(), count: 3 },
            MbTag { name: "ambient".into(), count: 7 },
            MbTag { name: "electronic".into(), count: 3 },
        ]);
        let names: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ambient", "electronic", "shoegaze"]);
    }

    #[test]
    fn test_artist_search_payload_parsing() {
        let json = r#"{"created": "2026-01-01", "count": 1, "artists": [
            {"id": "abc-123", "name": "Boards of Canada", "score": 100}
        ]}"#;
        let search: MbArtistSearch = serde_json::from_str(json).unwrap();
        assert_eq!(search.artists.len(), 1);
        assert_eq!(search.artists[0].name, "Boards of Canada");
        assert_eq!(search.artists[0].id, "abc-123");
    }

    #[test]
    fn test_tag_lookup_payload_parsing() {
        let json = r#"{"tags": [{"name": "idm", "count": 12}, {"name": "downtempo"}]}"#;
        let lookup: MbArtistLookup = serde_json::from_str(json).unwrap();
        let tags = sort_tags(lookup.tags);
        assert_eq!(tags[0].name, "idm");
        assert_eq!(tags[0].weight, 12);
        assert_eq!(tags[1].weight, 0); // missing count defaults
    }

    #[tokio::test]
    async fn test_rate_limiter_enforces_one_per_second() {
        use std::time::Instant;

        let client = test_client();

        let start = Instant::now();
        client.rate_limiter.until_ready().await;
        let first_elapsed = start.elapsed();
        assert!(
            first_elapsed.as_millis() < 100,
            "First request should be immediate, took {:?}",
            first_elapsed
        );

        let start = Instant::now();
        client.rate_limiter.until_ready().await;
        let second_elapsed = start.elapsed();
        assert!(
            second_elapsed.as_millis() >= 900,
            "Second request should wait ~1 second, took {:?}",
            second_elapsed
        );
    }
}
