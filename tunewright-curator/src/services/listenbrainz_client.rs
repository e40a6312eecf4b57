//! ListenBrainz LB-radio client
//!
//! Discovery service for candidate generation. The endpoint takes a prompt
//! in the LB-radio DSL ("artist:(Name)" / "tag:(name)" tokens) plus a
//! strictness mode, and returns a JSPF playlist of suggestions.
//!
//! ListenBrainz publishes no rate-limit headers for this endpoint, so the
//! client paces itself with a minimum inter-request interval.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::Candidate;

const DEFAULT_BASE_URL: &str = "https://api.listenbrainz.org/1";

/// ListenBrainz client errors
#[derive(Debug, Error)]
pub enum LbError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// LB-radio strictness mode.
///
/// "easy" keeps results close to the prompt; "hard" biases toward
/// less-similar, exploratory picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Easy,
    Medium,
    Hard,
}

impl Strictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strictness::Easy => "easy",
            Strictness::Medium => "medium",
            Strictness::Hard => "hard",
        }
    }
}

/// JSPF response envelope. Every level is defaulted: the payload shape is
/// not under our control and partial responses must not panic.
#[derive(Debug, Default, Deserialize)]
struct LbRadioResponse {
    #[serde(default)]
    payload: LbRadioPayload,
}

#[derive(Debug, Default, Deserialize)]
struct LbRadioPayload {
    #[serde(default)]
    jspf: LbJspf,
}

#[derive(Debug, Default, Deserialize)]
struct LbJspf {
    #[serde(default)]
    playlist: LbPlaylist,
}

#[derive(Debug, Default, Deserialize)]
struct LbPlaylist {
    #[serde(default)]
    track: Vec<LbTrack>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LbTrack {
    title: String,
    creator: String,
    identifier: Vec<String>,
}

impl From<LbTrack> for Candidate {
    fn from(track: LbTrack) -> Self {
        Candidate {
            title: track.title,
            creator: track.creator,
            external_id: track.identifier.into_iter().next(),
        }
    }
}

/// Minimum-interval rate limiter
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to comply with the pacing interval
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("ListenBrainz rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// ListenBrainz API client
pub struct ListenBrainzClient {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl ListenBrainzClient {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        min_interval: Duration,
    ) -> Result<Self, LbError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| LbError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            rate_limiter: RateLimiter::new(min_interval),
        })
    }

    /// Client against the public API with 1 req/sec pacing
    pub fn public(user_agent: &str) -> Result<Self, LbError> {
        Self::new(DEFAULT_BASE_URL, user_agent, Duration::from_secs(1))
    }

    /// Generate radio suggestions for a prompt.
    ///
    /// Returns candidates in service order; callers request their own
    /// headroom on top of `count`.
    pub async fn lb_radio(
        &self,
        prompt: &str,
        mode: Strictness,
        count: usize,
    ) -> Result<Vec<Candidate>, LbError> {
        self.rate_limiter.wait().await;

        let url = format!(
            "{}/lb-radio?prompt={}&mode={}&count={}",
            self.base_url,
            urlencoding::encode(prompt),
            mode.as_str(),
            count
        );

        tracing::debug!(prompt = %prompt, mode = mode.as_str(), count, "Querying LB-radio");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LbError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LbError::Api(status.as_u16(), error_text));
        }

        let body: LbRadioResponse = response
            .json()
            .await
            .map_err(|e| LbError::Parse(e.to_string()))?;

        let candidates: Vec<Candidate> = body
            .payload
            .jspf
            .playlist
            .track
            .into_iter()
            .map(Candidate::from)
            .collect();

        tracing::info!(
            prompt = %prompt,
            returned = candidates.len(),
            "LB-radio generation complete"
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictness_names() {
        assert_eq!(Strictness::Easy.as_str(), "easy");
        assert_eq!(Strictness::Medium.as_str(), "medium");
        assert_eq!(Strictness::Hard.as_str(), "hard");
    }

    #[test]
    fn test_client_creation() {
        let client =
            ListenBrainzClient::public("TestApp/1.0").unwrap();
        assert!(client.base_url.contains("listenbrainz.org"));
    }

    #[test]
    fn test_jspf_payload_parsing() {
        let json = r#"{"payload": {"jspf": {"playlist": {"track": [
            {"title": "Olson", "creator": "Boards of Canada",
             "identifier": ["https://musicbrainz.org/recording/abc"]},
            {"creator": "Plaid"}
        ]}}}}"#;

        let body: LbRadioResponse = serde_json::from_str(json).unwrap();
        let candidates: Vec<Candidate> = body
            .payload
            .jspf
            .playlist
            .track
            .into_iter()
            .map(Candidate::from)
            .collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Olson");
        assert_eq!(
            candidates[0].external_id.as_deref(),
            Some("https://musicbrainz.org/recording/abc")
        );
        // Missing title defaults to empty, never null
        assert_eq!(candidates[1].title, "");
        assert_eq!(candidates[1].creator, "Plaid");
        assert!(candidates[1].external_id.is_none());
    }

    #[test]
    fn test_empty_payload_parses() {
        let body: LbRadioResponse = serde_json::from_str("{}").unwrap();
        assert!(body.payload.jspf.playlist.track.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limiter_timing() {
        let limiter = RateLimiter::new(Duration::from_millis(100));

        let start = Instant::now();
        limiter.wait().await; // First request - immediate
        let first_elapsed = start.elapsed();

        limiter.wait().await; // Second request - should wait ~100ms
        let second_elapsed = start.elapsed();

        assert!(first_elapsed.as_millis() < 50);
        assert!(second_elapsed.as_millis() >= 100);
    }
}
