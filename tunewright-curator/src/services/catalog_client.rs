//! Target catalog search client
//!
//! Best-match search against the catalog gateway that owns the user's
//! library. The gateway base URL and bearer token come from configuration;
//! token issuance and storage live outside this service.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::CatalogItem;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Search response envelope; results may be missing entirely
#[derive(Debug, Default, Deserialize)]
struct CatalogSearchResponse {
    #[serde(default)]
    results: Vec<CatalogSearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CatalogSearchHit {
    id: String,
    title: String,
    artists: Vec<String>,
    album: Option<String>,
    duration_secs: Option<u32>,
}

impl Default for CatalogSearchHit {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            artists: Vec::new(),
            album: None,
            duration_secs: None,
        }
    }
}

impl From<CatalogSearchHit> for CatalogItem {
    fn from(hit: CatalogSearchHit) -> Self {
        CatalogItem {
            catalog_id: hit.id,
            title: hit.title,
            artists: hit.artists,
            album: hit.album,
            duration_secs: hit.duration_secs,
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

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Catalog rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Catalog gateway client
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: RateLimiter,
}

impl CatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        min_interval: Duration,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
            rate_limiter: RateLimiter::new(min_interval),
        })
    }

    /// Best-match track search.
    ///
    /// `Ok(None)` means the catalog has no match for the query; only
    /// transport/protocol problems are errors.
    pub async fn search_track(&self, query: &str) -> Result<Option<CatalogItem>, CatalogError> {
        self.rate_limiter.wait().await;

        let url = format!(
            "{}/search?q={}&type=track&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );

        tracing::debug!(query = %query, "Searching target catalog");

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let body: CatalogSearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        Ok(body.results.into_iter().next().map(CatalogItem::from))
    }
}
