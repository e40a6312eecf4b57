//! Candidate generation from the discovery service
//!
//! Builds the LB-radio prompt from resolved seeds, maps the session's
//! diversity setting to a strictness mode, and requests twice the desired
//! count so later filtering stages have headroom. A discovery failure is
//! fatal for the run: an empty candidate pool defeats the purpose and is
//! surfaced as an upstream error, never an empty success.

use std::sync::Arc;

use tunewright_common::{Error, Result};

use crate::models::{Candidate, Diversity, Seed, Tag};
use crate::services::listenbrainz_client::{ListenBrainzClient, Strictness};

/// Oversampling factor applied to the requested limit
const HEADROOM_FACTOR: usize = 2;

/// Candidate count requested from the discovery service for a desired
/// playlist length; oversized so scoring and mapping losses still leave a
/// full playlist
pub fn requested_count(limit: usize) -> usize {
    limit * HEADROOM_FACTOR
}

/// Diversity setting to discovery strictness mode; total by construction
pub fn strictness_for(diversity: Diversity) -> Strictness {
    match diversity {
        Diversity::Focused => Strictness::Easy,
        Diversity::Balanced => Strictness::Medium,
        Diversity::Diverse => Strictness::Hard,
    }
}

/// Build the prompt: one `artist:(Name)` token per resolved seed, falling
/// back to `tag:(name)` tokens from the aggregated signal when no seed
/// resolved. Returns None when neither source yields a token.
pub fn build_prompt(seeds: &[Seed], fallback_tags: &[Tag]) -> Option<String> {
    let mut tokens: Vec<String> = Vec::new();

    for seed in seeds {
        if !seed.is_resolved() {
            continue;
        }
        if let Some(artist) = &seed.resolved_artist {
            let token = format!("artist:({})", artist);
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }

    if tokens.is_empty() {
        tokens.extend(
            fallback_tags
                .iter()
                .take(3)
                .map(|tag| format!("tag:({})", tag.name)),
        );
    }

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

/// Generator over the ListenBrainz client
#[derive(Clone)]
pub struct CandidateGenerator {
    lb: Arc<ListenBrainzClient>,
}

impl CandidateGenerator {
    pub fn new(lb: Arc<ListenBrainzClient>) -> Self {
        Self { lb }
    }

    /// Fetch an oversized candidate pool for the given seeds.
    ///
    /// `limit` is the caller's desired playlist length; the service is
    /// asked for `2 * limit`.
    pub async fn generate(
        &self,
        seeds: &[Seed],
        aggregated_tags: &[Tag],
        diversity: Diversity,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let prompt = build_prompt(seeds, aggregated_tags).ok_or_else(|| {
            Error::InvalidInput("no resolvable seeds to generate from".to_string())
        })?;

        let mode = strictness_for(diversity);
        let count = requested_count(limit);

        let candidates = self
            .lb
            .lb_radio(&prompt, mode, count)
            .await
            .map_err(|e| Error::Upstream(format!("discovery service: {}", e)))?;

        if candidates.is_empty() {
            return Err(Error::Upstream(
                "discovery service returned no candidates".to_string(),
            ));
        }

        tracing::info!(
            prompt = %prompt,
            mode = mode.as_str(),
            requested = count,
            returned = candidates.len(),
            "Candidate pool generated"
        );

        Ok(candidates)
    }
}
