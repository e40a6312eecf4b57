//! Preference scoring and filtering
//!
//! Drops excluded creators, scores the survivors against the session's
//! preferred/avoided tags, and returns a ranked, truncated list. The avoided
//! penalty is twice the preference bonus so avoidance biases conservatively.
//!
//! One tag lookup is issued per distinct creator in the surviving pool, each
//! bounded by its own timeout; a slow or failed lookup contributes a neutral
//! score and never stalls or aborts the batch. Deduplicating by creator
//! matters because the lookups ride a paced 1 req/s client.

use std::collections::HashMap;
use std::time::Duration;

use crate::models::{Candidate, ScoredCandidate, Tag};
use crate::services::seed_resolver::SeedResolver;

/// Score contribution for each matched preferred tag
const PREFER_BONUS: i64 = 1;
/// Score contribution for each matched avoided tag
const AVOID_PENALTY: i64 = -2;

/// Drop candidates whose creator matches the exclusion list
/// (case-insensitive).
pub fn filter_excluded(candidates: Vec<Candidate>, exclude: &[String]) -> Vec<Candidate> {
    if exclude.is_empty() {
        return candidates;
    }

    let excluded: Vec<String> = exclude.iter().map(|name| name.to_lowercase()).collect();
    candidates
        .into_iter()
        .filter(|candidate| !excluded.contains(&candidate.creator.to_lowercase()))
        .collect()
}

/// Distinct creator names in first-appearance order, deduplicated
/// case-insensitively. Each name costs a paced external lookup, so repeated
/// creators in the pool must collapse to one entry.
pub fn unique_creators(candidates: &[Candidate]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut names: Vec<String> = Vec::new();
    for candidate in candidates {
        let key = candidate.creator.to_lowercase();
        if !keys.contains(&key) {
            keys.push(key);
            names.push(candidate.creator.clone());
        }
    }
    names
}

/// Rule score for one candidate's tag set
pub fn score_against(tags: &[Tag], prefer: &[String], avoid: &[String]) -> i64 {
    let tag_names: Vec<String> = tags.iter().map(|tag| tag.name.to_lowercase()).collect();

    let preferred_hits = prefer
        .iter()
        .filter(|tag| tag_names.contains(&tag.to_lowercase()))
        .count() as i64;
    let avoided_hits = avoid
        .iter()
        .filter(|tag| tag_names.contains(&tag.to_lowercase()))
        .count() as i64;

    preferred_hits * PREFER_BONUS + avoided_hits * AVOID_PENALTY
}

/// Stable sort descending by score, truncate, assign ranks.
/// Ties keep their original relative order.
pub fn rank_and_truncate(scored: Vec<(Candidate, i64)>, limit: usize) -> Vec<ScoredCandidate> {
    let mut scored = scored;
    scored.sort_by(|a, b| b.1.cmp(&a.1)); // sort_by is stable

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(rank, (candidate, score))| ScoredCandidate {
            candidate,
            score,
            rank,
        })
        .collect()
}

/// Scorer over the seed resolver's tag lookups
#[derive(Clone)]
pub struct PreferenceScorer {
    resolver: SeedResolver,
    lookup_timeout: Duration,
}

impl PreferenceScorer {
    pub fn new(resolver: SeedResolver, lookup_timeout: Duration) -> Self {
        Self {
            resolver,
            lookup_timeout,
        }
    }

    /// Filter, score, rank, and truncate a candidate pool.
    pub async fn score(
        &self,
        candidates: Vec<Candidate>,
        exclude: &[String],
        prefer: &[String],
        avoid: &[String],
        limit: usize,
    ) -> Vec<ScoredCandidate> {
        let survivors = filter_excluded(candidates, exclude);

        // No tag preferences: every candidate scores 0, order preserved
        let needs_lookup = !prefer.is_empty() || !avoid.is_empty();

        let mut tags_by_creator: HashMap<String, Vec<Tag>> = HashMap::new();
        if needs_lookup {
            for creator in unique_creators(&survivors) {
                let tags = self.creator_tags_bounded(&creator).await;
                tags_by_creator.insert(creator.to_lowercase(), tags);
            }
        }

        let mut scored = Vec::with_capacity(survivors.len());
        for candidate in survivors {
            let score = tags_by_creator
                .get(&candidate.creator.to_lowercase())
                .map(|tags| score_against(tags, prefer, avoid))
                .unwrap_or(0);
            scored.push((candidate, score));
        }

        rank_and_truncate(scored, limit)
    }

    /// Tag lookup bounded by its own timeout; timeout means neutral score
    async fn creator_tags_bounded(&self, creator: &str) -> Vec<Tag> {
        match tokio::time::timeout(self.lookup_timeout, self.resolver.creator_tags(creator)).await
        {
            Ok(tags) => tags,
            Err(_) => {
                tracing::warn!(creator = %creator, "Tag lookup timed out, scoring neutral");
                Vec::new()
            }
        }
    }
}
