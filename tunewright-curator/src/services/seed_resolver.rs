//! Seed resolution against the identity/tag service
//!
//! Turns human-entered artist/track names into canonical identities plus
//! weighted tags. Resolution failures are non-fatal: the seed stays
//! unresolved, contributes nothing downstream, and the miss is logged.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{Seed, Tag};
use crate::services::musicbrainz_client::MusicBrainzClient;

/// Maximum tags kept per seed and per aggregated signal
pub const TOP_K_TAGS: usize = 10;

/// Resolver over the MusicBrainz client
#[derive(Clone)]
pub struct SeedResolver {
    mb: Arc<MusicBrainzClient>,
}

impl SeedResolver {
    pub fn new(mb: Arc<MusicBrainzClient>) -> Self {
        Self { mb }
    }

    /// Resolve an artist seed.
    ///
    /// Returns the seed unresolved (id None, no tags) when the lookup
    /// fails or matches nothing.
    pub async fn resolve_artist(&self, seed: Seed) -> Seed {
        if seed.is_resolved() {
            return seed; // immutable once resolved
        }

        let matches = match self.mb.search_artist(&seed.name, 1).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(seed = %seed.name, error = %e, "Artist resolution failed, skipping seed");
                return seed;
            }
        };

        let Some(artist) = matches.into_iter().next() else {
            tracing::warn!(seed = %seed.name, "No artist match, skipping seed");
            return seed;
        };

        let tags = self.tags_for_artist(&artist.id).await;

        tracing::info!(seed = %seed.name, mbid = %artist.id, tags = tags.len(), "Artist seed resolved");
        Seed {
            canonical_id: Some(artist.id),
            resolved_artist: Some(artist.name),
            tags,
            ..seed
        }
    }

    /// Resolve a track seed.
    ///
    /// The canonical identity is the recording; the credited artist carries
    /// the tag signal and the prompt token.
    pub async fn resolve_track(&self, seed: Seed) -> Seed {
        if seed.is_resolved() {
            return seed;
        }

        let matches = match self.mb.search_recording(&seed.name, 1).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(seed = %seed.name, error = %e, "Track resolution failed, skipping seed");
                return seed;
            }
        };

        let Some(recording) = matches.into_iter().next() else {
            tracing::warn!(seed = %seed.name, "No recording match, skipping seed");
            return seed;
        };

        let credit = recording.artist_credit.into_iter().next();
        let (artist_id, artist_name) = match credit {
            Some(credit) => (Some(credit.artist.id), Some(credit.artist.name)),
            None => (None, None),
        };

        let tags = match &artist_id {
            Some(id) => self.tags_for_artist(id).await,
            None => Vec::new(),
        };

        tracing::info!(seed = %seed.name, mbid = %recording.id, "Track seed resolved");
        Seed {
            canonical_id: Some(recording.id),
            resolved_artist: artist_name,
            tags,
            ..seed
        }
    }

    /// Tag set for a creator name, for scorer lookups.
    ///
    /// Every failure mode collapses to an empty set; a missing tag set is
    /// a neutral score, never an error. Costs up to two paced requests
    /// (artist search, then tag lookup), so callers scoring a batch should
    /// invoke it once per distinct creator.
    pub async fn creator_tags(&self, name: &str) -> Vec<Tag> {
        let artist = match self.mb.search_artist(name, 1).await {
            Ok(matches) => matches.into_iter().next(),
            Err(e) => {
                tracing::debug!(creator = %name, error = %e, "Creator tag lookup failed");
                None
            }
        };

        match artist {
            Some(artist) => self.tags_for_artist(&artist.id).await,
            None => Vec::new(),
        }
    }

    /// Top-K weighted tags for an artist MBID; failures become empty
    async fn tags_for_artist(&self, mbid: &str) -> Vec<Tag> {
        match self.mb.artist_tags(mbid).await {
            Ok(mut tags) => {
                tags.truncate(TOP_K_TAGS);
                tags
            }
            Err(e) => {
                tracing::debug!(mbid = %mbid, error = %e, "Tag lookup failed");
                Vec::new()
            }
        }
    }
}

/// Combine tags from multiple resolved seeds into one signal.
///
/// Weights are summed per lowercased tag name, sorted descending (name
/// ascending on ties), and truncated to the top-K.
pub fn aggregate_tags(seeds: &[Seed]) -> Vec<Tag> {
    let mut merged: HashMap<String, u32> = HashMap::new();
    for seed in seeds {
        for tag in &seed.tags {
            *merged.entry(tag.name.to_lowercase()).or_insert(0) += tag.weight;
        }
    }

    let mut tags: Vec<Tag> = merged
        .into_iter()
        .map(|(name, weight)| Tag { name, weight })
        .collect();
    tags.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.name.cmp(&b.name)));
    tags.truncate(TOP_K_TAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_with_tags(name: &str, tags: &[(&str, u32)]) -> Seed {
        Seed {
            name: name.to_string(),
            canonical_id: Some(format!("mbid-{name}")),
            resolved_artist: Some(name.to_string()),
            tags: tags
                .iter()
                .map(|(name, weight)| Tag {
                    name: name.to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }

    #[test]
    fn test_aggregate_sums_weights_per_name() {
        let seeds = vec![
            seed_with_tags("a", &[("idm", 5), ("ambient", 3)]),
            seed_with_tags("b", &[("IDM", 4), ("downtempo", 2)]),
        ];

        let tags = aggregate_tags(&seeds);
        assert_eq!(tags[0].name, "idm");
        assert_eq!(tags[0].weight, 9); // case-insensitive merge
        assert_eq!(tags[1].name, "ambient");
        assert_eq!(tags[2].name, "downtempo");
    }

    #[test]
    fn test_aggregate_truncates_to_top_k() {
        let many: Vec<(String, u32)> = (0..20).map(|i| (format!("tag{i:02}"), 20 - i)).collect();
        let pairs: Vec<(&str, u32)> = many.iter().map(|(n, w)| (n.as_str(), *w)).collect();
        let seeds = vec![seed_with_tags("a", &pairs)];

        let tags = aggregate_tags(&seeds);
        assert_eq!(tags.len(), TOP_K_TAGS);
        assert_eq!(tags[0].weight, 20);
    }

    #[test]
    fn test_aggregate_tie_order_is_deterministic() {
        let seeds = vec![seed_with_tags("a", &[("zeta", 3), ("alpha", 3)])];
        let tags = aggregate_tags(&seeds);
        assert_eq!(tags[0].name, "alpha");
        assert_eq!(tags[1].name, "zeta");
    }

    #[test]
    fn test_aggregate_empty_seeds() {
        assert!(aggregate_tags(&[]).is_empty());
        assert!(aggregate_tags(&[Seed::unresolved("nobody")]).is_empty());
    }
}
