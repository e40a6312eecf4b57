//! Candidate to catalog mapping
//!
//! Resolves each scored candidate into a playable catalog item with exactly
//! one best-match search per candidate. A miss or a per-candidate failure
//! never aborts the batch; it lands in `unmatched` with the original title
//! and creator strings unchanged. The two output lists always partition the
//! input.

use std::sync::Arc;

use crate::models::{CatalogItem, PlaylistTrack, ScoredCandidate, UnmatchedTrack};
use crate::services::catalog_client::CatalogClient;

/// Result of mapping one candidate pool
#[derive(Debug, Default)]
pub struct MapOutcome {
    /// Candidates the catalog matched, ready for sequencing
    pub tracks: Vec<PlaylistTrack>,
    /// Candidates with no catalog match, original strings verbatim
    pub unmatched: Vec<UnmatchedTrack>,
}

/// Best-match query for one candidate
pub fn search_query(candidate: &ScoredCandidate) -> String {
    format!("{} {}", candidate.candidate.title, candidate.candidate.creator)
}

/// Fold per-candidate search outcomes into the partitioned result
pub fn partition(outcomes: Vec<(ScoredCandidate, Option<CatalogItem>)>) -> MapOutcome {
    let mut result = MapOutcome::default();

    for (scored, item) in outcomes {
        match item {
            Some(item) => result.tracks.push(PlaylistTrack {
                item,
                creator: scored.candidate.creator,
                score: scored.score,
            }),
            None => result.unmatched.push(UnmatchedTrack {
                title: scored.candidate.title,
                creator: scored.candidate.creator,
            }),
        }
    }

    result
}

/// Mapper over the catalog client
#[derive(Clone)]
pub struct CatalogMapper {
    client: Arc<CatalogClient>,
}

impl CatalogMapper {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }

    /// Map a scored pool into catalog items plus the unmatched remainder.
    pub async fn map(&self, scored: Vec<ScoredCandidate>) -> MapOutcome {
        let total = scored.len();
        let mut outcomes = Vec::with_capacity(total);

        for candidate in scored {
            let query = search_query(&candidate);
            let item = match self.client.search_track(&query).await {
                Ok(item) => item,
                Err(e) => {
                    tracing::warn!(
                        title = %candidate.candidate.title,
                        creator = %candidate.candidate.creator,
                        error = %e,
                        "Catalog search failed, recording as unmatched"
                    );
                    None
                }
            };
            outcomes.push((candidate, item));
        }

        let result = partition(outcomes);
        tracing::info!(
            total,
            matched = result.tracks.len(),
            unmatched = result.unmatched.len(),
            "Catalog mapping complete"
        );
        debug_assert_eq!(result.tracks.len() + result.unmatched.len(), total);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;

    fn scored(title: &str, creator: &str, score: i64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                title: title.to_string(),
                creator: creator.to_string(),
                external_id: None,
            },
            score,
            rank: 0,
        }
    }

    fn item(id: &str, title: &str) -> CatalogItem {
        CatalogItem {
            catalog_id: id.to_string(),
            title: title.to_string(),
            artists: Vec::new(),
            album: None,
            duration_secs: None,
        }
    }

    #[test]
    fn test_search_query_shape() {
        let query = search_query(&scored("Olson", "Boards of Canada", 0));
        assert_eq!(query, "Olson Boards of Canada");
    }

    #[test]
    fn test_partition_invariant() {
        let outcomes = vec![
            (scored("t1", "a", 3), Some(item("cat:1", "t1"))),
            (scored("t2", "b", 2), None),
            (scored("t3", "c", 1), Some(item("cat:3", "t3"))),
            (scored("t4", "d", 0), None),
        ];

        let result = partition(outcomes);
        assert_eq!(result.tracks.len() + result.unmatched.len(), 4);
        assert_eq!(result.tracks.len(), 2);
        assert_eq!(result.unmatched.len(), 2);
    }

    #[test]
    fn test_unmatched_keeps_original_strings() {
        let outcomes = vec![(scored("Ob-La-Di, Ob-La-Da", "The Beatles", 1), None)];
        let result = partition(outcomes);

        assert_eq!(
            result.unmatched[0],
            UnmatchedTrack {
                title: "Ob-La-Di, Ob-La-Da".to_string(),
                creator: "The Beatles".to_string(),
            }
        );
    }

    #[test]
    fn test_matched_track_carries_creator_and_score() {
        let outcomes = vec![(scored("t1", "Plaid", 4), Some(item("cat:9", "t1")))];
        let result = partition(outcomes);

        let track = &result.tracks[0];
        assert_eq!(track.creator, "Plaid");
        assert_eq!(track.score, 4);
        assert_eq!(track.item.catalog_id, "cat:9");
    }
}
