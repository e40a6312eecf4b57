//! Candidate and catalog item types
//!
//! `Candidate` is the raw discovery-service payload. The service returns
//! loosely-shaped JSON, so every field is defaulted on deserialization:
//! missing strings become empty, never a panic.

use serde::{Deserialize, Serialize};

/// Unscored, unmapped recommendation from the discovery service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candidate {
    /// Track title
    pub title: String,
    /// Creator (artist) name
    pub creator: String,
    /// Discovery-service identifier, when present
    pub external_id: Option<String>,
}

impl Default for Candidate {
    fn default() -> Self {
        Self {
            title: String::new(),
            creator: String::new(),
            external_id: None,
        }
    }
}

/// Candidate after preference scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    /// Sum of rule contributions (+1 preferred tag, -2 avoided tag)
    pub score: i64,
    /// Position after the stable descending sort (0 = best)
    pub rank: usize,
}

/// Playable item in the target catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Platform-native identifier
    pub catalog_id: String,
    /// Display title
    pub title: String,
    /// Credited artists
    #[serde(default)]
    pub artists: Vec<String>,
    /// Album title, when known
    pub album: Option<String>,
    /// Duration in seconds, when known
    pub duration_secs: Option<u32>,
}

/// A mapped catalog item paired with its sequencing inputs.
///
/// The creator key comes from the originating candidate, not the catalog
/// metadata, so adjacency decisions match what the scorer saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub item: CatalogItem,
    pub creator: String,
    pub score: i64,
}

/// A candidate the target catalog could not match.
///
/// Title and creator are the original discovery-service strings, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedTrack {
    pub title: String,
    pub creator: String,
}
