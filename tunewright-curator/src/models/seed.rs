//! Seed and tag types
//!
//! A seed is a user-supplied artist or track that steers candidate
//! generation. Seeds are immutable once resolved: resolution fills in the
//! canonical identity and weighted tags exactly once.

use serde::{Deserialize, Serialize};

/// Weighted genre/style label attached to an artist or track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name (lowercased on aggregation)
    pub name: String,
    /// Relative weight (MusicBrainz vote count)
    pub weight: u32,
}

/// User-supplied artist or track seed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Human-entered name, kept verbatim
    pub name: String,
    /// Canonical identity (MBID); None when resolution found no match
    pub canonical_id: Option<String>,
    /// Canonical artist name behind this seed: the canonical spelling for
    /// an artist seed, the credited artist for a track seed
    pub resolved_artist: Option<String>,
    /// Weighted tags, descending by weight, capped at top-K
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Seed {
    /// New, not-yet-resolved seed
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canonical_id: None,
            resolved_artist: None,
            tags: Vec::new(),
        }
    }

    /// True when resolution produced a canonical identity
    pub fn is_resolved(&self) -> bool {
        self.canonical_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_seed() {
        let seed = Seed::unresolved("Boards of Canada");
        assert_eq!(seed.name, "Boards of Canada");
        assert!(!seed.is_resolved());
        assert!(seed.tags.is_empty());
    }
}
