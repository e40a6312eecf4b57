//! Curation session state
//!
//! A session holds the accumulated state of one curation conversation:
//! seeds, exclusions, tag preferences, the diversity setting, and the last
//! generated result. Sessions live in the keyed store with a TTL; seed lists
//! are append-only, the other refinement fields are last-write-wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CatalogItem, Seed, UnmatchedTrack};

/// How the conversation sources its material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// New-to-the-user recommendations only
    Discover,
    /// Re-curate from the user's existing library
    FromLibrary,
    /// Both
    Mixed,
}

/// How closely candidates must resemble the seeds.
///
/// Maps 1:1 to the discovery service's strictness mode; see
/// `CandidateGenerator`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diversity {
    /// Stay close to the seeds
    Focused,
    /// Middle ground
    #[default]
    Balanced,
    /// Bias toward exploratory, less-similar results
    Diverse,
}

/// Output of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationResult {
    /// Sequenced, playable tracks
    pub tracks: Vec<CatalogItem>,
    /// Candidates the catalog could not match, original strings verbatim
    pub unmatched: Vec<UnmatchedTrack>,
    pub generated_at: DateTime<Utc>,
}

/// Persisted state of one curation conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub session_id: Uuid,

    pub mode: SessionMode,

    /// Artist seeds (append-only)
    pub seed_artists: Vec<Seed>,
    /// Track seeds (append-only)
    pub seed_tracks: Vec<Seed>,

    /// Creator names to drop from every result (case-insensitive match)
    pub excluded_artists: Vec<String>,
    /// Tags that raise a candidate's score
    pub preferred_tags: Vec<String>,
    /// Tags that lower a candidate's score
    pub avoided_tags: Vec<String>,

    pub diversity: Diversity,

    /// Last generated playlist, if any
    pub result: Option<CurationResult>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session in the given mode
    pub fn new(mode: SessionMode) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            mode,
            seed_artists: Vec::new(),
            seed_tracks: Vec::new(),
            excluded_artists: Vec::new(),
            preferred_tags: Vec::new(),
            avoided_tags: Vec::new(),
            diversity: Diversity::default(),
            result: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// All seeds, artists first
    pub fn all_seeds(&self) -> impl Iterator<Item = &Seed> {
        self.seed_artists.iter().chain(self.seed_tracks.iter())
    }
}
