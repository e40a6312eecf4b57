//! Data model for the curation pipeline

pub mod candidate;
pub mod seed;
pub mod session;

pub use candidate::{Candidate, CatalogItem, PlaylistTrack, ScoredCandidate, UnmatchedTrack};
pub use seed::{Seed, Tag};
pub use session::{CurationResult, Diversity, Session, SessionMode};
