//! Pipeline components and external service clients

pub mod candidate_generator;
pub mod catalog_client;
pub mod catalog_mapper;
pub mod curation_pipeline;
pub mod listenbrainz_client;
pub mod musicbrainz_client;
pub mod playlist_sequencer;
pub mod preference_scorer;
pub mod seed_resolver;
pub mod session_store;

pub use candidate_generator::CandidateGenerator;
pub use catalog_client::{CatalogClient, CatalogError};
pub use catalog_mapper::{CatalogMapper, MapOutcome};
pub use curation_pipeline::CurationPipeline;
pub use listenbrainz_client::{LbError, ListenBrainzClient, Strictness};
pub use musicbrainz_client::{MbError, MusicBrainzClient};
pub use preference_scorer::PreferenceScorer;
pub use seed_resolver::SeedResolver;
pub use session_store::SessionStore;
