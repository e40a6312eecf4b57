//! Curation pipeline orchestrator
//!
//! Runs the full recommend operation for one session as an ordered sequence
//! of stages: seed resolution, candidate generation, preference scoring,
//! catalog mapping, and sequencing. Each stage is an I/O suspension point;
//! sessions are processed sequentially within themselves and independently
//! of each other.

use chrono::Utc;
use uuid::Uuid;

use tunewright_common::{Error, Result};

use crate::models::{CurationResult, Seed, Session};
use crate::services::candidate_generator::CandidateGenerator;
use crate::services::catalog_mapper::CatalogMapper;
use crate::services::playlist_sequencer;
use crate::services::preference_scorer::PreferenceScorer;
use crate::services::seed_resolver::{self, SeedResolver};
use crate::services::session_store::SessionStore;

/// Orchestrator holding the store and the pipeline components
pub struct CurationPipeline {
    store: SessionStore,
    resolver: SeedResolver,
    generator: CandidateGenerator,
    scorer: PreferenceScorer,
    mapper: CatalogMapper,
}

impl CurationPipeline {
    pub fn new(
        store: SessionStore,
        resolver: SeedResolver,
        generator: CandidateGenerator,
        scorer: PreferenceScorer,
        mapper: CatalogMapper,
    ) -> Self {
        Self {
            store,
            resolver,
            generator,
            scorer,
            mapper,
        }
    }

    /// Run the recommend operation for a session.
    ///
    /// Errors: NotFound when the session is unknown or expired (precondition
    /// failure), InvalidInput when no seed resolves, Upstream when the
    /// discovery service fails. Catalog misses are not errors; they come
    /// back in the result's `unmatched` list.
    pub async fn run(&self, session_id: Uuid, limit: usize) -> Result<CurationResult> {
        let session = self
            .store
            .get(session_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("session {}", session_id)))?;

        tracing::info!(
            session_id = %session_id,
            artists = session.seed_artists.len(),
            tracks = session.seed_tracks.len(),
            diversity = ?session.diversity,
            limit,
            "Starting curation run"
        );

        // Stage 1: seed resolution (misses are skipped, not fatal)
        let session = self.resolve_seeds(session).await?;

        let seeds: Vec<Seed> = session.all_seeds().cloned().collect();
        let resolved_count = seeds.iter().filter(|s| s.is_resolved()).count();
        tracing::info!(
            session_id = %session_id,
            resolved = resolved_count,
            total = seeds.len(),
            "Seed resolution complete"
        );

        let aggregated = seed_resolver::aggregate_tags(&seeds);

        // Stage 2: candidate generation (fatal on upstream failure)
        let candidates = self
            .generator
            .generate(&seeds, &aggregated, session.diversity, limit)
            .await?;

        // Stage 3: preference scoring
        let scored = self
            .scorer
            .score(
                candidates,
                &session.excluded_artists,
                &session.preferred_tags,
                &session.avoided_tags,
                limit,
            )
            .await;
        tracing::info!(session_id = %session_id, scored = scored.len(), "Scoring complete");

        // Stage 4: catalog mapping (misses accumulate, never abort)
        let outcome = self.mapper.map(scored).await;

        // Stage 5: sequencing
        let sequenced = playlist_sequencer::reorder(outcome.tracks);

        let result = CurationResult {
            tracks: sequenced.into_iter().map(|t| t.item).collect(),
            unmatched: outcome.unmatched,
            generated_at: Utc::now(),
        };

        // Write back; a session deleted mid-run discards the result
        match self.store.store_result(session_id, result.clone()).await {
            Ok(_) => {}
            Err(Error::NotFound(_)) => {
                tracing::warn!(
                    session_id = %session_id,
                    "Session gone before write-back; result discarded from store"
                );
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            session_id = %session_id,
            tracks = result.tracks.len(),
            unmatched = result.unmatched.len(),
            "Curation run complete"
        );

        Ok(result)
    }

    /// Resolve all unresolved seeds and persist them into the session.
    ///
    /// Resolved seeds are immutable; refinement calls between runs only
    /// append new unresolved seeds. The write-back replaces only the seed
    /// lists, so a refinement to another field landing mid-resolution is
    /// not lost.
    async fn resolve_seeds(&self, session: Session) -> Result<Session> {
        let session_id = session.session_id;

        let mut artists = Vec::with_capacity(session.seed_artists.len());
        for seed in session.seed_artists {
            artists.push(self.resolver.resolve_artist(seed).await);
        }

        let mut tracks = Vec::with_capacity(session.seed_tracks.len());
        for seed in session.seed_tracks {
            tracks.push(self.resolver.resolve_track(seed).await);
        }

        self.store.replace_seeds(session_id, artists, tracks).await
    }
}
