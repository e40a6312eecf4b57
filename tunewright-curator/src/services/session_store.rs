//! In-memory session store with TTL eviction
//!
//! Keyed store for conversation state. Sessions expire a fixed TTL after
//! creation; `get` treats an expired entry as absent and evicts it on read,
//! and a per-session deferred eviction task is scheduled at creation as a
//! safety net so memory is not held for sessions that are never read again.
//!
//! The store is a handle (cheap to clone) holding shared state, injected
//! into the pipeline and the API layer; there is no global registry.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use tunewright_common::{Error, Result};

use crate::models::{CurationResult, Seed, Session, SessionMode};

/// Keyed session store with time-bounded lifecycle
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    /// Deferred eviction timers, aborted on explicit delete
    eviction_tasks: Arc<RwLock<HashMap<Uuid, JoinHandle<()>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            eviction_tasks: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session and schedule its deferred eviction
    pub async fn create(&self, mode: SessionMode) -> Session {
        let session = Session::new(mode);
        let session_id = session.session_id;

        self.sessions
            .write()
            .await
            .insert(session_id, session.clone());

        let sessions = Arc::clone(&self.sessions);
        let eviction_tasks = Arc::clone(&self.eviction_tasks);
        let ttl = self.ttl;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if sessions.write().await.remove(&session_id).is_some() {
                tracing::debug!(session_id = %session_id, "Session evicted after TTL");
            }
            eviction_tasks.write().await.remove(&session_id);
        });
        self.eviction_tasks.write().await.insert(session_id, handle);

        tracing::info!(session_id = %session_id, ?mode, "Session created");
        session
    }

    /// True once `now - created_at` exceeds the TTL
    fn is_expired(&self, session: &Session) -> bool {
        self.is_expired_at(session.created_at)
    }

    /// Fetch a session; expired entries are evicted and reported absent,
    /// even if the deferred eviction timer has not fired yet.
    pub async fn get(&self, session_id: Uuid) -> Option<Session> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(&session_id) {
                Some(session) if self.is_expired(session) => true,
                Some(session) => return Some(session.clone()),
                None => return None,
            }
        };

        if expired {
            self.sessions.write().await.remove(&session_id);
            tracing::debug!(session_id = %session_id, "Expired session evicted on read");
        }
        None
    }

    /// Persist a session, touching its `updated_at` timestamp
    pub async fn update(&self, mut session: Session) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&session.session_id) {
            Some(existing) if !self.is_expired(existing) => {
                session.updated_at = Utc::now();
                sessions.insert(session.session_id, session.clone());
                Ok(session)
            }
            _ => Err(Error::NotFound(format!("session {}", session.session_id))),
        }
    }

    /// Apply a mutation to a stored session.
    ///
    /// Signals NotFound for unknown/expired ids; callers treat that as
    /// fatal for the operation, never a silent no-op.
    async fn with_session<F>(&self, session_id: Uuid, mutate: F) -> Result<Session>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(session) if !self.is_expired_at(session.created_at) => {
                mutate(session);
                session.updated_at = Utc::now();
                Ok(session.clone())
            }
            _ => Err(Error::NotFound(format!("session {}", session_id))),
        }
    }

    fn is_expired_at(&self, created_at: chrono::DateTime<Utc>) -> bool {
        let age = Utc::now().signed_duration_since(created_at);
        age.to_std().map(|age| age > self.ttl).unwrap_or(false)
    }

    /// Append artist seeds (seed lists are append-only)
    pub async fn add_seed_artists(&self, session_id: Uuid, names: Vec<String>) -> Result<Session> {
        self.with_session(session_id, |session| {
            session
                .seed_artists
                .extend(names.into_iter().map(Seed::unresolved));
        })
        .await
    }

    /// Append track seeds
    pub async fn add_seed_tracks(&self, session_id: Uuid, names: Vec<String>) -> Result<Session> {
        self.with_session(session_id, |session| {
            session
                .seed_tracks
                .extend(names.into_iter().map(Seed::unresolved));
        })
        .await
    }

    /// Append creator names to the exclusion list
    pub async fn add_exclusions(&self, session_id: Uuid, names: Vec<String>) -> Result<Session> {
        self.with_session(session_id, |session| {
            session.excluded_artists.extend(names);
        })
        .await
    }

    /// Replace the seed lists with their resolved forms.
    ///
    /// Touches only the seed fields, so a refinement landing between the
    /// resolver's read and this write-back survives.
    pub async fn replace_seeds(
        &self,
        session_id: Uuid,
        seed_artists: Vec<Seed>,
        seed_tracks: Vec<Seed>,
    ) -> Result<Session> {
        self.with_session(session_id, |session| {
            session.seed_artists = seed_artists;
            session.seed_tracks = seed_tracks;
        })
        .await
    }

    /// Replace tag preferences (last-write-wins)
    pub async fn set_tag_preferences(
        &self,
        session_id: Uuid,
        preferred: Vec<String>,
        avoided: Vec<String>,
    ) -> Result<Session> {
        self.with_session(session_id, |session| {
            session.preferred_tags = preferred;
            session.avoided_tags = avoided;
        })
        .await
    }

    /// Replace the diversity setting (last-write-wins)
    pub async fn set_diversity(
        &self,
        session_id: Uuid,
        diversity: crate::models::Diversity,
    ) -> Result<Session> {
        self.with_session(session_id, |session| {
            session.diversity = diversity;
        })
        .await
    }

    /// Store a pipeline result into the session.
    ///
    /// A late result for a session deleted mid-flight lands on NotFound
    /// here and is simply discarded by the caller.
    pub async fn store_result(&self, session_id: Uuid, result: CurationResult) -> Result<Session> {
        self.with_session(session_id, |session| {
            session.result = Some(result);
        })
        .await
    }

    /// Explicitly destroy a session; aborts its eviction timer.
    ///
    /// In-flight external calls issued on the session's behalf are not
    /// cancelled; their results are discarded on write-back.
    pub async fn delete(&self, session_id: Uuid) -> Result<()> {
        let removed = self.sessions.write().await.remove(&session_id);
        if let Some(handle) = self.eviction_tasks.write().await.remove(&session_id) {
            handle.abort();
        }
        match removed {
            Some(_) => {
                tracing::info!(session_id = %session_id, "Session deleted");
                Ok(())
            }
            None => Err(Error::NotFound(format!("session {}", session_id))),
        }
    }

    /// Non-expired sessions, for diagnostics
    pub async fn list_active(&self) -> Vec<Session> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| !self.is_expired(session))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Diversity;

    fn store(ttl_ms: u64) -> SessionStore {
        SessionStore::new(Duration::from_millis(ttl_ms))
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = store(60_000);
        let session = store.create(SessionMode::Discover).await;

        let fetched = store.get(session.session_id).await.unwrap();
        assert_eq!(fetched.session_id, session.session_id);
        assert_eq!(fetched.mode, SessionMode::Discover);
    }

    #[tokio::test]
    async fn test_get_unknown_is_absent() {
        let store = store(60_000);
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_absent_on_read() {
        let store = store(50);
        let session = store.create(SessionMode::Discover).await;

        tokio::time::sleep(Duration::from_millis(80)).await;

        // Expired even though no sweep may have run; lazy eviction on read
        assert!(store.get(session.session_id).await.is_none());
    }

    #[tokio::test]
    async fn test_deferred_eviction_frees_entry() {
        let store = store(50);
        let session = store.create(SessionMode::Discover).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        // Timer task removed the entry without any read
        assert!(store.sessions.read().await.get(&session.session_id).is_none());
    }

    #[tokio::test]
    async fn test_mutator_on_unknown_id_is_not_found() {
        let store = store(60_000);
        let err = store
            .add_seed_artists(Uuid::new_v4(), vec!["Autechre".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mutator_on_expired_id_is_not_found() {
        let store = store(50);
        let session = store.create(SessionMode::Discover).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let err = store
            .set_diversity(session.session_id, Diversity::Diverse)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seed_lists_are_append_only() {
        let store = store(60_000);
        let session = store.create(SessionMode::Mixed).await;

        store
            .add_seed_artists(session.session_id, vec!["Autechre".into()])
            .await
            .unwrap();
        let updated = store
            .add_seed_artists(session.session_id, vec!["Plaid".into()])
            .await
            .unwrap();

        let names: Vec<&str> = updated.seed_artists.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Autechre", "Plaid"]);
    }

    #[tokio::test]
    async fn test_replace_seeds_keeps_concurrent_refinements() {
        let store = store(60_000);
        let session = store.create(SessionMode::Discover).await;
        store
            .add_seed_artists(session.session_id, vec!["Autechre".into()])
            .await
            .unwrap();

        // Refinement landing between a resolver's read and its write-back
        store
            .add_exclusions(session.session_id, vec!["Nickelback".into()])
            .await
            .unwrap();

        let resolved = vec![Seed {
            name: "Autechre".into(),
            canonical_id: Some("mbid-ae".into()),
            resolved_artist: Some("Autechre".into()),
            tags: Vec::new(),
        }];
        let updated = store
            .replace_seeds(session.session_id, resolved, Vec::new())
            .await
            .unwrap();

        assert!(updated.seed_artists[0].is_resolved());
        assert_eq!(updated.excluded_artists, vec!["Nickelback"]);
    }

    #[tokio::test]
    async fn test_refinements_last_write_wins() {
        let store = store(60_000);
        let session = store.create(SessionMode::Discover).await;

        store
            .set_tag_preferences(session.session_id, vec!["idm".into()], vec![])
            .await
            .unwrap();
        let updated = store
            .set_tag_preferences(session.session_id, vec!["ambient".into()], vec!["metal".into()])
            .await
            .unwrap();

        assert_eq!(updated.preferred_tags, vec!["ambient"]);
        assert_eq!(updated.avoided_tags, vec!["metal"]);
    }

    #[tokio::test]
    async fn test_update_touches_timestamp() {
        let store = store(60_000);
        let session = store.create(SessionMode::Discover).await;
        let before = session.updated_at;

        tokio::time::sleep(Duration::from_millis(10)).await;
        let updated = store.update(session).await.unwrap();
        assert!(updated.updated_at > before);
    }

    #[tokio::test]
    async fn test_delete_then_not_found() {
        let store = store(60_000);
        let session = store.create(SessionMode::Discover).await;

        store.delete(session.session_id).await.unwrap();
        assert!(store.get(session.session_id).await.is_none());
        assert!(store.delete(session.session_id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_active_skips_expired() {
        let store = store(50);
        store.create(SessionMode::Discover).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        // Expired session not listed even before its timer fires
        assert!(store.list_active().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sessions_are_independent() {
        let store = store(60_000);
        let a = store.create(SessionMode::Discover).await;
        let b = store.create(SessionMode::FromLibrary).await;

        store
            .add_seed_artists(a.session_id, vec!["Autechre".into()])
            .await
            .unwrap();

        let b_after = store.get(b.session_id).await.unwrap();
        assert!(b_after.seed_artists.is_empty());
    }
}
