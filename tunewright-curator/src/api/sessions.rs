//! Session API handlers
//!
//! Thin boundary for the four host operations: begin, refine (seeds and
//! preferences), curate (runs the pipeline), inspect. Handlers only decode
//! arguments and map errors; all semantics live in the services.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{CurationResult, Diversity, Session, SessionMode};
use crate::AppState;

/// POST /session request
#[derive(Debug, Deserialize)]
pub struct BeginSessionRequest {
    pub mode: SessionMode,
    #[serde(default)]
    pub diversity: Option<Diversity>,
}

/// POST /session/:id/refine request; all fields optional, seeds append
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefineSessionRequest {
    pub seed_artists: Vec<String>,
    pub seed_tracks: Vec<String>,
    pub exclude_artists: Vec<String>,
    pub preferred_tags: Option<Vec<String>>,
    pub avoided_tags: Option<Vec<String>>,
    pub diversity: Option<Diversity>,
}

/// POST /session/:id/curate request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CurateRequest {
    /// Desired playlist length; service default when omitted
    pub limit: Option<usize>,
}

/// GET /sessions response
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
}

/// POST /session — begin a conversation
pub async fn begin_session(
    State(state): State<AppState>,
    Json(request): Json<BeginSessionRequest>,
) -> ApiResult<Json<Session>> {
    let session = state.store.create(request.mode).await;

    let session = match request.diversity {
        Some(diversity) => state
            .store
            .set_diversity(session.session_id, diversity)
            .await
            .map_err(ApiError::from)?,
        None => session,
    };

    Ok(Json(session))
}

/// POST /session/:id/refine — extend with seeds/preferences
pub async fn refine_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<RefineSessionRequest>,
) -> ApiResult<Json<Session>> {
    let store = &state.store;

    if !request.seed_artists.is_empty() {
        store
            .add_seed_artists(session_id, request.seed_artists)
            .await?;
    }
    if !request.seed_tracks.is_empty() {
        store
            .add_seed_tracks(session_id, request.seed_tracks)
            .await?;
    }
    if !request.exclude_artists.is_empty() {
        store
            .add_exclusions(session_id, request.exclude_artists)
            .await?;
    }
    if request.preferred_tags.is_some() || request.avoided_tags.is_some() {
        // Fetch current values so one list can change without the other
        let current = store
            .get(session_id)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("session {}", session_id)))?;
        store
            .set_tag_preferences(
                session_id,
                request.preferred_tags.unwrap_or(current.preferred_tags),
                request.avoided_tags.unwrap_or(current.avoided_tags),
            )
            .await?;
    }
    if let Some(diversity) = request.diversity {
        store.set_diversity(session_id, diversity).await?;
    }

    let session = store
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("session {}", session_id)))?;
    Ok(Json(session))
}

/// POST /session/:id/curate — run the full pipeline
pub async fn curate_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CurateRequest>,
) -> ApiResult<Json<CurationResult>> {
    let limit = request.limit.unwrap_or(state.default_playlist_length);
    if limit == 0 {
        return Err(ApiError::BadRequest("limit must be positive".to_string()));
    }

    let result = state.pipeline.run(session_id, limit).await?;
    Ok(Json(result))
}

/// GET /session/:id — inspect/export
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Session>> {
    state
        .store
        .get(session_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session {}", session_id)))
}

/// DELETE /session/:id — explicit destroy
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    state.store.delete(session_id).await?;
    Ok(Json(serde_json::json!({ "deleted": session_id })))
}

/// GET /sessions — active session diagnostics
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.store.list_active().await,
    })
}

/// Build session routes
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(begin_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/refine", post(refine_session))
        .route("/session/:id/curate", post(curate_session))
        .route("/sessions", get(list_sessions))
}
