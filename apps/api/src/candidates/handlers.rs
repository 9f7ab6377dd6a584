//! Axum route handlers for the Candidates API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::candidates::models::{
    Candidate, CandidateListParams, CandidatePatch, NewCandidate, StageChange, TimelineEntry,
};
use crate::candidates::repository::{
    candidate_timeline, create_candidate, get_candidate, list_candidates, move_candidate,
    update_candidate,
};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::pagination::Page;

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<CandidateListParams>,
) -> Result<Json<Page<Candidate>>, AppError> {
    state.network.read().await;
    let store = state.store.read().await;
    Ok(Json(list_candidates(&store, &params)))
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidate>, AppError> {
    state.network.read().await;
    let store = state.store.read().await;
    Ok(Json(get_candidate(&store, id)?))
}

/// POST /api/candidates
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    Json(req): Json<NewCandidate>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    let candidate = create_candidate(&mut store, req)?;
    info!("Created candidate {} ({})", candidate.id, candidate.email);
    Ok((StatusCode::CREATED, Json(candidate)))
}

/// PATCH /api/candidates/:id
pub async fn handle_update_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CandidatePatch>,
) -> Result<Json<Candidate>, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    Ok(Json(update_candidate(&mut store, id, &patch)?))
}

/// PATCH /api/candidates/:id/stage
pub async fn handle_move_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StageChange>,
) -> Result<Json<Candidate>, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    let candidate = move_candidate(&mut store, id, req.stage, req.actor.as_deref())?;
    info!("Moved candidate {id} to {}", candidate.stage);
    Ok(Json(candidate))
}

/// GET /api/candidates/:id/timeline
pub async fn handle_candidate_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEntry>>, AppError> {
    state.network.read().await;
    let store = state.store.read().await;
    Ok(Json(candidate_timeline(&store, id)?))
}
