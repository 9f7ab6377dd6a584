//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::models::{Job, JobListParams, JobPatch, NewJob, ReorderRequest};
use crate::jobs::repository::{create_job, delete_job, get_job, list_jobs, reorder_job, update_job};
use crate::state::AppState;
use crate::store::pagination::Page;

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<Json<Page<Job>>, AppError> {
    state.network.read().await;
    let store = state.store.read().await;
    Ok(Json(list_jobs(&store, &params)))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    state.network.read().await;
    let store = state.store.read().await;
    Ok(Json(get_job(&store, id)?))
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    let job = create_job(&mut store, req)?;
    info!("Created job {} '{}' at position {}", job.id, job.title, job.order);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PATCH /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<Job>, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    Ok(Json(update_job(&mut store, id, &patch)?))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    delete_job(&mut store, id)?;
    info!("Deleted job {id} with its candidates and assessments");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/jobs/:id/reorder
pub async fn handle_reorder_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReorderRequest>,
) -> Result<StatusCode, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    reorder_job(&mut store, id, req)?;
    info!(
        "Moved job {id} from position {} to {}",
        req.from_order, req.to_order
    );
    Ok(StatusCode::NO_CONTENT)
}
