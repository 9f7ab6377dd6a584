//! Axum route handlers for the Assessments API.
//!
//! `GET` and `PUT` on `/api/assessments/:id` take a job id; `PATCH` and
//! `DELETE` take an assessment id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::assessments::models::{
    Assessment, AssessmentDraft, AssessmentPatch, AssessmentSubmission, SubmitRequest,
};
use crate::assessments::repository::{
    create_assessment, delete_assessment, list_for_job, record_submission, update_assessment,
};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/assessments/:jobId
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<Assessment>>, AppError> {
    state.network.read().await;
    let store = state.store.read().await;
    Ok(Json(list_for_job(&store, job_id)))
}

/// PUT /api/assessments/:jobId
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(draft): Json<AssessmentDraft>,
) -> Result<(StatusCode, Json<Assessment>), AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    let assessment = create_assessment(&mut store, job_id, &draft)?;
    info!(
        "Created assessment {} '{}' for job {job_id} with {} question(s)",
        assessment.id,
        assessment.title,
        assessment.questions.len()
    );
    Ok((StatusCode::CREATED, Json(assessment)))
}

/// PATCH /api/assessments/:id
pub async fn handle_update_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AssessmentPatch>,
) -> Result<Json<Assessment>, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    Ok(Json(update_assessment(&mut store, id, &patch)?))
}

/// DELETE /api/assessments/:id
pub async fn handle_delete_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    delete_assessment(&mut store, id)?;
    info!("Deleted assessment {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/assessments/:id/submit
pub async fn handle_submit_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<AssessmentSubmission>), AppError> {
    state.network.write().await?;
    let mut store = state.store.write().await;
    let submission = record_submission(&mut store, id, req)?;
    info!(
        "Recorded submission {} from candidate {} for assessment {id}",
        submission.id, submission.candidate_id
    );
    Ok((StatusCode::CREATED, Json(submission)))
}
