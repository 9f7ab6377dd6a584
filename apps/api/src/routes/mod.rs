pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::assessments::handlers as assessments;
use crate::candidates::handlers as candidates;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/api/jobs/:id/reorder", patch(jobs::handle_reorder_job))
        // Candidates
        .route(
            "/api/candidates",
            get(candidates::handle_list_candidates).post(candidates::handle_create_candidate),
        )
        .route(
            "/api/candidates/:id",
            get(candidates::handle_get_candidate).patch(candidates::handle_update_candidate),
        )
        .route(
            "/api/candidates/:id/stage",
            patch(candidates::handle_move_candidate),
        )
        .route(
            "/api/candidates/:id/timeline",
            get(candidates::handle_candidate_timeline),
        )
        // Assessments: GET/PUT take a job id, PATCH/DELETE an assessment id
        .route(
            "/api/assessments/:id",
            get(assessments::handle_list_assessments)
                .put(assessments::handle_create_assessment)
                .patch(assessments::handle_update_assessment)
                .delete(assessments::handle_delete_assessment),
        )
        .route(
            "/api/assessments/:id/submit",
            post(assessments::handle_submit_assessment),
        )
        .with_state(state)
}
