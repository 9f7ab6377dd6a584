use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus record counts and the active write failure rate. Bypasses
/// the network simulator.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "talentflow-api",
        "records": {
            "jobs": store.jobs.len(),
            "candidates": store.candidates.len(),
            "assessments": store.assessments.len(),
            "submissions": store.submissions.len(),
        },
        "writeFailureRate": state.network.failure_rate(),
    }))
}
