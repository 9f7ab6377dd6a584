//! `TalentApi` served in-process from an [`AppState`].
//!
//! Runs the same repository code and network simulator as the HTTP
//! handlers, without a socket in between. This is the shape the mock API
//! takes when the board runs entirely on one machine.

use async_trait::async_trait;
use uuid::Uuid;

use crate::assessments::models::{
    Assessment, AssessmentDraft, AssessmentPatch, AssessmentSubmission, SubmitRequest,
};
use crate::assessments::repository as assessments;
use crate::candidates::models::{
    Candidate, CandidateListParams, CandidatePatch, NewCandidate, StageChange, TimelineEntry,
};
use crate::candidates::repository as candidates;
use crate::errors::AppError;
use crate::jobs::models::{Job, JobListParams, JobPatch, NewJob, ReorderRequest};
use crate::jobs::repository as jobs;
use crate::state::AppState;
use crate::store::pagination::Page;
use crate::sync::error::PersistError;
use crate::sync::remote::TalentApi;

#[derive(Clone)]
pub struct LocalApi {
    state: AppState,
}

impl LocalApi {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

impl From<AppError> for PersistError {
    fn from(err: AppError) -> Self {
        let rejected = |status: u16, message: String| PersistError::Rejected { status, message };
        match err {
            AppError::Network => PersistError::Network(err.to_string()),
            AppError::Internal(_) => PersistError::Server {
                status: 500,
                message: err.to_string(),
            },
            AppError::NotFound(msg) => rejected(404, msg),
            AppError::Validation(msg) => rejected(400, msg),
            AppError::Conflict(msg) => rejected(409, msg),
            AppError::InvalidSubmission(_) => rejected(422, err.to_string()),
        }
    }
}

#[async_trait]
impl TalentApi for LocalApi {
    async fn list_jobs(&self, params: &JobListParams) -> Result<Page<Job>, PersistError> {
        self.state.network.read().await;
        let store = self.state.store.read().await;
        Ok(jobs::list_jobs(&store, params))
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(jobs::create_job(&mut store, job.clone())?)
    }

    async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Job, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(jobs::update_job(&mut store, id, patch)?)
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(jobs::delete_job(&mut store, id)?)
    }

    async fn reorder_job(&self, id: Uuid, request: ReorderRequest) -> Result<(), PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(jobs::reorder_job(&mut store, id, request)?)
    }

    async fn list_candidates(
        &self,
        params: &CandidateListParams,
    ) -> Result<Page<Candidate>, PersistError> {
        self.state.network.read().await;
        let store = self.state.store.read().await;
        Ok(candidates::list_candidates(&store, params))
    }

    async fn create_candidate(&self, candidate: &NewCandidate) -> Result<Candidate, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(candidates::create_candidate(&mut store, candidate.clone())?)
    }

    async fn update_candidate(
        &self,
        id: Uuid,
        patch: &CandidatePatch,
    ) -> Result<Candidate, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(candidates::update_candidate(&mut store, id, patch)?)
    }

    async fn move_candidate(
        &self,
        id: Uuid,
        change: &StageChange,
    ) -> Result<Candidate, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(candidates::move_candidate(
            &mut store,
            id,
            change.stage,
            change.actor.as_deref(),
        )?)
    }

    async fn candidate_timeline(&self, id: Uuid) -> Result<Vec<TimelineEntry>, PersistError> {
        self.state.network.read().await;
        let store = self.state.store.read().await;
        Ok(candidates::candidate_timeline(&store, id)?)
    }

    async fn list_assessments(&self, job_id: Uuid) -> Result<Vec<Assessment>, PersistError> {
        self.state.network.read().await;
        let store = self.state.store.read().await;
        Ok(assessments::list_for_job(&store, job_id))
    }

    async fn create_assessment(
        &self,
        job_id: Uuid,
        draft: &AssessmentDraft,
    ) -> Result<Assessment, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(assessments::create_assessment(&mut store, job_id, draft)?)
    }

    async fn update_assessment(
        &self,
        id: Uuid,
        patch: &AssessmentPatch,
    ) -> Result<Assessment, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(assessments::update_assessment(&mut store, id, patch)?)
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<(), PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(assessments::delete_assessment(&mut store, id)?)
    }

    async fn submit_assessment(
        &self,
        id: Uuid,
        request: &SubmitRequest,
    ) -> Result<AssessmentSubmission, PersistError> {
        self.state.network.write().await?;
        let mut store = self.state.store.write().await;
        Ok(assessments::record_submission(&mut store, id, request.clone())?)
    }
}
