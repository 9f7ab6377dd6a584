use async_trait::async_trait;
use uuid::Uuid;

use crate::assessments::models::{
    Assessment, AssessmentDraft, AssessmentPatch, AssessmentSubmission, SubmitRequest,
};
use crate::candidates::models::{
    Candidate, CandidateListParams, CandidatePatch, NewCandidate, StageChange, TimelineEntry,
};
use crate::jobs::models::{Job, JobListParams, JobPatch, NewJob, ReorderRequest};
use crate::store::pagination::Page;
use crate::sync::error::PersistError;

/// The REST surface as seen by the client collections.
///
/// Implemented over HTTP by [`HttpApi`](crate::sync::http::HttpApi) and
/// in-process by [`LocalApi`](crate::sync::local::LocalApi).
#[async_trait]
pub trait TalentApi: Send + Sync {
    async fn list_jobs(&self, params: &JobListParams) -> Result<Page<Job>, PersistError>;
    async fn create_job(&self, job: &NewJob) -> Result<Job, PersistError>;
    async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Job, PersistError>;
    async fn delete_job(&self, id: Uuid) -> Result<(), PersistError>;
    async fn reorder_job(&self, id: Uuid, request: ReorderRequest) -> Result<(), PersistError>;

    async fn list_candidates(
        &self,
        params: &CandidateListParams,
    ) -> Result<Page<Candidate>, PersistError>;
    async fn create_candidate(&self, candidate: &NewCandidate) -> Result<Candidate, PersistError>;
    async fn update_candidate(
        &self,
        id: Uuid,
        patch: &CandidatePatch,
    ) -> Result<Candidate, PersistError>;
    async fn move_candidate(&self, id: Uuid, change: &StageChange)
        -> Result<Candidate, PersistError>;
    async fn candidate_timeline(&self, id: Uuid) -> Result<Vec<TimelineEntry>, PersistError>;

    async fn list_assessments(&self, job_id: Uuid) -> Result<Vec<Assessment>, PersistError>;
    async fn create_assessment(
        &self,
        job_id: Uuid,
        draft: &AssessmentDraft,
    ) -> Result<Assessment, PersistError>;
    async fn update_assessment(
        &self,
        id: Uuid,
        patch: &AssessmentPatch,
    ) -> Result<Assessment, PersistError>;
    async fn delete_assessment(&self, id: Uuid) -> Result<(), PersistError>;
    async fn submit_assessment(
        &self,
        id: Uuid,
        request: &SubmitRequest,
    ) -> Result<AssessmentSubmission, PersistError>;
}

/// Page size used when a client pulls a whole collection.
pub const LOAD_PAGE_SIZE: usize = 100;

/// Walks every page of a list endpoint.
pub async fn fetch_all<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, PersistError>
where
    F: FnMut(usize) -> Fut,
    Fut: std::future::Future<Output = Result<Page<T>, PersistError>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let Page { data, pagination } = fetch_page(page).await?;
        items.extend(data);
        if page >= pagination.total_pages {
            return Ok(items);
        }
        page += 1;
    }
}
