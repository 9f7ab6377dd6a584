//! `TalentApi` over HTTP with reqwest.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use uuid::Uuid;

use crate::assessments::models::{
    Assessment, AssessmentDraft, AssessmentPatch, AssessmentSubmission, SubmitRequest,
};
use crate::candidates::models::{
    Candidate, CandidateListParams, CandidatePatch, NewCandidate, StageChange, TimelineEntry,
};
use crate::errors::NETWORK_ERROR_CODE;
use crate::jobs::models::{Job, JobListParams, JobPatch, NewJob, ReorderRequest};
use crate::store::pagination::Page;
use crate::sync::error::PersistError;
use crate::sync::remote::TalentApi;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, PersistError> {
        let response = request
            .send()
            .await
            .map_err(|e| PersistError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        debug!("Request failed with {status}: {body}");

        match envelope {
            Some(e) if e.error.code == NETWORK_ERROR_CODE => {
                Err(PersistError::Network(e.error.message))
            }
            envelope => {
                let message = envelope.map(|e| e.error.message).unwrap_or(body);
                if status.is_server_error() {
                    Err(PersistError::Server {
                        status: status.as_u16(),
                        message,
                    })
                } else {
                    Err(PersistError::Rejected {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, PersistError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| PersistError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TalentApi for HttpApi {
    async fn list_jobs(&self, params: &JobListParams) -> Result<Page<Job>, PersistError> {
        self.json(self.client.get(self.url("/jobs")).query(params))
            .await
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job, PersistError> {
        self.json(self.client.post(self.url("/jobs")).json(job)).await
    }

    async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Job, PersistError> {
        self.json(self.client.patch(self.url(&format!("/jobs/{id}"))).json(patch))
            .await
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), PersistError> {
        self.send(self.client.delete(self.url(&format!("/jobs/{id}"))))
            .await?;
        Ok(())
    }

    async fn reorder_job(&self, id: Uuid, request: ReorderRequest) -> Result<(), PersistError> {
        self.send(
            self.client
                .patch(self.url(&format!("/jobs/{id}/reorder")))
                .json(&request),
        )
        .await?;
        Ok(())
    }

    async fn list_candidates(
        &self,
        params: &CandidateListParams,
    ) -> Result<Page<Candidate>, PersistError> {
        self.json(self.client.get(self.url("/candidates")).query(params))
            .await
    }

    async fn create_candidate(&self, candidate: &NewCandidate) -> Result<Candidate, PersistError> {
        self.json(self.client.post(self.url("/candidates")).json(candidate))
            .await
    }

    async fn update_candidate(
        &self,
        id: Uuid,
        patch: &CandidatePatch,
    ) -> Result<Candidate, PersistError> {
        self.json(
            self.client
                .patch(self.url(&format!("/candidates/{id}")))
                .json(patch),
        )
        .await
    }

    async fn move_candidate(
        &self,
        id: Uuid,
        change: &StageChange,
    ) -> Result<Candidate, PersistError> {
        self.json(
            self.client
                .patch(self.url(&format!("/candidates/{id}/stage")))
                .json(change),
        )
        .await
    }

    async fn candidate_timeline(&self, id: Uuid) -> Result<Vec<TimelineEntry>, PersistError> {
        self.json(self.client.get(self.url(&format!("/candidates/{id}/timeline"))))
            .await
    }

    async fn list_assessments(&self, job_id: Uuid) -> Result<Vec<Assessment>, PersistError> {
        self.json(self.client.get(self.url(&format!("/assessments/{job_id}"))))
            .await
    }

    async fn create_assessment(
        &self,
        job_id: Uuid,
        draft: &AssessmentDraft,
    ) -> Result<Assessment, PersistError> {
        self.json(
            self.client
                .put(self.url(&format!("/assessments/{job_id}")))
                .json(draft),
        )
        .await
    }

    async fn update_assessment(
        &self,
        id: Uuid,
        patch: &AssessmentPatch,
    ) -> Result<Assessment, PersistError> {
        self.json(
            self.client
                .patch(self.url(&format!("/assessments/{id}")))
                .json(patch),
        )
        .await
    }

    async fn delete_assessment(&self, id: Uuid) -> Result<(), PersistError> {
        self.send(self.client.delete(self.url(&format!("/assessments/{id}"))))
            .await?;
        Ok(())
    }

    async fn submit_assessment(
        &self,
        id: Uuid,
        request: &SubmitRequest,
    ) -> Result<AssessmentSubmission, PersistError> {
        self.json(
            self.client
                .post(self.url(&format!("/assessments/{id}/submit")))
                .json(request),
        )
        .await
    }
}
