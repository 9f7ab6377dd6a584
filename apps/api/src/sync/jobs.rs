//! Jobs board: the ordered job collection and its optimistic mutations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::jobs::models::{Job, JobListParams, JobPatch, NewJob, ReorderRequest};
use crate::jobs::ordering::{close_gap, move_item, renumber, to_position};
use crate::sync::coordinator::{position_of, supersede, Coordinator, Entity, Mutation};
use crate::sync::error::PersistError;
use crate::sync::remote::{fetch_all, TalentApi, LOAD_PAGE_SIZE};

impl Entity for Job {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Every job, active and archived, in board order.
pub struct JobBoard {
    api: Arc<dyn TalentApi>,
    jobs: Coordinator<Job>,
}

impl JobBoard {
    pub fn new(api: Arc<dyn TalentApi>) -> Self {
        Self {
            api,
            jobs: Coordinator::default(),
        }
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.snapshot()
    }

    pub fn job(&self, id: Uuid) -> Option<Job> {
        self.jobs.get(id)
    }

    pub fn version(&self) -> u64 {
        self.jobs.version()
    }

    pub async fn load(&self) -> Result<usize, PersistError> {
        let api = &self.api;
        let mut jobs = fetch_all(|page| {
            let params = JobListParams {
                status: Some("all".to_string()),
                page: Some(page),
                page_size: Some(LOAD_PAGE_SIZE),
                ..JobListParams::default()
            };
            async move { api.list_jobs(&params).await }
        })
        .await?;
        jobs.sort_by_key(|j| j.order);

        let count = jobs.len();
        self.jobs.replace_all(jobs).await;
        info!("Loaded {count} jobs");
        Ok(count)
    }

    /// Shows a placeholder at the end of the board until the server's
    /// record (real id, slug and order) replaces it.
    pub async fn create(&self, job: NewJob) -> Result<Job, PersistError> {
        let mutation = CreateJob {
            api: self.api.as_ref(),
            temp_id: Uuid::new_v4(),
            job,
        };
        self.jobs.mutate(&mutation).await
    }

    pub async fn update(&self, id: Uuid, patch: JobPatch) -> Result<Job, PersistError> {
        let mutation = UpdateJob {
            api: self.api.as_ref(),
            id,
            patch,
        };
        self.jobs.mutate(&mutation).await
    }

    pub async fn toggle_archive(&self, id: Uuid) -> Result<Job, PersistError> {
        let job = self.jobs.get(id).ok_or(PersistError::UnknownEntity(id))?;
        self.update(id, JobPatch::status(job.status.toggled())).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        let mutation = DeleteJob {
            api: self.api.as_ref(),
            id,
        };
        self.jobs.mutate(&mutation).await
    }

    /// Drag-and-drop move by 0-based board index.
    pub async fn reorder(&self, from_index: usize, to_index: usize) -> Result<(), PersistError> {
        let jobs = self.jobs.snapshot();
        let len = jobs.len();
        for index in [from_index, to_index] {
            if index >= len {
                return Err(PersistError::OutOfRange { index, len });
            }
        }
        if from_index == to_index {
            return Ok(());
        }

        let mutation = ReorderJob {
            api: self.api.as_ref(),
            id: jobs[from_index].id,
            from_index,
            to_index,
        };
        self.jobs.mutate(&mutation).await
    }
}

struct CreateJob<'a> {
    api: &'a dyn TalentApi,
    temp_id: Uuid,
    job: NewJob,
}

#[async_trait]
impl<'a> Mutation<Job> for CreateJob<'a> {
    type Output = Job;

    fn label(&self) -> String {
        format!("create job '{}'", self.job.title)
    }

    fn apply(&self, items: &[Job]) -> Result<Vec<Job>, PersistError> {
        let mut next = items.to_vec();
        let order = items.iter().map(|j| j.order).max().unwrap_or(0) + 1;
        next.push(Job {
            order,
            ..self.job.placeholder(self.temp_id, Utc::now())
        });
        Ok(next)
    }

    async fn persist(&self) -> Result<Job, PersistError> {
        self.api.create_job(&self.job).await
    }

    fn reconcile(&self, items: &mut Vec<Job>, output: &Job) {
        supersede(items, self.temp_id, output.clone());
    }
}

struct UpdateJob<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
    patch: JobPatch,
}

#[async_trait]
impl<'a> Mutation<Job> for UpdateJob<'a> {
    type Output = Job;

    fn label(&self) -> String {
        format!("update job {}", self.id)
    }

    fn apply(&self, items: &[Job]) -> Result<Vec<Job>, PersistError> {
        let mut next = items.to_vec();
        let index = position_of(&next, self.id)?;
        self.patch.apply_to(&mut next[index]);
        next[index].updated_at = Utc::now();
        Ok(next)
    }

    async fn persist(&self) -> Result<Job, PersistError> {
        self.api.update_job(self.id, &self.patch).await
    }

    fn reconcile(&self, items: &mut Vec<Job>, output: &Job) {
        supersede(items, self.id, output.clone());
    }
}

struct DeleteJob<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
}

#[async_trait]
impl<'a> Mutation<Job> for DeleteJob<'a> {
    type Output = ();

    fn label(&self) -> String {
        format!("delete job {}", self.id)
    }

    fn apply(&self, items: &[Job]) -> Result<Vec<Job>, PersistError> {
        let mut next = items.to_vec();
        let removed = next.remove(position_of(&next, self.id)?);
        close_gap(&mut next, removed.order);
        Ok(next)
    }

    async fn persist(&self) -> Result<(), PersistError> {
        self.api.delete_job(self.id).await
    }
}

struct ReorderJob<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
    from_index: usize,
    to_index: usize,
}

impl ReorderJob<'_> {
    /// The server speaks 1-based positions.
    fn request(&self) -> ReorderRequest {
        ReorderRequest {
            from_order: to_position(self.from_index),
            to_order: to_position(self.to_index),
        }
    }
}

#[async_trait]
impl<'a> Mutation<Job> for ReorderJob<'a> {
    type Output = ();

    fn label(&self) -> String {
        let request = self.request();
        format!(
            "move job {} from {} to {}",
            self.id, request.from_order, request.to_order
        )
    }

    fn apply(&self, items: &[Job]) -> Result<Vec<Job>, PersistError> {
        let mut next = items.to_vec();
        let len = next.len();
        if self.to_index >= len {
            return Err(PersistError::OutOfRange {
                index: self.to_index,
                len,
            });
        }
        if position_of(&next, self.id)? != self.from_index {
            return Err(PersistError::UnknownEntity(self.id));
        }
        move_item(&mut next, self.from_index, self.to_index);
        renumber(&mut next);
        Ok(next)
    }

    async fn persist(&self) -> Result<(), PersistError> {
        self.api.reorder_job(self.id, self.request()).await
    }
}
