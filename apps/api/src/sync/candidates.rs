//! Candidate pipeline: the candidate collection behind the kanban board.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::candidates::models::{
    Candidate, CandidateListParams, CandidatePatch, Stage, StageChange, TimelineEntry,
};
use crate::candidates::pipeline::{
    group_by_stage, record_notes, timeline_newest_first, transition, DEFAULT_ACTOR,
};
use crate::sync::coordinator::{position_of, supersede, Coordinator, Entity, Mutation};
use crate::sync::error::PersistError;
use crate::sync::remote::{fetch_all, TalentApi, LOAD_PAGE_SIZE};

impl Entity for Candidate {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct CandidatePipeline {
    api: Arc<dyn TalentApi>,
    candidates: Coordinator<Candidate>,
}

impl CandidatePipeline {
    pub fn new(api: Arc<dyn TalentApi>) -> Self {
        Self {
            api,
            candidates: Coordinator::default(),
        }
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.candidates.snapshot()
    }

    pub fn candidate(&self, id: Uuid) -> Option<Candidate> {
        self.candidates.get(id)
    }

    /// Pulls every candidate, or only those applying to `job_id`.
    pub async fn load(&self, job_id: Option<Uuid>) -> Result<usize, PersistError> {
        let api = &self.api;
        let candidates = fetch_all(|page| {
            let params = CandidateListParams {
                job_id,
                page: Some(page),
                page_size: Some(LOAD_PAGE_SIZE),
                ..CandidateListParams::default()
            };
            async move { api.list_candidates(&params).await }
        })
        .await?;

        let count = candidates.len();
        self.candidates.replace_all(candidates).await;
        info!("Loaded {count} candidates");
        Ok(count)
    }

    /// Changes the stage and appends the matching timeline entry in one
    /// local update. Moving to the current stage does nothing.
    pub async fn move_to_stage(
        &self,
        id: Uuid,
        stage: Stage,
        actor: Option<&str>,
    ) -> Result<Candidate, PersistError> {
        let current = self
            .candidates
            .get(id)
            .ok_or(PersistError::UnknownEntity(id))?;
        if current.stage == stage {
            return Ok(current);
        }

        let mutation = MoveCandidate {
            api: self.api.as_ref(),
            id,
            change: StageChange {
                stage,
                actor: Some(actor.unwrap_or(DEFAULT_ACTOR).to_string()),
            },
        };
        self.candidates.mutate(&mutation).await
    }

    pub async fn update_notes(
        &self,
        id: Uuid,
        notes: &str,
        actor: Option<&str>,
    ) -> Result<Candidate, PersistError> {
        let mutation = UpdateNotes {
            api: self.api.as_ref(),
            id,
            patch: CandidatePatch {
                notes: Some(notes.to_string()),
                actor: Some(actor.unwrap_or(DEFAULT_ACTOR).to_string()),
                ..CandidatePatch::default()
            },
        };
        self.candidates.mutate(&mutation).await
    }

    /// Kanban columns for every stage.
    pub fn board(&self) -> BTreeMap<Stage, Vec<Candidate>> {
        group_by_stage(&self.candidates.snapshot())
    }

    pub fn timeline(&self, id: Uuid) -> Option<Vec<TimelineEntry>> {
        self.candidates.get(id).map(|c| timeline_newest_first(&c))
    }
}

struct MoveCandidate<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
    change: StageChange,
}

#[async_trait]
impl<'a> Mutation<Candidate> for MoveCandidate<'a> {
    type Output = Candidate;

    fn label(&self) -> String {
        format!("move candidate {} to {}", self.id, self.change.stage)
    }

    fn apply(&self, items: &[Candidate]) -> Result<Vec<Candidate>, PersistError> {
        let mut next = items.to_vec();
        let index = position_of(&next, self.id)?;
        let actor = self.change.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
        transition(&mut next[index], self.change.stage, actor, Utc::now());
        Ok(next)
    }

    async fn persist(&self) -> Result<Candidate, PersistError> {
        self.api.move_candidate(self.id, &self.change).await
    }

    fn reconcile(&self, items: &mut Vec<Candidate>, output: &Candidate) {
        supersede(items, self.id, output.clone());
    }
}

struct UpdateNotes<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
    patch: CandidatePatch,
}

#[async_trait]
impl<'a> Mutation<Candidate> for UpdateNotes<'a> {
    type Output = Candidate;

    fn label(&self) -> String {
        format!("update notes for candidate {}", self.id)
    }

    fn apply(&self, items: &[Candidate]) -> Result<Vec<Candidate>, PersistError> {
        let mut next = items.to_vec();
        let index = position_of(&next, self.id)?;
        let notes = self.patch.notes.as_deref().unwrap_or_default();
        let actor = self.patch.actor.as_deref().unwrap_or(DEFAULT_ACTOR);
        record_notes(&mut next[index], notes, actor, Utc::now());
        Ok(next)
    }

    async fn persist(&self) -> Result<Candidate, PersistError> {
        self.api.update_candidate(self.id, &self.patch).await
    }

    fn reconcile(&self, items: &mut Vec<Candidate>, output: &Candidate) {
        supersede(items, self.id, output.clone());
    }
}
