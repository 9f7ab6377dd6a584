//! Assessment library: one job's assessments plus the submit path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::assessments::engine::AssessmentRuntime;
use crate::assessments::models::{
    Assessment, AssessmentDraft, AssessmentPatch, AssessmentSubmission, ResponseSet,
    SubmitRequest,
};
use crate::sync::coordinator::{position_of, supersede, Coordinator, Entity, Mutation};
use crate::sync::error::PersistError;
use crate::sync::remote::TalentApi;

impl Entity for Assessment {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct AssessmentLibrary {
    api: Arc<dyn TalentApi>,
    job_id: Uuid,
    assessments: Coordinator<Assessment>,
}

impl AssessmentLibrary {
    pub fn new(api: Arc<dyn TalentApi>, job_id: Uuid) -> Self {
        Self {
            api,
            job_id,
            assessments: Coordinator::default(),
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn assessments(&self) -> Vec<Assessment> {
        self.assessments.snapshot()
    }

    pub fn assessment(&self, id: Uuid) -> Option<Assessment> {
        self.assessments.get(id)
    }

    pub async fn load(&self) -> Result<usize, PersistError> {
        let assessments = self.api.list_assessments(self.job_id).await?;
        let count = assessments.len();
        self.assessments.replace_all(assessments).await;
        info!("Loaded {count} assessments for job {}", self.job_id);
        Ok(count)
    }

    pub async fn create(&self, draft: AssessmentDraft) -> Result<Assessment, PersistError> {
        let mutation = CreateAssessment {
            api: self.api.as_ref(),
            job_id: self.job_id,
            temp_id: Uuid::new_v4(),
            draft,
        };
        self.assessments.mutate(&mutation).await
    }

    pub async fn update(&self, id: Uuid, patch: AssessmentPatch) -> Result<Assessment, PersistError> {
        let mutation = UpdateAssessment {
            api: self.api.as_ref(),
            id,
            patch,
        };
        self.assessments.mutate(&mutation).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), PersistError> {
        let mutation = DeleteAssessment {
            api: self.api.as_ref(),
            id,
        };
        self.assessments.mutate(&mutation).await
    }

    /// Creates a copy titled "<title> (Copy)" with the same questions.
    pub async fn duplicate(&self, id: Uuid) -> Result<Assessment, PersistError> {
        let source = self
            .assessments
            .get(id)
            .ok_or(PersistError::UnknownEntity(id))?;
        self.create(AssessmentDraft {
            title: format!("{} (Copy)", source.title),
            questions: source.questions,
        })
        .await
    }

    /// A fresh runtime session over the assessment's current questions.
    pub fn start(&self, id: Uuid) -> Result<AssessmentRuntime, PersistError> {
        let assessment = self
            .assessments
            .get(id)
            .ok_or(PersistError::UnknownEntity(id))?;
        Ok(AssessmentRuntime::initialize(assessment.questions))
    }

    /// Sends a validated response set. Submissions are not part of the
    /// collection, so nothing is applied locally.
    pub async fn submit(
        &self,
        id: Uuid,
        candidate_id: Uuid,
        responses: ResponseSet,
    ) -> Result<AssessmentSubmission, PersistError> {
        let request = SubmitRequest {
            candidate_id,
            responses,
        };
        self.api.submit_assessment(id, &request).await
    }
}

struct CreateAssessment<'a> {
    api: &'a dyn TalentApi,
    job_id: Uuid,
    temp_id: Uuid,
    draft: AssessmentDraft,
}

#[async_trait]
impl<'a> Mutation<Assessment> for CreateAssessment<'a> {
    type Output = Assessment;

    fn label(&self) -> String {
        format!("create assessment '{}'", self.draft.title)
    }

    fn apply(&self, items: &[Assessment]) -> Result<Vec<Assessment>, PersistError> {
        let mut next = items.to_vec();
        next.push(self.draft.placeholder(self.temp_id, self.job_id, Utc::now()));
        Ok(next)
    }

    async fn persist(&self) -> Result<Assessment, PersistError> {
        self.api.create_assessment(self.job_id, &self.draft).await
    }

    fn reconcile(&self, items: &mut Vec<Assessment>, output: &Assessment) {
        supersede(items, self.temp_id, output.clone());
    }
}

struct UpdateAssessment<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
    patch: AssessmentPatch,
}

#[async_trait]
impl<'a> Mutation<Assessment> for UpdateAssessment<'a> {
    type Output = Assessment;

    fn label(&self) -> String {
        format!("update assessment {}", self.id)
    }

    fn apply(&self, items: &[Assessment]) -> Result<Vec<Assessment>, PersistError> {
        let mut next = items.to_vec();
        let index = position_of(&next, self.id)?;
        self.patch.apply_to(&mut next[index]);
        next[index].updated_at = Utc::now();
        Ok(next)
    }

    async fn persist(&self) -> Result<Assessment, PersistError> {
        self.api.update_assessment(self.id, &self.patch).await
    }

    fn reconcile(&self, items: &mut Vec<Assessment>, output: &Assessment) {
        supersede(items, self.id, output.clone());
    }
}

struct DeleteAssessment<'a> {
    api: &'a dyn TalentApi,
    id: Uuid,
}

#[async_trait]
impl<'a> Mutation<Assessment> for DeleteAssessment<'a> {
    type Output = ();

    fn label(&self) -> String {
        format!("delete assessment {}", self.id)
    }

    fn apply(&self, items: &[Assessment]) -> Result<Vec<Assessment>, PersistError> {
        let mut next = items.to_vec();
        next.remove(position_of(&next, self.id)?);
        Ok(next)
    }

    async fn persist(&self) -> Result<(), PersistError> {
        self.api.delete_assessment(self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessments::builder::{AssessmentBuilder, QuestionPatch};
    use crate::assessments::models::{
        Answer, ConditionOperator, ConditionalRule, QuestionKind,
    };
    use crate::candidates::models::NewCandidate;
    use crate::candidates::repository::create_candidate;
    use crate::jobs::models::NewJob;
    use crate::jobs::repository::create_job;
    use crate::store::Store;
    use crate::sync::local::testing::{backend, Backend};

    struct Fixture {
        api: Backend,
        job_id: Uuid,
        candidate_id: Uuid,
    }

    fn fixture() -> Fixture {
        let mut store = Store::new();
        let job = create_job(
            &mut store,
            NewJob {
                title: "Data Engineer".into(),
                ..NewJob::default()
            },
        )
        .unwrap();
        let candidate = create_candidate(
            &mut store,
            NewCandidate {
                name: "Edsger".into(),
                email: "edsger@example.com".into(),
                job_id: Some(job.id),
                ..NewCandidate::default()
            },
        )
        .unwrap();
        Fixture {
            api: backend(store),
            job_id: job.id,
            candidate_id: candidate.id,
        }
    }

    /// "Remote?" (Yes/No) followed by a timezone question shown on "Yes".
    fn draft() -> AssessmentDraft {
        let mut builder = AssessmentBuilder::new("Working style");
        let remote = builder.add_question();
        builder
            .update_question(
                remote,
                QuestionPatch {
                    prompt: Some("Remote?".into()),
                    options: Some(vec!["Yes".into(), "No".into()]),
                    ..QuestionPatch::default()
                },
            )
            .unwrap();
        let timezone = builder.add_question();
        builder
            .update_question(
                timezone,
                QuestionPatch {
                    kind: Some(QuestionKind::ShortText),
                    prompt: Some("Timezone".into()),
                    conditional: Some(ConditionalRule::new(
                        remote,
                        ConditionOperator::Equals,
                        "Yes",
                    )),
                    ..QuestionPatch::default()
                },
            )
            .unwrap();
        builder.validate_for_save().unwrap();
        builder.into_draft()
    }

    #[tokio::test]
    async fn test_create_then_duplicate() {
        let f = fixture();
        let library = AssessmentLibrary::new(f.api.healthy.clone(), f.job_id);
        library.load().await.unwrap();

        let created = library.create(draft()).await.unwrap();
        let copy = library.duplicate(created.id).await.unwrap();
        assert_eq!(copy.title, "Working style (Copy)");
        assert_eq!(copy.questions, created.questions);
        assert_ne!(copy.id, created.id);

        let ids: Vec<Uuid> = library.assessments().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![created.id, copy.id]);
    }

    #[tokio::test]
    async fn test_rejected_create_rolls_back() {
        let f = fixture();
        let library = AssessmentLibrary::new(f.api.healthy.clone(), f.job_id);
        let err = library
            .create(AssessmentDraft {
                title: "Empty".into(),
                questions: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Please add at least one question");
        assert!(library.assessments().is_empty());
    }

    #[tokio::test]
    async fn test_failed_update_and_delete_roll_back() {
        let f = fixture();
        let healthy = AssessmentLibrary::new(f.api.healthy.clone(), f.job_id);
        let created = healthy.create(draft()).await.unwrap();

        let library = AssessmentLibrary::new(f.api.failing.clone(), f.job_id);
        assert_eq!(library.load().await.unwrap(), 1);
        let rename = AssessmentPatch {
            title: Some("Renamed".into()),
            ..AssessmentPatch::default()
        };
        assert!(library.update(created.id, rename).await.is_err());
        assert_eq!(library.assessments(), vec![created.clone()]);
        assert!(library.delete(created.id).await.is_err());
        assert_eq!(library.assessments(), vec![created]);
    }

    #[tokio::test]
    async fn test_runtime_session_submits_visible_answers() {
        let f = fixture();
        let library = AssessmentLibrary::new(f.api.healthy.clone(), f.job_id);
        let assessment = library.create(draft()).await.unwrap();
        let remote = assessment.questions[0].id;
        let timezone = assessment.questions[1].id;

        let mut runtime = library.start(assessment.id).unwrap();
        runtime.set_response(remote, Some(Answer::text("Yes"))).unwrap();
        runtime.set_response(timezone, Some(Answer::text("UTC+2"))).unwrap();
        runtime.set_response(remote, Some(Answer::text("No"))).unwrap();
        assert!(runtime.validate());

        let submission = library
            .submit(assessment.id, f.candidate_id, runtime.submit().unwrap())
            .await
            .unwrap();
        assert_eq!(submission.responses.len(), 1);
        assert_eq!(submission.responses[&remote], Answer::text("No"));
    }
}
