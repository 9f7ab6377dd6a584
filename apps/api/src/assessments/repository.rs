use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::assessments::builder::check_structure;
use crate::assessments::engine::AssessmentRuntime;
use crate::assessments::models::{
    Assessment, AssessmentDraft, AssessmentPatch, AssessmentSubmission, SubmitRequest,
};
use crate::errors::AppError;
use crate::store::Store;

/// A job's assessments, oldest first.
pub fn list_for_job(store: &Store, job_id: Uuid) -> Vec<Assessment> {
    let mut assessments: Vec<Assessment> = store
        .assessments
        .iter()
        .filter(|a| a.job_id == job_id)
        .cloned()
        .collect();
    assessments.sort_by_key(|a| a.created_at);
    assessments
}

pub fn get_assessment(store: &Store, id: Uuid) -> Result<Assessment, AppError> {
    store
        .assessments
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))
}

pub fn create_assessment(
    store: &mut Store,
    job_id: Uuid,
    draft: &AssessmentDraft,
) -> Result<Assessment, AppError> {
    if !store.jobs.iter().any(|j| j.id == job_id) {
        return Err(AppError::NotFound(format!("Job {job_id} not found")));
    }
    check_structure(&draft.title, &draft.questions).map_err(AppError::Validation)?;

    let assessment = draft.placeholder(Uuid::new_v4(), job_id, Utc::now());
    store.assessments.push(assessment.clone());
    Ok(assessment)
}

/// Applies the patch to a copy first so a structurally invalid edit leaves
/// the stored assessment untouched.
pub fn update_assessment(
    store: &mut Store,
    id: Uuid,
    patch: &AssessmentPatch,
) -> Result<Assessment, AppError> {
    let stored = store
        .assessments
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;

    let mut updated = stored.clone();
    patch.apply_to(&mut updated);
    check_structure(&updated.title, &updated.questions).map_err(AppError::Validation)?;
    updated.updated_at = Utc::now();

    *stored = updated.clone();
    Ok(updated)
}

/// Deletes the assessment and every submission recorded against it.
pub fn delete_assessment(store: &mut Store, id: Uuid) -> Result<(), AppError> {
    let index = store
        .assessments
        .iter()
        .position(|a| a.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Assessment {id} not found")))?;
    store.assessments.remove(index);
    store.submissions.retain(|s| s.assessment_id != id);
    Ok(())
}

/// Replays the responses through the runtime against the stored questions.
/// Rejects the submission when any visible question fails validation and
/// stores only the answers to visible questions.
pub fn record_submission(
    store: &mut Store,
    id: Uuid,
    request: SubmitRequest,
) -> Result<AssessmentSubmission, AppError> {
    let assessment = get_assessment(store, id)?;
    if !store.candidates.iter().any(|c| c.id == request.candidate_id) {
        return Err(AppError::NotFound(format!(
            "Candidate {} not found",
            request.candidate_id
        )));
    }
    if let Some(stray) = request
        .responses
        .keys()
        .find(|qid| assessment.question(**qid).is_none())
    {
        return Err(AppError::Validation(format!(
            "question {stray} is not part of assessment {id}"
        )));
    }

    let mut runtime = AssessmentRuntime::initialize(assessment.questions.clone());
    for question in &assessment.questions {
        if let Some(answer) = request.responses.get(&question.id) {
            runtime
                .set_response(question.id, Some(answer.clone()))
                .map_err(anyhow::Error::from)?;
        }
    }
    if !runtime.validate() {
        let errors = runtime
            .errors()
            .iter()
            .map(|(qid, message)| (*qid, message.clone()))
            .collect();
        return Err(AppError::InvalidSubmission(errors));
    }
    let responses = runtime.submit().map_err(anyhow::Error::from)?;
    debug!(
        "Accepted {} of {} answers for assessment {id}",
        responses.len(),
        request.responses.len()
    );

    let submission = AssessmentSubmission {
        id: Uuid::new_v4(),
        assessment_id: id,
        candidate_id: request.candidate_id,
        responses,
        submitted_at: Utc::now(),
    };
    store.submissions.push(submission.clone());
    Ok(submission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessments::models::{
        Answer, ConditionOperator, ConditionalRule, Question, QuestionKind, ResponseSet,
    };
    use crate::candidates::models::NewCandidate;
    use crate::candidates::repository::create_candidate;
    use crate::jobs::models::NewJob;
    use crate::jobs::repository::{create_job, delete_job};

    struct Fixture {
        store: Store,
        job_id: Uuid,
        candidate_id: Uuid,
        relocate: Question,
        city: Question,
    }

    fn fixture() -> Fixture {
        let mut store = Store::new();
        let job = create_job(
            &mut store,
            NewJob {
                title: "Platform Engineer".into(),
                ..NewJob::default()
            },
        )
        .unwrap();
        let candidate = create_candidate(
            &mut store,
            NewCandidate {
                name: "Ada Lovelace".into(),
                email: "ada@example.com".into(),
                job_id: Some(job.id),
                ..NewCandidate::default()
            },
        )
        .unwrap();
        let relocate = Question::new(QuestionKind::SingleChoice, "Willing to relocate?")
            .with_options(&["Yes", "No"])
            .required();
        let city = Question::new(QuestionKind::ShortText, "Preferred city")
            .required()
            .shown_when(ConditionalRule::new(
                relocate.id,
                ConditionOperator::Equals,
                "Yes",
            ));
        Fixture {
            store,
            job_id: job.id,
            candidate_id: candidate.id,
            relocate,
            city,
        }
    }

    fn draft(f: &Fixture) -> AssessmentDraft {
        AssessmentDraft {
            title: "Logistics".into(),
            questions: vec![f.relocate.clone(), f.city.clone()],
        }
    }

    #[test]
    fn test_create_requires_job_and_structure() {
        let mut f = fixture();
        let d = draft(&f);
        let missing_job = create_assessment(&mut f.store, Uuid::new_v4(), &d);
        assert!(matches!(missing_job, Err(AppError::NotFound(_))));

        let untitled = AssessmentDraft {
            title: " ".into(),
            ..draft(&f)
        };
        let err = create_assessment(&mut f.store, f.job_id, &untitled).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "Please enter a title for the assessment"));

        let created = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        assert_eq!(list_for_job(&f.store, f.job_id), vec![created]);
    }

    #[test]
    fn test_invalid_update_leaves_stored_copy() {
        let mut f = fixture();
        let d = draft(&f);
        let created = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        let patch = AssessmentPatch {
            questions: Some(vec![]),
            ..AssessmentPatch::default()
        };
        assert!(update_assessment(&mut f.store, created.id, &patch).is_err());
        assert_eq!(get_assessment(&f.store, created.id).unwrap(), created);

        let rename = AssessmentPatch {
            title: Some("Logistics v2".into()),
            ..AssessmentPatch::default()
        };
        let renamed = update_assessment(&mut f.store, created.id, &rename).unwrap();
        assert_eq!(renamed.title, "Logistics v2");
        assert_eq!(renamed.questions, created.questions);
    }

    #[test]
    fn test_submission_drops_hidden_answers() {
        let mut f = fixture();
        let d = draft(&f);
        let assessment = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        let mut responses = ResponseSet::new();
        responses.insert(f.relocate.id, Answer::text("No"));
        responses.insert(f.city.id, Answer::text("Lisbon"));

        let submission = record_submission(
            &mut f.store,
            assessment.id,
            SubmitRequest {
                candidate_id: f.candidate_id,
                responses,
            },
        )
        .unwrap();
        assert_eq!(submission.responses.len(), 1);
        assert!(!submission.responses.contains_key(&f.city.id));
        assert_eq!(f.store.submissions.len(), 1);
    }

    #[test]
    fn test_submission_rejects_missing_visible_answer() {
        let mut f = fixture();
        let d = draft(&f);
        let assessment = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        let mut responses = ResponseSet::new();
        responses.insert(f.relocate.id, Answer::text("Yes"));

        let err = record_submission(
            &mut f.store,
            assessment.id,
            SubmitRequest {
                candidate_id: f.candidate_id,
                responses,
            },
        )
        .unwrap_err();
        match err {
            AppError::InvalidSubmission(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.contains_key(&f.city.id));
            }
            other => panic!("expected InvalidSubmission, got {other:?}"),
        }
        assert!(f.store.submissions.is_empty());
    }

    #[test]
    fn test_submission_answering_only_unrelated_question() {
        let mut f = fixture();
        let remote = Question::new(QuestionKind::ShortText, "Why on-site?")
            .required()
            .shown_when(ConditionalRule::new(
                f.relocate.id,
                ConditionOperator::NotEquals,
                "Yes",
            ));
        let notes = Question::new(QuestionKind::ShortText, "Anything else?");
        let mut relocate = f.relocate.clone();
        relocate.required = false;
        let d = AssessmentDraft {
            title: "Logistics".into(),
            questions: vec![relocate, remote.clone(), notes.clone()],
        };
        let assessment = create_assessment(&mut f.store, f.job_id, &d).unwrap();

        let mut responses = ResponseSet::new();
        responses.insert(notes.id, Answer::text("hello"));
        let submission = record_submission(
            &mut f.store,
            assessment.id,
            SubmitRequest {
                candidate_id: f.candidate_id,
                responses,
            },
        )
        .unwrap();
        assert_eq!(submission.responses.len(), 1);
        assert!(submission.responses.contains_key(&notes.id));
    }

    #[test]
    fn test_submission_rejects_unknown_question_and_candidate() {
        let mut f = fixture();
        let d = draft(&f);
        let assessment = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        let mut responses = ResponseSet::new();
        responses.insert(Uuid::new_v4(), Answer::text("?"));
        let stray = record_submission(
            &mut f.store,
            assessment.id,
            SubmitRequest {
                candidate_id: f.candidate_id,
                responses: responses.clone(),
            },
        );
        assert!(matches!(stray, Err(AppError::Validation(_))));

        let nobody = record_submission(
            &mut f.store,
            assessment.id,
            SubmitRequest {
                candidate_id: Uuid::new_v4(),
                responses,
            },
        );
        assert!(matches!(nobody, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_deleting_job_removes_assessments_and_submissions() {
        let mut f = fixture();
        let d = draft(&f);
        let assessment = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        let mut responses = ResponseSet::new();
        responses.insert(f.relocate.id, Answer::text("No"));
        record_submission(
            &mut f.store,
            assessment.id,
            SubmitRequest {
                candidate_id: f.candidate_id,
                responses,
            },
        )
        .unwrap();

        delete_job(&mut f.store, f.job_id).unwrap();
        assert!(f.store.assessments.is_empty());
        assert!(f.store.submissions.is_empty());
    }

    #[test]
    fn test_delete_assessment() {
        let mut f = fixture();
        let d = draft(&f);
        let assessment = create_assessment(&mut f.store, f.job_id, &d).unwrap();
        delete_assessment(&mut f.store, assessment.id).unwrap();
        assert!(matches!(
            get_assessment(&f.store, assessment.id),
            Err(AppError::NotFound(_))
        ));
    }
}
