use std::sync::Arc;

use uuid::Uuid;

use talentflow_api::assessments::models::{
    Answer, AssessmentDraft, ConditionOperator, ConditionalRule, Question, QuestionKind,
    ResponseSet,
};
use talentflow_api::candidates::models::{NewCandidate, Stage};
use talentflow_api::config::Config;
use talentflow_api::jobs::models::{Job, NewJob};
use talentflow_api::jobs::repository::create_job;
use talentflow_api::network::NetworkSimulator;
use talentflow_api::routes::build_router;
use talentflow_api::state::AppState;
use talentflow_api::store::Store;
use talentflow_api::sync::assessments::AssessmentLibrary;
use talentflow_api::sync::candidates::CandidatePipeline;
use talentflow_api::sync::error::NETWORK_MESSAGE;
use talentflow_api::sync::http::HttpApi;
use talentflow_api::sync::jobs::JobBoard;
use talentflow_api::sync::{PersistError, TalentApi};

/// Serves the router on an ephemeral port and returns its base URL.
async fn spawn_server(store: Store, network: NetworkSimulator) -> String {
    let app = build_router(AppState::new(store, network, Config::default()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn store_with_jobs(titles: &[&str]) -> Store {
    let mut store = Store::new();
    for title in titles {
        create_job(
            &mut store,
            NewJob {
                title: title.to_string(),
                ..NewJob::default()
            },
        )
        .unwrap();
    }
    store
}

#[tokio::test]
async fn test_board_pipeline_and_assessments_over_http() {
    let base = spawn_server(
        store_with_jobs(&["A", "B", "C", "D", "E"]),
        NetworkSimulator::instant(),
    )
    .await;
    let api = Arc::new(HttpApi::new(base));

    // board: move the first job to the third position
    let board = JobBoard::new(api.clone());
    assert_eq!(board.load().await.unwrap(), 5);
    board.reorder(0, 2).await.unwrap();

    let fresh = JobBoard::new(api.clone());
    fresh.load().await.unwrap();
    let titles: Vec<String> = fresh.jobs().into_iter().map(|j| j.title).collect();
    assert_eq!(titles, vec!["B", "C", "A", "D", "E"]);
    let positions = |jobs: Vec<Job>| -> Vec<(Uuid, u32)> {
        jobs.into_iter().map(|j| (j.id, j.order)).collect()
    };
    assert_eq!(positions(fresh.jobs()), positions(board.jobs()));
    let job_id = fresh.jobs()[0].id;

    // pipeline: stage change lands on the server timeline
    let candidate = api
        .create_candidate(&NewCandidate {
            name: "Barbara Liskov".into(),
            email: "barbara@example.com".into(),
            job_id: Some(job_id),
            ..NewCandidate::default()
        })
        .await
        .unwrap();
    let pipeline = CandidatePipeline::new(api.clone());
    pipeline.load(Some(job_id)).await.unwrap();
    pipeline
        .move_to_stage(candidate.id, Stage::Interview, None)
        .await
        .unwrap();
    let timeline = api.candidate_timeline(candidate.id).await.unwrap();
    assert_eq!(timeline[0].stage, Stage::Interview);
    assert_eq!(timeline[0].note, "Moved to Interview stage");

    // assessments: the server re-validates submissions
    let rust = Question::new(QuestionKind::SingleChoice, "Do you write Rust?")
        .with_options(&["Yes", "No"])
        .required();
    let years = Question::new(QuestionKind::Numeric, "Years of Rust?")
        .with_range(0, 10)
        .required()
        .shown_when(ConditionalRule::new(rust.id, ConditionOperator::Equals, "Yes"));
    let library = AssessmentLibrary::new(api.clone(), job_id);
    let assessment = library
        .create(AssessmentDraft {
            title: "Rust screen".into(),
            questions: vec![rust.clone(), years.clone()],
        })
        .await
        .unwrap();

    let mut out_of_range = ResponseSet::new();
    out_of_range.insert(rust.id, Answer::text("Yes"));
    out_of_range.insert(years.id, Answer::text("15"));
    let err = library
        .submit(assessment.id, candidate.id, out_of_range)
        .await
        .unwrap_err();
    assert!(matches!(err, PersistError::Rejected { status: 422, .. }));

    let mut runtime = library.start(assessment.id).unwrap();
    runtime.set_response(rust.id, Some(Answer::text("No"))).unwrap();
    assert!(!runtime.is_visible(years.id));
    assert!(runtime.validate());
    let submission = library
        .submit(assessment.id, candidate.id, runtime.submit().unwrap())
        .await
        .unwrap();
    assert_eq!(submission.responses.len(), 1);
}

#[tokio::test]
async fn test_failed_writes_roll_back_over_http() {
    let base = spawn_server(
        store_with_jobs(&["A", "B", "C"]),
        NetworkSimulator::instant().with_failure_rate(1.0),
    )
    .await;
    let api = Arc::new(HttpApi::new(base));

    let board = JobBoard::new(api.clone());
    board.load().await.unwrap();
    let before = board.jobs();

    let err = board.delete(before[1].id).await.unwrap_err();
    assert!(matches!(err, PersistError::Network(_)));
    assert_eq!(err.user_message(), NETWORK_MESSAGE);
    assert_eq!(board.jobs(), before);

    assert!(board.reorder(0, 2).await.is_err());
    assert_eq!(board.jobs(), before);

    let fresh = JobBoard::new(api);
    fresh.load().await.unwrap();
    assert_eq!(fresh.jobs(), before);
}
