//! Demo data for a fresh store.

use chrono::{Duration, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::assessments::models::{
    Assessment, ConditionOperator, ConditionalRule, Question, QuestionKind,
};
use crate::candidates::models::{Candidate, Stage, TimelineEntry};
use crate::candidates::pipeline::stage_note;
use crate::jobs::models::{slugify, Job, JobStatus};
use crate::store::Store;

/// (title, company, location, type, salary, tags)
const JOBS: [(&str, &str, &str, &str, &str, &[&str]); 25] = [
    ("Senior React Developer", "TechCorp", "Boston, MA", "Full-Time", "$90K - $120K", &["React", "JavaScript", "Frontend", "Senior"]),
    ("Frontend Engineer", "StartupXYZ", "San Francisco, CA", "Full-Time", "$80K - $110K", &["React", "TypeScript", "Frontend"]),
    ("Full Stack Developer", "InnovateLab", "Remote", "Full-Time", "$85K - $115K", &["React", "Node.js", "Full-Stack"]),
    ("React Native Developer", "MobileFirst", "Austin, TX", "Full-Time", "$75K - $105K", &["React Native", "Mobile", "JavaScript"]),
    ("JavaScript Developer", "WebWorks", "Seattle, WA", "Full-Time", "$70K - $100K", &["JavaScript", "Frontend", "Web"]),
    ("UI/UX Developer", "DesignStudio", "New York, NY", "Full-Time", "$75K - $105K", &["UI", "UX", "Frontend", "Design"]),
    ("Software Engineer", "BigTech", "Mountain View, CA", "Full-Time", "$100K - $140K", &["Software", "Engineering", "Senior"]),
    ("Web Developer", "AgencyPro", "Chicago, IL", "Full-Time", "$65K - $95K", &["Web", "Frontend", "HTML", "CSS"]),
    ("Mobile Developer", "AppFactory", "Denver, CO", "Full-Time", "$80K - $110K", &["Mobile", "iOS", "Android"]),
    ("DevOps Engineer", "CloudTech", "Remote", "Full-Time", "$90K - $130K", &["DevOps", "AWS", "Docker", "Kubernetes"]),
    ("Backend Developer", "DataFlow", "Portland, OR", "Full-Time", "$85K - $115K", &["Backend", "Node.js", "Python", "API"]),
    ("Node.js Developer", "ServerSoft", "Miami, FL", "Full-Time", "$75K - $105K", &["Node.js", "JavaScript", "Backend"]),
    ("Python Developer", "DataScience Inc", "Remote", "Full-Time", "$80K - $120K", &["Python", "Data Science", "Backend"]),
    ("Java Developer", "EnterpriseCorp", "Washington, DC", "Full-Time", "$85K - $125K", &["Java", "Spring", "Backend", "Enterprise"]),
    ("Data Scientist", "AnalyticsPro", "Remote", "Full-Time", "$95K - $135K", &["Data Science", "Python", "Machine Learning"]),
    ("Machine Learning Engineer", "AI Solutions", "San Francisco, CA", "Full-Time", "$110K - $150K", &["Machine Learning", "Python", "AI"]),
    ("Product Manager", "ProductCo", "New York, NY", "Full-Time", "$100K - $140K", &["Product", "Management", "Strategy"]),
    ("UX Designer", "DesignLab", "Los Angeles, CA", "Full-Time", "$70K - $100K", &["UX", "Design", "Research"]),
    ("QA Engineer", "QualityAssured", "Remote", "Full-Time", "$65K - $95K", &["QA", "Testing", "Automation"]),
    ("Technical Lead", "LeadTech", "Boston, MA", "Full-Time", "$120K - $160K", &["Leadership", "Architecture", "Senior"]),
    ("Software Architect", "ArchitectureCorp", "Remote", "Full-Time", "$130K - $170K", &["Architecture", "Design", "Senior"]),
    ("Scrum Master", "AgileSoft", "Austin, TX", "Full-Time", "$80K - $110K", &["Scrum", "Agile", "Process"]),
    ("Business Analyst", "AnalysisInc", "Chicago, IL", "Full-Time", "$70K - $100K", &["Analysis", "Business", "Requirements"]),
    ("Technical Consultant", "ConsultingPro", "Remote", "Contract", "$100K - $150K", &["Consulting", "Contract", "Senior"]),
    ("Freelance Developer", "FreelanceHub", "Remote", "Contract", "$60K - $120K", &["Freelance", "Contract", "Remote"]),
];

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Mike", "Sarah", "David", "Lisa", "Chris", "Amy", "Tom", "Emma", "Alex",
    "Maria", "James", "Jennifer", "Robert", "Linda", "Michael", "Patricia", "William", "Karen",
    "Daniel", "Nancy", "Paul", "Helen", "George", "Sandra", "Kenneth", "Donna", "Steven", "Ruth",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas", "Taylor", "Moore",
    "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Clark", "Lewis",
    "Walker", "Young", "Allen", "King", "Nguyen", "Hill",
];

const SKILLS: &[&str] = &[
    "React", "JavaScript", "TypeScript", "Node.js", "Python", "Java", "Vue.js", "Angular",
    "MongoDB", "PostgreSQL", "HTML", "CSS", "Docker", "AWS", "Git", "REST API", "GraphQL",
    "Redux", "Express", "Django", "Spring", "MySQL", "Redis", "Kubernetes", "Terraform", "Linux",
];

/// Applied, Screening, Interview, Offer, Hired, Rejected.
const STAGE_WEIGHTS: [f64; 6] = [0.4, 0.2, 0.15, 0.1, 0.1, 0.05];

const LIKERT: [&str; 5] = [
    "Strongly Agree",
    "Agree",
    "Neutral",
    "Disagree",
    "Strongly Disagree",
];

const KINDS: [QuestionKind; 5] = [
    QuestionKind::SingleChoice,
    QuestionKind::MultiChoice,
    QuestionKind::ShortText,
    QuestionKind::LongText,
    QuestionKind::Numeric,
];

const TEMPLATES: [(&str, &[&str]); 5] = [
    (
        "React Developer Assessment",
        &[
            "What is the primary purpose of React hooks?",
            "Which of the following are React lifecycle methods?",
            "What is JSX?",
            "Explain the difference between controlled and uncontrolled components.",
            "How many years of React experience do you have?",
            "Which hook is used for side effects?",
            "What is Redux used for?",
        ],
    ),
    (
        "JavaScript Fundamentals Assessment",
        &[
            "What is the difference between let and var?",
            "What is closure in JavaScript?",
            "Explain the concept of prototypal inheritance.",
            "How do you handle asynchronous operations?",
            "Explain the event loop.",
            "What is the difference between null and undefined?",
        ],
    ),
    (
        "Full Stack Developer Assessment",
        &[
            "What is REST API?",
            "Explain the difference between SQL and NoSQL databases.",
            "How do you handle authentication?",
            "What is CORS?",
            "How do you optimize database queries?",
            "How do you implement caching?",
        ],
    ),
    (
        "Frontend Engineer Assessment",
        &[
            "What is CSS Grid?",
            "Explain the box model.",
            "How do you make a website responsive?",
            "How do you optimize website performance?",
            "How do you handle cross-browser compatibility?",
            "How do you implement accessibility?",
        ],
    ),
    (
        "Backend Developer Assessment",
        &[
            "How do you handle database transactions?",
            "Explain the concept of database indexing.",
            "What is the difference between authentication and authorization?",
            "How do you implement rate limiting?",
            "How do you handle file uploads?",
            "What is the purpose of database migrations?",
        ],
    ),
];

const SEEDED_ASSESSMENTS: usize = 10;

/// Fills an empty store with 25 jobs, `candidates` candidates spread over
/// them, and assessments for the first ten jobs.
pub fn seed_store(store: &mut Store, candidates: usize, rng: &mut impl Rng) {
    let now = Utc::now();

    for (index, (title, company, location, job_type, salary, tags)) in JOBS.iter().enumerate() {
        let created_at = now - Duration::minutes(rng.gen_range(0..90 * 24 * 60));
        store.jobs.push(Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slugify(title),
            company: company.to_string(),
            location: location.to_string(),
            job_type: job_type.to_string(),
            salary: salary.to_string(),
            status: if rng.gen_bool(0.8) {
                JobStatus::Active
            } else {
                JobStatus::Archived
            },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            description: format!(
                "We are seeking a talented {} to join our team at {company}.",
                title.to_lowercase()
            ),
            order: index as u32 + 1,
            created_at,
            updated_at: now,
        });
    }

    let job_ids: Vec<Uuid> = store.jobs.iter().map(|j| j.id).collect();
    let stages = WeightedIndex::new(STAGE_WEIGHTS).ok();
    for n in 1..=candidates {
        let stage = stages
            .as_ref()
            .map_or(Stage::Applied, |dist| Stage::ALL[dist.sample(rng)]);
        let candidate = random_candidate(n, stage, job_ids.choose(rng).copied(), rng);
        store.candidates.push(candidate);
    }

    for (index, job_id) in job_ids.iter().take(SEEDED_ASSESSMENTS).enumerate() {
        let (title, prompts) = TEMPLATES[index % TEMPLATES.len()];
        store.assessments.push(Assessment {
            id: Uuid::new_v4(),
            job_id: *job_id,
            title: title.to_string(),
            questions: template_questions(prompts, rng),
            created_at: now,
            updated_at: now,
        });
    }

    info!(
        "Seeded {} jobs, {} candidates, {} assessments",
        store.jobs.len(),
        store.candidates.len(),
        store.assessments.len()
    );
}

fn random_candidate(n: usize, stage: Stage, job_id: Option<Uuid>, rng: &mut impl Rng) -> Candidate {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    let skill_count = rng.gen_range(2..=6);
    let skills = SKILLS
        .choose_multiple(rng, skill_count)
        .map(|s| s.to_string())
        .collect();

    let now = Utc::now();
    let applied_at = now - Duration::minutes(rng.gen_range(0..90 * 24 * 60));
    let status = match stage {
        Stage::Hired => "Successfully hired!".to_string(),
        Stage::Rejected => "Not a good fit.".to_string(),
        other => format!("Currently in {} stage.", other.label()),
    };

    Candidate {
        id: Uuid::new_v4(),
        name: format!("{first} {last}"),
        email: format!("{}.{}{n}@email.com", first.to_lowercase(), last.to_lowercase()),
        phone: format!(
            "+1 ({}) {}-{}",
            rng.gen_range(100..1000),
            rng.gen_range(100..1000),
            rng.gen_range(1000..10000)
        ),
        stage,
        job_id,
        experience: rng.gen_range(1..=12),
        skills,
        notes: format!("{first} {last} applied for the position. {status}"),
        applied_date: applied_at.date_naive(),
        timeline: vec![TimelineEntry {
            id: Uuid::new_v4(),
            stage,
            timestamp: applied_at,
            note: stage_note(stage),
            actor: "System".to_string(),
        }],
        created_at: now,
        updated_at: now,
    }
}

/// About one question in five gets a condition on an earlier choice
/// question, when there is one.
fn template_questions(prompts: &[&str], rng: &mut impl Rng) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::with_capacity(prompts.len());
    for prompt in prompts {
        let kind = KINDS.choose(rng).copied().unwrap_or(QuestionKind::ShortText);
        let mut question = Question::new(kind, prompt);
        question.required = rng.gen_bool(0.7);
        match kind {
            QuestionKind::SingleChoice | QuestionKind::MultiChoice => {
                question = question.with_options(&LIKERT);
            }
            QuestionKind::Numeric => question = question.with_range(0, 10),
            QuestionKind::ShortText | QuestionKind::LongText => {
                question = question.with_max_length(500);
            }
            QuestionKind::FileUpload => {}
        }

        if rng.gen_bool(0.2) {
            let triggers: Vec<&Question> = questions.iter().filter(|q| q.kind.is_choice()).collect();
            if let Some(trigger) = triggers.choose(rng) {
                let value = LIKERT.choose(rng).copied().unwrap_or("Agree");
                question = question.shown_when(ConditionalRule::new(
                    trigger.id,
                    ConditionOperator::Equals,
                    value,
                ));
            }
        }
        questions.push(question);
    }
    questions
}
