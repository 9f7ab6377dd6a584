use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type QuestionId = Uuid;

/// Answers keyed by question id.
pub type ResponseSet = BTreeMap<QuestionId, Answer>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    SingleChoice,
    MultiChoice,
    ShortText,
    LongText,
    Numeric,
    FileUpload,
}

impl QuestionKind {
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::MultiChoice)
    }

    pub fn is_text(self) -> bool {
        matches!(self, QuestionKind::ShortText | QuestionKind::LongText)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Contains,
}

/// Shows a question only while another question's answer satisfies `operator`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub enabled: bool,
    #[serde(default)]
    pub depends_on: Option<QuestionId>,
    #[serde(default)]
    pub operator: ConditionOperator,
    #[serde(default)]
    pub comparison_value: String,
}

impl ConditionalRule {
    pub fn new(depends_on: QuestionId, operator: ConditionOperator, value: &str) -> Self {
        Self {
            enabled: true,
            depends_on: Some(depends_on),
            operator,
            comparison_value: value.to_string(),
        }
    }

    /// `equals`/`not_equals` compare the answer's text form exactly;
    /// `contains` is a case-insensitive substring test that never matches an
    /// empty or missing answer.
    pub fn is_satisfied_by(&self, answer: Option<&Answer>) -> bool {
        let answer = answer.filter(|a| !a.is_empty());
        match self.operator {
            ConditionOperator::Equals => {
                answer.is_some_and(|a| a.as_text() == self.comparison_value)
            }
            ConditionOperator::NotEquals => {
                answer.map_or(true, |a| a.as_text() != self.comparison_value)
            }
            ConditionOperator::Contains => answer.is_some_and(|a| {
                a.as_text()
                    .to_lowercase()
                    .contains(&self.comparison_value.to_lowercase())
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min as f64 && value <= self.max as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub prompt: String,
    #[serde(default)]
    pub required: bool,
    /// Choice kinds only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Numeric kind only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_range: Option<NumericRange>,
    /// Text kinds only, in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<ConditionalRule>,
}

impl Question {
    pub fn new(kind: QuestionKind, prompt: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            prompt: prompt.to_string(),
            required: false,
            options: vec![],
            numeric_range: None,
            max_length: None,
            conditional: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.numeric_range = Some(NumericRange { min, max });
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn shown_when(mut self, rule: ConditionalRule) -> Self {
        self.conditional = Some(rule);
        self
    }

    /// The enabled rule, if any. A disabled rule is ignored entirely.
    pub fn active_rule(&self) -> Option<&ConditionalRule> {
        self.conditional.as_ref().filter(|rule| rule.enabled)
    }
}

/// A candidate's answer, shaped by the question kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    /// Single choice, short/long text, and numeric input as typed.
    Text(String),
    /// Multi choice.
    Choices(Vec<String>),
    Number(f64),
    /// Upload metadata only; file contents never reach the engine.
    File(FileAnswer),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileAnswer {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Answer {
    pub fn text(value: &str) -> Self {
        Answer::Text(value.to_string())
    }

    pub fn choices(values: &[&str]) -> Self {
        Answer::Choices(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Text(s) => s.is_empty(),
            Answer::Choices(values) => values.is_empty(),
            Answer::Number(n) => n.is_nan(),
            Answer::File(file) => file.name.is_empty(),
        }
    }

    /// Text form used by conditional rules. Selected choices are joined with
    /// commas, so a single selection compares equal to its option text.
    pub fn as_text(&self) -> String {
        match self {
            Answer::Text(s) => s.clone(),
            Answer::Choices(values) => values.join(","),
            Answer::Number(n) => n.to_string(),
            Answer::File(file) => file.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: Uuid,
    pub job_id: Uuid,
    pub title: String,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Body of `PUT /assessments/{jobId}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDraft {
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl AssessmentDraft {
    pub fn placeholder(&self, id: Uuid, job_id: Uuid, now: DateTime<Utc>) -> Assessment {
        Assessment {
            id,
            job_id,
            title: self.title.clone(),
            questions: self.questions.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `PATCH /assessments/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
}

impl AssessmentPatch {
    pub fn apply_to(&self, assessment: &mut Assessment) {
        if let Some(title) = &self.title {
            assessment.title = title.clone();
        }
        if let Some(questions) = &self.questions {
            assessment.questions = questions.clone();
        }
    }
}

/// Body of `POST /assessments/{id}/submit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub candidate_id: Uuid,
    pub responses: ResponseSet,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSubmission {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub candidate_id: Uuid,
    pub responses: ResponseSet,
    pub submitted_at: DateTime<Utc>,
}
