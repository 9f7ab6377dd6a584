//! Authoring operations over an in-progress assessment.
//!
//! The builder edits a title plus an ordered list of questions. It never
//! repairs conditional references: deleting a question that others depend
//! on leaves a dangling rule, which `structural_warnings` reports and the
//! runtime treats as never satisfied.

use thiserror::Error;
use uuid::Uuid;

use crate::assessments::models::{
    Assessment, AssessmentDraft, ConditionalRule, NumericRange, Question, QuestionId, QuestionKind,
};

pub const MISSING_TITLE: &str = "Please enter a title for the assessment";
pub const NO_QUESTIONS: &str = "Please add at least one question";

const MIN_OPTIONS: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(QuestionId),

    #[error("a choice question needs at least two options")]
    TooFewOptions,

    #[error("option {0} does not exist")]
    UnknownOption(usize),

    #[error("only choice questions have options")]
    NotAChoice,

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Partial edit of one question. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct QuestionPatch {
    pub kind: Option<QuestionKind>,
    pub prompt: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub numeric_range: Option<NumericRange>,
    pub max_length: Option<usize>,
    pub conditional: Option<ConditionalRule>,
}

impl QuestionPatch {
    fn apply_to(self, question: &mut Question) {
        if let Some(kind) = self.kind {
            question.kind = kind;
        }
        if let Some(prompt) = self.prompt {
            question.prompt = prompt;
        }
        if let Some(required) = self.required {
            question.required = required;
        }
        if let Some(options) = self.options {
            question.options = options;
        }
        if let Some(range) = self.numeric_range {
            question.numeric_range = Some(range);
        }
        if let Some(max_length) = self.max_length {
            question.max_length = Some(max_length);
        }
        if let Some(rule) = self.conditional {
            question.conditional = Some(rule);
        }
        if question.kind.is_choice() && question.options.len() < MIN_OPTIONS {
            question.options.resize(MIN_OPTIONS, String::new());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentBuilder {
    title: String,
    questions: Vec<Question>,
}

impl AssessmentBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            questions: vec![],
        }
    }

    pub fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            title: assessment.title.clone(),
            questions: assessment.questions.clone(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn into_draft(self) -> AssessmentDraft {
        AssessmentDraft {
            title: self.title,
            questions: self.questions,
        }
    }

    /// Appends a required single-choice question with two blank options.
    pub fn add_question(&mut self) -> QuestionId {
        let question = Question {
            required: true,
            options: vec![String::new(); MIN_OPTIONS],
            numeric_range: Some(NumericRange { min: 0, max: 100 }),
            max_length: Some(100),
            conditional: Some(ConditionalRule::default()),
            ..Question::new(QuestionKind::SingleChoice, "")
        };
        let id = question.id;
        self.questions.push(question);
        id
    }

    pub fn update_question(
        &mut self,
        id: QuestionId,
        patch: QuestionPatch,
    ) -> Result<&Question, BuilderError> {
        let question = self.question_mut(id)?;
        patch.apply_to(question);
        Ok(question)
    }

    pub fn delete_question(&mut self, id: QuestionId) -> Result<Question, BuilderError> {
        let index = self.index_of(id)?;
        Ok(self.questions.remove(index))
    }

    /// Appends a copy with a fresh id and " (Copy)" after the prompt.
    pub fn duplicate_question(&mut self, id: QuestionId) -> Result<QuestionId, BuilderError> {
        let source = self.question(id).ok_or(BuilderError::UnknownQuestion(id))?;
        let copy = Question {
            id: Uuid::new_v4(),
            prompt: format!("{} (Copy)", source.prompt),
            ..source.clone()
        };
        let copy_id = copy.id;
        self.questions.push(copy);
        Ok(copy_id)
    }

    /// Swaps the question with its neighbour. Returns `false` when it is
    /// already first (Up) or last (Down).
    pub fn move_question(&mut self, id: QuestionId, direction: Direction) -> Result<bool, BuilderError> {
        let index = self.index_of(id)?;
        let target = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < self.questions.len() => index + 1,
            _ => return Ok(false),
        };
        self.questions.swap(index, target);
        Ok(true)
    }

    pub fn add_option(&mut self, id: QuestionId) -> Result<usize, BuilderError> {
        let question = self.choice_mut(id)?;
        question.options.push(String::new());
        Ok(question.options.len() - 1)
    }

    pub fn remove_option(&mut self, id: QuestionId, index: usize) -> Result<String, BuilderError> {
        let question = self.choice_mut(id)?;
        if index >= question.options.len() {
            return Err(BuilderError::UnknownOption(index));
        }
        if question.options.len() <= MIN_OPTIONS {
            return Err(BuilderError::TooFewOptions);
        }
        Ok(question.options.remove(index))
    }

    /// Choice questions other than `id` that a condition on `id` may use.
    pub fn eligible_dependencies(&self, id: QuestionId) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|q| q.id != id && q.kind.is_choice())
            .collect()
    }

    pub fn validate_for_save(&self) -> Result<(), BuilderError> {
        check_structure(&self.title, &self.questions).map_err(BuilderError::Invalid)
    }

    pub fn structural_warnings(&self) -> Vec<String> {
        structural_warnings(&self.questions)
    }

    fn index_of(&self, id: QuestionId) -> Result<usize, BuilderError> {
        self.questions
            .iter()
            .position(|q| q.id == id)
            .ok_or(BuilderError::UnknownQuestion(id))
    }

    fn question_mut(&mut self, id: QuestionId) -> Result<&mut Question, BuilderError> {
        self.questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(BuilderError::UnknownQuestion(id))
    }

    fn choice_mut(&mut self, id: QuestionId) -> Result<&mut Question, BuilderError> {
        let question = self.question_mut(id)?;
        if !question.kind.is_choice() {
            return Err(BuilderError::NotAChoice);
        }
        Ok(question)
    }
}

/// Save-time checks shared by the builder and the assessments API.
/// Returns the first problem found.
pub fn check_structure(title: &str, questions: &[Question]) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err(MISSING_TITLE.to_string());
    }
    if questions.is_empty() {
        return Err(NO_QUESTIONS.to_string());
    }

    for (index, question) in questions.iter().enumerate() {
        let n = index + 1;
        if question.kind.is_choice() && question.options.len() < MIN_OPTIONS {
            return Err(format!("Question {n} needs at least {MIN_OPTIONS} options"));
        }
        if let Some(range) = question.numeric_range {
            if question.kind == QuestionKind::Numeric && range.min > range.max {
                return Err(format!("Question {n} has a minimum above its maximum"));
            }
        }

        let Some(trigger) = question.active_rule().and_then(|r| r.depends_on) else {
            continue;
        };
        if trigger == question.id {
            return Err(format!("Question {n} cannot depend on itself"));
        }
        if let Some(parent) = questions.iter().find(|q| q.id == trigger) {
            if !parent.kind.is_choice() {
                return Err(format!("Question {n} can only depend on a choice question"));
            }
        }
    }
    Ok(())
}

/// Conditions that cannot fire: no trigger selected, or the trigger was deleted.
pub fn structural_warnings(questions: &[Question]) -> Vec<String> {
    questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            let rule = question.active_rule()?;
            let n = index + 1;
            match rule.depends_on {
                None => Some(format!("Question {n} has a condition with no trigger question")),
                Some(trigger) if !questions.iter().any(|q| q.id == trigger) => Some(format!(
                    "Question {n} depends on a question that no longer exists"
                )),
                Some(_) => None,
            }
        })
        .collect()
}
