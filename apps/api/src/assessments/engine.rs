//! Assessment runtime: conditional visibility and submission validation.
//!
//! A runtime owns a snapshot of an assessment's questions plus the answers
//! given so far. Every edit recomputes which questions are visible; a
//! question that becomes hidden loses its stored answer so it can neither
//! resurface nor be submitted. Only visible questions are validated and
//! only their answers are submitted.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tracing::{debug, warn};

use crate::assessments::models::{Answer, ConditionalRule, Question, QuestionId, ResponseSet};
use crate::assessments::validation::check_answer;

/// How far an edit propagates through chains of conditional questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeMode {
    /// Re-evaluate only questions that depend directly on the edited one.
    /// A chain A -> B -> C converges one hop per edit.
    DirectOnly,
    /// Re-evaluate dependents of the edited question, then dependents of
    /// every question whose visibility flipped, until nothing flips. A
    /// question is shown only while the question it depends on is shown.
    /// Questions outside the edited question's chain are never touched.
    #[default]
    FixedPoint,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(QuestionId),

    #[error("responses have not passed validation since the last edit")]
    NotValidated,
}

#[derive(Debug, Clone)]
pub struct AssessmentRuntime {
    questions: Vec<Question>,
    mode: CascadeMode,
    responses: ResponseSet,
    visible: HashSet<QuestionId>,
    errors: HashMap<QuestionId, String>,
    validated: bool,
}

impl AssessmentRuntime {
    /// Starts a session. Questions with an enabled conditional rule start
    /// hidden; everything else starts visible.
    pub fn initialize(questions: Vec<Question>) -> Self {
        Self::with_mode(questions, CascadeMode::default())
    }

    pub fn with_mode(questions: Vec<Question>, mode: CascadeMode) -> Self {
        let visible = questions
            .iter()
            .filter(|q| q.active_rule().is_none())
            .map(|q| q.id)
            .collect();
        Self {
            questions,
            mode,
            responses: ResponseSet::new(),
            visible,
            errors: HashMap::new(),
            validated: false,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn mode(&self) -> CascadeMode {
        self.mode
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn response(&self, id: QuestionId) -> Option<&Answer> {
        self.responses.get(&id)
    }

    pub fn visible(&self) -> &HashSet<QuestionId> {
        &self.visible
    }

    pub fn is_visible(&self, id: QuestionId) -> bool {
        self.visible.contains(&id)
    }

    /// Visible questions in document order, for rendering.
    pub fn visible_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(|q| self.visible.contains(&q.id))
    }

    /// Messages from the last `validate()`, minus questions edited since.
    pub fn errors(&self) -> &HashMap<QuestionId, String> {
        &self.errors
    }

    pub fn error(&self, id: QuestionId) -> Option<&str> {
        self.errors.get(&id).map(String::as_str)
    }

    /// Records an answer (an empty or `None` value clears it), drops the
    /// question's error and recomputes visibility.
    pub fn set_response(&mut self, id: QuestionId, value: Option<Answer>) -> Result<(), EngineError> {
        if !self.questions.iter().any(|q| q.id == id) {
            return Err(EngineError::UnknownQuestion(id));
        }

        match value.filter(|v| !v.is_empty()) {
            Some(answer) => {
                self.responses.insert(id, answer);
            }
            None => {
                self.responses.remove(&id);
            }
        }
        self.errors.remove(&id);
        self.validated = false;

        match self.mode {
            CascadeMode::DirectOnly => self.refresh_dependents_of(id),
            CascadeMode::FixedPoint => self.propagate_from(id),
        }
        Ok(())
    }

    /// Validates every visible question. Hidden questions are skipped even
    /// when required. Returns `true` when no errors were found.
    pub fn validate(&mut self) -> bool {
        self.errors = self
            .visible_questions()
            .filter_map(|q| check_answer(q, self.responses.get(&q.id)).map(|msg| (q.id, msg)))
            .collect();
        self.validated = self.errors.is_empty();
        self.validated
    }

    /// The answers to visible questions. Requires a successful `validate()`
    /// with no edits since.
    pub fn submit(&self) -> Result<ResponseSet, EngineError> {
        if !self.validated {
            return Err(EngineError::NotValidated);
        }
        Ok(self
            .responses
            .iter()
            .filter(|(id, _)| self.visible.contains(id))
            .map(|(id, answer)| (*id, answer.clone()))
            .collect())
    }

    fn refresh_dependents_of(&mut self, changed: QuestionId) {
        let answer = self.responses.get(&changed).cloned();
        let updates: Vec<(QuestionId, bool)> = self
            .questions
            .iter()
            .filter_map(|q| {
                let rule = q.active_rule()?;
                (rule.depends_on == Some(changed))
                    .then(|| (q.id, rule.is_satisfied_by(answer.as_ref())))
            })
            .collect();

        for (id, show) in updates {
            self.set_visible(id, show);
        }
    }

    fn propagate_from(&mut self, edited: QuestionId) {
        let limit = self.questions.len() * (self.questions.len() + 1);
        let mut pending = VecDeque::from([edited]);
        let mut steps = 0;
        while let Some(trigger) = pending.pop_front() {
            if steps == limit {
                warn!("Conditional visibility did not settle; check for cyclic dependencies");
                return;
            }
            steps += 1;

            let updates: Vec<(QuestionId, bool)> = self
                .questions
                .iter()
                .filter_map(|q| {
                    let rule = q.active_rule()?;
                    (rule.depends_on == Some(trigger)).then(|| (q.id, self.rule_holds(rule)))
                })
                .collect();
            for (id, show) in updates {
                // a flip changes what this question's own dependents see
                if self.set_visible(id, show) {
                    pending.push_back(id);
                }
            }
        }
    }

    /// Dangling and unset triggers never hold.
    fn rule_holds(&self, rule: &ConditionalRule) -> bool {
        match rule.depends_on {
            Some(trigger) if self.visible.contains(&trigger) => {
                rule.is_satisfied_by(self.responses.get(&trigger))
            }
            _ => false,
        }
    }

    /// Returns whether visibility changed.
    fn set_visible(&mut self, id: QuestionId, show: bool) -> bool {
        if show {
            let shown = self.visible.insert(id);
            if shown {
                debug!(question = %id, "Showing conditional question");
            }
            return shown;
        }

        if !self.visible.remove(&id) {
            return false;
        }
        self.responses.remove(&id);
        self.errors.remove(&id);
        debug!(question = %id, "Hiding conditional question and discarding its answer");
        true
    }
}
