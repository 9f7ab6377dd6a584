use crate::assessments::models::{Answer, Question, QuestionKind};

pub const REQUIRED_MESSAGE: &str = "This question is required";

/// Checks one answer against its question's constraints.
///
/// FAIL conditions:
/// - required question with an empty or missing answer
/// - numeric question whose answer does not parse as a finite number, or
///   falls outside the inclusive range
/// - text question whose answer is longer than `max_length` characters
///
/// Returns the message to show next to the question, or `None` when valid.
pub fn check_answer(question: &Question, answer: Option<&Answer>) -> Option<String> {
    let answer = answer.filter(|a| !a.is_empty());

    let Some(answer) = answer else {
        return question.required.then(|| REQUIRED_MESSAGE.to_string());
    };

    match question.kind {
        QuestionKind::Numeric => check_numeric(question, answer),
        kind if kind.is_text() => check_length(question, answer),
        _ => None,
    }
}

fn check_numeric(question: &Question, answer: &Answer) -> Option<String> {
    let value = match answer {
        Answer::Number(n) => Some(*n),
        Answer::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite());

    match (question.numeric_range, value) {
        (Some(range), Some(n)) if range.contains(n) => None,
        (Some(range), _) => Some(format!(
            "Please enter a number between {} and {}",
            range.min, range.max
        )),
        (None, Some(_)) => None,
        (None, None) => Some("Please enter a valid number".to_string()),
    }
}

fn check_length(question: &Question, answer: &Answer) -> Option<String> {
    let max = question.max_length?;
    let Answer::Text(text) = answer else {
        return None;
    };
    (text.chars().count() > max).then(|| format!("Maximum length is {max} characters"))
}
