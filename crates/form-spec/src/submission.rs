use thiserror::Error;

use crate::answers::{AnswerMap, SubmittedAnswer};
use crate::spec::question::{QuestionId, QuestionSpec};
use crate::visibility::VisibleSet;

/// Separator used when flattening multi-choice answers.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// User-visible submission failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("question {question_id} (\"{question_text}\") is required")]
    MissingRequiredAnswer {
        question_id: QuestionId,
        question_text: String,
    },
    #[error("respondent name is required")]
    MissingRespondent,
}

impl SubmissionError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::MissingRequiredAnswer { .. } => "missing_required",
            SubmissionError::MissingRespondent => "missing_respondent",
        }
    }

    pub fn question_id(&self) -> Option<QuestionId> {
        match self {
            SubmissionError::MissingRequiredAnswer { question_id, .. } => Some(*question_id),
            SubmissionError::MissingRespondent => None,
        }
    }
}

/// Visible required questions without a usable answer, in form order.
pub fn missing_required(
    questions: &[QuestionSpec],
    answers: &AnswerMap,
    visible: &VisibleSet,
) -> Vec<QuestionId> {
    questions
        .iter()
        .filter(|question| question.required && visible.contains(question.id))
        .filter(|question| !answers.is_answered(question.id))
        .map(|question| question.id)
        .collect()
}

/// Validates required answers over `visible` and builds the outgoing list.
pub fn prepare_submission(
    questions: &[QuestionSpec],
    answers: &AnswerMap,
    visible: &VisibleSet,
) -> Result<Vec<SubmittedAnswer>, SubmissionError> {
    prepare_submission_with(questions, answers, visible, DEFAULT_SEPARATOR)
}

pub fn prepare_submission_with(
    questions: &[QuestionSpec],
    answers: &AnswerMap,
    visible: &VisibleSet,
    separator: &str,
) -> Result<Vec<SubmittedAnswer>, SubmissionError> {
    if let Some(question) = questions.iter().find(|question| {
        question.required && visible.contains(question.id) && !answers.is_answered(question.id)
    }) {
        return Err(SubmissionError::MissingRequiredAnswer {
            question_id: question.id,
            question_text: question.question_text.clone(),
        });
    }

    Ok(questions
        .iter()
        .filter(|question| visible.contains(question.id))
        .filter_map(|question| {
            answers.get(question.id).map(|value| SubmittedAnswer {
                question_id: question.id,
                answer_text: value.joined(&question.options, separator),
            })
        })
        .collect())
}
