use serde::Serialize;

use crate::answers::AnswerMap;
use crate::spec::question::{QuestionId, QuestionSpec};
use crate::visibility::VisibleSet;

/// Answered/total counters over the visible questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

/// First visible question that still lacks an answer.
pub fn next_question(
    questions: &[QuestionSpec],
    answers: &AnswerMap,
    visible: &VisibleSet,
) -> Option<QuestionId> {
    questions
        .iter()
        .map(|question| question.id)
        .find(|id| visible.contains(*id) && !answers.is_answered(*id))
}

pub fn progress(answers: &AnswerMap, visible: &VisibleSet) -> Progress {
    Progress {
        answered: visible.iter().filter(|id| answers.is_answered(*id)).count(),
        total: visible.len(),
    }
}
