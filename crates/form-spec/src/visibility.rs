//! Skip-logic visibility engine.
//!
//! Visibility is a pure function of the ordered questions and the current
//! answers. Each evaluation starts from the full form and walks it once,
//! front to back; only questions that are still visible when reached may hide
//! later ones.

use serde::Serialize;
use tracing::{debug, trace};

use crate::answers::AnswerMap;
use crate::spec::question::{QuestionId, QuestionSpec};
use crate::spec::skip::{SkipCondition, SkipTarget};

/// Ordered ids of the questions currently presented to the respondent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct VisibleSet(Vec<QuestionId>);

impl VisibleSet {
    /// Every question of the form, in order.
    pub fn all(questions: &[QuestionSpec]) -> Self {
        VisibleSet(questions.iter().map(|question| question.id).collect())
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.0.contains(&id)
    }

    /// 1-based number shown next to a visible question.
    pub fn display_number(&self, id: QuestionId) -> Option<usize> {
        self.0.iter().position(|visible| *visible == id).map(|index| index + 1)
    }

    pub fn ids(&self) -> &[QuestionId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Skip rules the engine ignored. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum SkipDiagnostic {
    /// Target position is outside the form.
    MalformedTarget { question_id: QuestionId, position: i64 },
    /// Target points at the triggering question or one before it.
    BackwardOrSelfJump { question_id: QuestionId, position: i64 },
}

/// Result of one engine evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Visibility {
    pub visible: VisibleSet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<SkipDiagnostic>,
}

/// Visible question ids for the given answers.
pub fn compute_visible(questions: &[QuestionSpec], answers: &AnswerMap) -> VisibleSet {
    evaluate(questions, answers).visible
}

/// Runs the engine and keeps the diagnostics for ignored rules.
pub fn evaluate(questions: &[QuestionSpec], answers: &AnswerMap) -> Visibility {
    let len = questions.len();
    let mut shown = vec![true; len];
    let mut diagnostics = Vec::new();

    for (index, question) in questions.iter().enumerate() {
        if !shown[index] {
            continue;
        }
        let Some(logic) = question.active_skip_logic() else {
            continue;
        };
        let Some(answer) = answers.get(question.id).filter(|answer| !answer.is_blank()) else {
            continue;
        };
        let Some(condition) = first_match(&logic.conditions, |option| answer.matches(option))
        else {
            trace!(question = %question.id, "no skip condition matched");
            continue;
        };

        match condition.target {
            SkipTarget::Terminate => {
                debug!(question = %question.id, option = %condition.option, "terminate form");
                shown[index + 1..].fill(false);
            }
            SkipTarget::Position(position) => match condition.target.index_in(len) {
                None => {
                    debug!(question = %question.id, position, "skip target outside form, ignored");
                    diagnostics.push(SkipDiagnostic::MalformedTarget {
                        question_id: question.id,
                        position,
                    });
                }
                Some(target) if target <= index => {
                    debug!(question = %question.id, position, "backward skip target, ignored");
                    diagnostics.push(SkipDiagnostic::BackwardOrSelfJump {
                        question_id: question.id,
                        position,
                    });
                }
                Some(target) => {
                    debug!(
                        question = %question.id,
                        option = %condition.option,
                        target = %questions[target].id,
                        "skip forward"
                    );
                    shown[index + 1..target].fill(false);
                }
            },
        }
    }

    let visible = questions
        .iter()
        .zip(&shown)
        .filter(|(_, shown)| **shown)
        .map(|(question, _)| question.id)
        .collect();

    Visibility {
        visible: VisibleSet(visible),
        diagnostics,
    }
}

fn first_match(
    conditions: &[SkipCondition],
    matches: impl Fn(&str) -> bool,
) -> Option<&SkipCondition> {
    conditions
        .iter()
        .find(|condition| matches(condition.option.as_str()))
}
