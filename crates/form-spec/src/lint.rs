use serde::Serialize;

use crate::spec::form::FormDefinition;
use crate::spec::question::{QuestionId, QuestionSpec};
use crate::spec::skip::SkipTarget;

/// Authoring problem found in a form definition.
///
/// None of these stop the engine; they point at rules that will not behave
/// the way an author probably expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_id: Option<QuestionId>,
    pub code: &'static str,
    pub message: String,
}

impl DefinitionIssue {
    fn form(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            code,
            message: message.into(),
        }
    }

    fn question(question: &QuestionSpec, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id),
            code,
            message: message.into(),
        }
    }
}

pub fn lint(form: &FormDefinition) -> Vec<DefinitionIssue> {
    let mut issues = Vec::new();

    if form.title.trim().is_empty() {
        issues.push(DefinitionIssue::form("empty_title", "form title is empty"));
    }
    if form.questions.is_empty() {
        issues.push(DefinitionIssue::form("no_questions", "form has no questions"));
    }

    for (index, question) in form.questions.iter().enumerate() {
        lint_question(form, index, question, &mut issues);
    }

    issues
}

fn lint_question(
    form: &FormDefinition,
    index: usize,
    question: &QuestionSpec,
    issues: &mut Vec<DefinitionIssue>,
) {
    let position = index + 1;

    if question.question_text.trim().is_empty() {
        issues.push(DefinitionIssue::question(
            question,
            "empty_text",
            format!("question {position} has no text"),
        ));
    }

    let has_option = question.options.iter().any(|option| !option.trim().is_empty());
    if question.kind.has_options() && !has_option {
        issues.push(DefinitionIssue::question(
            question,
            "missing_options",
            format!("question {position} needs at least one non-empty option"),
        ));
    }

    let Some(logic) = question.active_skip_logic() else {
        return;
    };

    if !question.kind.has_options() && !logic.conditions.is_empty() {
        issues.push(DefinitionIssue::question(
            question,
            "skip_on_free_input",
            format!(
                "question {position} is '{}' and can only trigger on exact text",
                question.kind.as_str()
            ),
        ));
    }

    for (condition_index, condition) in logic.conditions.iter().enumerate() {
        let label = format!("condition {} of question {position}", condition_index + 1);

        if condition.option.trim().is_empty() {
            issues.push(DefinitionIssue::question(
                question,
                "empty_trigger",
                format!("{label} has no option selected"),
            ));
        } else if question.kind.has_options() && !question.options.contains(&condition.option) {
            issues.push(DefinitionIssue::question(
                question,
                "unknown_trigger",
                format!("{label} triggers on '{}' which is not an option", condition.option),
            ));
        }

        if let SkipTarget::Position(target) = condition.target {
            match condition.target.index_in(form.len()) {
                None => issues.push(DefinitionIssue::question(
                    question,
                    "malformed_target",
                    format!("{label} jumps to question {target}, which does not exist"),
                )),
                Some(target_index) if target_index <= index => {
                    issues.push(DefinitionIssue::question(
                        question,
                        "backward_jump",
                        format!("{label} jumps back to question {target} and is ignored"),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    let options = logic
        .conditions
        .iter()
        .map(|condition| condition.option.as_str())
        .collect::<Vec<_>>();
    for (later, option) in options.iter().enumerate() {
        if options[..later].contains(option) && !option.trim().is_empty() {
            issues.push(DefinitionIssue::question(
                question,
                "shadowed_condition",
                format!(
                    "condition {} of question {position} repeats '{option}' and never applies",
                    later + 1
                ),
            ));
        }
    }
}
