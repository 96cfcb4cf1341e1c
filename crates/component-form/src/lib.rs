use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::warn;

use form_spec::{
    AnswerMap, AnswerValue, DEFAULT_SEPARATOR, FillSession, FormDefinition, FormError,
    QuestionId, RenderPayload, SessionError, SubmissionError, answers_schema,
    build_render_payload, definition_schema, lint, missing_required, next_question, progress,
    render_json_ui as form_render_json_ui, render_text as form_render_text,
};

const DEFAULT_SPEC: &str = include_str!("../../form-spec/tests/fixtures/car_survey.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse answers: {0}")]
    AnswerParse(#[source] serde_json::Error),
    #[error("failed to parse answer value: {0}")]
    ValueParse(#[source] serde_json::Error),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    form_spec_json: Option<String>,
    #[serde(default)]
    multi_choice_separator: Option<String>,
}

impl ComponentConfig {
    fn parse(config_json: &str) -> Result<Self, ComponentError> {
        if config_json.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
        }
    }

    fn separator(&self) -> &str {
        self.multi_choice_separator
            .as_deref()
            .unwrap_or(DEFAULT_SEPARATOR)
    }
}

fn load_form(config: &ComponentConfig) -> Result<FormDefinition, ComponentError> {
    let spec_json = config.form_spec_json.as_deref().unwrap_or(DEFAULT_SPEC);
    Ok(FormDefinition::from_json(spec_json)?)
}

fn ensure_form(
    form_id: &str,
    config_json: &str,
) -> Result<(FormDefinition, ComponentConfig), ComponentError> {
    let config = ComponentConfig::parse(config_json)?;
    let form = load_form(&config)?;
    if form.id != form_id {
        Err(FormError::UnknownForm(form_id.to_string()).into())
    } else {
        Ok((form, config))
    }
}

fn parse_answers(answers_json: &str) -> Result<AnswerMap, ComponentError> {
    if answers_json.trim().is_empty() {
        return Ok(AnswerMap::new());
    }
    serde_json::from_str(answers_json).map_err(|error| {
        warn!(%error, "rejecting unparsable answers");
        ComponentError::AnswerParse(error)
    })
}

/// Loads the form and replays the given answers through one
/// evaluate-then-reconcile cycle.
fn open_session(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
) -> Result<FillSession, ComponentError> {
    let (form, config) = ensure_form(form_id, config_json)?;
    let answers = parse_answers(answers_json)?;
    let separator = config.separator().to_string();
    Ok(FillSession::resume(Arc::new(form), answers).with_separator(separator))
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn session_state(session: &FillSession) -> Value {
    let form = session.form();
    let next = next_question(&form.questions, session.answers(), session.visible());
    let progress = progress(session.answers(), session.visible());
    json!({
        "status": if next.is_some() { "need_input" } else { "complete" },
        "next_question_id": next,
        "progress": progress,
        "visible": session.visible(),
        "answers": session.answers(),
    })
}

pub fn describe(form_id: &str, config_json: &str) -> String {
    respond(
        ensure_form(form_id, config_json)
            .and_then(|(form, _)| serde_json::to_value(form).map_err(ComponentError::JsonEncode)),
    )
}

pub fn get_definition_schema() -> String {
    respond(Ok(definition_schema()))
}

pub fn get_answer_schema(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(
        open_session(form_id, config_json, answers_json)
            .map(|session| answers_schema(session.form(), session.visible())),
    )
}

/// Visible questions, display numbers and ignored rules for the answers.
pub fn visible(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(open_session(form_id, config_json, answers_json).map(|session| {
        let numbers = session
            .visible()
            .iter()
            .map(|id| json!({ "question_id": id, "number": session.visible().display_number(id) }))
            .collect::<Vec<_>>();
        json!({
            "visible": session.visible(),
            "numbers": numbers,
            "diagnostics": session.visibility().diagnostics,
            "answers": session.answers(),
        })
    }))
}

pub fn next(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(open_session(form_id, config_json, answers_json).map(|session| {
        let state = session_state(&session);
        json!({
            "status": state["status"],
            "next_question_id": state["next_question_id"],
            "progress": state["progress"],
        })
    }))
}

pub fn lint_form(form_id: &str, config_json: &str) -> String {
    respond(ensure_form(form_id, config_json).map(|(form, _)| {
        let issues = lint(&form);
        json!({ "valid": issues.is_empty(), "issues": issues })
    }))
}

fn render_payload(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
) -> Result<RenderPayload, ComponentError> {
    open_session(form_id, config_json, answers_json).map(|session| build_render_payload(&session))
}

pub fn render_text(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond_string(
        render_payload(form_id, config_json, answers_json)
            .map(|payload| form_render_text(&payload)),
    )
}

pub fn render_json_ui(form_id: &str, config_json: &str, answers_json: &str) -> String {
    respond(
        render_payload(form_id, config_json, answers_json)
            .map(|payload| form_render_json_ui(&payload)),
    )
}

fn session_error_response(session: &FillSession, error: &SessionError) -> Value {
    let (code, question_id) = match error {
        SessionError::UnknownQuestion(id) => ("unknown_question", *id),
        SessionError::QuestionHidden(id) => ("question_hidden", *id),
        SessionError::NotMultiChoice(id) => ("not_multi_choice", *id),
        SessionError::ValueShape(id) => ("value_shape", *id),
    };
    let mut state = session_state(session);
    state["status"] = Value::String("error".into());
    state["error"] = json!({
        "code": code,
        "question_id": question_id,
        "message": error.to_string(),
    });
    state
}

fn submission_error_response(session: &FillSession, error: &SubmissionError) -> Value {
    let form = session.form();
    let missing = missing_required(&form.questions, session.answers(), session.visible());
    let mut state = session_state(session);
    state["status"] = Value::String("error".into());
    state["error"] = json!({
        "code": error.code(),
        "question_id": error.question_id(),
        "message": error.to_string(),
    });
    state["missing_required"] = json!(missing);
    state
}

/// Applies one answer and returns the reconciled state.
pub fn submit_patch(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
    question_id: u64,
    value_json: &str,
) -> String {
    respond(
        open_session(form_id, config_json, answers_json).and_then(|mut session| {
            let value: AnswerValue =
                serde_json::from_str(value_json).map_err(ComponentError::ValueParse)?;
            match session.set_answer(QuestionId(question_id), value) {
                Ok(_) => Ok(session_state(&session)),
                Err(error) => Ok(session_error_response(&session, &error)),
            }
        }),
    )
}

/// Gates the answers for submission against freshly computed visibility.
pub fn submit_all(
    form_id: &str,
    config_json: &str,
    answers_json: &str,
    respondent_name: &str,
) -> String {
    respond(
        open_session(form_id, config_json, answers_json).and_then(|mut session| {
            match session.submit(respondent_name) {
                Ok(submission) => Ok(json!({
                    "status": "submitted",
                    "form_id": session.form().id,
                    "submission": submission,
                })),
                Err(error) => Ok(submission_error_response(&session, &error)),
            }
        }),
    )
}
