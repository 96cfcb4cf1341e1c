use serde_json::{Map, Value, json};

use crate::answers::AnswerValue;
use crate::progress::{Progress, next_question, progress};
use crate::session::FillSession;
use crate::spec::question::{QuestionId, QuestionType};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Some visible question still has no answer.
    NeedInput,
    /// All visible questions are filled.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Describes a single question for render outputs.
#[derive(Debug, Clone)]
pub struct RenderQuestion {
    pub id: QuestionId,
    /// Position among visible questions, `None` when hidden.
    pub number: Option<usize>,
    pub text: String,
    pub kind: QuestionType,
    pub required: bool,
    pub visible: bool,
    pub current_value: Option<AnswerValue>,
    pub options: Vec<String>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub form_id: String,
    pub form_title: String,
    pub help: Option<String>,
    pub status: RenderStatus,
    pub next_question_id: Option<QuestionId>,
    pub progress: Progress,
    pub questions: Vec<RenderQuestion>,
}

impl RenderPayload {
    pub fn hidden_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| !question.visible)
            .count()
    }

    pub fn question(&self, id: QuestionId) -> Option<&RenderQuestion> {
        self.questions.iter().find(|question| question.id == id)
    }
}

pub fn build_render_payload(session: &FillSession) -> RenderPayload {
    let form = session.form();
    let answers = session.answers();
    let visible = session.visible();
    let next_question_id = next_question(&form.questions, answers, visible);

    let questions = form
        .questions
        .iter()
        .map(|question| RenderQuestion {
            id: question.id,
            number: visible.display_number(question.id),
            text: question.question_text.clone(),
            kind: question.kind,
            required: question.required,
            visible: visible.contains(question.id),
            current_value: answers.get(question.id).cloned(),
            options: question.options.clone(),
        })
        .collect();

    RenderPayload {
        form_id: form.id.clone(),
        form_title: form.title.clone(),
        help: form.description.clone(),
        status: if next_question_id.is_some() {
            RenderStatus::NeedInput
        } else {
            RenderStatus::Complete
        },
        next_question_id,
        progress: progress(answers, visible),
        questions,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let questions = payload
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("id".into(), json!(question.id));
            map.insert("number".into(), json!(question.number));
            map.insert("text".into(), Value::String(question.text.clone()));
            map.insert("type".into(), Value::String(question.kind.as_str().into()));
            map.insert("required".into(), Value::Bool(question.required));
            map.insert("visible".into(), Value::Bool(question.visible));
            if !question.options.is_empty() {
                map.insert("options".into(), json!(question.options));
            }
            if let Some(value) = &question.current_value {
                map.insert("current_value".into(), json!(value));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "form_title": payload.form_title,
        "help": payload.help,
        "status": payload.status.as_str(),
        "next_question_id": payload.next_question_id,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
            "hidden": payload.hidden_count(),
        },
        "questions": questions,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", payload.form_title, payload.form_id));
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));
    if let Some(help) = &payload.help {
        lines.push(format!("Help: {}", help));
    }
    let hidden = payload.hidden_count();
    if hidden > 0 {
        lines.push(format!(
            "Visible questions: {}, hidden: {}",
            payload.progress.total, hidden
        ));
    }

    match payload.next_question_id.and_then(|id| payload.question(id)) {
        Some(question) => lines.push(format!("Next question: {}", question.text)),
        None => lines.push("All visible questions are answered.".to_string()),
    }

    lines.push("Questions:".to_string());
    for question in payload.questions.iter().filter(|question| question.visible) {
        let mut entry = format!(
            " {}. {}",
            question.number.unwrap_or_default(),
            question.text
        );
        if question.required {
            entry.push_str(" *");
        }
        if let Some(value) = &question.current_value {
            entry.push_str(&format!(" = {}", value_to_display(value, &question.options)));
        }
        lines.push(entry);
    }

    lines.join("\n")
}

fn value_to_display(value: &AnswerValue, options: &[String]) -> String {
    value.joined(options, ", ")
}
