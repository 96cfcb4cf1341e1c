use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::spec::question::{QuestionId, QuestionSpec};

/// Errors raised while loading a form definition.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("failed to parse form definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read form definition: {0}")]
    Io(#[from] std::io::Error),
    #[error("question id {0} is used more than once")]
    DuplicateQuestionId(QuestionId),
    #[error("form '{0}' has no questions")]
    NoQuestions(String),
    #[error("form '{0}' is not available")]
    UnknownForm(String),
}

/// Top-level form definition: an ordered, immutable list of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<QuestionSpec>,
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            questions: Vec::new(),
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn with_question(self, question: QuestionSpec) -> Self {
        let mut questions = self.questions;
        questions.push(question);
        Self { questions, ..self }
    }

    /// Parses and checks a JSON form definition.
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        let form: FormDefinition = serde_json::from_str(json)?;
        form.checked()
    }

    pub fn from_value(value: Value) -> Result<Self, FormError> {
        let form: FormDefinition = serde_json::from_value(value)?;
        form.checked()
    }

    /// Rejects definitions the engine cannot address by id.
    pub fn checked(self) -> Result<Self, FormError> {
        if self.questions.is_empty() {
            return Err(FormError::NoQuestions(self.id));
        }
        let mut seen = BTreeSet::new();
        for question in &self.questions {
            if !seen.insert(question.id) {
                return Err(FormError::DuplicateQuestionId(question.id));
            }
        }
        Ok(self)
    }

    pub fn question(&self, id: QuestionId) -> Option<&QuestionSpec> {
        self.questions.iter().find(|question| question.id == id)
    }

    /// Zero-based position of a question in the defining sequence.
    pub fn position(&self, id: QuestionId) -> Option<usize> {
        self.questions.iter().position(|question| question.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// JSON schema describing the form definition format.
pub fn definition_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(FormDefinition)).unwrap_or(Value::Null)
}
