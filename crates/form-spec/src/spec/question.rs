use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::skip::SkipLogic;

/// Stable question identifier, unique within a form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for QuestionId {
    fn from(value: u64) -> Self {
        QuestionId(value)
    }
}

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum QuestionType {
    #[default]
    #[serde(rename = "text")]
    FreeText,
    #[serde(rename = "textarea")]
    LongText,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "datetime-local")]
    DateTime,
    #[serde(rename = "radio")]
    SingleChoice,
    #[serde(rename = "checkbox")]
    MultiChoice,
    #[serde(rename = "select")]
    SingleSelect,
}

impl QuestionType {
    /// Wire label used in form definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::FreeText => "text",
            QuestionType::LongText => "textarea",
            QuestionType::Email => "email",
            QuestionType::Number => "number",
            QuestionType::Date => "date",
            QuestionType::Time => "time",
            QuestionType::DateTime => "datetime-local",
            QuestionType::SingleChoice => "radio",
            QuestionType::MultiChoice => "checkbox",
            QuestionType::SingleSelect => "select",
        }
    }

    /// Whether the question offers a fixed list of options.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice | QuestionType::MultiChoice | QuestionType::SingleSelect
        )
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, QuestionType::MultiChoice)
    }
}

/// A single question of a form. Its position in the form is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionSpec {
    pub id: QuestionId,
    pub question_text: String,
    #[serde(rename = "question_type", default)]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_logic: Option<SkipLogic>,
}

impl QuestionSpec {
    pub fn new(id: u64, kind: QuestionType, text: impl Into<String>) -> Self {
        Self {
            id: QuestionId(id),
            question_text: text.into(),
            kind,
            options: Vec::new(),
            required: false,
            skip_logic: None,
        }
    }

    pub fn with_options<I, S>(self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub fn with_skip_logic(self, skip_logic: SkipLogic) -> Self {
        Self {
            skip_logic: Some(skip_logic),
            ..self
        }
    }

    /// Skip logic that participates in visibility, if any.
    pub fn active_skip_logic(&self) -> Option<&SkipLogic> {
        self.skip_logic.as_ref().filter(|logic| logic.enabled)
    }
}
