use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::question::QuestionId;
use crate::visibility::VisibleSet;

/// A respondent's answer to one question.
///
/// JSON numbers and booleans are accepted as text, since clients often send
/// `number` answers unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "WireAnswer")]
pub enum AnswerValue {
    /// Free text, dates and single choices.
    Text(String),
    /// Multi-choice selections.
    Selections(BTreeSet<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireAnswer {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Selections(BTreeSet<String>),
}

impl From<WireAnswer> for AnswerValue {
    fn from(value: WireAnswer) -> Self {
        match value {
            WireAnswer::Text(text) => AnswerValue::Text(text),
            WireAnswer::Number(number) => AnswerValue::Text(number.to_string()),
            WireAnswer::Flag(flag) => AnswerValue::Text(flag.to_string()),
            WireAnswer::Selections(selected) => AnswerValue::Selections(selected),
        }
    }
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn selections<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AnswerValue::Selections(values.into_iter().map(Into::into).collect())
    }

    /// Exact match for text, membership for selections.
    pub fn matches(&self, option: &str) -> bool {
        match self {
            AnswerValue::Text(text) => text == option,
            AnswerValue::Selections(selected) => selected.contains(option),
        }
    }

    /// Empty and whitespace-only text, or no selection at all.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Selections(selected) => selected.is_empty(),
        }
    }

    /// Flattens the answer into submitted text. Selections follow the order
    /// of `options`; selections outside of it come last, sorted.
    pub fn joined(&self, options: &[String], separator: &str) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Selections(selected) => {
                let mut ordered: Vec<&str> = options
                    .iter()
                    .filter(|option| selected.contains(option.as_str()))
                    .map(String::as_str)
                    .collect();
                let mut listed = BTreeSet::new();
                ordered.retain(|option| listed.insert(*option));
                ordered.extend(
                    selected
                        .iter()
                        .map(String::as_str)
                        .filter(|option| !listed.contains(option)),
                );
                ordered.join(separator)
            }
        }
    }
}

/// Live answers of one form-filling session, keyed by question id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<QuestionId, AnswerValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn get(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.0.get(&id)
    }

    pub fn insert(&mut self, id: QuestionId, value: AnswerValue) -> Option<AnswerValue> {
        self.0.insert(id, value)
    }

    pub fn remove(&mut self, id: QuestionId) -> Option<AnswerValue> {
        self.0.remove(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.0.contains_key(&id)
    }

    /// Present and not blank.
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.get(id).is_some_and(|value| !value.is_blank())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestionId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &AnswerValue)> {
        self.0.iter().map(|(id, value)| (*id, value))
    }

    /// Drops every answer whose question is not visible and returns the
    /// dropped ids.
    pub fn retain_visible(&mut self, visible: &VisibleSet) -> Vec<QuestionId> {
        let mut dropped = Vec::new();
        self.0.retain(|id, _| {
            let keep = visible.contains(*id);
            if !keep {
                dropped.push(*id);
            }
            keep
        });
        dropped
    }
}

impl FromIterator<(QuestionId, AnswerValue)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (QuestionId, AnswerValue)>>(iter: T) -> Self {
        AnswerMap(iter.into_iter().collect())
    }
}

/// One entry of the outgoing response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub answer_text: String,
}

/// Payload handed to the submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub respondent_name: String,
    pub answers: Vec<SubmittedAnswer>,
}

impl Submission {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes)
    }
}
