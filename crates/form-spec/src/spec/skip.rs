use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a matched condition sends the respondent.
///
/// On the wire this is `skip_to_question`: `0` terminates the form, `k >= 1`
/// jumps to the question at 1-based position `k`. Other integers are kept as
/// is and ignored by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum SkipTarget {
    Terminate,
    Position(i64),
}

impl SkipTarget {
    /// Jump target by 1-based position. Positions past `i64::MAX` saturate
    /// and end up outside every form.
    pub fn question(position: usize) -> Self {
        SkipTarget::Position(i64::try_from(position).unwrap_or(i64::MAX))
    }

    /// Zero-based index of the jump destination within a form of `len`
    /// questions, or `None` for terminate and out-of-range positions.
    pub fn index_in(&self, len: usize) -> Option<usize> {
        match *self {
            SkipTarget::Terminate => None,
            SkipTarget::Position(position) => usize::try_from(position)
                .ok()
                .and_then(|position| position.checked_sub(1))
                .filter(|index| *index < len),
        }
    }
}

impl From<i64> for SkipTarget {
    fn from(value: i64) -> Self {
        if value == 0 {
            SkipTarget::Terminate
        } else {
            SkipTarget::Position(value)
        }
    }
}

impl From<SkipTarget> for i64 {
    fn from(value: SkipTarget) -> Self {
        match value {
            SkipTarget::Terminate => 0,
            SkipTarget::Position(position) => position,
        }
    }
}

/// Trigger option and target of a single skip rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkipCondition {
    pub option: String,
    #[serde(rename = "skip_to_question")]
    #[schemars(with = "i64")]
    pub target: SkipTarget,
}

impl SkipCondition {
    pub fn new(option: impl Into<String>, target: SkipTarget) -> Self {
        Self {
            option: option.into(),
            target,
        }
    }
}

/// Ordered skip rules attached to a question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SkipLogic {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub conditions: Vec<SkipCondition>,
}

impl SkipLogic {
    pub fn enabled_with(conditions: Vec<SkipCondition>) -> Self {
        Self {
            enabled: true,
            conditions,
        }
    }

    pub fn with_condition(self, condition: SkipCondition) -> Self {
        let mut conditions = self.conditions;
        conditions.push(condition);
        Self { conditions, ..self }
    }

    pub fn toggled(self) -> Self {
        Self {
            enabled: !self.enabled,
            ..self
        }
    }
}
