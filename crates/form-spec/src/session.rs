use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::answers::{AnswerMap, AnswerValue, Submission};
use crate::reconcile::reconcile;
use crate::sink::{SinkError, SubmissionSink};
use crate::spec::form::FormDefinition;
use crate::spec::question::QuestionId;
use crate::submission::{DEFAULT_SEPARATOR, SubmissionError, prepare_submission_with};
use crate::visibility::{Visibility, VisibleSet, evaluate};

/// Rejected answer mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question {0} does not exist in this form")]
    UnknownQuestion(QuestionId),
    #[error("question {0} is hidden by skip logic")]
    QuestionHidden(QuestionId),
    #[error("question {0} is not a multi-choice question")]
    NotMultiChoice(QuestionId),
    #[error("answer shape does not fit question {0}")]
    ValueShape(QuestionId),
}

/// Errors from [`FillSession::submit_to`].
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// One respondent filling one form.
///
/// Every mutation runs exactly one evaluate-then-reconcile cycle before it
/// returns, so `visible()` and `answers()` never disagree.
#[derive(Debug, Clone)]
pub struct FillSession {
    form: Arc<FormDefinition>,
    answers: AnswerMap,
    visibility: Visibility,
    separator: String,
}

impl FillSession {
    pub fn new(form: Arc<FormDefinition>) -> Self {
        Self::resume(form, AnswerMap::new())
    }

    /// Starts from previously collected answers, dropping those that are
    /// hidden under them.
    pub fn resume(form: Arc<FormDefinition>, answers: AnswerMap) -> Self {
        let mut session = Self {
            form,
            answers,
            visibility: Visibility::default(),
            separator: DEFAULT_SEPARATOR.to_string(),
        };
        session.recompute();
        session
    }

    pub fn with_separator(self, separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..self
        }
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visibility.visible
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn set_answer(
        &mut self,
        id: QuestionId,
        value: AnswerValue,
    ) -> Result<&VisibleSet, SessionError> {
        self.ensure_editable(id)?;
        let is_multi = self.is_multi(id);
        let fits = match &value {
            AnswerValue::Text(_) => !is_multi,
            AnswerValue::Selections(_) => is_multi,
        };
        if !fits {
            return Err(SessionError::ValueShape(id));
        }
        self.answers.insert(id, value);
        self.recompute();
        Ok(self.visible())
    }

    pub fn clear_answer(&mut self, id: QuestionId) -> Result<&VisibleSet, SessionError> {
        self.ensure_editable(id)?;
        self.answers.remove(id);
        self.recompute();
        Ok(self.visible())
    }

    /// Checks or unchecks one option of a multi-choice question.
    pub fn toggle_option(
        &mut self,
        id: QuestionId,
        option: &str,
        checked: bool,
    ) -> Result<&VisibleSet, SessionError> {
        self.ensure_editable(id)?;
        if !self.is_multi(id) {
            return Err(SessionError::NotMultiChoice(id));
        }

        // A resumed answer may still carry a single option as text.
        let mut selected = match self.answers.get(id) {
            Some(AnswerValue::Selections(selected)) => selected.clone(),
            Some(AnswerValue::Text(text)) if !text.trim().is_empty() => {
                BTreeSet::from([text.clone()])
            }
            _ => BTreeSet::new(),
        };
        if checked {
            selected.insert(option.to_string());
        } else {
            selected.remove(option);
        }
        self.answers.insert(id, AnswerValue::Selections(selected));
        self.recompute();
        Ok(self.visible())
    }

    /// Recomputes visibility, then gates and builds the submission.
    pub fn submit(&mut self, respondent_name: &str) -> Result<Submission, SubmissionError> {
        self.recompute();

        let respondent_name = respondent_name.trim();
        if respondent_name.is_empty() {
            return Err(SubmissionError::MissingRespondent);
        }

        let answers = prepare_submission_with(
            &self.form.questions,
            &self.answers,
            self.visible(),
            &self.separator,
        )?;
        Ok(Submission {
            respondent_name: respondent_name.to_string(),
            answers,
        })
    }

    pub fn submit_to<S: SubmissionSink>(
        &mut self,
        sink: &mut S,
        respondent_name: &str,
    ) -> Result<Submission, SubmitError> {
        let submission = self.submit(respondent_name)?;
        sink.deliver(&self.form.id, &submission)?;
        Ok(submission)
    }

    fn ensure_editable(&self, id: QuestionId) -> Result<(), SessionError> {
        if self.form.question(id).is_none() {
            return Err(SessionError::UnknownQuestion(id));
        }
        if !self.visible().contains(id) {
            return Err(SessionError::QuestionHidden(id));
        }
        Ok(())
    }

    fn is_multi(&self, id: QuestionId) -> bool {
        self.form
            .question(id)
            .is_some_and(|question| question.kind.is_multi())
    }

    fn recompute(&mut self) {
        let visibility = evaluate(&self.form.questions, &self.answers);
        let answers = std::mem::take(&mut self.answers);
        self.answers = reconcile(answers, &visibility.visible);
        debug!(
            form = %self.form.id,
            visible = visibility.visible.len(),
            answered = self.answers.len(),
            "visibility recomputed"
        );
        self.visibility = visibility;
    }
}
