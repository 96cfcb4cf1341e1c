#![allow(missing_docs)]

pub mod answers;
pub mod answers_schema;
pub mod lint;
pub mod progress;
pub mod reconcile;
pub mod render;
pub mod session;
pub mod sink;
pub mod source;
pub mod spec;
pub mod submission;
pub mod visibility;

pub use answers::{AnswerMap, AnswerValue, Submission, SubmittedAnswer};
pub use answers_schema::generate as answers_schema;
pub use lint::{DefinitionIssue, lint};
pub use progress::{Progress, next_question, progress};
pub use reconcile::reconcile;
pub use render::{
    RenderPayload, RenderQuestion, RenderStatus, build_render_payload, render_json_ui,
    render_text,
};
pub use session::{FillSession, SessionError, SubmitError};
pub use sink::{JsonLinesSink, MemorySink, SinkError, SubmissionSink};
pub use source::{DirSource, FormSource, StaticSource};
pub use spec::{
    FormDefinition, FormError, QuestionId, QuestionSpec, QuestionType, SkipCondition, SkipLogic,
    SkipTarget, definition_schema,
};
pub use submission::{
    DEFAULT_SEPARATOR, SubmissionError, missing_required, prepare_submission,
    prepare_submission_with,
};
pub use visibility::{SkipDiagnostic, Visibility, VisibleSet, compute_visible, evaluate};
