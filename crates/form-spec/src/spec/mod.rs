pub mod form;
pub mod question;
pub mod skip;

pub use form::{FormDefinition, FormError, definition_schema};
pub use question::{QuestionId, QuestionSpec, QuestionType};
pub use skip::{SkipCondition, SkipLogic, SkipTarget};
