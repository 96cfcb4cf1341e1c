use tracing::debug;

use crate::answers::AnswerMap;
use crate::visibility::VisibleSet;

/// Discards answers that belong to questions outside `visible`.
///
/// Must run after every visibility evaluation so a later evaluation never
/// sees an answer to a question that was hidden.
pub fn reconcile(mut answers: AnswerMap, visible: &VisibleSet) -> AnswerMap {
    let dropped = answers.retain_visible(visible);
    if !dropped.is_empty() {
        debug!(?dropped, "discarded answers of hidden questions");
    }
    answers
}
