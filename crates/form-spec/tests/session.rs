use std::sync::Arc;

use form_spec::{
    AnswerMap, AnswerValue, FillSession, FormDefinition, JsonLinesSink, MemorySink, QuestionId,
    QuestionSpec, QuestionType, SessionError, SkipCondition, SkipLogic, SkipTarget,
    SubmissionError, SubmitError,
};

fn toggle_form() -> FormDefinition {
    FormDefinition::new("toggle", "Toggle")
        .with_question(
            QuestionSpec::new(1, QuestionType::SingleChoice, "Show the second question?")
                .with_options(["Hide", "Keep"])
                .with_skip_logic(SkipLogic::enabled_with(vec![SkipCondition::new(
                    "Hide",
                    SkipTarget::question(3),
                )])),
        )
        .with_question(QuestionSpec::new(2, QuestionType::FreeText, "Details").required())
        .with_question(QuestionSpec::new(3, QuestionType::Email, "Email").required())
}

fn survey() -> Arc<FormDefinition> {
    Arc::new(
        FormDefinition::from_json(include_str!("../tests/fixtures/car_survey.json"))
            .expect("fixture form"),
    )
}

fn assert_closed(session: &FillSession) {
    for id in session.answers().ids() {
        assert!(session.visible().contains(id), "answer {id} is not visible");
    }
}

#[test]
fn re_showing_a_question_leaves_it_unanswered() {
    let mut session = FillSession::new(Arc::new(toggle_form()));
    session
        .set_answer(QuestionId(2), AnswerValue::text("some details"))
        .expect("visible");

    let visible = session
        .set_answer(QuestionId(1), AnswerValue::text("Hide"))
        .expect("visible");
    assert!(!visible.contains(QuestionId(2)));
    assert!(session.answers().get(QuestionId(2)).is_none());
    assert_closed(&session);

    let visible = session
        .set_answer(QuestionId(1), AnswerValue::text("Keep"))
        .expect("visible");
    assert!(visible.contains(QuestionId(2)));
    assert!(session.answers().get(QuestionId(2)).is_none());
}

#[test]
fn hidden_required_question_does_not_block_submit() {
    let form = FormDefinition::new("hidden-required", "Hidden required")
        .with_question(
            QuestionSpec::new(1, QuestionType::SingleChoice, "Continue?")
                .with_options(["Yes", "No"])
                .with_skip_logic(SkipLogic::enabled_with(vec![SkipCondition::new(
                    "No",
                    SkipTarget::Terminate,
                )])),
        )
        .with_question(QuestionSpec::new(2, QuestionType::FreeText, "Why?"))
        .with_question(QuestionSpec::new(3, QuestionType::Date, "When?").required());
    let mut session = FillSession::new(Arc::new(form));
    session
        .set_answer(QuestionId(1), AnswerValue::text("No"))
        .expect("visible");

    let submission = session.submit("Ada").expect("submit succeeds");
    assert_eq!(submission.respondent_name, "Ada");
    assert_eq!(submission.answers.len(), 1);
    assert_eq!(submission.answers[0].question_id, QuestionId(1));
    assert_eq!(submission.answers[0].answer_text, "No");
}

#[test]
fn rejects_unknown_and_hidden_questions() {
    let mut session = FillSession::new(survey());
    assert_eq!(
        session.set_answer(QuestionId(77), AnswerValue::text("x")),
        Err(SessionError::UnknownQuestion(QuestionId(77)))
    );

    session
        .set_answer(QuestionId(10), AnswerValue::text("No"))
        .expect("visible");
    assert_eq!(
        session.set_answer(QuestionId(20), AnswerValue::text("Volvo")),
        Err(SessionError::QuestionHidden(QuestionId(20)))
    );
    assert!(session.answers().get(QuestionId(20)).is_none());
}

#[test]
fn toggling_options_recomputes_visibility() {
    let mut session = FillSession::new(survey());
    session
        .set_answer(QuestionId(10), AnswerValue::text("Yes"))
        .expect("visible");
    session
        .set_answer(QuestionId(40), AnswerValue::text("Phone"))
        .expect("visible");

    let visible = session
        .toggle_option(QuestionId(30), "Sunroof", true)
        .expect("multi choice");
    assert!(!visible.contains(QuestionId(40)));
    assert!(session.answers().get(QuestionId(40)).is_none());

    let visible = session
        .toggle_option(QuestionId(30), "Sunroof", false)
        .expect("multi choice");
    assert!(visible.contains(QuestionId(40)));
    assert_eq!(
        session.answers().get(QuestionId(30)),
        Some(&AnswerValue::selections(Vec::<String>::new()))
    );

    assert_eq!(
        session.toggle_option(QuestionId(40), "Email", true),
        Err(SessionError::NotMultiChoice(QuestionId(40)))
    );
}

#[test]
fn resume_drops_answers_hidden_by_existing_ones() {
    let answers: AnswerMap = serde_json::from_value(serde_json::json!({
        "10": "No",
        "20": "Volvo",
        "30": ["GPS"],
        "40": "Email"
    }))
    .expect("answers");
    let session = FillSession::resume(survey(), answers);

    let ids: Vec<u64> = session.answers().ids().map(|id| id.0).collect();
    assert_eq!(ids, vec![10, 40]);
    assert_closed(&session);
}

#[test]
fn clearing_an_answer_restores_hidden_questions() {
    let mut session = FillSession::new(survey());
    session
        .set_answer(QuestionId(10), AnswerValue::text("No"))
        .expect("visible");
    assert_eq!(session.visible().len(), 3);

    session.clear_answer(QuestionId(10)).expect("visible");
    assert_eq!(session.visible().len(), 5);
}

#[test]
fn submit_requires_respondent_and_visible_required_answers() {
    let mut session = FillSession::new(survey());
    session
        .set_answer(QuestionId(10), AnswerValue::text("Yes"))
        .expect("visible");

    assert_eq!(session.submit("   "), Err(SubmissionError::MissingRespondent));
    match session.submit("Grace") {
        Err(SubmissionError::MissingRequiredAnswer { question_id, .. }) => {
            assert_eq!(question_id, QuestionId(20))
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn submit_to_forwards_to_sinks() {
    let mut session = FillSession::new(survey());
    session
        .set_answer(QuestionId(10), AnswerValue::text("No"))
        .expect("visible");
    session
        .set_answer(QuestionId(40), AnswerValue::text("Email"))
        .expect("visible");

    let mut memory = MemorySink::default();
    let submission = session.submit_to(&mut memory, " Lin ").expect("delivered");
    assert_eq!(memory.delivered.len(), 1);
    assert_eq!(memory.delivered[0].0, "car-survey");
    assert_eq!(memory.delivered[0].1, submission);
    assert_eq!(submission.respondent_name, "Lin");

    let mut lines = JsonLinesSink::new(Vec::new());
    session.submit_to(&mut lines, "Lin").expect("delivered");
    let written = String::from_utf8(lines.into_inner()).expect("utf8");
    let record: serde_json::Value =
        serde_json::from_str(written.trim_end()).expect("json line");
    assert_eq!(record["form_id"], "car-survey");
    assert_eq!(record["submission"]["answers"][1]["answer_text"], "Email");

    let mut empty = FillSession::new(survey());
    assert!(matches!(
        empty.submit_to(&mut memory, "Lin"),
        Err(SubmitError::Submission(_))
    ));
    assert_eq!(memory.delivered.len(), 1);
}

#[test]
fn editing_a_definition_does_not_touch_running_sessions() {
    let form = Arc::new(toggle_form());
    let mut session = FillSession::new(Arc::clone(&form));

    let edited = FormDefinition::clone(&form)
        .with_question(QuestionSpec::new(4, QuestionType::Number, "Age").required());
    assert_eq!(edited.len(), 4);

    session
        .set_answer(QuestionId(1), AnswerValue::text("Keep"))
        .expect("visible");
    assert_eq!(session.form().len(), 3);
    assert_eq!(session.visible().len(), 3);
}

#[test]
fn answer_shape_must_fit_question_type() {
    let mut session = FillSession::new(survey());
    session
        .set_answer(QuestionId(10), AnswerValue::text("Yes"))
        .expect("visible");

    assert_eq!(
        session.set_answer(QuestionId(10), AnswerValue::selections(["No"])),
        Err(SessionError::ValueShape(QuestionId(10)))
    );
    assert_eq!(
        session.set_answer(QuestionId(30), AnswerValue::text("GPS")),
        Err(SessionError::ValueShape(QuestionId(30)))
    );
    assert_eq!(
        session.answers().get(QuestionId(10)),
        Some(&AnswerValue::text("Yes"))
    );
    assert!(session.answers().get(QuestionId(30)).is_none());
    assert_eq!(session.visible().len(), 5);
}

#[test]
fn toggling_keeps_a_resumed_single_selection() {
    let answers: AnswerMap = serde_json::from_value(serde_json::json!({
        "10": "Yes",
        "30": "GPS"
    }))
    .expect("answers");
    let mut session = FillSession::resume(survey(), answers);
    assert!(!session.visible().contains(QuestionId(40)));

    session
        .toggle_option(QuestionId(30), "Sunroof", true)
        .expect("multi choice");
    assert_eq!(
        session.answers().get(QuestionId(30)),
        Some(&AnswerValue::selections(["GPS", "Sunroof"]))
    );

    let visible = session
        .toggle_option(QuestionId(30), "Sunroof", false)
        .expect("multi choice");
    assert_eq!(
        visible.ids(),
        &[QuestionId(10), QuestionId(20), QuestionId(30)]
    );
}
