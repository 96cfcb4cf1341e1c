use form_spec::{
    AnswerMap, AnswerValue, FormDefinition, QuestionId, QuestionSpec, QuestionType,
    SkipCondition, SkipDiagnostic, SkipLogic, SkipTarget, compute_visible, evaluate,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "car_survey" => include_str!("../tests/fixtures/car_survey.json"),
        "broken_rules" => include_str!("../tests/fixtures/broken_rules.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn load(name: &str) -> FormDefinition {
    FormDefinition::from_json(fixture(name)).expect("fixture form")
}

fn choice(id: u64, options: &[&str], conditions: Vec<SkipCondition>) -> QuestionSpec {
    QuestionSpec::new(id, QuestionType::SingleChoice, format!("Question {id}"))
        .with_options(options.iter().copied())
        .with_skip_logic(SkipLogic::enabled_with(conditions))
}

fn text(id: u64) -> QuestionSpec {
    QuestionSpec::new(id, QuestionType::FreeText, format!("Question {id}"))
}

fn answers(entries: &[(u64, &str)]) -> AnswerMap {
    entries
        .iter()
        .map(|(id, value)| (QuestionId(*id), AnswerValue::text(*value)))
        .collect()
}

fn visible_ids(questions: &[QuestionSpec], answers: &AnswerMap) -> Vec<u64> {
    compute_visible(questions, answers).iter().map(|id| id.0).collect()
}

#[test]
fn everything_visible_without_answers() {
    let form = load("car_survey");
    assert_eq!(
        visible_ids(&form.questions, &AnswerMap::new()),
        vec![10, 20, 30, 40, 50]
    );
}

#[test]
fn terminate_hides_everything_after_trigger() {
    let questions = vec![
        choice(1, &["Yes", "No"], vec![SkipCondition::new("No", SkipTarget::Terminate)]),
        text(2),
        text(3),
    ];
    assert_eq!(visible_ids(&questions, &answers(&[(1, "No")])), vec![1]);
    assert_eq!(visible_ids(&questions, &answers(&[(1, "Yes")])), vec![1, 2, 3]);
}

#[test]
fn forward_jump_hides_questions_strictly_between() {
    let questions = vec![
        text(1),
        choice(
            2,
            &["Skip ahead", "Stay"],
            vec![SkipCondition::new("Skip ahead", SkipTarget::question(5))],
        ),
        text(3),
        text(4),
        text(5),
    ];
    assert_eq!(
        visible_ids(&questions, &answers(&[(2, "Skip ahead")])),
        vec![1, 2, 5]
    );
}

#[test]
fn first_matching_condition_wins() {
    let questions = vec![
        choice(
            1,
            &["A"],
            vec![
                SkipCondition::new("A", SkipTarget::question(3)),
                SkipCondition::new("A", SkipTarget::Terminate),
            ],
        ),
        text(2),
        text(3),
        text(4),
    ];
    assert_eq!(visible_ids(&questions, &answers(&[(1, "A")])), vec![1, 3, 4]);
}

#[test]
fn multi_choice_uses_condition_order_not_selection_order() {
    let form = load("car_survey");
    let mut map = answers(&[(10, "Yes")]);
    map.insert(QuestionId(30), AnswerValue::selections(["GPS", "Sunroof"]));
    assert_eq!(visible_ids(&form.questions, &map), vec![10, 20, 30, 50]);

    map.insert(QuestionId(30), AnswerValue::selections(["GPS"]));
    assert_eq!(visible_ids(&form.questions, &map), vec![10, 20, 30]);
}

#[test]
fn hidden_question_cannot_trigger_rules() {
    let questions = vec![
        choice(1, &["Jump"], vec![SkipCondition::new("Jump", SkipTarget::question(4))]),
        choice(2, &["End"], vec![SkipCondition::new("End", SkipTarget::Terminate)]),
        text(3),
        text(4),
        text(5),
    ];
    let map = answers(&[(1, "Jump"), (2, "End")]);
    assert_eq!(visible_ids(&questions, &map), vec![1, 4, 5]);
}

#[test]
fn overlapping_rules_apply_in_sequence() {
    let questions = vec![
        choice(1, &["go"], vec![SkipCondition::new("go", SkipTarget::question(3))]),
        text(2),
        choice(3, &["go"], vec![SkipCondition::new("go", SkipTarget::question(5))]),
        text(4),
        choice(5, &["stop"], vec![SkipCondition::new("stop", SkipTarget::Terminate)]),
        text(6),
    ];
    let map = answers(&[(1, "go"), (3, "go")]);
    assert_eq!(visible_ids(&questions, &map), vec![1, 3, 5, 6]);

    let map = answers(&[(1, "go"), (3, "go"), (5, "stop")]);
    assert_eq!(visible_ids(&questions, &map), vec![1, 3, 5]);
}

#[test]
fn malformed_and_backward_targets_are_ignored_and_reported() {
    let form = load("broken_rules");

    let result = evaluate(&form.questions, &answers(&[(1, "A")]));
    assert_eq!(result.visible.len(), 3);
    assert_eq!(
        result.diagnostics,
        vec![SkipDiagnostic::MalformedTarget {
            question_id: QuestionId(1),
            position: 9
        }]
    );

    let result = evaluate(&form.questions, &answers(&[(1, "B")]));
    assert_eq!(result.visible.len(), 3);
    assert_eq!(
        result.diagnostics,
        vec![SkipDiagnostic::BackwardOrSelfJump {
            question_id: QuestionId(1),
            position: 1
        }]
    );
}

#[test]
fn negative_target_is_malformed() {
    let questions = vec![
        choice(1, &["x"], vec![SkipCondition::new("x", SkipTarget::Position(-3))]),
        text(2),
    ];
    let result = evaluate(&questions, &answers(&[(1, "x")]));
    assert_eq!(result.visible.len(), 2);
    assert!(matches!(
        result.diagnostics.as_slice(),
        [SkipDiagnostic::MalformedTarget { position: -3, .. }]
    ));
}

#[test]
fn answers_for_unknown_or_hidden_questions_are_tolerated() {
    let form = load("car_survey");
    let map = answers(&[(10, "No"), (20, "Volvo"), (999, "stray")]);
    assert_eq!(visible_ids(&form.questions, &map), vec![10, 40, 50]);
}

#[test]
fn evaluation_is_idempotent_and_never_grows() {
    let form = load("car_survey");
    let mut map = answers(&[(10, "Yes")]);
    map.insert(QuestionId(30), AnswerValue::selections(["Sunroof"]));

    let first = compute_visible(&form.questions, &map);
    let second = compute_visible(&form.questions, &map);
    assert_eq!(first, second);

    let all: Vec<QuestionId> = form.questions.iter().map(|question| question.id).collect();
    assert!(first.len() <= all.len());
    assert!(first.iter().all(|id| all.contains(&id)));
    let positions: Vec<usize> = first
        .iter()
        .map(|id| form.position(id).expect("known id"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}
