use activity_delivery_core::{CataAction, CataEditor, CataEvent, CataModel, Rule};
use activity_delivery_tests::{parse_list, DeliveryWorld};
use cucumber::{given, then, when};

fn model(world: &mut DeliveryWorld) -> &CataModel {
    world.editor().model()
}

fn rules(world: &mut DeliveryWorld) -> Vec<Rule> {
    model(world).responses().iter().map(|r| r.rule.clone()).collect()
}

// ===== Given Steps =====

#[given(expr = "a new simple CATA model with choices {string}")]
async fn new_simple_model(world: &mut DeliveryWorld, labels: String) {
    let model = CataModel::new_simple();
    for (label, choice) in parse_list(&labels).into_iter().zip(&model.choices) {
        world.choice_ids.insert(label, choice.id.clone());
    }
    world.editor = Some(CataEditor::new(model));
}

// ===== When Steps =====

#[when(expr = "I toggle the correctness of choice {string}")]
async fn toggle_correctness(world: &mut DeliveryWorld, label: String) {
    let choice_id = world.choice_id(&label);
    world.execute(CataAction::ToggleChoiceCorrectness { choice_id });
}

#[when("I toggle the correctness of an unknown choice")]
async fn toggle_unknown(world: &mut DeliveryWorld) {
    world.execute(CataAction::ToggleChoiceCorrectness {
        choice_id: "no-such-choice".to_string(),
    });
}

#[when(expr = "I add choice {string}")]
async fn add_choice(world: &mut DeliveryWorld, label: String) {
    match world.execute(CataAction::AddChoice).clone() {
        CataEvent::ChoiceAdded { choice_id } => {
            world.choice_ids.insert(label, choice_id);
        }
        other => panic!("Expected ChoiceAdded, got {:?}", other),
    }
}

#[when(expr = "I remove choice {string}")]
async fn remove_choice(world: &mut DeliveryWorld, label: String) {
    let choice_id = world.choice_id(&label);
    world.execute(CataAction::RemoveChoice { choice_id });
}

#[when("I add targeted feedback")]
async fn add_targeted_feedback(world: &mut DeliveryWorld) {
    world.execute(CataAction::AddTargetedFeedback);
}

#[when("I switch the model type")]
async fn switch_type(world: &mut DeliveryWorld) {
    world.execute(CataAction::ToggleType);
}

#[when("I remember the rules")]
async fn remember_rules(world: &mut DeliveryWorld) {
    let remembered = rules(world);
    for (i, rule) in remembered.into_iter().enumerate() {
        world.rules.insert(format!("remembered:{}", i), rule);
    }
}

#[when("I add a hint")]
async fn add_hint(world: &mut DeliveryWorld) {
    world.execute(CataAction::AddHint);
}

#[when("I remove the last hint")]
async fn remove_last_hint(world: &mut DeliveryWorld) {
    let hint_id = model(world)
        .hints()
        .last()
        .map(|h| h.id.clone())
        .expect("Model has no hints");
    world.execute(CataAction::RemoveHint { hint_id });
}

// ===== Then Steps =====

#[then(expr = "selecting {string} earns the correct response")]
async fn earns_correct(world: &mut DeliveryWorld, labels: String) {
    let selection: Vec<_> = parse_list(&labels)
        .iter()
        .map(|l| world.choice_id(l))
        .collect();
    let model = model(world);
    let response = model.evaluate(&selection).expect("No response matched");
    assert_eq!(response.id, model.authoring.correct.1);
}

#[then(expr = "selecting {string} earns the incorrect response")]
async fn earns_incorrect(world: &mut DeliveryWorld, labels: String) {
    let selection: Vec<_> = parse_list(&labels)
        .iter()
        .map(|l| world.choice_id(l))
        .collect();
    let model = model(world);
    let response = model.evaluate(&selection).expect("No response matched");
    assert_eq!(response.id, model.authoring.incorrect.1);
}

#[then(expr = "choice {string} is correct")]
async fn choice_is_correct(world: &mut DeliveryWorld, label: String) {
    let choice_id = world.choice_id(&label);
    assert!(model(world).is_correct(&choice_id));
}

#[then(expr = "choice {string} is not correct")]
async fn choice_is_not_correct(world: &mut DeliveryWorld, label: String) {
    let choice_id = world.choice_id(&label);
    assert!(!model(world).is_correct(&choice_id));
}

#[then(expr = "no rule references choice {string}")]
async fn no_rule_references(world: &mut DeliveryWorld, label: String) {
    let choice_id = world.choice_id(&label);
    assert!(!model(world).references_choice(&choice_id));
}

#[then(expr = "the model has {int} choices")]
async fn choice_count(world: &mut DeliveryWorld, count: usize) {
    assert_eq!(model(world).choices.len(), count);
}

#[then(expr = "the model has {int} responses")]
async fn response_count(world: &mut DeliveryWorld, count: usize) {
    assert_eq!(model(world).responses().len(), count);
}

#[then(expr = "the model has {int} hints")]
async fn hint_count(world: &mut DeliveryWorld, count: usize) {
    assert_eq!(model(world).hints().len(), count);
}

#[then("the model is simple")]
async fn model_is_simple(world: &mut DeliveryWorld) {
    assert!(model(world).is_simple());
}

#[then("the rules are unchanged")]
async fn rules_unchanged(world: &mut DeliveryWorld) {
    let current = rules(world);
    for (i, rule) in current.iter().enumerate() {
        let remembered = world
            .rules
            .get(&format!("remembered:{}", i))
            .expect("Rules were not remembered");
        assert_eq!(rule, remembered);
    }
}

#[then("the last action failed")]
async fn last_action_failed(world: &mut DeliveryWorld) {
    let event = world.last_event.as_ref().expect("No action executed");
    assert!(event.is_failure(), "Expected a failure, got {:?}", event);
}

#[then("the last action was ignored")]
async fn last_action_ignored(world: &mut DeliveryWorld) {
    assert!(matches!(
        world.last_event,
        Some(CataEvent::ActionIgnored { .. })
    ));
}
