use activity_delivery_core::{create_rule_for_ids, invert_rule, set_difference, union_rules, Rule};
use activity_delivery_tests::{parse_list, DeliveryWorld};
use cucumber::{given, then};

// ===== Given Steps =====

#[given(expr = "choices {string} of which {string} are correct")]
async fn choices_with_correct(world: &mut DeliveryWorld, all: String, correct: String) {
    let all = parse_list(&all);
    let correct = parse_list(&correct);
    let incorrect = set_difference(all.as_slice(), correct.as_slice());

    let rule = create_rule_for_ids(correct.as_slice(), incorrect.as_slice());
    world.rules.insert("inverted".to_string(), invert_rule(&rule));
    world.rules.insert("correct".to_string(), rule);
}

#[given("an empty union of rules")]
async fn empty_union(world: &mut DeliveryWorld) {
    world
        .rules
        .insert("union".to_string(), union_rules(Vec::<Rule>::new()));
}

// ===== Then Steps =====

#[then(expr = "the {word} rule matches the selection {string}")]
async fn rule_matches(world: &mut DeliveryWorld, name: String, selection: String) {
    let rule = world.rules.get(&name).expect("No such rule");
    assert!(
        rule.matches(parse_list(&selection)),
        "{} should match [{}]",
        rule,
        selection
    );
}

#[then(expr = "the {word} rule does not match the selection {string}")]
async fn rule_does_not_match(world: &mut DeliveryWorld, name: String, selection: String) {
    let rule = world.rules.get(&name).expect("No such rule");
    assert!(
        !rule.matches(parse_list(&selection)),
        "{} should not match [{}]",
        rule,
        selection
    );
}

#[then(expr = "the {word} rule reads {string}")]
async fn rule_reads(world: &mut DeliveryWorld, name: String, expected: String) {
    let rule = world.rules.get(&name).expect("No such rule");
    assert_eq!(rule.to_string(), expected);
}
