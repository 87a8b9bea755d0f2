use activity_delivery_core::{AttemptState, CheckResults, Timestamp};
use activity_delivery_tests::{parse_list, DeliveryWorld};
use cucumber::{given, then, when};
use serde_json::{json, Value};

async fn observe(world: &mut DeliveryWorld) {
    let state = world.host_state.clone();
    world.delivery.sync_all(&state).await;
}

fn last_payload(world: &DeliveryWorld, activity_id: &str) -> Value {
    world
        .delivery
        .notifications_for(activity_id)
        .last()
        .map(|n| n.payload.clone())
        .expect("No notification delivered")
}

async fn complete_check(world: &mut DeliveryWorld, activity_id: &str, at: Timestamp) {
    let evaluated = world.tick();
    let attempt = AttemptState::new(format!("{}-graded", activity_id))
        .for_activity(activity_id)
        .with_score(1.0, 1.0)
        .evaluated_at(evaluated);

    world.host_state.complete_check(CheckResults::new(at, attempt));
    observe(world).await;
}

// ===== Given Steps =====

#[given(expr = "the host fact {string} is {int}")]
async fn host_fact(world: &mut DeliveryWorld, key: String, value: i64) {
    world.delivery.host.set_fact(&key, json!(value));
}

// ===== When Steps =====

#[when("the host starts a check")]
async fn start_check(world: &mut DeliveryWorld) {
    let at = world.tick();
    world.host_state.trigger_check(at);
    observe(world).await;
}

#[when(expr = "the host completes the check for activity {string}")]
async fn complete_current_check(world: &mut DeliveryWorld, activity_id: String) {
    let at = world
        .host_state
        .last_check_triggered
        .expect("No check started");
    complete_check(world, &activity_id, at).await;
}

#[when(expr = "the host completes an outdated check for activity {string}")]
async fn complete_outdated_check(world: &mut DeliveryWorld, activity_id: String) {
    complete_check(world, &activity_id, Timestamp::from_millis(0)).await;
}

#[when(expr = "the host finishes initialization in review mode with facts {string}")]
async fn finish_init(world: &mut DeliveryWorld, facts: String) {
    world.host_state.init_state_facts = parse_list(&facts);
    world.host_state.history_navigation = Some(true);
    world.host_state.init_phase_complete = true;
    observe(world).await;
}

#[when(expr = "the host mutates {string} to {int}")]
async fn mutate(world: &mut DeliveryWorld, key: String, value: i64) {
    let at = world.tick();
    world.host_state.mutate(at, json!({ key: value }));
    observe(world).await;
}

// ===== Then Steps =====

#[then(expr = "activity {string} was notified {string}")]
async fn was_notified(world: &mut DeliveryWorld, activity_id: String, expected: String) {
    let seen: Vec<String> = world
        .delivery
        .notifications_for(&activity_id)
        .iter()
        .map(|n| n.notification.to_string())
        .collect();
    assert_eq!(seen, parse_list(&expected));
}

#[then(expr = "the last notification of {string} carries snapshot fact {string} of {int}")]
async fn carries_snapshot_fact(
    world: &mut DeliveryWorld,
    activity_id: String,
    key: String,
    value: i64,
) {
    let payload = last_payload(world, &activity_id);
    assert_eq!(payload["snapshot"][&key], json!(value));
}

#[then(expr = "the last notification of {string} has mode {string}")]
async fn has_mode(world: &mut DeliveryWorld, activity_id: String, mode: String) {
    let payload = last_payload(world, &activity_id);
    assert_eq!(payload["mode"], json!(mode));
}

#[then(expr = "the last notification of {string} carries init fact {string}")]
async fn carries_init_fact(world: &mut DeliveryWorld, activity_id: String, key: String) {
    let payload = last_payload(world, &activity_id);
    assert!(payload["initStateFacts"].get(&key).is_some());
}

#[then(expr = "the last notification of {string} lacks init fact {string}")]
async fn lacks_init_fact(world: &mut DeliveryWorld, activity_id: String, key: String) {
    let payload = last_payload(world, &activity_id);
    assert!(payload["initStateFacts"].get(&key).is_none());
}

#[then(expr = "the published attempt of {string} is evaluated")]
async fn attempt_evaluated(world: &mut DeliveryWorld, activity_id: String) {
    let attempt = world
        .delivery
        .ctx
        .registry
        .get(&activity_id)
        .expect("No attempt published");
    assert!(attempt.is_evaluated());
}

#[then(expr = "the published attempt of {string} is not evaluated")]
async fn attempt_not_evaluated(world: &mut DeliveryWorld, activity_id: String) {
    let attempt = world
        .delivery
        .ctx
        .registry
        .get(&activity_id)
        .expect("No attempt published");
    assert!(!attempt.is_evaluated());
}
