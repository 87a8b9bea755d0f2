use activity_delivery_bridge::BridgeEvent;
use activity_delivery_core::BridgeEventKind;
use activity_delivery_tests::DeliveryWorld;
use cucumber::{given, then, when};
use serde_json::json;
use std::time::Duration;

const REPLY_TIMEOUT: Duration = Duration::from_millis(50);

fn kind(name: &str) -> BridgeEventKind {
    name.parse()
        .unwrap_or_else(|e| panic!("Unknown event kind '{}': {}", name, e))
}

// ===== Given Steps =====

#[given(expr = "activity {string} is mounted with attempt {string}")]
async fn activity_mounted(world: &mut DeliveryWorld, activity_id: String, attempt_guid: String) {
    world.delivery.mount(&activity_id, &attempt_guid);
}

#[given(expr = "the host rejects {string}")]
async fn host_rejects(world: &mut DeliveryWorld, name: String) {
    world.delivery.host.fail_on(kind(&name));
}

// ===== When Steps =====

#[when(expr = "the element raises {string} for attempt {string}")]
async fn element_raises(world: &mut DeliveryWorld, name: String, attempt_guid: String) {
    let (event, pending) = BridgeEvent::new(kind(&name), attempt_guid)
        .with_payload(json!({"input": []}))
        .with_continuation();

    world.delivery.ctx.bus.dispatch(event).await;

    let result = match pending.timeout(REPLY_TIMEOUT).await {
        Some(Ok(result)) => Some(result),
        _ => None,
    };
    world.last_result = Some(result);
}

#[when(expr = "activity {string} is unmounted")]
async fn activity_unmounted(world: &mut DeliveryWorld, activity_id: String) {
    world.delivery.bridge(&activity_id).unmount();
}

// ===== Then Steps =====

#[then(expr = "the call succeeds for activity {string}")]
async fn call_succeeds(world: &mut DeliveryWorld, activity_id: String) {
    let result = world
        .last_result
        .clone()
        .expect("No call raised")
        .expect("Call went unanswered");

    assert!(result.is_success());
    assert_eq!(result.get("activityId"), Some(&json!(activity_id)));
}

#[then("the call goes unanswered")]
async fn call_unanswered(world: &mut DeliveryWorld) {
    let result = world.last_result.clone().expect("No call raised");
    assert!(result.is_none(), "Unexpected answer: {:?}", result);
}

#[then("an error message is published")]
async fn error_published(world: &mut DeliveryWorld) {
    let messages = world.delivery.ctx.messages();
    assert_eq!(messages.errors().count(), 1);
}

#[then("no message is published")]
async fn no_message(world: &mut DeliveryWorld) {
    assert!(world.delivery.ctx.messages().is_empty());
}
