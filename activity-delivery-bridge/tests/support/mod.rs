pub mod mock_host;

use activity_delivery_bridge::{
    ActivityBridge, ActivityElement, AttemptRegistry, DeliveryContext, ElementFactory,
    ElementRegistry,
};
use activity_delivery_core::{ActivityDescriptor, AttemptState, NotificationType};
use mock_host::MockHost;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

pub const ELEMENT_TYPE: &str = "oli_check_all_that_apply";

/// One delivered notification, plus the registry's view of the attempt at
/// that moment
#[derive(Debug, Clone)]
pub struct Delivered {
    pub activity_id: String,
    pub notification: NotificationType,
    pub payload: Value,
    pub registry_attempt: Option<AttemptState>,
}

/// Element that records what it is told
pub struct RecordingElement {
    activity_id: String,
    registry: AttemptRegistry,
    log: Arc<Mutex<Vec<Delivered>>>,
}

impl ActivityElement for RecordingElement {
    fn notify(&self, notification: NotificationType, payload: Value) {
        self.log.lock().unwrap().push(Delivered {
            activity_id: self.activity_id.clone(),
            notification,
            payload,
            registry_attempt: self.registry.get(&self.activity_id),
        });
    }
}

/// Test fixture for a page of activities
pub struct DeliveryFixture {
    pub ctx: DeliveryContext,
    pub host: Arc<MockHost>,
    delivered: Arc<Mutex<Vec<Delivered>>>,
}

impl DeliveryFixture {
    pub fn new() -> Self {
        Self::with_host(MockHost::new())
    }

    pub fn with_host(host: MockHost) -> Self {
        let host = Arc::new(host);
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let ctx = DeliveryContext::new(host.clone());
        let factory = recording_factory(ctx.registry.clone(), delivered.clone());
        let ctx = ctx.with_elements(ElementRegistry::new().with(ELEMENT_TYPE, factory));

        Self {
            ctx,
            host,
            delivered,
        }
    }

    /// Mount an activity whose attempt knows its owner
    pub fn mount(&self, activity_id: &str, attempt_guid: &str) -> ActivityBridge {
        let descriptor = ActivityDescriptor::new(activity_id, ELEMENT_TYPE, json!({"choices": []}));
        let attempt = AttemptState::new(attempt_guid).for_activity(activity_id);
        ActivityBridge::mount(&self.ctx, &descriptor, attempt).expect("mount")
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn notifications_for(&self, activity_id: &str) -> Vec<NotificationType> {
        self.delivered()
            .into_iter()
            .filter(|d| d.activity_id == activity_id)
            .map(|d| d.notification)
            .collect()
    }

    pub fn last(&self, notification: NotificationType) -> Option<Delivered> {
        self.delivered()
            .into_iter()
            .rev()
            .find(|d| d.notification == notification)
    }
}

fn recording_factory(
    registry: AttemptRegistry,
    log: Arc<Mutex<Vec<Delivered>>>,
) -> ElementFactory {
    Arc::new(move |props| {
        Arc::new(RecordingElement {
            activity_id: props.activity_id,
            registry: registry.clone(),
            log: log.clone(),
        }) as Arc<dyn ActivityElement>
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("activity_delivery_bridge=debug")
        .with_test_writer()
        .try_init();
}
