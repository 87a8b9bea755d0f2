use activity_delivery_bridge::{
    ActivityBridge, ActivityElement, CallbackError, CallbackResult, DeliveryContext, ElementProps,
    ElementRegistry, HostCallbacks, HostState, HostSync, LifecycleCall,
};
use activity_delivery_core::{
    ActivityDescriptor, ActivityId, AttemptState, BridgeEventKind, BridgeResult, CataEditor,
    CataEvent, ChoiceId, NotificationType, Rule, Snapshot,
};
use async_trait::async_trait;
use cucumber::World;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

pub const ELEMENT_TYPE: &str = "oli_check_all_that_apply";

/// Host whose answers the scenarios script
#[derive(Debug, Default)]
pub struct ScriptedHost {
    failing: Mutex<Vec<BridgeEventKind>>,
    snapshot: Mutex<Snapshot>,
    calls: Mutex<Vec<(BridgeEventKind, LifecycleCall)>>,
}

impl ScriptedHost {
    pub fn fail_on(&self, kind: BridgeEventKind) {
        self.failing.lock().unwrap().push(kind);
    }

    pub fn set_fact(&self, key: &str, value: Value) {
        self.snapshot.lock().unwrap().insert(key.to_string(), value);
    }

    pub fn calls(&self) -> Vec<(BridgeEventKind, LifecycleCall)> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, kind: BridgeEventKind, call: LifecycleCall) -> CallbackResult {
        self.calls.lock().unwrap().push((kind, call.clone()));
        if self.failing.lock().unwrap().contains(&kind) {
            return Err(CallbackError::new(format!("{} rejected", kind)));
        }
        Ok(BridgeResult::success().merge("activityId", Value::String(call.activity_id)))
    }
}

#[async_trait]
impl HostCallbacks for ScriptedHost {
    async fn on_save(&self, call: LifecycleCall) -> CallbackResult {
        self.answer(BridgeEventKind::Save, call)
    }

    async fn on_submit(&self, call: LifecycleCall) -> CallbackResult {
        self.answer(BridgeEventKind::Submit, call)
    }

    async fn on_save_part(&self, call: LifecycleCall) -> CallbackResult {
        self.answer(BridgeEventKind::SavePart, call)
    }

    async fn on_submit_part(&self, call: LifecycleCall) -> CallbackResult {
        self.answer(BridgeEventKind::SubmitPart, call)
    }

    async fn request_latest_state(&self) -> Result<Snapshot, CallbackError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }
}

/// One notification as the element saw it
#[derive(Debug, Clone)]
pub struct Notified {
    pub activity_id: ActivityId,
    pub notification: NotificationType,
    pub payload: Value,
}

struct NotifyLog {
    activity_id: ActivityId,
    log: Arc<Mutex<Vec<Notified>>>,
}

impl ActivityElement for NotifyLog {
    fn notify(&self, notification: NotificationType, payload: Value) {
        self.log.lock().unwrap().push(Notified {
            activity_id: self.activity_id.clone(),
            notification,
            payload,
        });
    }
}

/// Mounted activities sharing one host
pub struct Delivery {
    pub ctx: DeliveryContext,
    pub host: Arc<ScriptedHost>,
    pub bridges: HashMap<ActivityId, ActivityBridge>,
    pub syncs: HashMap<ActivityId, HostSync>,
    pub notified: Arc<Mutex<Vec<Notified>>>,
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("bridges", &self.bridges.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Default for Delivery {
    fn default() -> Self {
        let host = Arc::new(ScriptedHost::default());
        let notified = Arc::new(Mutex::new(Vec::new()));

        let log = notified.clone();
        let elements = ElementRegistry::new().with(
            ELEMENT_TYPE,
            Arc::new(move |props: ElementProps| {
                Arc::new(NotifyLog {
                    activity_id: props.activity_id,
                    log: log.clone(),
                }) as Arc<dyn ActivityElement>
            }),
        );

        Self {
            ctx: DeliveryContext::new(host.clone()).with_elements(elements),
            host,
            bridges: HashMap::new(),
            syncs: HashMap::new(),
            notified,
        }
    }
}

impl Delivery {
    pub fn mount(&mut self, activity_id: &str, attempt_guid: &str) {
        let descriptor = ActivityDescriptor::new(
            activity_id,
            ELEMENT_TYPE,
            serde_json::json!({"stem": activity_id}),
        );
        let attempt = AttemptState::new(attempt_guid).for_activity(activity_id);
        let bridge = ActivityBridge::mount(&self.ctx, &descriptor, attempt)
            .unwrap_or_else(|e| panic!("mount of {} failed: {}", activity_id, e));

        self.syncs
            .insert(activity_id.to_string(), HostSync::new(bridge.clone()));
        self.bridges.insert(activity_id.to_string(), bridge);
    }

    pub fn bridge(&self, activity_id: &str) -> &ActivityBridge {
        self.bridges
            .get(activity_id)
            .unwrap_or_else(|| panic!("Activity '{}' not mounted", activity_id))
    }

    /// Let every mounted activity observe the host state
    pub async fn sync_all(&mut self, state: &HostState) {
        for sync in self.syncs.values_mut() {
            sync.sync(state).await;
        }
    }

    pub fn notifications_for(&self, activity_id: &str) -> Vec<Notified> {
        self.notified
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.activity_id == activity_id)
            .cloned()
            .collect()
    }
}

#[derive(Debug, World, Default)]
pub struct DeliveryWorld {
    /// Rule under test, keyed by name ("correct", "inverted", ...)
    pub rules: HashMap<String, Rule>,

    /// CATA editor (the system under test for authoring scenarios)
    pub editor: Option<CataEditor>,

    /// Last event reported by the editor
    pub last_event: Option<CataEvent>,

    /// Track choice ids by label
    pub choice_ids: HashMap<String, ChoiceId>,

    pub delivery: Delivery,

    /// Host state the mounted activities observe
    pub host_state: HostState,

    /// Host clock in milliseconds
    pub clock: u64,

    /// Outcome of the last lifecycle call; `None` when nobody answered
    pub last_result: Option<Option<BridgeResult>>,
}

impl DeliveryWorld {
    pub fn editor(&mut self) -> &mut CataEditor {
        self.editor.as_mut().expect("No model authored yet")
    }

    pub fn execute(&mut self, action: activity_delivery_core::CataAction) -> &CataEvent {
        let event = self.editor().handle_action(action);
        self.last_event.insert(event)
    }

    /// Choice id for a label such as "A"
    pub fn choice_id(&self, label: &str) -> ChoiceId {
        self.choice_ids
            .get(label)
            .cloned()
            .unwrap_or_else(|| panic!("Choice '{}' not found", label))
    }

    pub fn tick(&mut self) -> activity_delivery_core::Timestamp {
        self.clock += 1;
        activity_delivery_core::Timestamp::from_millis(self.clock)
    }
}

/// Split a comma separated list, ignoring blanks
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
