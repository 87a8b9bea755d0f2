use crate::application::config::BridgeConfig;
use crate::domain::{AttemptRegistry, BridgeEvent};
use crate::infrastructure::capability::{
    invoke_callback, ActivityElement, ElementProps, ElementRegistry, GlobalEnvironment,
    HostCallbacks, LifecycleCall, ScriptEnvironment,
};
use crate::infrastructure::error::{BridgeError, Result};
use crate::infrastructure::{EventBus, Listener, ListenerId};
use activity_delivery_core::{
    project_init_state_facts, ActivityDescriptor, ActivityId, AttemptState, BridgeEventKind,
    BridgeResult, CheckResults, MessageBoard, NavigationMode, NotificationType, Timestamp,
};
use futures::FutureExt;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Collaborators shared by every bridge on a page
#[derive(Clone)]
pub struct DeliveryContext {
    pub bus: EventBus,
    pub registry: AttemptRegistry,
    pub elements: ElementRegistry,
    pub callbacks: Arc<dyn HostCallbacks>,
    pub scripting: Arc<dyn ScriptEnvironment>,
    pub messages: Arc<Mutex<MessageBoard>>,
    pub config: BridgeConfig,
}

impl DeliveryContext {
    pub fn new(callbacks: Arc<dyn HostCallbacks>) -> Self {
        Self::with_config(callbacks, BridgeConfig::default())
    }

    pub fn with_config(callbacks: Arc<dyn HostCallbacks>, config: BridgeConfig) -> Self {
        Self {
            bus: EventBus::new(),
            registry: AttemptRegistry::with_history_warning(config.history_warning),
            elements: ElementRegistry::new(),
            callbacks,
            scripting: Arc::new(GlobalEnvironment::new()),
            messages: Arc::new(Mutex::new(MessageBoard::new())),
            config,
        }
    }

    pub fn with_elements(mut self, elements: ElementRegistry) -> Self {
        self.elements = elements;
        self
    }

    pub fn with_scripting(mut self, scripting: Arc<dyn ScriptEnvironment>) -> Self {
        self.scripting = scripting;
        self
    }

    /// Copy of the user-visible messages
    pub fn messages(&self) -> MessageBoard {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Bridge lifecycle: `Unmounted -> Listening -> Ready -> Unmounted`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Unmounted,
    /// Listeners registered, attempt not yet published
    Listening,
    Ready,
}

#[derive(Debug, Default)]
struct CheckState {
    in_progress: bool,
    triggered: Option<Timestamp>,
}

/// Routes inbound lifecycle calls to the host.
///
/// Holds no attempt state of its own; addressing re-reads the registry on
/// every event.
struct InboundHandler {
    activity_id: ActivityId,
    registry: AttemptRegistry,
    callbacks: Arc<dyn HostCallbacks>,
    scripting: Arc<dyn ScriptEnvironment>,
    messages: Arc<Mutex<MessageBoard>>,
}

impl InboundHandler {
    async fn handle(&self, event: BridgeEvent) {
        if !self
            .registry
            .is_addressed_to(&self.activity_id, &event.attempt_guid)
        {
            tracing::trace!(
                "Ignoring {} for attempt {} (not addressed to {})",
                event.kind,
                event.attempt_guid,
                self.activity_id
            );
            return;
        }

        tracing::debug!(
            "Activity {} handling {} for attempt {}",
            self.activity_id,
            event.kind,
            event.attempt_guid
        );

        let kind = event.kind;
        let call = LifecycleCall {
            activity_id: self.activity_id.clone(),
            attempt_guid: event.attempt_guid.clone(),
            part_attempt_guid: event.part_attempt_guid.clone(),
            payload: event.payload.clone(),
        };

        let outcome = AssertUnwindSafe(invoke_callback(self.callbacks.as_ref(), kind, call))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return self.report_failure(kind, &e.to_string()),
            Err(panic) => return self.report_failure(kind, &panic_message(panic)),
        };

        let result = if kind == BridgeEventKind::Ready {
            self.with_environment(result)
        } else {
            result
        };

        if let Some(continuation) = event.continuation {
            if let Err(e) = continuation.settle(result) {
                tracing::debug!("Result for {} not delivered: {}", kind, e);
            }
        }
    }

    fn with_environment(&self, result: BridgeResult) -> BridgeResult {
        match serde_json::to_value(self.scripting.child_scope()) {
            Ok(env) => result.merge("env", env),
            Err(e) => {
                tracing::warn!("Could not serialize script scope: {}", e);
                result
            }
        }
    }

    /// Failed calls leave the continuation unsettled
    fn report_failure(&self, kind: BridgeEventKind, reason: &str) {
        tracing::error!(
            "Host callback {} failed for activity {}: {}",
            kind,
            self.activity_id,
            reason
        );

        if kind.affects_grading() {
            self.messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .publish_error(format!("Your answer could not be recorded ({})", reason));
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

struct BridgeInner {
    activity_id: ActivityId,
    ctx: DeliveryContext,
    live: AtomicBool,
    state: Mutex<BridgeState>,
    check: Mutex<CheckState>,
    element: Mutex<Option<Arc<dyn ActivityElement>>>,
    subscriptions: Mutex<Vec<ListenerId>>,
}

/// Connects one mounted activity element to the host
#[derive(Clone)]
pub struct ActivityBridge {
    inner: Arc<BridgeInner>,
}

impl ActivityBridge {
    /// Mount an activity: listen, publish its attempt, then render it
    pub fn mount(
        ctx: &DeliveryContext,
        descriptor: &ActivityDescriptor,
        attempt: AttemptState,
    ) -> Result<Self> {
        if ctx.registry.contains(&descriptor.id) {
            return Err(BridgeError::AlreadyMounted(descriptor.id.clone()));
        }

        let bridge = Self {
            inner: Arc::new(BridgeInner {
                activity_id: descriptor.id.clone(),
                ctx: ctx.clone(),
                live: AtomicBool::new(true),
                state: Mutex::new(BridgeState::Unmounted),
                check: Mutex::new(CheckState::default()),
                element: Mutex::new(None),
                subscriptions: Mutex::new(Vec::new()),
            }),
        };

        bridge.listen();

        let serialized = descriptor
            .serialized_model()
            .and_then(|model| Ok((model, serde_json::to_string(&attempt)?)));
        let (model, state) = match serialized {
            Ok(pair) => pair,
            Err(e) => {
                bridge.unmount();
                return Err(e.into());
            }
        };

        ctx.registry.set(&descriptor.id, attempt);
        bridge.set_state(BridgeState::Ready);
        tracing::info!("Activity {} ready", descriptor.id);

        bridge.render(descriptor, model, state);
        Ok(bridge)
    }

    fn listen(&self) {
        let handler = Arc::new(InboundHandler {
            activity_id: self.inner.activity_id.clone(),
            registry: self.inner.ctx.registry.clone(),
            callbacks: self.inner.ctx.callbacks.clone(),
            scripting: self.inner.ctx.scripting.clone(),
            messages: self.inner.ctx.messages.clone(),
        });

        let ids: Vec<ListenerId> = BridgeEventKind::ALL
            .into_iter()
            .map(|kind| {
                let handler = handler.clone();
                let listener: Listener = Arc::new(move |event| {
                    let handler = handler.clone();
                    async move { handler.handle(event).await }.boxed()
                });
                self.inner.ctx.bus.subscribe(kind, listener)
            })
            .collect();

        *self.lock_subscriptions() = ids;
        self.set_state(BridgeState::Listening);
    }

    fn render(&self, descriptor: &ActivityDescriptor, model: String, state: String) {
        let props = ElementProps {
            activity_id: descriptor.id.clone(),
            model,
            state,
            preview: self.inner.ctx.config.preview,
            user_id: self.inner.ctx.config.user_id.clone(),
            bus: self.inner.ctx.bus.clone(),
        };

        match self.inner.ctx.elements.create(&descriptor.activity_type, props) {
            Some(element) => {
                *self.lock_element() = Some(element);
            }
            None => tracing::warn!(
                "No element registered for activity type {}; activity {} not rendered",
                descriptor.activity_type,
                descriptor.id
            ),
        }
    }

    /// Stop listening and forget the current attempt. Idempotent.
    pub fn unmount(&self) {
        if !self.inner.live.swap(false, Ordering::SeqCst) {
            return;
        }

        for id in self.lock_subscriptions().drain(..) {
            self.inner.ctx.bus.unsubscribe(id);
        }
        self.inner.ctx.registry.delete(&self.inner.activity_id);
        *self.lock_element() = None;
        self.set_state(BridgeState::Unmounted);

        tracing::info!("Activity {} unmounted", self.inner.activity_id);
    }

    pub fn activity_id(&self) -> &str {
        &self.inner.activity_id
    }

    pub fn state(&self) -> BridgeState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::SeqCst)
    }

    pub fn is_rendered(&self) -> bool {
        self.lock_element().is_some()
    }

    pub fn check_in_progress(&self) -> bool {
        self.lock_check().in_progress
    }

    /// Attempt currently published for this activity
    pub fn attempt(&self) -> Option<AttemptState> {
        self.inner.ctx.registry.get(&self.inner.activity_id)
    }

    // ===== Outbound notifications =====

    /// Host started grading. Returns whether the element was notified.
    pub fn notify_check_started(&self, triggered: Timestamp) -> bool {
        if self.state() != BridgeState::Ready {
            return false;
        }

        {
            let mut check = self.lock_check();
            check.in_progress = true;
            check.triggered = Some(triggered);
        }

        self.notify(NotificationType::CheckStarted, json!({ "ts": triggered }))
    }

    /// Host finished grading.
    ///
    /// Ignored unless a check is in progress and `results` belong to it. The
    /// registry and history are updated before the fresh snapshot is
    /// requested; the element is only notified if still mounted once the
    /// snapshot arrives.
    pub async fn on_check_results(&self, results: &CheckResults) -> bool {
        if !self.is_live() {
            self.lock_check().in_progress = false;
            tracing::debug!(
                "Dropping check results for unmounted activity {}",
                self.inner.activity_id
            );
            return false;
        }

        {
            let check = self.lock_check();
            if !check.in_progress || check.triggered != Some(results.timestamp) {
                return false;
            }
        }

        let registry = &self.inner.ctx.registry;
        if let Some(current) = registry.get(&self.inner.activity_id) {
            if current.activity_id == results.attempt.activity_id {
                registry.set(&self.inner.activity_id, results.attempt.clone());
                registry.record(
                    &self.inner.activity_id,
                    &results.attempt.attempt_guid,
                    results.attempt.clone(),
                );
            }
        }

        let snapshot = match self.inner.ctx.callbacks.request_latest_state().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(
                    "Latest state request failed for activity {}: {}",
                    self.inner.activity_id,
                    e
                );
                self.lock_check().in_progress = false;
                return false;
            }
        };

        if !self.is_live() {
            tracing::debug!(
                "Activity {} unmounted before check results arrived",
                self.inner.activity_id
            );
            return false;
        }

        let mut payload = match serde_json::to_value(results) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Could not serialize check results: {}", e);
                return false;
            }
        };
        if let Value::Object(map) = &mut payload {
            map.insert("snapshot".to_string(), Value::Object(snapshot));
        }

        self.lock_check().in_progress = false;
        self.notify(NotificationType::CheckComplete, payload)
    }

    /// Host finished initialization
    pub async fn notify_context_changed(
        &self,
        current_activity_id: Option<&str>,
        mode: Option<NavigationMode>,
        init_state_keys: &[String],
    ) -> bool {
        if self.state() != BridgeState::Ready {
            return false;
        }

        let snapshot = match self.inner.ctx.callbacks.request_latest_state().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("Latest state request failed: {}", e);
                return false;
            }
        };

        if !self.is_live() {
            return false;
        }

        let init_state_facts = project_init_state_facts(&snapshot, init_state_keys);
        let mode = mode.unwrap_or(self.inner.ctx.config.default_mode);

        self.notify(
            NotificationType::ContextChanged,
            json!({
                "currentActivityId": current_activity_id,
                "mode": mode,
                "snapshot": snapshot,
                "initStateFacts": init_state_facts,
            }),
        )
    }

    /// Host state was mutated from outside the activity
    pub fn notify_state_changed(&self, mutate_changes: Value) -> bool {
        if self.state() != BridgeState::Ready {
            return false;
        }

        self.notify(
            NotificationType::StateChanged,
            json!({ "mutateChanges": mutate_changes }),
        )
    }

    fn notify(&self, notification: NotificationType, payload: Value) -> bool {
        let element = self.lock_element().clone();
        match element {
            Some(element) if self.is_live() => {
                tracing::debug!("Notifying activity {}: {}", self.inner.activity_id, notification);
                element.notify(notification, payload);
                true
            }
            _ => false,
        }
    }

    fn set_state(&self, state: BridgeState) {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn lock_check(&self) -> std::sync::MutexGuard<'_, CheckState> {
        self.inner
            .check
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_element(&self) -> std::sync::MutexGuard<'_, Option<Arc<dyn ActivityElement>>> {
        self.inner
            .element
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscriptions(&self) -> std::sync::MutexGuard<'_, Vec<ListenerId>> {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ActivityBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityBridge")
            .field("activity_id", &self.inner.activity_id)
            .field("state", &self.state())
            .field("live", &self.is_live())
            .finish()
    }
}
