use crate::infrastructure::bus::EventBus;
use crate::infrastructure::error::CallbackError;
use activity_delivery_core::{
    ActivityId, AttemptGuid, BridgeEventKind, BridgeResult, NotificationType, Snapshot,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

// ===== Rendering =====

/// Mounted activity element (rendering is out of scope; it only receives
/// host notifications)
pub trait ActivityElement: Send + Sync {
    fn notify(&self, notification: NotificationType, payload: Value);
}

/// Everything an element gets when it is created
#[derive(Clone)]
pub struct ElementProps {
    pub activity_id: ActivityId,
    /// Serialized activity model
    pub model: String,
    /// Serialized attempt state
    pub state: String,
    pub preview: bool,
    pub user_id: Option<String>,
    /// Where the element raises its lifecycle calls
    pub bus: EventBus,
}

impl fmt::Debug for ElementProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementProps")
            .field("activity_id", &self.activity_id)
            .field("preview", &self.preview)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

pub type ElementFactory = Arc<dyn Fn(ElementProps) -> Arc<dyn ActivityElement> + Send + Sync>;

/// Element factories keyed by activity type
#[derive(Clone, Default)]
pub struct ElementRegistry {
    factories: HashMap<String, ElementFactory>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, activity_type: impl Into<String>, factory: ElementFactory) {
        self.factories.insert(activity_type.into(), factory);
    }

    pub fn with(mut self, activity_type: impl Into<String>, factory: ElementFactory) -> Self {
        self.register(activity_type, factory);
        self
    }

    pub fn contains(&self, activity_type: &str) -> bool {
        self.factories.contains_key(activity_type)
    }

    /// Build an element, or `None` when the type has no factory
    pub fn create(
        &self,
        activity_type: &str,
        props: ElementProps,
    ) -> Option<Arc<dyn ActivityElement>> {
        self.factories
            .get(activity_type)
            .map(|factory| factory(props))
    }
}

// ===== Host callbacks =====

/// Arguments of a lifecycle call, as handed to the host
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleCall {
    pub activity_id: ActivityId,
    pub attempt_guid: AttemptGuid,
    pub part_attempt_guid: Option<AttemptGuid>,
    pub payload: Value,
}

pub type CallbackResult = Result<BridgeResult, CallbackError>;

/// Host side of the lifecycle protocol. Unimplemented calls succeed.
#[async_trait]
pub trait HostCallbacks: Send + Sync {
    async fn on_save(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_submit(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_reset(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_save_part(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_submit_part(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_reset_part(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_request_hint(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_submit_evaluations(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    async fn on_ready(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    /// Layout only
    async fn on_resize_part(&self, call: LifecycleCall) -> CallbackResult {
        let _ = call;
        Ok(BridgeResult::success())
    }

    /// Fresh host state facts, requested before results are delivered
    async fn request_latest_state(&self) -> Result<Snapshot, CallbackError> {
        Ok(Snapshot::new())
    }
}

/// Host that accepts every call
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl HostCallbacks for AcceptAll {}

/// Route a call to the callback for its kind
pub async fn invoke_callback(
    callbacks: &dyn HostCallbacks,
    kind: BridgeEventKind,
    call: LifecycleCall,
) -> CallbackResult {
    match kind {
        BridgeEventKind::Save => callbacks.on_save(call).await,
        BridgeEventKind::Submit => callbacks.on_submit(call).await,
        BridgeEventKind::Reset => callbacks.on_reset(call).await,
        BridgeEventKind::SavePart => callbacks.on_save_part(call).await,
        BridgeEventKind::SubmitPart => callbacks.on_submit_part(call).await,
        BridgeEventKind::ResetPart => callbacks.on_reset_part(call).await,
        BridgeEventKind::RequestHint => callbacks.on_request_hint(call).await,
        BridgeEventKind::SubmitEvaluations => callbacks.on_submit_evaluations(call).await,
        BridgeEventKind::Ready => callbacks.on_ready(call).await,
        BridgeEventKind::ResizePart => callbacks.on_resize_part(call).await,
    }
}

// ===== Scripting =====

/// Script variable scope handed to an element on `ready`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptScope {
    pub id: Uuid,
    pub parent: Option<Uuid>,
    #[serde(default)]
    pub bindings: Map<String, Value>,
}

/// Scripting engine; only child scopes are needed here
pub trait ScriptEnvironment: Send + Sync {
    fn child_scope(&self) -> ScriptScope;
}

/// In-memory global scope
#[derive(Debug)]
pub struct GlobalEnvironment {
    id: Uuid,
    bindings: RwLock<Map<String, Value>>,
}

impl Default for GlobalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalEnvironment {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            bindings: RwLock::new(Map::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value);
    }
}

impl ScriptEnvironment for GlobalEnvironment {
    /// Snapshot of the globals under a fresh scope id
    fn child_scope(&self) -> ScriptScope {
        ScriptScope {
            id: Uuid::new_v4(),
            parent: Some(self.id),
            bindings: self
                .bindings
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
