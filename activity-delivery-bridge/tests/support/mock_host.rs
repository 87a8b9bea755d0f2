use activity_delivery_bridge::{CallbackError, HostCallbacks, LifecycleCall};
use activity_delivery_core::{BridgeEventKind, BridgeResult, Snapshot};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Host callbacks that record every call and fail on demand
#[derive(Default)]
pub struct MockHost {
    calls: Mutex<Vec<(BridgeEventKind, LifecycleCall)>>,
    failing: Mutex<HashSet<BridgeEventKind>>,
    panicking: Mutex<HashSet<BridgeEventKind>>,
    snapshot: Mutex<Snapshot>,
    snapshot_requests: Mutex<usize>,
    /// When set, snapshot requests wait for a permit
    gate: Option<Arc<Notify>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot requests block until the returned handle is notified
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                gate: Some(gate.clone()),
                ..Self::default()
            },
            gate,
        )
    }

    pub fn fail_on(&self, kind: BridgeEventKind) {
        self.failing.lock().unwrap().insert(kind);
    }

    pub fn panic_on(&self, kind: BridgeEventKind) {
        self.panicking.lock().unwrap().insert(kind);
    }

    pub fn set_snapshot(&self, snapshot: serde_json::Value) {
        *self.snapshot.lock().unwrap() = snapshot.as_object().cloned().unwrap_or_default();
    }

    pub fn calls(&self) -> Vec<(BridgeEventKind, LifecycleCall)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, activity_id: &str) -> Vec<BridgeEventKind> {
        self.calls()
            .into_iter()
            .filter(|(_, call)| call.activity_id == activity_id)
            .map(|(kind, _)| kind)
            .collect()
    }

    pub fn snapshot_requests(&self) -> usize {
        *self.snapshot_requests.lock().unwrap()
    }

    fn answer(
        &self,
        kind: BridgeEventKind,
        call: LifecycleCall,
    ) -> Result<BridgeResult, CallbackError> {
        self.calls.lock().unwrap().push((kind, call.clone()));

        if self.panicking.lock().unwrap().contains(&kind) {
            panic!("host exploded on {}", kind);
        }
        if self.failing.lock().unwrap().contains(&kind) {
            return Err(CallbackError::new(format!("{} rejected", kind)));
        }

        Ok(BridgeResult::success().merge("attemptGuid", call.attempt_guid.into()))
    }
}

#[async_trait]
impl HostCallbacks for MockHost {
    async fn on_save(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::Save, call)
    }

    async fn on_submit(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::Submit, call)
    }

    async fn on_reset(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::Reset, call)
    }

    async fn on_save_part(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::SavePart, call)
    }

    async fn on_submit_part(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::SubmitPart, call)
    }

    async fn on_request_hint(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::RequestHint, call)
    }

    async fn on_ready(&self, call: LifecycleCall) -> Result<BridgeResult, CallbackError> {
        self.answer(BridgeEventKind::Ready, call)
    }

    async fn request_latest_state(&self) -> Result<Snapshot, CallbackError> {
        *self.snapshot_requests.lock().unwrap() += 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }
}
