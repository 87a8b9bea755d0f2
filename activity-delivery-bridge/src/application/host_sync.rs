use crate::application::bridge::ActivityBridge;
use activity_delivery_core::{
    ActivityId, CheckResults, NavigationMode, NotificationType, Timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Host-side delivery state observed by the bridges
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostState {
    pub last_check_triggered: Option<Timestamp>,
    pub last_check_results: Option<CheckResults>,
    pub init_phase_complete: bool,
    /// Snapshot keys reported as `initStateFacts`
    pub init_state_facts: Vec<String>,
    pub current_activity_id: Option<ActivityId>,
    /// `None` leaves the mode to the bridge configuration
    pub history_navigation: Option<bool>,
    pub last_mutate_triggered: Option<Timestamp>,
    pub last_mutate_changes: Value,
}

impl HostState {
    pub fn trigger_check(&mut self, at: Timestamp) {
        self.last_check_triggered = Some(at);
    }

    pub fn complete_check(&mut self, results: CheckResults) {
        self.last_check_results = Some(results);
    }

    pub fn mutate(&mut self, at: Timestamp, changes: Value) {
        self.last_mutate_triggered = Some(at);
        self.last_mutate_changes = changes;
    }
}

/// Drives one bridge's outbound notifications from host state transitions.
///
/// Within one observation the order is CHECK_STARTED, CHECK_COMPLETE,
/// CONTEXT_CHANGED, STATE_CHANGED.
#[derive(Debug)]
pub struct HostSync {
    bridge: ActivityBridge,
    seen_check: Option<Timestamp>,
    init_complete: bool,
    seen_mutate: Option<Timestamp>,
}

impl HostSync {
    pub fn new(bridge: ActivityBridge) -> Self {
        Self {
            bridge,
            seen_check: None,
            init_complete: false,
            seen_mutate: None,
        }
    }

    /// Apply one observation; returns the notifications delivered
    pub async fn sync(&mut self, state: &HostState) -> Vec<NotificationType> {
        let mut sent = Vec::new();

        if let Some(triggered) = state.last_check_triggered {
            if self.seen_check != Some(triggered) {
                self.seen_check = Some(triggered);
                if self.bridge.notify_check_started(triggered) {
                    sent.push(NotificationType::CheckStarted);
                }
            }
        }

        if let Some(results) = &state.last_check_results {
            if self.bridge.check_in_progress()
                && state.last_check_triggered == Some(results.timestamp)
                && self.bridge.on_check_results(results).await
            {
                sent.push(NotificationType::CheckComplete);
            }
        }

        if state.init_phase_complete && !self.init_complete {
            let mode = state.history_navigation.map(NavigationMode::from_history);
            if self
                .bridge
                .notify_context_changed(
                    state.current_activity_id.as_deref(),
                    mode,
                    &state.init_state_facts,
                )
                .await
            {
                sent.push(NotificationType::ContextChanged);
            }
        }
        self.init_complete = state.init_phase_complete;

        if let Some(triggered) = state.last_mutate_triggered {
            if self.seen_mutate != Some(triggered) {
                self.seen_mutate = Some(triggered);
                if self
                    .bridge
                    .notify_state_changed(state.last_mutate_changes.clone())
                {
                    sent.push(NotificationType::StateChanged);
                }
            }
        }

        sent
    }

    /// Follow host state until the channel closes or the bridge unmounts
    pub async fn run(mut self, mut host: watch::Receiver<HostState>) {
        loop {
            let state = host.borrow_and_update().clone();
            let sent = self.sync(&state).await;
            if !sent.is_empty() {
                tracing::trace!("Activity {} notified: {:?}", self.bridge.activity_id(), sent);
            }

            if !self.bridge.is_live() {
                break;
            }
            if host.changed().await.is_err() {
                tracing::debug!("Host state closed; stopping sync");
                break;
            }
        }
    }

    pub fn spawn(self, host: watch::Receiver<HostState>) -> JoinHandle<()> {
        tokio::spawn(self.run(host))
    }
}
