use crate::application::cata::{grade, GradeReport};
use crate::infrastructure::{CliError, Result};
use activity_delivery_bridge::{
    ActivityBridge, ActivityElement, BridgeConfig, BridgeEvent, CallbackError, CallbackResult,
    DeliveryContext, ElementProps, ElementRegistry, HostCallbacks, HostState, HostSync,
    LifecycleCall,
};
use activity_delivery_core::{
    ActivityDescriptor, ActivityId, AttemptState, BridgeEventKind, BridgeResult, CataModel,
    CheckResults, Message, NotificationType, Snapshot, Timestamp,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Activity type graded by the simulated host
pub const CATA_TYPE: &str = "oli_check_all_that_apply";

/// How long a dispatched call may stay unanswered
const REPLY_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub activities: Vec<ScenarioActivity>,
    /// Initial host state facts
    #[serde(default)]
    pub snapshot: Snapshot,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioActivity {
    #[serde(flatten)]
    pub descriptor: ActivityDescriptor,
    pub attempt_guid: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum ScenarioStep {
    /// An element raises a lifecycle call
    #[serde(rename_all = "camelCase")]
    Dispatch {
        kind: BridgeEventKind,
        attempt_guid: String,
        #[serde(default)]
        part_attempt_guid: Option<String>,
        #[serde(default)]
        payload: Value,
    },

    /// The host grades the activity's last submission
    #[serde(rename_all = "camelCase")]
    Check { activity_id: String },

    #[serde(rename_all = "camelCase")]
    InitComplete {
        #[serde(default)]
        init_state_facts: Vec<String>,
        #[serde(default)]
        review: Option<bool>,
        #[serde(default)]
        current_activity_id: Option<String>,
    },

    Mutate { changes: Value },

    #[serde(rename_all = "camelCase")]
    Unmount { activity_id: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub kind: BridgeEventKind,
    pub attempt_guid: String,
    /// `None` when no activity answered in time
    pub result: Option<BridgeResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub activity_id: ActivityId,
    pub notification: NotificationType,
    pub payload: Value,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub calls: Vec<CallRecord>,
    pub notifications: Vec<NotificationRecord>,
    pub messages: Vec<Message>,
    /// Attempts still published when the scenario ended
    pub attempts: BTreeMap<ActivityId, AttemptState>,
}

/// Element stand-in that records and logs notifications
struct ConsoleElement {
    activity_id: ActivityId,
    log: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl ActivityElement for ConsoleElement {
    fn notify(&self, notification: NotificationType, payload: Value) {
        tracing::info!("{} <- {}", self.activity_id, notification);
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(NotificationRecord {
                activity_id: self.activity_id.clone(),
                notification,
                payload,
            });
    }
}

/// Host that grades CATA submissions and serves a snapshot
struct GradingHost {
    models: HashMap<ActivityId, CataModel>,
    selections: Mutex<HashMap<ActivityId, Vec<String>>>,
    snapshot: Mutex<Snapshot>,
}

impl GradingHost {
    fn new(activities: &[ScenarioActivity], snapshot: Snapshot) -> Self {
        let models = activities
            .iter()
            .filter(|a| a.descriptor.activity_type == CATA_TYPE)
            .filter_map(|a| {
                match serde_json::from_value::<CataModel>(a.descriptor.model.clone()) {
                    Ok(model) => Some((a.descriptor.id.clone(), model)),
                    Err(e) => {
                        tracing::warn!(
                            "Activity {} has no usable CATA model: {}",
                            a.descriptor.id,
                            e
                        );
                        None
                    }
                }
            })
            .collect();

        Self {
            models,
            selections: Mutex::new(HashMap::new()),
            snapshot: Mutex::new(snapshot),
        }
    }

    fn remember_selection(&self, call: &LifecycleCall) {
        let selection: Vec<String> = call.payload["input"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        self.selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(call.activity_id.clone(), selection);
    }

    fn grade(&self, activity_id: &str) -> Option<GradeReport> {
        let model = self.models.get(activity_id)?;
        let selection = self
            .selections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(activity_id)
            .cloned()
            .unwrap_or_default();
        Some(grade(model, selection))
    }

    fn apply_changes(&self, changes: &Value) {
        if let Value::Object(changes) = changes {
            let mut snapshot = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
            for (key, value) in changes {
                snapshot.insert(key.clone(), value.clone());
            }
        }
    }
}

#[async_trait]
impl HostCallbacks for GradingHost {
    async fn on_save(&self, call: LifecycleCall) -> CallbackResult {
        self.remember_selection(&call);
        Ok(BridgeResult::success())
    }

    async fn on_submit(&self, call: LifecycleCall) -> CallbackResult {
        self.remember_selection(&call);
        match self.grade(&call.activity_id) {
            Some(report) => Ok(BridgeResult::evaluation(vec![serde_json::to_value(report)?])),
            None => Ok(BridgeResult::success()),
        }
    }

    async fn request_latest_state(&self) -> std::result::Result<Snapshot, CallbackError> {
        Ok(self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

struct Simulation {
    ctx: DeliveryContext,
    host: Arc<GradingHost>,
    bridges: BTreeMap<ActivityId, (ActivityBridge, HostSync)>,
    state: HostState,
    clock: u64,
    calls: Vec<CallRecord>,
}

impl Simulation {
    fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        Timestamp::from_millis(self.clock)
    }

    async fn sync_all(&mut self) {
        for (_, sync) in self.bridges.values_mut() {
            sync.sync(&self.state).await;
        }
    }

    async fn step(&mut self, step: ScenarioStep) -> Result<()> {
        match step {
            ScenarioStep::Dispatch {
                kind,
                attempt_guid,
                part_attempt_guid,
                payload,
            } => {
                let mut event = BridgeEvent::new(kind, attempt_guid.clone()).with_payload(payload);
                event.part_attempt_guid = part_attempt_guid;
                let (event, pending) = event.with_continuation();

                self.ctx.bus.dispatch(event).await;
                let result = match pending.timeout(REPLY_TIMEOUT).await {
                    Some(Ok(result)) => Some(result),
                    _ => {
                        tracing::info!("{} for {} went unanswered", kind, attempt_guid);
                        None
                    }
                };

                self.calls.push(CallRecord {
                    kind,
                    attempt_guid,
                    result,
                });
            }

            ScenarioStep::Check { activity_id } => {
                if !self.bridges.contains_key(&activity_id) {
                    return Err(CliError::UnknownActivity(activity_id));
                }

                let ts = self.tick();
                self.state.trigger_check(ts);
                self.sync_all().await;

                let report = self.host.grade(&activity_id);
                let mut attempt = AttemptState::new(uuid::Uuid::new_v4().to_string())
                    .for_activity(activity_id.clone())
                    .evaluated_at(ts);
                if let Some(current) = self.ctx.registry.get(&activity_id) {
                    attempt.attempt_number = current.attempt_number + 1;
                }
                let actions = match report {
                    Some(report) => {
                        attempt = attempt.with_score(report.score as f64, report.out_of as f64);
                        vec![serde_json::to_value(report)?]
                    }
                    None => Vec::new(),
                };

                self.state
                    .complete_check(CheckResults::new(ts, attempt).with_results(actions));
                self.sync_all().await;
            }

            ScenarioStep::InitComplete {
                init_state_facts,
                review,
                current_activity_id,
            } => {
                self.state.init_state_facts = init_state_facts;
                self.state.history_navigation = review;
                self.state.current_activity_id = current_activity_id;
                self.state.init_phase_complete = true;
                self.sync_all().await;
            }

            ScenarioStep::Mutate { changes } => {
                let ts = self.tick();
                self.host.apply_changes(&changes);
                self.state.mutate(ts, changes);
                self.sync_all().await;
            }

            ScenarioStep::Unmount { activity_id } => {
                let (bridge, _) = self
                    .bridges
                    .remove(&activity_id)
                    .ok_or_else(|| CliError::UnknownActivity(activity_id.clone()))?;
                bridge.unmount();
            }
        }

        Ok(())
    }
}

/// Mount every activity, play the steps, then unmount what is left
pub async fn run(scenario: Scenario, config: BridgeConfig) -> Result<SimulationReport> {
    let notifications = Arc::new(Mutex::new(Vec::new()));
    let host = Arc::new(GradingHost::new(&scenario.activities, scenario.snapshot));

    let mut elements = ElementRegistry::new();
    for activity in &scenario.activities {
        let log = notifications.clone();
        elements.register(
            activity.descriptor.activity_type.clone(),
            Arc::new(move |props: ElementProps| {
                Arc::new(ConsoleElement {
                    activity_id: props.activity_id,
                    log: log.clone(),
                }) as Arc<dyn ActivityElement>
            }),
        );
    }

    let ctx = DeliveryContext::with_config(host.clone(), config).with_elements(elements);

    let mut bridges = BTreeMap::new();
    for activity in &scenario.activities {
        let attempt = AttemptState::new(activity.attempt_guid.clone())
            .for_activity(activity.descriptor.id.clone());
        let bridge = ActivityBridge::mount(&ctx, &activity.descriptor, attempt)?;
        bridges.insert(
            activity.descriptor.id.clone(),
            (bridge.clone(), HostSync::new(bridge)),
        );
    }

    let mut simulation = Simulation {
        ctx,
        host,
        bridges,
        state: HostState::default(),
        clock: 0,
        calls: Vec::new(),
    };

    for step in scenario.steps {
        simulation.step(step).await?;
    }

    let mut attempts = BTreeMap::new();
    for (activity_id, (bridge, _)) in std::mem::take(&mut simulation.bridges) {
        if let Some(attempt) = bridge.attempt() {
            attempts.insert(activity_id, attempt);
        }
        bridge.unmount();
    }

    let notifications = notifications
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    Ok(SimulationReport {
        calls: simulation.calls,
        notifications,
        messages: simulation.ctx.messages().messages().to_vec(),
        attempts,
    })
}
