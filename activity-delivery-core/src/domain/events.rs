use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Latest host-side state facts, keyed by fact name
pub type Snapshot = Map<String, Value>;

/// Lifecycle calls an activity element can raise toward the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum BridgeEventKind {
    Save,
    Submit,
    Reset,
    SavePart,
    SubmitPart,
    ResetPart,
    RequestHint,
    SubmitEvaluations,
    /// Element finished initializing
    Ready,
    /// Layout hint; hosts usually ignore it
    ResizePart,
}

impl BridgeEventKind {
    pub const ALL: [BridgeEventKind; 10] = [
        BridgeEventKind::Save,
        BridgeEventKind::Submit,
        BridgeEventKind::Reset,
        BridgeEventKind::SavePart,
        BridgeEventKind::SubmitPart,
        BridgeEventKind::ResetPart,
        BridgeEventKind::RequestHint,
        BridgeEventKind::SubmitEvaluations,
        BridgeEventKind::Ready,
        BridgeEventKind::ResizePart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeEventKind::Save => "save",
            BridgeEventKind::Submit => "submit",
            BridgeEventKind::Reset => "reset",
            BridgeEventKind::SavePart => "savePart",
            BridgeEventKind::SubmitPart => "submitPart",
            BridgeEventKind::ResetPart => "resetPart",
            BridgeEventKind::RequestHint => "requestHint",
            BridgeEventKind::SubmitEvaluations => "submitEvaluations",
            BridgeEventKind::Ready => "ready",
            BridgeEventKind::ResizePart => "resizePart",
        }
    }

    /// Calls whose failure may leave a grade unrecorded
    pub fn affects_grading(&self) -> bool {
        matches!(
            self,
            BridgeEventKind::Submit
                | BridgeEventKind::SubmitPart
                | BridgeEventKind::SubmitEvaluations
        )
    }
}

impl fmt::Display for BridgeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown bridge event kind: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for BridgeEventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BridgeEventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Host-pushed notifications delivered to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    CheckStarted,
    CheckComplete,
    ContextChanged,
    StateChanged,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::CheckStarted => "CHECK_STARTED",
            NotificationType::CheckComplete => "CHECK_COMPLETE",
            NotificationType::ContextChanged => "CONTEXT_CHANGED",
            NotificationType::StateChanged => "STATE_CHANGED",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an activity is being shown after initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationMode {
    /// Revisiting a past attempt
    Review,
    /// Normal delivery
    #[default]
    Viewer,
}

impl NavigationMode {
    pub fn from_history(history_navigation: bool) -> Self {
        if history_navigation {
            NavigationMode::Review
        } else {
            NavigationMode::Viewer
        }
    }
}

/// Subset of `snapshot` named by `keys`. Keys without a value are skipped.
pub fn project_init_state_facts<S: AsRef<str>>(snapshot: &Snapshot, keys: &[S]) -> Snapshot {
    keys.iter()
        .filter_map(|key| {
            let key = key.as_ref();
            snapshot.get(key).map(|value| (key.to_string(), value.clone()))
        })
        .collect()
}
