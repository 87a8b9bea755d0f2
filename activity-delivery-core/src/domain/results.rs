use crate::domain::attempt::AttemptState;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tagged outcome of a lifecycle call.
///
/// Produced by the host callback and carried back to the element unchanged.
/// On the wire: `{"type": "success", ...payload}` or
/// `{"type": "failure", "reason": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeResult {
    Success {
        #[serde(flatten)]
        payload: Map<String, Value>,
    },
    Failure {
        reason: String,
    },
}

impl BridgeResult {
    /// Success with no payload
    pub fn success() -> Self {
        BridgeResult::Success {
            payload: Map::new(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        BridgeResult::Failure {
            reason: reason.into(),
        }
    }

    /// Success carrying one serialized field
    pub fn with_field<T: Serialize>(key: &str, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::success().merge(key, serde_json::to_value(value)?))
    }

    /// Result of a submission: the evaluation actions to apply
    pub fn evaluation(actions: Vec<Value>) -> Self {
        Self::success().merge("actions", Value::Array(actions))
    }

    /// Result of a reset: the fresh attempt and the (possibly re-randomized) model
    pub fn reset(attempt: &AttemptState, model: Value) -> Result<Self, serde_json::Error> {
        Ok(Self::with_field("attemptState", attempt)?.merge("model", model))
    }

    /// Result of a hint request
    pub fn hint(hint: Option<Value>, has_more_hints: bool) -> Self {
        let result = Self::success().merge("hasMoreHints", Value::Bool(has_more_hints));
        match hint {
            Some(hint) => result.merge("hint", hint),
            None => result,
        }
    }

    /// Add a field to a success payload. Failures are returned unchanged.
    pub fn merge(mut self, key: &str, value: Value) -> Self {
        if let BridgeResult::Success { payload } = &mut self {
            payload.insert(key.to_string(), value);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BridgeResult::Success { .. })
    }

    /// Payload field of a success
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            BridgeResult::Success { payload } => payload.get(key),
            BridgeResult::Failure { .. } => None,
        }
    }
}

impl Default for BridgeResult {
    fn default() -> Self {
        Self::success()
    }
}
