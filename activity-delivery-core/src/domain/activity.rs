use crate::domain::attempt::ActivityId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Activity placed on a page (immutable while mounted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDescriptor {
    /// Unique ID
    pub id: ActivityId,

    /// Activity type key (e.g., "oli_multiple_choice"), selects the element
    pub activity_type: String,

    /// Display name
    #[serde(default)]
    pub title: String,

    /// Activity-specific model (opaque to the bridge)
    #[serde(default)]
    pub model: serde_json::Value,
}

impl ActivityDescriptor {
    pub fn new(
        id: impl Into<ActivityId>,
        activity_type: impl Into<String>,
        model: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            activity_type: activity_type.into(),
            title: String::new(),
            model,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Model as handed to the element
    pub fn serialized_model(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.model)
    }
}
