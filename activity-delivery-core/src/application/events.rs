use crate::domain::{CataVariant, ChoiceId, HintId, ResponseId};
use serde::{Deserialize, Serialize};

/// Events emitted after a CATA action is handled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum CataEvent {
    TypeToggled { variant: CataVariant },

    StemEdited { preview_text: String },

    ChoiceAdded { choice_id: ChoiceId },

    ChoiceEdited { choice_id: ChoiceId },

    ChoiceRemoved { choice_id: ChoiceId },

    CorrectnessToggled { choice_id: ChoiceId, correct: bool },

    FeedbackEdited { response_id: ResponseId },

    TargetedFeedbackAdded { response_id: ResponseId },

    TargetedFeedbackRemoved { response_id: ResponseId },

    HintAdded { hint_id: HintId },

    HintEdited { hint_id: HintId },

    HintRemoved { hint_id: HintId },

    /// Action had no effect on this model
    ActionIgnored { action: String, reason: String },

    /// Action failed
    ActionFailed { action: String, reason: String },
}

impl CataEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, CataEvent::ActionFailed { .. })
    }
}
