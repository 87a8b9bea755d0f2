use crate::domain::{ChoiceId, HintId, ResponseId, RichText};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Editing operations that can be applied to a CATA model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CataAction {
    /// Switch between Simple and Targeted
    ToggleType,

    EditStem { content: RichText },

    AddChoice,

    #[serde(rename_all = "camelCase")]
    EditChoiceContent { choice_id: ChoiceId, content: RichText },

    #[serde(rename_all = "camelCase")]
    RemoveChoice { choice_id: ChoiceId },

    /// Move a choice between the correct and incorrect sets
    #[serde(rename_all = "camelCase")]
    ToggleChoiceCorrectness { choice_id: ChoiceId },

    #[serde(rename_all = "camelCase")]
    EditResponseFeedback {
        response_id: ResponseId,
        content: RichText,
    },

    AddTargetedFeedback,

    #[serde(rename_all = "camelCase")]
    RemoveTargetedFeedback { response_id: ResponseId },

    #[serde(rename_all = "camelCase")]
    EditTargetedFeedbackChoices { choice_ids: Vec<ChoiceId> },

    AddHint,

    #[serde(rename_all = "camelCase")]
    EditHint { hint_id: HintId, content: RichText },

    #[serde(rename_all = "camelCase")]
    RemoveHint { hint_id: HintId },
}

impl CataAction {
    pub fn name(&self) -> &'static str {
        match self {
            CataAction::ToggleType => "ToggleType",
            CataAction::EditStem { .. } => "EditStem",
            CataAction::AddChoice => "AddChoice",
            CataAction::EditChoiceContent { .. } => "EditChoiceContent",
            CataAction::RemoveChoice { .. } => "RemoveChoice",
            CataAction::ToggleChoiceCorrectness { .. } => "ToggleChoiceCorrectness",
            CataAction::EditResponseFeedback { .. } => "EditResponseFeedback",
            CataAction::AddTargetedFeedback => "AddTargetedFeedback",
            CataAction::RemoveTargetedFeedback { .. } => "RemoveTargetedFeedback",
            CataAction::EditTargetedFeedbackChoices { .. } => "EditTargetedFeedbackChoices",
            CataAction::AddHint => "AddHint",
            CataAction::EditHint { .. } => "EditHint",
            CataAction::RemoveHint { .. } => "RemoveHint",
        }
    }
}
