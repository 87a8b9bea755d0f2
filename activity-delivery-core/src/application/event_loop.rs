use crate::application::{CataAction, CataEvent};
use crate::domain::{CataError, CataModel, RichText};

/// Applies editing actions to one CATA model and reports what happened
#[derive(Debug, Clone)]
pub struct CataEditor {
    model: CataModel,
}

impl CataEditor {
    pub fn new(model: CataModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &CataModel {
        &self.model
    }

    pub fn into_model(self) -> CataModel {
        self.model
    }

    /// Process a single action and return the resulting event
    pub fn handle_action(&mut self, action: CataAction) -> CataEvent {
        let name = action.name();
        tracing::debug!("Handling CATA action {}", name);

        match action {
            CataAction::ToggleType => {
                self.model.toggle_type();
                CataEvent::TypeToggled {
                    variant: self.model.variant.clone(),
                }
            }

            CataAction::EditStem { content } => self.handle_edit_stem(content),

            CataAction::AddChoice => CataEvent::ChoiceAdded {
                choice_id: self.model.add_choice(),
            },

            CataAction::EditChoiceContent { choice_id, content } => {
                match self.model.edit_choice_content(&choice_id, content) {
                    Ok(()) => CataEvent::ChoiceEdited { choice_id },
                    Err(e) => failed(name, e),
                }
            }

            CataAction::RemoveChoice { choice_id } => {
                if self.model.remove_choice(&choice_id) {
                    CataEvent::ChoiceRemoved { choice_id }
                } else {
                    ignored(name, format!("Choice {} not found", choice_id))
                }
            }

            CataAction::ToggleChoiceCorrectness { choice_id } => {
                match self.model.toggle_choice_correctness(&choice_id) {
                    Ok(()) => CataEvent::CorrectnessToggled {
                        correct: self.model.is_correct(&choice_id),
                        choice_id,
                    },
                    Err(e) => failed(name, e),
                }
            }

            CataAction::EditResponseFeedback {
                response_id,
                content,
            } => match self.model.edit_response_feedback(&response_id, content) {
                Ok(()) => CataEvent::FeedbackEdited { response_id },
                Err(e) => failed(name, e),
            },

            CataAction::AddTargetedFeedback => match self.model.add_targeted_feedback() {
                Some(response_id) => CataEvent::TargetedFeedbackAdded { response_id },
                None => ignored(name, "Model is not targeted".to_string()),
            },

            CataAction::RemoveTargetedFeedback { response_id } => {
                if self.model.remove_targeted_feedback(&response_id) {
                    CataEvent::TargetedFeedbackRemoved { response_id }
                } else {
                    ignored(name, format!("No targeted response {}", response_id))
                }
            }

            CataAction::EditTargetedFeedbackChoices { choice_ids } => {
                self.model.edit_targeted_feedback_choices(&choice_ids);
                ignored(name, "Not supported yet".to_string())
            }

            CataAction::AddHint => match self.model.add_hint() {
                Ok(hint_id) => CataEvent::HintAdded { hint_id },
                Err(e) => failed(name, e),
            },

            CataAction::EditHint { hint_id, content } => {
                match self.model.edit_hint(&hint_id, content) {
                    Ok(()) => CataEvent::HintEdited { hint_id },
                    Err(e) => failed(name, e),
                }
            }

            CataAction::RemoveHint { hint_id } => {
                if self.model.remove_hint(&hint_id) {
                    CataEvent::HintRemoved { hint_id }
                } else {
                    ignored(name, format!("Hint {} not found", hint_id))
                }
            }
        }
    }

    fn handle_edit_stem(&mut self, content: RichText) -> CataEvent {
        self.model.edit_stem(content);
        CataEvent::StemEdited {
            preview_text: self.model.authoring.preview_text.clone(),
        }
    }
}

fn failed(action: &str, error: CataError) -> CataEvent {
    tracing::warn!("CATA action {} failed: {}", action, error);
    CataEvent::ActionFailed {
        action: action.to_string(),
        reason: error.to_string(),
    }
}

fn ignored(action: &str, reason: String) -> CataEvent {
    tracing::debug!("CATA action {} ignored: {}", action, reason);
    CataEvent::ActionIgnored {
        action: action.to_string(),
        reason,
    }
}
