use crate::infrastructure::{CliError, Result};
use activity_delivery_core::{CataAction, CataEditor, CataEvent, CataModel};
use serde::Serialize;

/// Default authoring model
pub fn new_model(targeted: bool) -> CataModel {
    if targeted {
        CataModel::new_targeted()
    } else {
        CataModel::new_simple()
    }
}

/// Replay actions in order.
///
/// Ignored actions are reported but do not stop the replay; the first failure
/// does.
pub fn apply_actions(
    model: CataModel,
    actions: Vec<CataAction>,
) -> Result<(CataModel, Vec<CataEvent>)> {
    let mut editor = CataEditor::new(model);
    let mut events = Vec::with_capacity(actions.len());

    for action in actions {
        let event = editor.handle_action(action);
        if let CataEvent::ActionFailed { action, reason } = &event {
            return Err(CliError::ActionFailed {
                action: action.clone(),
                reason: reason.clone(),
            });
        }
        events.push(event);
    }

    Ok((editor.into_model(), events))
}

/// Outcome of grading one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub selection: Vec<String>,
    pub response_id: Option<String>,
    pub score: u32,
    pub out_of: u32,
    pub correct: bool,
    pub feedback: String,
}

pub fn grade(model: &CataModel, selection: Vec<String>) -> GradeReport {
    let out_of = model.responses().iter().map(|r| r.score).max().unwrap_or(0);
    let response = model.evaluate(&selection);

    GradeReport {
        response_id: response.map(|r| r.id.clone()),
        score: response.map(|r| r.score).unwrap_or(0),
        out_of,
        correct: response.map(|r| r.id == model.authoring.correct.1).unwrap_or(false),
        feedback: response
            .map(|r| r.feedback.content.to_simple_text())
            .unwrap_or_default(),
        selection,
    }
}

/// Textual rule per response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleListing {
    pub response_id: String,
    pub score: u32,
    pub rule: String,
}

pub fn list_rules(model: &CataModel) -> Vec<RuleListing> {
    model
        .responses()
        .iter()
        .map(|r| RuleListing {
            response_id: r.id.clone(),
            score: r.score,
            rule: r.rule.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_then_grade() {
        let model = new_model(false);
        let second = model.choices[1].id.clone();

        let (model, events) = apply_actions(
            model,
            vec![
                CataAction::ToggleChoiceCorrectness {
                    choice_id: second.clone(),
                },
                CataAction::AddChoice,
            ],
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(model.choices.len(), 3);

        let both = model.correct_choice_ids();
        let report = grade(&model, both.clone());
        assert!(report.correct);
        assert_eq!(report.score, 1);
        assert_eq!(report.out_of, 1);
        assert_eq!(report.feedback, "Correct");

        let report = grade(&model, vec![second]);
        assert!(!report.correct);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_failed_action_stops_replay() {
        let result = apply_actions(
            new_model(false),
            vec![
                CataAction::ToggleChoiceCorrectness {
                    choice_id: "nope".to_string(),
                },
                CataAction::AddChoice,
            ],
        );

        assert!(matches!(result, Err(CliError::ActionFailed { .. })));
    }

    #[test]
    fn test_ignored_actions_are_reported() {
        let (model, events) =
            apply_actions(new_model(false), vec![CataAction::AddTargetedFeedback]).unwrap();

        assert!(matches!(events[0], CataEvent::ActionIgnored { .. }));
        assert!(model.is_simple());
    }

    #[test]
    fn test_list_rules() {
        let model = new_model(true);
        let listing = list_rules(&model);

        assert_eq!(listing.len(), 2);
        assert!(listing[0].rule.contains("input like {"));
    }
}
