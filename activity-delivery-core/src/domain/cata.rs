use crate::domain::content::RichText;
use crate::domain::rule::{
    create_rule_for_ids, invert_rule, set_difference, union_rules, ChoiceId, Rule,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ResponseId = String;
pub type HintId = String;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Question stem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Stem {
    pub id: String,
    pub content: RichText,
}

/// Selectable answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Choice {
    pub id: ChoiceId,
    pub content: RichText,
}

impl Choice {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: RichText::from_text(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Feedback {
    pub id: String,
    pub content: RichText,
}

impl Feedback {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: RichText::from_text(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Hint {
    pub id: HintId,
    pub content: RichText,
}

impl Hint {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            content: RichText::from_text(text),
        }
    }
}

/// Graded outcome matched by its rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    pub id: ResponseId,
    pub rule: Rule,
    pub score: u32,
    pub feedback: Feedback,
}

impl Response {
    pub fn new(rule: Rule, score: u32, feedback: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            rule,
            score,
            feedback: Feedback::from_text(feedback),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Part {
    pub id: String,
    pub responses: Vec<Response>,
    /// Cognitive hints followed by a final bottom-out hint
    pub hints: Vec<Hint>,
}

/// Choice subset paired with the response it selects.
///
/// Serialized as a `[choiceIds, responseId]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceIdsToResponseId(pub Vec<ChoiceId>, pub ResponseId);

impl ChoiceIdsToResponseId {
    pub fn choice_ids(&self) -> &[ChoiceId] {
        &self.0
    }

    pub fn response_id(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum CataVariant {
    /// Binary correct/incorrect feedback
    #[serde(rename = "SimpleCATA")]
    Simple,

    /// Extra feedback for specific choice subsets
    #[serde(rename = "TargetedCATA")]
    Targeted { targeted: Vec<ChoiceIdsToResponseId> },
}

impl CataVariant {
    pub fn name(&self) -> &'static str {
        match self {
            CataVariant::Simple => "SimpleCATA",
            CataVariant::Targeted { .. } => "TargetedCATA",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Authoring {
    pub parts: Vec<Part>,
    pub correct: ChoiceIdsToResponseId,
    pub incorrect: ChoiceIdsToResponseId,
    #[serde(default)]
    pub preview_text: String,
}

/// Errors raised by CATA content edits
#[derive(Debug, thiserror::Error, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum CataError {
    #[error("Choice not found: {0}")]
    ChoiceNotFound(ChoiceId),

    #[error("Response not found: {0}")]
    ResponseNotFound(ResponseId),

    #[error("Hint not found: {0}")]
    HintNotFound(HintId),

    #[error("Model has no parts")]
    MissingPart,
}

/// "Choose all that apply" model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CataModel {
    pub stem: Stem,
    pub choices: Vec<Choice>,
    pub authoring: Authoring,
    pub variant: CataVariant,
}

impl CataModel {
    /// Default authoring model: two choices (the first correct), a correct and
    /// an incorrect response, two cognitive hints and a bottom-out hint
    pub fn new_simple() -> Self {
        let choice_a = Choice::from_text("Choice A");
        let choice_b = Choice::from_text("Choice B");

        let placeholder = create_rule_for_ids::<&str, &str>(&[], &[]);
        let correct = Response::new(placeholder.clone(), 1, "Correct");
        let incorrect = Response::new(placeholder, 0, "Incorrect");

        let mut model = Self {
            stem: Stem {
                id: new_id(),
                content: RichText::default(),
            },
            authoring: Authoring {
                correct: ChoiceIdsToResponseId(vec![choice_a.id.clone()], correct.id.clone()),
                incorrect: ChoiceIdsToResponseId(
                    vec![choice_b.id.clone()],
                    incorrect.id.clone(),
                ),
                parts: vec![Part {
                    id: "1".to_string(),
                    responses: vec![correct, incorrect],
                    hints: vec![
                        Hint::from_text(""),
                        Hint::from_text(""),
                        Hint::from_text(""),
                    ],
                }],
                preview_text: String::new(),
            },
            choices: vec![choice_a, choice_b],
            variant: CataVariant::Simple,
        };

        model.recompute_rules();
        model
    }

    /// Default model in its targeted form
    pub fn new_targeted() -> Self {
        let mut model = Self::new_simple();
        model.toggle_type();
        model
    }

    // ===== Queries =====

    pub fn is_simple(&self) -> bool {
        matches!(self.variant, CataVariant::Simple)
    }

    pub fn choice_ids(&self) -> Vec<ChoiceId> {
        self.choices.iter().map(|c| c.id.clone()).collect()
    }

    pub fn choice(&self, id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    /// Correct ids in choice order
    pub fn correct_choice_ids(&self) -> Vec<ChoiceId> {
        self.in_choice_order(self.authoring.correct.choice_ids())
    }

    /// Incorrect ids in choice order
    pub fn incorrect_choice_ids(&self) -> Vec<ChoiceId> {
        self.in_choice_order(self.authoring.incorrect.choice_ids())
    }

    pub fn is_correct(&self, choice_id: &str) -> bool {
        self.authoring.correct.0.iter().any(|id| id == choice_id)
    }

    pub fn targeted(&self) -> &[ChoiceIdsToResponseId] {
        match &self.variant {
            CataVariant::Simple => &[],
            CataVariant::Targeted { targeted } => targeted,
        }
    }

    pub fn responses(&self) -> &[Response] {
        self.authoring
            .parts
            .first()
            .map(|p| p.responses.as_slice())
            .unwrap_or(&[])
    }

    pub fn response(&self, id: &str) -> Option<&Response> {
        self.responses().iter().find(|r| r.id == id)
    }

    pub fn correct_response(&self) -> Option<&Response> {
        self.response(self.authoring.correct.response_id())
    }

    pub fn incorrect_response(&self) -> Option<&Response> {
        self.response(self.authoring.incorrect.response_id())
    }

    pub fn hints(&self) -> &[Hint] {
        self.authoring
            .parts
            .first()
            .map(|p| p.hints.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any rule or id list still mentions `choice_id`
    pub fn references_choice(&self, choice_id: &str) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
            || self.authoring.correct.0.iter().any(|id| id == choice_id)
            || self.authoring.incorrect.0.iter().any(|id| id == choice_id)
            || self
                .targeted()
                .iter()
                .any(|assoc| assoc.0.iter().any(|id| id == choice_id))
            || self.responses().iter().any(|r| r.rule.references(choice_id))
    }

    /// Response matched by a student's selection.
    ///
    /// The correct response wins, then targeted responses in authoring order,
    /// then the incorrect catch-all.
    pub fn evaluate<I, S>(&self, selection: I) -> Option<&Response>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selected: Vec<String> = selection
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let ordered = std::iter::once(self.authoring.correct.response_id())
            .chain(self.targeted().iter().map(|a| a.response_id()))
            .chain(std::iter::once(self.authoring.incorrect.response_id()));

        ordered
            .filter_map(|id| self.response(id))
            .find(|response| response.rule.matches(&selected))
    }

    // ===== Editing =====

    /// Switch between the simple and targeted representations
    pub fn toggle_type(&mut self) {
        match &self.variant {
            CataVariant::Simple => {
                self.variant = CataVariant::Targeted {
                    targeted: Vec::new(),
                };
            }
            CataVariant::Targeted { targeted } => {
                let discarded: Vec<ResponseId> =
                    targeted.iter().map(|a| a.1.clone()).collect();
                if let Some(part) = self.authoring.parts.first_mut() {
                    part.responses.retain(|r| !discarded.contains(&r.id));
                }
                self.variant = CataVariant::Simple;
            }
        }

        tracing::debug!("CATA model switched to {}", self.variant.name());
        self.recompute_rules();
    }

    /// Replace the stem and refresh the preview text
    pub fn edit_stem(&mut self, content: RichText) {
        self.authoring.preview_text = content.to_simple_text();
        self.stem.content = content;
    }

    /// Append an empty choice, classified as incorrect
    pub fn add_choice(&mut self) -> ChoiceId {
        let choice = Choice::from_text("");
        let id = choice.id.clone();

        self.choices.push(choice);
        self.authoring.incorrect.0.push(id.clone());
        self.recompute_rules();

        id
    }

    pub fn edit_choice_content(&mut self, id: &str, content: RichText) -> Result<(), CataError> {
        let choice = self
            .choices
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CataError::ChoiceNotFound(id.to_string()))?;

        choice.content = content;
        Ok(())
    }

    /// Remove a choice and every reference to it.
    ///
    /// Returns `false` (and leaves the model untouched) when the id is unknown.
    pub fn remove_choice(&mut self, id: &str) -> bool {
        if !self.references_choice(id) {
            return false;
        }

        self.choices.retain(|c| c.id != id);
        self.authoring.correct.0.retain(|c| c != id);
        self.authoring.incorrect.0.retain(|c| c != id);
        if let CataVariant::Targeted { targeted } = &mut self.variant {
            for assoc in targeted.iter_mut() {
                assoc.0.retain(|c| c != id);
            }
        }

        self.recompute_rules();
        true
    }

    /// Move a choice between the correct and incorrect sets
    pub fn toggle_choice_correctness(&mut self, id: &str) -> Result<(), CataError> {
        if self.choice(id).is_none() {
            return Err(CataError::ChoiceNotFound(id.to_string()));
        }

        add_or_remove(id, &mut self.authoring.correct.0);
        add_or_remove(id, &mut self.authoring.incorrect.0);

        self.authoring.correct.0 = self.correct_choice_ids();
        self.authoring.incorrect.0 = self.incorrect_choice_ids();

        self.recompute_rules();
        Ok(())
    }

    pub fn edit_response_feedback(
        &mut self,
        response_id: &str,
        content: RichText,
    ) -> Result<(), CataError> {
        let response = self
            .response_mut(response_id)
            .ok_or_else(|| CataError::ResponseNotFound(response_id.to_string()))?;

        response.feedback.content = content;
        Ok(())
    }

    /// Add a targeted response for an (initially empty) choice subset.
    ///
    /// No-op on a simple model.
    pub fn add_targeted_feedback(&mut self) -> Option<ResponseId> {
        let CataVariant::Targeted { targeted } = &mut self.variant else {
            return None;
        };

        let all: Vec<ChoiceId> = self.choices.iter().map(|c| c.id.clone()).collect();
        let response = Response::new(create_rule_for_ids::<&str, _>(&[], &all), 0, "");
        let response_id = response.id.clone();

        targeted.push(ChoiceIdsToResponseId(Vec::new(), response_id.clone()));
        self.authoring.parts.first_mut()?.responses.push(response);

        self.recompute_rules();
        Some(response_id)
    }

    /// Drop a targeted response and its association. No-op on a simple model.
    pub fn remove_targeted_feedback(&mut self, response_id: &str) -> bool {
        let CataVariant::Targeted { targeted } = &mut self.variant else {
            return false;
        };

        let before = targeted.len();
        targeted.retain(|assoc| assoc.1 != response_id);
        if targeted.len() == before {
            return false;
        }

        if let Some(part) = self.authoring.parts.first_mut() {
            part.responses.retain(|r| r.id != response_id);
        }

        self.recompute_rules();
        true
    }

    /// Reserved for editing a targeted association's choices; currently does nothing
    pub fn edit_targeted_feedback_choices(&mut self, choice_ids: &[ChoiceId]) {
        tracing::debug!(
            "Ignoring targeted feedback choice edit ({} choices)",
            choice_ids.len()
        );
    }

    /// Insert a cognitive hint right before the bottom-out hint
    pub fn add_hint(&mut self) -> Result<HintId, CataError> {
        let part = self
            .authoring
            .parts
            .first_mut()
            .ok_or(CataError::MissingPart)?;

        let hint = Hint::from_text("");
        let id = hint.id.clone();
        let bottom_out = part.hints.len().saturating_sub(1);
        part.hints.insert(bottom_out, hint);

        Ok(id)
    }

    pub fn edit_hint(&mut self, id: &str, content: RichText) -> Result<(), CataError> {
        let hint = self
            .authoring
            .parts
            .first_mut()
            .ok_or(CataError::MissingPart)?
            .hints
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CataError::HintNotFound(id.to_string()))?;

        hint.content = content;
        Ok(())
    }

    pub fn remove_hint(&mut self, id: &str) -> bool {
        let Some(part) = self.authoring.parts.first_mut() else {
            return false;
        };

        let before = part.hints.len();
        part.hints.retain(|h| h.id != id);
        part.hints.len() != before
    }

    // ===== Rules =====

    /// Regenerate every response rule from the current choices and
    /// classification. Total and idempotent.
    pub fn recompute_rules(&mut self) {
        let all = self.choice_ids();
        let correct_rule =
            create_rule_for_ids(&self.correct_choice_ids(), &self.incorrect_choice_ids());

        let mut assignments: Vec<(ResponseId, Rule)> = Vec::new();

        let incorrect_rule = match &self.variant {
            CataVariant::Simple => invert_rule(&correct_rule),
            CataVariant::Targeted { targeted } => {
                let mut inverted = Vec::with_capacity(targeted.len() + 1);
                for assoc in targeted {
                    let excluded = set_difference(&all, assoc.choice_ids());
                    let rule = create_rule_for_ids(assoc.choice_ids(), excluded.as_slice());
                    inverted.push(invert_rule(&rule));
                    assignments.push((assoc.1.clone(), rule));
                }
                inverted.push(invert_rule(&correct_rule));
                union_rules(inverted)
            }
        };

        assignments.push((self.authoring.correct.1.clone(), correct_rule));
        assignments.push((self.authoring.incorrect.1.clone(), incorrect_rule));

        for (response_id, rule) in assignments {
            match self.response_mut(&response_id) {
                Some(response) => response.rule = rule,
                None => tracing::warn!("No response {} to attach rule to", response_id),
            }
        }
    }

    fn response_mut(&mut self, id: &str) -> Option<&mut Response> {
        self.authoring
            .parts
            .first_mut()?
            .responses
            .iter_mut()
            .find(|r| r.id == id)
    }

    fn in_choice_order(&self, ids: &[ChoiceId]) -> Vec<ChoiceId> {
        self.choices
            .iter()
            .filter(|c| ids.contains(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }
}

fn add_or_remove(item: &str, list: &mut Vec<ChoiceId>) {
    match list.iter().position(|x| x == item) {
        Some(index) => {
            list.remove(index);
        }
        None => list.push(item.to_string()),
    }
}
