use crate::domain::attempt::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Information,
    Warning,
    Error,
}

/// User-visible notice raised by a fail-soft path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub guid: Uuid,
    pub severity: Severity,
    pub content: String,
    pub can_user_dismiss: bool,
    pub created: Timestamp,
}

impl Message {
    pub fn new(severity: Severity, content: impl Into<String>) -> Self {
        Self {
            guid: Uuid::new_v4(),
            severity,
            content: content.into(),
            can_user_dismiss: true,
            created: Timestamp::now(),
        }
    }

    pub fn sticky(mut self) -> Self {
        self.can_user_dismiss = false;
        self
    }
}

/// Messages currently shown to the user, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MessageBoard {
    messages: Vec<Message>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, message: Message) -> Uuid {
        let guid = message.guid;
        tracing::debug!("Publishing {:?} message {}", message.severity, guid);
        self.messages.push(message);
        guid
    }

    pub fn publish_error(&mut self, content: impl Into<String>) -> Uuid {
        self.publish(Message::new(Severity::Error, content))
    }

    /// Remove a dismissible message. Sticky or unknown messages stay put.
    pub fn dismiss(&mut self, guid: Uuid) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| !(m.guid == guid && m.can_user_dismiss));
        self.messages.len() != before
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
