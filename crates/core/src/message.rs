//! Message and Conversation domain types.
//!
//! These are the core value objects that flow through the system:
//! the user asks a question → the pipeline grounds it in retrieved
//! passages → the provider answers → the turn pair is recorded here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (grounding rules)
    System,
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// The ordered, session-owned turn history.
///
/// Append-only: turns are never edited or removed individually. The only
/// destructive operation is [`Conversation::reset`], which clears the whole
/// history. At most one system message exists at a time, and it is always
/// emitted first when the outbound message list is built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unconditionally.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a system message only if none exists yet. Idempotent: the
    /// first system content supplied wins, later calls are no-ops.
    pub fn append_system_if_absent(&mut self, content: impl Into<String>) {
        if !self.has_system() {
            self.messages.push(Message::system(content));
        }
    }

    /// Whether a system message is present.
    pub fn has_system(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::System)
    }

    /// The system message, if any.
    pub fn system_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::System)
    }

    /// All turns in recorded order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation holds no turns.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clear all turns, returning the conversation to its empty state.
    pub fn reset(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello!");
    }

    #[test]
    fn append_system_if_absent_is_idempotent() {
        let mut conv = Conversation::new();
        conv.append_system_if_absent("first");
        conv.append_system_if_absent("second");

        let systems: Vec<_> = conv
            .messages()
            .iter()
            .filter(|m| m.role == Role::System)
            .collect();
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].content, "first");
    }

    #[test]
    fn reset_returns_to_empty() {
        let mut conv = Conversation::new();
        conv.append_system_if_absent("S");
        conv.push(Message::user("Q1"));
        conv.push(Message::assistant("A1"));
        assert_eq!(conv.len(), 3);

        conv.reset();
        assert!(conv.is_empty());
        assert!(!conv.has_system());
    }

    #[test]
    fn turn_order_is_preserved() {
        let mut conv = Conversation::new();
        conv.append_system_if_absent("S");
        conv.push(Message::user("Q1"));
        conv.push(Message::assistant("A1"));

        let contents: Vec<_> = conv.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["S", "Q1", "A1"]);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":"user""#));
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Test message");
        assert_eq!(deserialized.role, Role::User);
    }
}
