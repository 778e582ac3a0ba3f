//! Conversation message types.
//!
//! Messages are immutable once appended; the order of a conversation's
//! message sequence is its canonical history order.

use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by (or delivered as if typed by) the user.
    User,
    /// Message produced by the model.
    Model,
    /// Error surfaced into the history.
    Error,
}

/// The kind of sender recorded in message metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    /// Another conversation's agent.
    Agent,
    /// A human user.
    User,
}

/// Provenance metadata attached to routed messages.
///
/// The recipient agent cannot distinguish "a human typed this" from
/// "another agent sent this" except through this structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Conversation id of the sender.
    pub sender_id: String,
    /// Whether the sender was an agent or a human user.
    pub sender_type: SenderType,
    /// Timestamp when the message was routed (ISO 8601 format).
    pub timestamp: String,
    /// Identifier of the orchestrator session that routed the message.
    pub session_id: String,
}

/// A single message in a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub text: String,
    /// Optional attached images as base64 blobs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Optional provenance metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    /// Creates a plain user message without metadata.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
            images: Vec::new(),
            metadata: None,
        }
    }

    /// Creates a model response message.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            text: text.into(),
            images: Vec::new(),
            metadata: None,
        }
    }

    /// Creates an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Error,
            text: text.into(),
            images: Vec::new(),
            metadata: None,
        }
    }

    /// Attaches provenance metadata.
    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serde_roundtrip() {
        let message = Message::user("hello \"world\" \u{00e9}\n\ttab").with_metadata(MessageMetadata {
            sender_id: "c1".to_string(),
            sender_type: SenderType::Agent,
            timestamp: "2026-01-01T00:00:00Z".to_string(),
            session_id: "s1".to_string(),
        });

        let value = serde_json::to_value(&message).unwrap();
        let back: Message = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let value = serde_json::to_value(MessageRole::Model).unwrap();
        assert_eq!(value, serde_json::json!("model"));
    }

    #[test]
    fn test_metadata_absent_is_omitted() {
        let value = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(value.get("metadata").is_none());
        assert!(value.get("images").is_none());
    }
}
