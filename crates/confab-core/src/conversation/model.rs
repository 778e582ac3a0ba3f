//! Conversation domain model.

use super::message::Message;
use serde::{Deserialize, Serialize};

/// Maximum length of a derived conversation title, in characters.
const MAX_TITLE_LEN: usize = 60;

/// The persisted, ordered message history identified by a stable id.
///
/// Owned exclusively by `ConversationManager`; created on first save,
/// mutated only by replacing its `messages` sequence wholesale, and removed
/// only by an explicit delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Externally supplied, unique conversation identifier.
    pub id: String,
    /// Human-readable title derived from the first user message.
    pub title: String,
    /// Timestamp when the conversation was created (ISO 8601 format).
    /// Preserved across re-saves of an existing id.
    pub created_at: String,
    /// Timestamp of the last successful save (ISO 8601 format).
    pub last_updated: String,
    /// Full message history in canonical order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Creates a fresh conversation record for an id seen for the first time.
    pub fn new(id: impl Into<String>, messages: Vec<Message>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            title: derive_title(&messages),
            created_at: now.clone(),
            last_updated: now,
            messages,
        }
    }

    /// Returns a copy with the message sequence replaced wholesale.
    ///
    /// `created_at` is preserved; `last_updated` and the title are refreshed.
    pub fn with_messages(&self, messages: Vec<Message>) -> Self {
        Self {
            id: self.id.clone(),
            title: derive_title(&messages),
            created_at: self.created_at.clone(),
            last_updated: chrono::Utc::now().to_rfc3339(),
            messages,
        }
    }
}

/// Derives a display title from the first non-empty user message.
fn derive_title(messages: &[Message]) -> String {
    let first_line = messages
        .iter()
        .find(|m| matches!(m.role, super::message::MessageRole::User) && !m.text.trim().is_empty())
        .map(|m| m.text.lines().next().unwrap_or_default().trim().to_string());

    match first_line {
        Some(line) if !line.is_empty() => {
            if line.chars().count() > MAX_TITLE_LEN {
                let truncated: String = line.chars().take(MAX_TITLE_LEN).collect();
                format!("{truncated}…")
            } else {
                line
            }
        }
        _ => "New conversation".to_string(),
    }
}
