//! Conversation store trait.
//!
//! Defines the opaque key/value persistence surface that conversation
//! records are mirrored to. Writes may fail transiently; the manager layers
//! retry on top of this trait, implementations do not retry themselves.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Key prefix under which conversation records are stored.
pub const CONVERSATION_KEY_PREFIX: &str = "conversation.";

/// Returns the store key for a conversation id.
pub fn conversation_key(id: &str) -> String {
    format!("{CONVERSATION_KEY_PREFIX}{id}")
}

/// Extracts the conversation id from a store key, if it is one.
pub fn conversation_id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(CONVERSATION_KEY_PREFIX)
}

/// An abstract key/value store for conversation persistence.
///
/// This trait decouples the engine from the concrete storage mechanism
/// (in-memory map, JSON files, a host-provided state store).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Atomic writes (a failed `update` must not corrupt the previous value)
/// - Missing keys (`get` returns `None`, `remove` is a no-op)
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// `Some(value)` if present and readable, `None` otherwise. Unreadable
    /// records are reported as absent here; corruption is surfaced when the
    /// value fails to deserialize into a conversation.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Value durably stored
    /// - `Err(_)`: Transient or permanent storage failure
    async fn update(&self, key: &str, value: Value) -> Result<()>;

    /// Removes the value stored under `key`, if any.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Lists all keys currently present in the store.
    async fn keys(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        let key = conversation_key("c1");
        assert_eq!(key, "conversation.c1");
        assert_eq!(conversation_id_from_key(&key), Some("c1"));
    }

    #[test]
    fn test_foreign_key_is_ignored() {
        assert_eq!(conversation_id_from_key("settings.theme"), None);
    }
}
