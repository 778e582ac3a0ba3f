//! In-memory conversation store.
//!
//! Backs embedded deployments and tests where no durable storage is wanted.

use anyhow::Result;
use async_trait::async_trait;
use confab_core::conversation::ConversationStore;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A [`ConversationStore`] holding every value in process memory.
#[derive(Default)]
pub struct MemoryConversationStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys. Test/diagnostic helper.
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn get(&self, key: &str) -> Option<Value> {
        self.values.read().await.get(key).cloned()
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.read().await.keys().cloned().collect())
    }
}
