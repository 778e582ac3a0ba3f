//! Conversation lifecycle and persistence management.
//!
//! `ConversationManager` owns every `Conversation` record in memory and
//! mirrors them to a [`ConversationStore`]. Storage is the write path,
//! memory is the read path; memory is refreshed at startup via
//! `load_all_conversations` / `restore_conversation`.

use super::model::Conversation;
use super::retry::RetryPolicy;
use super::store::{ConversationStore, conversation_id_from_key, conversation_key};
use crate::conversation::message::Message;
use crate::error::{ConfabError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One record that failed to hydrate during bulk loading.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    /// Conversation id of the unreadable record.
    pub id: String,
    /// Why hydration failed.
    pub error: String,
}

/// Outcome of bulk hydration at startup.
///
/// A single corrupt record never aborts loading of the others; it lands in
/// `failed` instead.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Records hydrated into memory.
    pub successful: Vec<Conversation>,
    /// Records that could not be hydrated.
    pub failed: Vec<LoadFailure>,
}

/// Manages conversation records and their persistence.
///
/// `ConversationManager` is responsible for:
/// - Upserting conversations with bounded, backed-off retries
/// - Serving in-memory reads
/// - Bulk hydration and single-record restoration from the store
/// - Round-trip integrity checking
pub struct ConversationManager {
    /// In-memory conversation records; the authoritative read path.
    conversations: RwLock<HashMap<String, Conversation>>,
    /// Per-conversation write serialization, so a slow late-arriving save
    /// cannot be overwritten by an earlier one that resolves later.
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Persistent storage backend.
    store: Arc<dyn ConversationStore>,
    /// Injected retry policy for store writes.
    retry: RetryPolicy,
}

impl ConversationManager {
    /// Creates a manager with the default retry policy (3 attempts,
    /// 1000 ms base delay, 2.0 multiplier).
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self::with_retry_policy(store, RetryPolicy::default())
    }

    /// Creates a manager with an explicit retry policy.
    pub fn with_retry_policy(store: Arc<dyn ConversationStore>, retry: RetryPolicy) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            write_locks: Mutex::new(HashMap::new()),
            store,
            retry,
        }
    }

    /// Upserts a conversation, replacing its message sequence wholesale.
    ///
    /// `created_at` of an existing record is preserved; `last_updated` is
    /// always refreshed. The store write is retried per the injected policy;
    /// after exhaustion the call fails with `PersistenceFailed` and the
    /// in-memory record is left untouched, so callers must treat the save
    /// as not-committed. On success the in-memory record is authoritative
    /// and immediately queryable.
    ///
    /// Saving an empty message sequence is valid and round-trips as empty.
    pub async fn save_conversation(&self, id: &str, messages: Vec<Message>) -> Result<Conversation> {
        let id_lock = self.write_lock_for(id).await;
        let _guard = id_lock.lock().await;

        let record = {
            let conversations = self.conversations.read().await;
            match conversations.get(id) {
                Some(existing) => existing.with_messages(messages),
                None => Conversation::new(id, messages),
            }
        };

        let value = serde_json::to_value(&record).map_err(|e| {
            ConfabError::message_processing(
                Some(id.to_string()),
                format!("conversation could not be encoded: {e}"),
            )
        })?;
        let key = conversation_key(id);

        let outcome = self
            .retry
            .run(|| {
                let store = Arc::clone(&self.store);
                let key = key.clone();
                let value = value.clone();
                async move { store.update(&key, value).await }
            })
            .await;

        if let Err(retry_error) = outcome {
            return Err(ConfabError::persistence_failed(
                id,
                retry_error.attempts,
                format!("{:#}", retry_error.error),
            ));
        }

        let mut conversations = self.conversations.write().await;
        conversations.insert(id.to_string(), record.clone());

        Ok(record)
    }

    /// Returns the in-memory record for `id`, if any. Does not read storage.
    pub async fn get_conversation(&self, id: &str) -> Option<Conversation> {
        let conversations = self.conversations.read().await;
        conversations.get(id).cloned()
    }

    /// Removes a conversation from memory and storage.
    ///
    /// # Returns
    ///
    /// Whether a record existed in either place.
    pub async fn delete_conversation(&self, id: &str) -> Result<bool> {
        let id_lock = self.write_lock_for(id).await;
        let _guard = id_lock.lock().await;

        let existed_in_memory = {
            let mut conversations = self.conversations.write().await;
            conversations.remove(id).is_some()
        };

        let key = conversation_key(id);
        let existed_in_store = self.store.get(&key).await.is_some();
        // Unconditional: a corrupt record reads back as absent but its
        // backing entry must still be removable. `remove` is a no-op for
        // missing keys.
        self.store
            .remove(&key)
            .await
            .map_err(|e| ConfabError::persistence_failed(id, 1, format!("delete failed: {e:#}")))?;

        Ok(existed_in_memory || existed_in_store)
    }

    /// Hydrates every stored conversation into memory.
    ///
    /// Unreadable records are collected in the report's `failed` list and do
    /// not abort loading of the rest.
    pub async fn load_all_conversations(&self) -> Result<LoadReport> {
        let keys = self
            .store
            .keys()
            .await
            .map_err(|e| ConfabError::load_failed("*", format!("listing store keys: {e:#}")))?;

        let mut report = LoadReport::default();
        for key in keys {
            let Some(id) = conversation_id_from_key(&key) else {
                continue;
            };
            match self.hydrate_one(id, &key).await {
                Ok(conversation) => report.successful.push(conversation),
                Err(error) => report.failed.push(LoadFailure {
                    id: id.to_string(),
                    error: error.to_string(),
                }),
            }
        }

        tracing::info!(
            loaded = report.successful.len(),
            failed = report.failed.len(),
            "Loaded conversations from store"
        );
        Ok(report)
    }

    /// Lists the ids of every conversation currently present in the store.
    pub async fn list_conversation_ids(&self) -> Result<Vec<String>> {
        let keys = self
            .store
            .keys()
            .await
            .map_err(|e| ConfabError::load_failed("*", format!("listing store keys: {e:#}")))?;
        Ok(keys
            .iter()
            .filter_map(|key| conversation_id_from_key(key))
            .map(str::to_string)
            .collect())
    }

    /// Re-hydrates a single record from storage, for recovery flows.
    pub async fn restore_conversation(&self, id: &str) -> Result<Conversation> {
        let key = conversation_key(id);
        self.hydrate_one(id, &key).await
    }

    /// Structural equality restricted to id, message count and per-message
    /// role/text. Volatile fields like `last_updated` are ignored, which
    /// makes this usable as a round-trip correctness check.
    pub fn verify_state_integrity(a: &Conversation, b: &Conversation) -> bool {
        if a.id != b.id || a.messages.len() != b.messages.len() {
            return false;
        }
        a.messages
            .iter()
            .zip(b.messages.iter())
            .all(|(ma, mb)| ma.role == mb.role && ma.text == mb.text)
    }

    /// Reads and deserializes one record, inserting it into memory.
    async fn hydrate_one(&self, id: &str, key: &str) -> Result<Conversation> {
        let value = self.store.get(key).await.ok_or_else(|| {
            ConfabError::load_failed(id, "record missing or unreadable in store")
        })?;

        let conversation: Conversation = serde_json::from_value(value)
            .map_err(|e| ConfabError::load_failed(id, format!("corrupt record: {e}")))?;

        let mut conversations = self.conversations.write().await;
        conversations.insert(id.to_string(), conversation.clone());
        Ok(conversation)
    }

    /// Returns the per-id write mutex, creating it on first use.
    ///
    /// Entries are retained for the manager's lifetime; cardinality is
    /// bounded by the number of conversations.
    async fn write_lock_for(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
