//! Live agent handle.

use super::mode::AgentMode;
use super::observer::MessageUpdateObserver;
use crate::conversation::Message;
use crate::error::{ConfabError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// The in-memory object representing one active AI session, bound to
/// exactly one conversation id and one mode.
///
/// Lifecycle: `absent -> active -> disposed`. A disposed handle never
/// returns to active; a fresh handle may be created under the same id
/// after disposal completes.
pub struct Agent {
    conversation_id: String,
    mode: AgentMode,
    /// Local message buffer; replaced wholesale, never reordered.
    messages: RwLock<Vec<Message>>,
    /// Observer registered by the manager; cleared on disposal.
    observer: RwLock<Option<Arc<dyn MessageUpdateObserver>>>,
    disposed: AtomicBool,
}

// Derive is blocked by the observer slot; render the stable identity fields.
impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("conversation_id", &self.conversation_id)
            .field("mode", &self.mode)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl Agent {
    pub(crate) fn new(conversation_id: impl Into<String>, mode: AgentMode) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            mode,
            messages: RwLock::new(Vec::new()),
            observer: RwLock::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// The conversation this agent is bound to.
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// The mode this agent was created with.
    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Whether this handle has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Returns a copy of the local message buffer.
    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    /// Appends one message to the buffer and notifies the observer.
    pub async fn append_message(&self, message: Message) -> Result<()> {
        self.ensure_live()?;
        let snapshot = {
            let mut messages = self.messages.write().await;
            messages.push(message);
            messages.clone()
        };
        self.notify(&snapshot).await
    }

    /// Replaces the buffer wholesale and notifies the observer.
    pub async fn replace_messages(&self, messages: Vec<Message>) -> Result<()> {
        self.ensure_live()?;
        {
            let mut buffer = self.messages.write().await;
            *buffer = messages.clone();
        }
        self.notify(&messages).await
    }

    /// Hydrates the buffer without notifying the observer.
    ///
    /// Used when the buffer is being refreshed *from* persisted state, where
    /// a notification would trigger a redundant save.
    pub async fn sync_messages(&self, messages: Vec<Message>) {
        let mut buffer = self.messages.write().await;
        *buffer = messages;
    }

    pub(crate) async fn register_observer(&self, observer: Arc<dyn MessageUpdateObserver>) {
        let mut slot = self.observer.write().await;
        *slot = Some(observer);
    }

    /// Marks the handle disposed and drops its observer registration.
    ///
    /// Returns `false` if the handle was already disposed. Does not cancel
    /// an in-flight save for this conversation id.
    pub(crate) async fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        let mut slot = self.observer.write().await;
        *slot = None;
        true
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(ConfabError::message_processing(
                Some(self.conversation_id.clone()),
                "agent handle is disposed",
            ));
        }
        Ok(())
    }

    async fn notify(&self, messages: &[Message]) -> Result<()> {
        let observer = self.observer.read().await.clone();
        if let Some(observer) = observer {
            observer
                .messages_updated(&self.conversation_id, messages)
                .await?;
        }
        Ok(())
    }
}
