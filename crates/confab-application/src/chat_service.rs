//! Chat coordination and agent-to-agent messaging.
//!
//! `ChatService` sits on top of `AgentManager` and `ConversationManager`.
//! It hydrates conversations into live agents and delivers messages from
//! one conversation's agent into another conversation's history.

use crate::sanitize::sanitize_message_text;
use confab_core::agent::{Agent, AgentManager, AgentMode};
use confab_core::conversation::{
    ConversationManager, Message, MessageMetadata, MessageRole, SenderType,
};
use confab_core::error::{ConfabError, Result};
use std::sync::Arc;

/// Coordinates agents and conversation state for the chat surface.
pub struct ChatService {
    agents: Arc<AgentManager>,
    conversations: Arc<ConversationManager>,
}

impl ChatService {
    /// Creates a new `ChatService` over the shared managers.
    pub fn new(agents: Arc<AgentManager>, conversations: Arc<ConversationManager>) -> Self {
        Self {
            agents,
            conversations,
        }
    }

    /// Ensures an agent handle exists for `conversation_id` and hydrates its
    /// buffer from persisted state.
    ///
    /// A conversation that has never been saved starts with an empty buffer.
    pub async fn load_conversation(&self, conversation_id: &str) -> Result<Arc<Agent>> {
        let agent = self
            .agents
            .get_or_create_agent(conversation_id, AgentMode::Chat)
            .await?;

        let messages = match self.conversations.get_conversation(conversation_id).await {
            Some(conversation) => conversation.messages,
            None => match self.conversations.restore_conversation(conversation_id).await {
                Ok(conversation) => conversation.messages,
                // Nothing stored yet; the agent starts empty.
                Err(error) if error.is_load_failed() => Vec::new(),
                Err(error) => return Err(error),
            },
        };

        agent.sync_messages(messages).await;
        Ok(agent)
    }

    /// Delivers `text` from the agent of `from_conversation_id` into the
    /// history of `to_conversation_id`, as if typed by a user.
    ///
    /// The recipient cannot distinguish the sender from a human except via
    /// the message metadata. The source conversation and any third
    /// conversation are never mutated; sequential calls preserve their
    /// issuance order in the target history.
    pub async fn send_agent_message(
        &self,
        from_conversation_id: &str,
        to_conversation_id: &str,
        text: &str,
    ) -> Result<()> {
        if from_conversation_id == to_conversation_id {
            return Err(ConfabError::communication(
                Some(from_conversation_id.to_string()),
                Some(to_conversation_id.to_string()),
                "an agent cannot message its own conversation",
            ));
        }

        let text = sanitize_message_text(text).ok_or_else(|| {
            ConfabError::message_processing(
                Some(to_conversation_id.to_string()),
                "message text is empty after sanitization",
            )
        })?;

        let message = Message {
            role: MessageRole::User,
            text,
            images: Vec::new(),
            metadata: Some(MessageMetadata {
                sender_id: from_conversation_id.to_string(),
                sender_type: SenderType::Agent,
                timestamp: chrono::Utc::now().to_rfc3339(),
                session_id: self.agents.session_id().to_string(),
            }),
        };

        // Only the target conversation is read and written here. A target
        // that is persisted but not yet hydrated must be restored first, so
        // delivery appends to the stored history instead of replacing it.
        let mut messages = match self.conversations.get_conversation(to_conversation_id).await {
            Some(conversation) => conversation.messages,
            None => match self.conversations.restore_conversation(to_conversation_id).await {
                Ok(conversation) => conversation.messages,
                Err(error) if error.is_load_failed() => Vec::new(),
                Err(error) => return Err(error),
            },
        };
        messages.push(message);

        let saved = self
            .conversations
            .save_conversation(to_conversation_id, messages)
            .await?;

        // Refresh a live target agent without re-triggering its observer,
        // which would issue a redundant save.
        if let Some(agent) = self.agents.get_agent(to_conversation_id).await {
            agent.sync_messages(saved.messages).await;
        }

        tracing::info!(
            from_conversation_id = %from_conversation_id,
            to_conversation_id = %to_conversation_id,
            "Delivered agent-to-agent message"
        );
        Ok(())
    }
}
