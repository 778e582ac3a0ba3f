//! Agent lifecycle management.
//!
//! `AgentManager` owns the map of conversation-id -> live [`Agent`] handle
//! and drives creation, switching and disposal. Every lifecycle operation
//! emits a structured `tracing` event carrying the conversation id(s) and
//! outcome, which is a hard contract enforced by the test suite.

use super::handle::Agent;
use super::mode::AgentMode;
use super::observer::MessageUpdateObserver;
use super::settings::AgentSettings;
use crate::conversation::{Conversation, ConversationManager, Message};
use crate::credential::CredentialService;
use crate::error::{ConfabError, Result};
use crate::webview::WebviewChannel;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;

/// Injected dependencies for [`AgentManager`].
///
/// Constructed once at process start and passed in explicitly; there is no
/// global singleton accessor.
pub struct AgentManagerConfig {
    /// Sink for UI-facing events.
    pub webview: Arc<dyn WebviewChannel>,
    /// Provider credential lookup.
    pub credentials: Arc<dyn CredentialService>,
    /// The conversation persistence layer.
    pub conversations: Arc<ConversationManager>,
}

/// The single write path from agent activity into persistence.
///
/// Registered as each agent's observer at creation time; deregistered on
/// disposal. Logs the save trigger and pushes a webview notification.
struct PersistenceRouter {
    conversations: Arc<ConversationManager>,
    webview: Arc<dyn WebviewChannel>,
}

impl PersistenceRouter {
    async fn save(&self, conversation_id: &str, messages: &[Message]) -> Result<Conversation> {
        tracing::info!(
            conversation_id = %conversation_id,
            message_count = messages.len(),
            "Saving conversation"
        );
        let conversation = self
            .conversations
            .save_conversation(conversation_id, messages.to_vec())
            .await?;
        self.webview.post_message(json!({
            "type": "conversationSaved",
            "conversationId": conversation_id,
            "messageCount": conversation.messages.len(),
        }));
        Ok(conversation)
    }
}

#[async_trait]
impl MessageUpdateObserver for PersistenceRouter {
    async fn messages_updated(&self, conversation_id: &str, messages: &[Message]) -> Result<()> {
        self.save(conversation_id, messages).await.map(|_| ())
    }
}

/// Manages live agent handles and their lifecycle.
///
/// State machine per conversation id: `absent -> active -> disposed`.
/// At most one live handle exists per id at any time.
pub struct AgentManager {
    /// Active handles, keyed by conversation id. Mutated only here.
    agents: RwLock<HashMap<String, Arc<Agent>>>,
    router: Arc<PersistenceRouter>,
    credentials: Arc<dyn CredentialService>,
    webview: Arc<dyn WebviewChannel>,
    settings: RwLock<AgentSettings>,
    /// Identifier for this orchestrator session, stamped into routed
    /// message metadata by the chat layer.
    session_id: String,
    disposed: AtomicBool,
}

impl AgentManager {
    /// Creates a manager from its injected dependencies.
    pub fn new(config: AgentManagerConfig) -> Self {
        let AgentManagerConfig {
            webview,
            credentials,
            conversations,
        } = config;
        Self {
            agents: RwLock::new(HashMap::new()),
            router: Arc::new(PersistenceRouter {
                conversations,
                webview: webview.clone(),
            }),
            credentials,
            webview,
            settings: RwLock::new(AgentSettings::default()),
            session_id: uuid::Uuid::new_v4().to_string(),
            disposed: AtomicBool::new(false),
        }
    }

    /// Identifier of this orchestrator session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the active handle for `conversation_id`, creating one if none
    /// exists.
    ///
    /// An existing handle is returned unchanged; its mode is not silently
    /// switched. Creation failures are not retried automatically; they
    /// surface immediately so the caller can offer an explicit retry.
    pub async fn get_or_create_agent(
        &self,
        conversation_id: &str,
        mode: AgentMode,
    ) -> Result<Arc<Agent>> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(ConfabError::creation_failed(
                conversation_id,
                "agent manager is disposed",
                None,
            ));
        }

        let mut agents = self.agents.write().await;
        if let Some(existing) = agents.get(conversation_id) {
            return Ok(existing.clone());
        }

        // Credentials are consumed at creation time; a missing backing
        // store fails the creation, not a later message.
        self.credentials.get_all_api_keys().await.map_err(|e| {
            ConfabError::creation_failed(
                conversation_id,
                "credential lookup failed",
                Some(e.to_string()),
            )
        })?;

        tracing::info!(
            conversation_id = %conversation_id,
            mode = %mode,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Creating new agent"
        );

        let agent = Arc::new(Agent::new(conversation_id, mode));
        agent
            .register_observer(self.router.clone() as Arc<dyn MessageUpdateObserver>)
            .await;
        agents.insert(conversation_id.to_string(), agent.clone());

        self.webview.post_message(json!({
            "type": "agentCreated",
            "conversationId": conversation_id,
            "mode": mode.to_string(),
        }));

        Ok(agent)
    }

    /// Returns the active handle for `conversation_id` without creating one.
    pub async fn get_agent(&self, conversation_id: &str) -> Option<Arc<Agent>> {
        let agents = self.agents.read().await;
        agents.get(conversation_id).cloned()
    }

    /// Persists an agent's changed message buffer.
    ///
    /// This is the sole write path from agent activity into persistence;
    /// registered observers and direct callers both route through here.
    pub async fn on_did_update_messages(
        &self,
        conversation_id: &str,
        messages: &[Message],
    ) -> Result<Conversation> {
        self.router.save(conversation_id, messages).await
    }

    /// Disposes the handle for `conversation_id`, releasing its resources.
    ///
    /// Disposing a non-existent id is a no-op. An in-flight save for the id
    /// is allowed to complete or fail independently.
    pub async fn dispose_agent(&self, conversation_id: &str) {
        let removed = {
            let mut agents = self.agents.write().await;
            agents.remove(conversation_id)
        };

        let Some(agent) = removed else {
            tracing::debug!(
                conversation_id = %conversation_id,
                "Dispose requested for unknown agent, ignoring"
            );
            return;
        };

        tracing::info!(conversation_id = %conversation_id, "Disposing agent");
        agent.dispose().await;
        tracing::info!(
            conversation_id = %conversation_id,
            status = "disposed successfully",
            "Agent disposed successfully"
        );

        self.webview.post_message(json!({
            "type": "agentDisposed",
            "conversationId": conversation_id,
        }));
    }

    /// Disposes every active handle. Safe to call with zero active agents.
    pub async fn dispose_all_agents(&self) {
        let ids: Vec<String> = {
            let agents = self.agents.read().await;
            agents.keys().cloned().collect()
        };
        for id in ids {
            self.dispose_agent(&id).await;
        }
    }

    /// Disposes the `from` handle (if active) and creates/returns the `to`
    /// handle.
    ///
    /// Post-condition on success: exactly the `to` handle is active. If
    /// creating the `to` agent fails after `from` was disposed, the manager
    /// is left agent-less for both ids; the caller may re-issue
    /// `get_or_create_agent`.
    pub async fn switch_conversation(
        &self,
        from_conversation_id: &str,
        to_conversation_id: &str,
        mode: AgentMode,
    ) -> Result<Arc<Agent>> {
        let started = Instant::now();
        self.dispose_agent(from_conversation_id).await;

        match self.get_or_create_agent(to_conversation_id, mode).await {
            Ok(agent) => {
                tracing::info!(
                    from_conversation_id = %from_conversation_id,
                    to_conversation_id = %to_conversation_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Switched conversation"
                );
                Ok(agent)
            }
            Err(error) => {
                tracing::warn!(
                    from_conversation_id = %from_conversation_id,
                    to_conversation_id = %to_conversation_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "Conversation switch failed, no agent is active"
                );
                Err(error)
            }
        }
    }

    /// Applies provider/credential settings changes.
    ///
    /// Valid with zero active agents. Re-reads the credential store so a
    /// broken backing store surfaces here rather than at the next creation.
    pub async fn update_settings(&self, settings: AgentSettings) -> Result<()> {
        // Validate the credential store first; a failed refresh must not
        // leave a half-applied settings change behind.
        self.credentials
            .get_all_api_keys()
            .await
            .map_err(|e| ConfabError::unauthorized(format!("credential refresh failed: {e}")))?;

        let changed = {
            let mut current = self.settings.write().await;
            let changed = current.diff(&settings);
            *current = settings;
            changed
        };

        tracing::info!(
            changed_settings = ?changed,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "Updating agent settings"
        );
        self.webview.post_message(json!({
            "type": "settingsUpdated",
            "changedSettings": changed,
        }));
        Ok(())
    }

    /// Returns a copy of the current settings.
    pub async fn settings(&self) -> AgentSettings {
        self.settings.read().await.clone()
    }

    /// Process-wide teardown: disposes all agents and marks the manager
    /// unusable for further creations.
    pub async fn dispose(&self) {
        self.dispose_all_agents().await;
        self.disposed.store(true, Ordering::Release);
        tracing::info!("Agent manager disposed");
    }
}
