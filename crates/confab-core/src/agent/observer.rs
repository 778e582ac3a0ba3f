//! Message-update observer trait.

use crate::conversation::Message;
use crate::error::Result;
use async_trait::async_trait;

/// Observer notified whenever an agent's local message buffer changes.
///
/// `AgentManager` registers one observer per handle at creation time and
/// deregisters it on disposal, so no closure can outlive its agent.
#[async_trait]
pub trait MessageUpdateObserver: Send + Sync {
    /// Called with the agent's conversation id and the full buffer contents
    /// after every change.
    async fn messages_updated(&self, conversation_id: &str, messages: &[Message]) -> Result<()>;
}
