//! Error types for the confab orchestrator.
//!
//! Every failure crossing a component boundary is expressed as a
//! [`ConfabError`] variant so the user-facing layer can render consistent
//! guidance. Underlying causes are carried as strings to keep the type
//! `Clone + Serialize` for the webview channel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the confab engine.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ConfabError {
    /// Agent handle creation failed (not retried automatically; the caller
    /// should offer the user an explicit retry).
    #[error("Agent creation failed for '{conversation_id}': {message}")]
    CreationFailed {
        conversation_id: String,
        message: String,
        #[serde(default)]
        cause: Option<String>,
    },

    /// Agent initialization failed after the handle was created.
    #[error("Agent initialization failed for '{conversation_id}': {message}")]
    InitializationFailed {
        conversation_id: String,
        message: String,
        #[serde(default)]
        cause: Option<String>,
    },

    /// A message could not be validated or routed.
    #[error("Message processing failed: {message}")]
    MessageProcessingFailed {
        conversation_id: Option<String>,
        message: String,
    },

    /// The conversation store rejected a write after all retry attempts.
    #[error("Persistence failed for '{conversation_id}' after {attempts} attempt(s): {message}")]
    PersistenceFailed {
        conversation_id: String,
        attempts: u32,
        message: String,
    },

    /// A conversation record could not be read back from the store.
    #[error("Load failed for '{conversation_id}': {message}")]
    LoadFailed {
        conversation_id: String,
        message: String,
    },

    /// Agent-to-agent delivery was rejected.
    #[error("Agent communication failed: {message}")]
    CommunicationFailed {
        from_conversation_id: Option<String>,
        to_conversation_id: Option<String>,
        message: String,
    },

    /// A requested provider capability is not available.
    #[error("Capability not found: {capability}")]
    CapabilityNotFound { capability: String },

    /// Credentials are missing or were rejected.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The storage backend reported an out-of-space condition.
    #[error("Storage quota exceeded: {message}")]
    StorageQuotaExceeded { message: String },

    /// A network-level failure outside the retry loop.
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// The webview channel is gone; observability events cannot be pushed.
    #[error("Webview disconnected: {message}")]
    WebviewDisconnected { message: String },

    /// The agent stopped responding to lifecycle requests.
    #[error("Agent unresponsive for '{conversation_id}': {message}")]
    AgentUnresponsive {
        conversation_id: String,
        message: String,
    },
}

/// Fixed user-facing explanation and troubleshooting steps for an error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorGuidance {
    /// One-sentence explanation shown to the user.
    pub explanation: &'static str,
    /// Ordered troubleshooting steps.
    pub troubleshooting: &'static [&'static str],
}

impl ConfabError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a CreationFailed error.
    pub fn creation_failed(
        conversation_id: impl Into<String>,
        message: impl Into<String>,
        cause: Option<String>,
    ) -> Self {
        Self::CreationFailed {
            conversation_id: conversation_id.into(),
            message: message.into(),
            cause,
        }
    }

    /// Creates a MessageProcessingFailed error.
    pub fn message_processing(
        conversation_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MessageProcessingFailed {
            conversation_id,
            message: message.into(),
        }
    }

    /// Creates a PersistenceFailed error.
    pub fn persistence_failed(
        conversation_id: impl Into<String>,
        attempts: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::PersistenceFailed {
            conversation_id: conversation_id.into(),
            attempts,
            message: message.into(),
        }
    }

    /// Creates a LoadFailed error.
    pub fn load_failed(conversation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LoadFailed {
            conversation_id: conversation_id.into(),
            message: message.into(),
        }
    }

    /// Creates a CommunicationFailed error.
    pub fn communication(
        from_conversation_id: Option<String>,
        to_conversation_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CommunicationFailed {
            from_conversation_id,
            to_conversation_id,
            message: message.into(),
        }
    }

    /// Creates an Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Wraps an unanticipated error crossing a component boundary.
    ///
    /// Unknown errors must never pass through raw; they are folded into the
    /// taxonomy so the user-facing layer can always render guidance.
    pub fn wrap_unknown(conversation_id: Option<String>, error: &anyhow::Error) -> Self {
        Self::MessageProcessingFailed {
            conversation_id,
            message: format!("unexpected error: {error:#}"),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a PersistenceFailed error.
    pub fn is_persistence_failed(&self) -> bool {
        matches!(self, Self::PersistenceFailed { .. })
    }

    /// Check if this is a LoadFailed error.
    pub fn is_load_failed(&self) -> bool {
        matches!(self, Self::LoadFailed { .. })
    }

    /// Check if this is a CommunicationFailed error.
    pub fn is_communication_failed(&self) -> bool {
        matches!(self, Self::CommunicationFailed { .. })
    }

    /// Returns the conversation id this error originated from, when known.
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Self::CreationFailed {
                conversation_id, ..
            }
            | Self::InitializationFailed {
                conversation_id, ..
            }
            | Self::PersistenceFailed {
                conversation_id, ..
            }
            | Self::LoadFailed {
                conversation_id, ..
            }
            | Self::AgentUnresponsive {
                conversation_id, ..
            } => Some(conversation_id),
            Self::MessageProcessingFailed {
                conversation_id, ..
            } => conversation_id.as_deref(),
            Self::CommunicationFailed {
                to_conversation_id, ..
            } => to_conversation_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the fixed user-facing guidance for this error kind.
    pub fn user_guidance(&self) -> ErrorGuidance {
        match self {
            Self::CreationFailed { .. } => ErrorGuidance {
                explanation: "The agent for this conversation could not be created.",
                troubleshooting: &[
                    "Check that your API keys are configured in settings.",
                    "Retry creating the conversation.",
                    "Restart the application if the problem persists.",
                ],
            },
            Self::InitializationFailed { .. } => ErrorGuidance {
                explanation: "The agent was created but failed to initialize.",
                troubleshooting: &[
                    "Verify the selected provider is reachable.",
                    "Switch to another conversation and back.",
                ],
            },
            Self::MessageProcessingFailed { .. } => ErrorGuidance {
                explanation: "A message could not be processed.",
                troubleshooting: &[
                    "Check the message content for unsupported characters.",
                    "Try sending the message again.",
                ],
            },
            Self::PersistenceFailed { .. } => ErrorGuidance {
                explanation: "The conversation could not be saved to storage.",
                troubleshooting: &[
                    "Check available disk space.",
                    "Retry the last action; saves are attempted three times.",
                    "Export the conversation if the problem persists.",
                ],
            },
            Self::LoadFailed { .. } => ErrorGuidance {
                explanation: "A stored conversation could not be loaded.",
                troubleshooting: &[
                    "Other conversations are unaffected and remain available.",
                    "Restore the conversation from a backup if one exists.",
                ],
            },
            Self::CommunicationFailed { .. } => ErrorGuidance {
                explanation: "The message could not be delivered to the target agent.",
                troubleshooting: &[
                    "Confirm the target conversation still exists.",
                    "Agents cannot send messages to their own conversation.",
                ],
            },
            Self::CapabilityNotFound { .. } => ErrorGuidance {
                explanation: "The selected provider does not support this capability.",
                troubleshooting: &["Select a different provider in settings."],
            },
            Self::Unauthorized { .. } => ErrorGuidance {
                explanation: "The configured credentials were rejected.",
                troubleshooting: &[
                    "Re-enter your API keys in settings.",
                    "Check that the keys have not expired.",
                ],
            },
            Self::StorageQuotaExceeded { .. } => ErrorGuidance {
                explanation: "Storage is full; the conversation was not saved.",
                troubleshooting: &[
                    "Delete old conversations to free space.",
                    "Retry the save afterwards.",
                ],
            },
            Self::NetworkError { .. } => ErrorGuidance {
                explanation: "A network failure interrupted the operation.",
                troubleshooting: &[
                    "Check your network connection.",
                    "Retry the operation.",
                ],
            },
            Self::WebviewDisconnected { .. } => ErrorGuidance {
                explanation: "The UI channel disconnected; state is preserved.",
                troubleshooting: &["Reload the window to reconnect."],
            },
            Self::AgentUnresponsive { .. } => ErrorGuidance {
                explanation: "The agent stopped responding.",
                troubleshooting: &[
                    "Dispose the conversation's agent and reopen it.",
                    "Restart the application if the problem persists.",
                ],
            },
        }
    }
}

/// A type alias for `Result<T, ConfabError>`.
pub type Result<T> = std::result::Result<T, ConfabError>;
