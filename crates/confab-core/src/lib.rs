//! Confab core: agent lifecycle and conversation persistence engine.
//!
//! This crate contains the domain models, the two stateful managers
//! ([`conversation::ConversationManager`] and [`agent::AgentManager`]),
//! and the trait seams for storage, credentials and the webview
//! channel. Concrete implementations live in `confab-infrastructure`;
//! agent-to-agent messaging lives in `confab-application`.

pub mod agent;
pub mod conversation;
pub mod credential;
pub mod error;
pub mod webview;

// Re-export common error type
pub use error::{ConfabError, ErrorGuidance, Result};
