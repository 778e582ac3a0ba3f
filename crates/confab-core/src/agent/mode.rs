//! Agent operating modes.

use serde::{Deserialize, Serialize};

/// The mode an agent session operates in.
///
/// A handle keeps the mode it was created with; `get_or_create_agent` never
/// silently switches the mode of an existing handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Free-form conversation.
    #[default]
    Chat,
    /// Code-generation workflow.
    Build,
    /// Feedback collection.
    Feedback,
}

impl std::fmt::Display for AgentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentMode::Chat => write!(f, "chat"),
            AgentMode::Build => write!(f, "build"),
            AgentMode::Feedback => write!(f, "feedback"),
        }
    }
}
