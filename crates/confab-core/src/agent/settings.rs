//! Agent provider settings.

use serde::{Deserialize, Serialize};

/// Provider-level settings applied across all agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Selected AI provider (e.g. "gemini", "bedrock").
    #[serde(default)]
    pub provider: Option<String>,
    /// Model identifier within the provider.
    #[serde(default)]
    pub model: Option<String>,
}

impl AgentSettings {
    /// Returns a human-readable list of fields that differ from `other`.
    ///
    /// Used for the `changed_settings` field of the settings-update log.
    /// Values are included verbatim; settings never contain credentials.
    pub fn diff(&self, other: &AgentSettings) -> Vec<String> {
        let mut changed = Vec::new();
        if self.provider != other.provider {
            changed.push(format!(
                "provider: {} -> {}",
                display(&self.provider),
                display(&other.provider)
            ));
        }
        if self.model != other.model {
            changed.push(format!(
                "model: {} -> {}",
                display(&self.model),
                display(&other.model)
            ));
        }
        changed
    }
}

fn display(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("<unset>")
}
