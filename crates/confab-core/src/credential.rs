//! Credential lookup service trait.
//!
//! Defines the interface for retrieving provider API keys. Consumed at
//! agent-creation and settings-update time; not part of the persistence or
//! messaging contracts.
//!
//! # Security Note
//!
//! Implementations must never log key material or include it in error
//! messages.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// API keys for the supported providers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub bedrock_access_key: Option<String>,
    #[serde(default)]
    pub bedrock_secret_key: Option<String>,
}

impl ApiKeys {
    /// Whether at least one provider is usable.
    pub fn has_any(&self) -> bool {
        self.gemini_api_key.is_some()
            || (self.bedrock_access_key.is_some() && self.bedrock_secret_key.is_some())
    }
}

/// Service for retrieving provider credentials.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Loads all configured API keys.
    ///
    /// # Returns
    ///
    /// - `Ok(ApiKeys)`: Keys loaded (possibly all unset)
    /// - `Err(_)`: The credential backing store could not be read
    async fn get_all_api_keys(&self) -> Result<ApiKeys>;
}
