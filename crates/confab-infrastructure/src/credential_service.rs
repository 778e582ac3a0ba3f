//! Credential service implementations.
//!
//! Provides API keys from the secret file (`secret.json`) or from the
//! process environment. Key material is cached after the first read and is
//! never logged.

use async_trait::async_trait;
use confab_core::credential::{ApiKeys, CredentialService};
use confab_core::error::{ConfabError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::fs;

/// Credential service reading `secret.json` with a lazy in-memory cache.
#[derive(Clone)]
pub struct FileCredentialService {
    path: PathBuf,
    /// Cached keys; RwLock for thread-safe lazy loading.
    cache: Arc<RwLock<Option<ApiKeys>>>,
}

impl FileCredentialService {
    /// Creates a service reading from the given secret file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cache = self.cache.write().unwrap();
        *cache = None;
    }

    async fn load(&self) -> Result<ApiKeys> {
        {
            let cache = self.cache.read().unwrap();
            if let Some(ref keys) = *cache {
                return Ok(keys.clone());
            }
        }

        let keys = match fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                // Error text carries the parse failure, never file contents.
                ConfabError::unauthorized(format!("secret file is not valid JSON: {e}"))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ApiKeys::default(),
            Err(e) => {
                return Err(ConfabError::unauthorized(format!(
                    "secret file could not be read: {e}"
                )));
            }
        };

        {
            let mut cache = self.cache.write().unwrap();
            *cache = Some(keys.clone());
        }
        Ok(keys)
    }
}

#[async_trait]
impl CredentialService for FileCredentialService {
    async fn get_all_api_keys(&self) -> Result<ApiKeys> {
        self.load().await
    }
}

/// Credential service reading provider keys from environment variables.
///
/// Recognized variables: `GEMINI_API_KEY`, `AWS_ACCESS_KEY_ID`,
/// `AWS_SECRET_ACCESS_KEY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialService;

#[async_trait]
impl CredentialService for EnvCredentialService {
    async fn get_all_api_keys(&self) -> Result<ApiKeys> {
        Ok(ApiKeys {
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            bedrock_access_key: std::env::var("AWS_ACCESS_KEY_ID").ok(),
            bedrock_secret_key: std::env::var("AWS_SECRET_ACCESS_KEY").ok(),
        })
    }
}
