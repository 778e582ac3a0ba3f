//! Configuration service.
//!
//! Loads the application configuration from `config.toml` and caches it.
//! A missing file yields defaults; a corrupt file is an error so silent
//! misconfiguration cannot slip through.

use anyhow::{Context, Result};
use confab_core::conversation::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::fs;

/// Persistence-related settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the conversation store directory.
    #[serde(default)]
    pub conversations_dir: Option<PathBuf>,
}

/// Retry settings for conversation saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_attempts() -> u32 {
    confab_core::conversation::RetryPolicy::default().max_attempts
}

fn default_base_delay_ms() -> u64 {
    RetryPolicy::default().base_delay.as_millis() as u64
}

fn default_multiplier() -> f64 {
    RetryPolicy::default().multiplier
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl RetryConfig {
    /// Converts into the policy injected into the conversation manager.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.multiplier,
        }
    }
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfabConfig {
    /// Default AI provider for new agents.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Loads and caches the application configuration.
#[derive(Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration; RwLock for thread-safe lazy loading.
    config: Arc<RwLock<Option<ConfabConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from the given config file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub async fn get_config(&self) -> Result<ConfabConfig> {
        {
            let cached = self.config.read().unwrap();
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = match fs::read_to_string(&self.path).await {
            Ok(raw) => toml::from_str(&raw).context("Failed to parse config.toml")?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfabConfig::default(),
            Err(e) => return Err(e).context("Failed to read config.toml"),
        };

        {
            let mut cached = self.config.write().unwrap();
            *cached = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap();
        *cached = None;
    }

    /// Saves the configuration back to disk and refreshes the cache.
    pub async fn save_config(&self, config: &ConfabConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }
        let encoded = toml::to_string_pretty(config).context("Failed to encode config")?;
        fs::write(&self.path, encoded)
            .await
            .context("Failed to write config.toml")?;

        let mut cached = self.config.write().unwrap();
        *cached = Some(config.clone());
        Ok(())
    }
}
