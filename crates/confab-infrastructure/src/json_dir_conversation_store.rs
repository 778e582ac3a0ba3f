//! Directory-backed conversation store.
//!
//! Stores one JSON file per key under a base directory:
//!
//! ```text
//! base_dir/
//! ├── conversation.c1.json
//! └── conversation.c2.json
//! ```
//!
//! Writes go through a temp file followed by an atomic rename, so a failed
//! `update` never corrupts the previous value.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use confab_core::conversation::ConversationStore;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A [`ConversationStore`] persisting each key as a JSON file.
pub struct JsonDirConversationStore {
    base_dir: PathBuf,
}

impl JsonDirConversationStore {
    /// Creates a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)
            .await
            .context("Failed to create store directory")?;
        Ok(Self { base_dir })
    }

    /// The directory files are stored in.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, key: &str) -> Result<PathBuf> {
        // Keys are dotted identifiers; anything resembling a path is refused
        // rather than escaped.
        if key.is_empty() || key.contains(['/', '\\', '\0']) || key.starts_with('.') {
            bail!("invalid store key: {key:?}");
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl ConversationStore for JsonDirConversationStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let path = self.file_path(key).ok()?;
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read store file");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Store file is not valid JSON");
                None
            }
        }
    }

    async fn update(&self, key: &str, value: Value) -> Result<()> {
        let path = self.file_path(key)?;
        let tmp_path = path.with_extension("json.tmp");
        let encoded = serde_json::to_vec_pretty(&value).context("Failed to encode value")?;

        fs::write(&tmp_path, &encoded)
            .await
            .with_context(|| format!("Failed to write temp file for key {key:?}"))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to commit file for key {key:?}"))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.file_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove key {key:?}")),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_dir)
            .await
            .context("Failed to list store directory")?;
        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(key) = name.strip_suffix(".json") {
                keys.push(key.to_string());
            }
        }
        Ok(keys)
    }
}
