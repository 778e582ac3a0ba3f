//! Unified path management for confab data files.
//!
//! All configuration, secrets and conversation data live under a single
//! per-user directory so every storage mechanism resolves paths the same
//! way on every platform.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find user config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for confab.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/confab/            # Config directory (XDG on Linux/macOS)
/// ├── config.toml              # Application configuration
/// ├── secret.json              # API keys
/// └── conversations/           # Conversation store (one JSON file per record)
/// ```
pub struct ConfabPaths;

impl ConfabPaths {
    /// Returns the confab configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("confab"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path of the application configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path of the secret file holding API keys.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("secret.json"))
    }

    /// Returns the directory the conversation store writes to.
    pub fn conversations_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("conversations"))
    }
}
