//! Infrastructure implementations for the confab engine.
//!
//! Concrete conversation stores, credential services, configuration loading
//! and path management. Everything here implements a trait seam defined in
//! `confab-core`.

mod config_service;
mod credential_service;
mod json_dir_conversation_store;
mod memory_conversation_store;
pub mod paths;

pub use config_service::{ConfabConfig, ConfigService, RetryConfig, StorageConfig};
pub use credential_service::{EnvCredentialService, FileCredentialService};
pub use json_dir_conversation_store::JsonDirConversationStore;
pub use memory_conversation_store::MemoryConversationStore;
pub use paths::{ConfabPaths, PathError};
