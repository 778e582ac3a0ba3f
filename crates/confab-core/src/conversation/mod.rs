//! Conversation domain module.
//!
//! Contains the conversation/message domain models, the storage trait,
//! the retry policy, and the persistence manager.
//!
//! # Module Structure
//!
//! - `model`: Core conversation record (`Conversation`)
//! - `message`: Message types (`Message`, `MessageRole`, `MessageMetadata`)
//! - `store`: Opaque key/value persistence surface (`ConversationStore`)
//! - `retry`: Injectable retry policy with exponential backoff
//! - `manager`: Conversation persistence management (`ConversationManager`)

mod manager;
mod message;
mod model;
mod retry;
mod store;

pub use manager::{ConversationManager, LoadFailure, LoadReport};
pub use message::{Message, MessageMetadata, MessageRole, SenderType};
pub use model::Conversation;
pub use retry::{RetryError, RetryPolicy};
pub use store::{CONVERSATION_KEY_PREFIX, ConversationStore, conversation_id_from_key, conversation_key};
