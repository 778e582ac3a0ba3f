//! Application services for the confab engine.
//!
//! Coordination logic on top of `confab-core`: conversation hydration and
//! agent-to-agent message delivery.

mod chat_service;
pub mod sanitize;

pub use chat_service::ChatService;
