//! Webview channel trait.

use serde_json::Value;

/// Opaque sink used to push UI-facing events to the webview.
///
/// Not required for the engine's correctness, only for its observability
/// surface; implementations must not block.
pub trait WebviewChannel: Send + Sync {
    /// Pushes one payload to the UI. Delivery is best-effort.
    fn post_message(&self, payload: Value);
}

/// A webview channel that drops every payload. Used headless and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWebviewChannel;

impl WebviewChannel for NullWebviewChannel {
    fn post_message(&self, _payload: Value) {}
}
