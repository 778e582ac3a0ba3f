//! Custom tracing layer for streaming lifecycle events.
//!
//! Captures the structured lifecycle events emitted by the managers and
//! forwards them over a tokio channel, from where they can be pushed to the
//! webview or inspected by tests. The logging contract (what happened, to
//! which conversation, when, with what outcome) is asserted against these
//! captured events.

use confab_core::webview::WebviewChannel;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One captured lifecycle event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LifecycleEvent {
    /// Event target (e.g. "confab_core::agent::manager").
    pub target: String,
    /// Log level (INFO, DEBUG, WARN, ERROR).
    pub level: String,
    /// Human-readable message.
    pub message: String,
    /// Structured fields from the event.
    pub fields: HashMap<String, Value>,
    /// Timestamp the event was captured.
    pub timestamp: String,
}

impl LifecycleEvent {
    /// Returns the string value of a field, if present.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// Returns the numeric value of a field, if present.
    pub fn field_u64(&self, name: &str) -> Option<u64> {
        self.fields.get(name).and_then(|v| v.as_u64())
    }
}

/// A tracing layer that sends every event to a channel.
pub struct LifecycleEventLayer {
    sender: mpsc::UnboundedSender<LifecycleEvent>,
}

impl LifecycleEventLayer {
    /// Creates a layer with the given channel sender.
    pub fn new(sender: mpsc::UnboundedSender<LifecycleEvent>) -> Self {
        Self { sender }
    }

    /// Creates a layer together with the receiving half of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl<S> Layer<S> for LifecycleEventLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        let mut visitor = FieldVisitor(&mut fields);
        event.record(&mut visitor);

        let lifecycle_event = LifecycleEvent {
            target: event.metadata().target().to_string(),
            level: event.metadata().level().to_string(),
            message: fields
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Non-blocking send; a dropped receiver just discards events.
        let _ = self.sender.send(lifecycle_event);
    }
}

/// Forwards captured events to the webview channel until the sender side
/// closes. Spawn with `tokio::spawn`.
pub async fn forward_to_webview(
    mut receiver: mpsc::UnboundedReceiver<LifecycleEvent>,
    webview: Arc<dyn WebviewChannel>,
) {
    while let Some(event) = receiver.recv().await {
        match serde_json::to_value(&event) {
            Ok(payload) => webview.post_message(payload),
            Err(error) => tracing::debug!(error = %error, "Dropping unencodable event"),
        }
    }
}

/// Field visitor that extracts tracing event fields into a HashMap.
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Default)]
    struct CollectingWebview {
        payloads: Mutex<Vec<Value>>,
    }

    impl WebviewChannel for CollectingWebview {
        fn post_message(&self, payload: Value) {
            self.payloads.lock().unwrap().push(payload);
        }
    }

    #[tokio::test]
    async fn test_layer_captures_structured_fields() {
        let (layer, mut receiver) = LifecycleEventLayer::channel();
        let subscriber = tracing_subscriber::registry().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        tracing::info!(conversation_id = "c1", message_count = 4u64, "Saving conversation");

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.message, "Saving conversation");
        assert_eq!(event.level, "INFO");
        assert_eq!(event.field_str("conversation_id"), Some("c1"));
        assert_eq!(event.field_u64("message_count"), Some(4));
        assert!(!event.timestamp.is_empty());
    }

    #[tokio::test]
    async fn test_forward_to_webview_pushes_every_event() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let webview = Arc::new(CollectingWebview::default());

        sender
            .send(LifecycleEvent {
                target: "confab_core::agent::manager".to_string(),
                level: "INFO".to_string(),
                message: "Creating new agent".to_string(),
                fields: HashMap::from([(
                    "conversation_id".to_string(),
                    serde_json::json!("c1"),
                )]),
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
            .unwrap();
        drop(sender);

        forward_to_webview(receiver, webview.clone()).await;

        let payloads = webview.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["message"], "Creating new agent");
        assert_eq!(payloads[0]["fields"]["conversation_id"], "c1");
    }
}
