//! Enforces the lifecycle logging contract.
//!
//! Creating, updating and disposing an agent must produce, in order,
//! structured records for "Creating new agent", "Saving conversation" (with
//! a message count) and "Disposing agent" (with a success marker), each
//! carrying the conversation id.

use confab_core::agent::{AgentManager, AgentManagerConfig, AgentMode};
use confab_core::conversation::{ConversationManager, Message};
use confab_core::credential::{ApiKeys, CredentialService};
use confab_core::error::Result;
use confab_core::webview::NullWebviewChannel;
use confab_execution::{LifecycleEvent, LifecycleEventLayer};
use confab_infrastructure::MemoryConversationStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;

struct TestCredentials;

#[async_trait::async_trait]
impl CredentialService for TestCredentials {
    async fn get_all_api_keys(&self) -> Result<ApiKeys> {
        Ok(ApiKeys::default())
    }
}

fn manager() -> AgentManager {
    let conversations = Arc::new(ConversationManager::new(Arc::new(
        MemoryConversationStore::new(),
    )));
    AgentManager::new(AgentManagerConfig {
        webview: Arc::new(NullWebviewChannel),
        credentials: Arc::new(TestCredentials),
        conversations,
    })
}

fn drain(receiver: &mut mpsc::UnboundedReceiver<LifecycleEvent>) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn position_of(events: &[LifecycleEvent], marker: &str, conversation_id: &str) -> usize {
    events
        .iter()
        .position(|e| {
            e.message.contains(marker) && e.field_str("conversation_id") == Some(conversation_id)
        })
        .unwrap_or_else(|| panic!("no event matching {marker:?} for {conversation_id:?}"))
}

#[tokio::test]
async fn create_save_dispose_log_in_order_with_context() {
    let (layer, mut receiver) = LifecycleEventLayer::channel();
    let subscriber = tracing_subscriber::registry().with(layer);
    let _guard = tracing::subscriber::set_default(subscriber);

    let manager = manager();
    let agent = manager
        .get_or_create_agent("conv-x", AgentMode::Chat)
        .await
        .unwrap();
    agent.append_message(Message::user("hello")).await.unwrap();
    agent.append_message(Message::model("world")).await.unwrap();
    manager.dispose_agent("conv-x").await;

    let events = drain(&mut receiver);

    let created = position_of(&events, "Creating new agent", "conv-x");
    let saved = position_of(&events, "Saving conversation", "conv-x");
    let disposing = position_of(&events, "Disposing agent", "conv-x");
    let disposed = position_of(&events, "disposed successfully", "conv-x");

    assert!(created < saved, "creation must precede the save trigger");
    assert!(saved < disposing, "save trigger must precede disposal");
    assert!(disposing <= disposed);

    // The save record carries a message count; the last save saw 2 messages.
    let save_counts: Vec<u64> = events
        .iter()
        .filter(|e| e.message.contains("Saving conversation"))
        .filter_map(|e| e.field_u64("message_count"))
        .collect();
    assert_eq!(save_counts, vec![1, 2]);

    // The creation record carries a timestamp.
    assert!(events[created].field_str("timestamp").is_some());
    // The disposal outcome carries the success marker as a field too.
    assert_eq!(
        events[disposed].field_str("status"),
        Some("disposed successfully")
    );
}

#[tokio::test]
async fn switch_logs_both_ids_and_duration() {
    let (layer, mut receiver) = LifecycleEventLayer::channel();
    let subscriber = tracing_subscriber::registry().with(layer);
    let _guard = tracing::subscriber::set_default(subscriber);

    let manager = manager();
    manager
        .get_or_create_agent("conv-a", AgentMode::Chat)
        .await
        .unwrap();
    manager
        .switch_conversation("conv-a", "conv-b", AgentMode::Chat)
        .await
        .unwrap();

    let events = drain(&mut receiver);
    let switch = events
        .iter()
        .find(|e| e.message.contains("Switched conversation"))
        .expect("switch event missing");

    assert_eq!(switch.field_str("from_conversation_id"), Some("conv-a"));
    assert_eq!(switch.field_str("to_conversation_id"), Some("conv-b"));
    assert!(switch.field_u64("duration_ms").is_some());
}

#[tokio::test]
async fn settings_update_logs_changes_and_timestamp() {
    let (layer, mut receiver) = LifecycleEventLayer::channel();
    let subscriber = tracing_subscriber::registry().with(layer);
    let _guard = tracing::subscriber::set_default(subscriber);

    let manager = manager();
    manager
        .update_settings(confab_core::agent::AgentSettings {
            provider: Some("gemini".to_string()),
            model: Some("flash".to_string()),
        })
        .await
        .unwrap();

    let events = drain(&mut receiver);
    let update = events
        .iter()
        .find(|e| e.message.contains("Updating agent settings"))
        .expect("settings event missing");

    let changed = update
        .field_str("changed_settings")
        .expect("changed_settings field missing");
    assert!(changed.contains("provider"));
    assert!(changed.contains("gemini"));
    assert!(update.field_str("timestamp").is_some());
}
