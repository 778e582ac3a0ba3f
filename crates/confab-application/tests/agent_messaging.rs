//! End-to-end tests of agent-to-agent messaging across the engine.

use confab_application::ChatService;
use confab_core::agent::{AgentManager, AgentManagerConfig};
use confab_core::conversation::{
    ConversationManager, ConversationStore, Message, MessageRole, SenderType,
};
use confab_core::credential::{ApiKeys, CredentialService};
use confab_core::error::Result;
use confab_core::webview::NullWebviewChannel;
use confab_infrastructure::MemoryConversationStore;
use std::sync::Arc;

struct TestCredentials;

#[async_trait::async_trait]
impl CredentialService for TestCredentials {
    async fn get_all_api_keys(&self) -> Result<ApiKeys> {
        Ok(ApiKeys::default())
    }
}

fn engine() -> (ChatService, Arc<ConversationManager>) {
    let conversations = Arc::new(ConversationManager::new(Arc::new(
        MemoryConversationStore::new(),
    )));
    let agents = Arc::new(AgentManager::new(AgentManagerConfig {
        webview: Arc::new(NullWebviewChannel),
        credentials: Arc::new(TestCredentials),
        conversations: conversations.clone(),
    }));
    (ChatService::new(agents, conversations.clone()), conversations)
}

#[tokio::test]
async fn isolation_only_the_target_conversation_changes() {
    let (chat, conversations) = engine();
    for id in ["a", "b", "c"] {
        conversations.save_conversation(id, Vec::new()).await.unwrap();
    }

    chat.send_agent_message("a", "b", "from a to b").await.unwrap();

    let a = conversations.get_conversation("a").await.unwrap();
    let b = conversations.get_conversation("b").await.unwrap();
    let c = conversations.get_conversation("c").await.unwrap();

    assert_eq!(a.messages.len(), 0);
    assert_eq!(b.messages.len(), 1);
    assert_eq!(c.messages.len(), 0);

    let delivered = &b.messages[0];
    assert_eq!(delivered.role, MessageRole::User);
    assert!(!delivered.text.is_empty());
    let metadata = delivered.metadata.as_ref().unwrap();
    assert_eq!(metadata.sender_id, "a");
    assert_eq!(metadata.sender_type, SenderType::Agent);
}

#[tokio::test]
async fn fifo_sequential_sends_keep_their_order() {
    let (chat, conversations) = engine();
    conversations.save_conversation("a", Vec::new()).await.unwrap();
    conversations.save_conversation("b", Vec::new()).await.unwrap();

    let inputs: Vec<String> = (1..=10).map(|n| format!("message {n}")).collect();
    for input in &inputs {
        chat.send_agent_message("a", "b", input).await.unwrap();
    }

    let target = conversations.get_conversation("b").await.unwrap();
    assert_eq!(target.messages.len(), inputs.len());
    let tail: Vec<&str> = target
        .messages
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(tail, inputs.iter().map(String::as_str).collect::<Vec<_>>());
}

#[tokio::test]
async fn example_scenario_from_the_contract() {
    let (chat, conversations) = engine();

    conversations.save_conversation("c1", Vec::new()).await.unwrap();
    let c1 = conversations.get_conversation("c1").await.unwrap();
    assert_eq!(c1.id, "c1");
    assert!(c1.messages.is_empty());

    conversations.save_conversation("c2", Vec::new()).await.unwrap();
    chat.send_agent_message("c1", "c2", "hello").await.unwrap();

    assert_eq!(
        conversations.get_conversation("c2").await.unwrap().messages.len(),
        1
    );
    assert_eq!(
        conversations.get_conversation("c1").await.unwrap().messages.len(),
        0
    );
}

#[tokio::test]
async fn delivery_into_unhydrated_target_preserves_stored_history() {
    let store = Arc::new(MemoryConversationStore::new());

    // One engine persists history for "b", then goes away.
    let seed = ConversationManager::new(store.clone() as Arc<dyn ConversationStore>);
    seed.save_conversation("b", vec![Message::user("earlier"), Message::model("reply")])
        .await
        .unwrap();

    // A fresh engine over the same store has hydrated nothing yet.
    let conversations = Arc::new(ConversationManager::new(
        store as Arc<dyn ConversationStore>,
    ));
    let agents = Arc::new(AgentManager::new(AgentManagerConfig {
        webview: Arc::new(NullWebviewChannel),
        credentials: Arc::new(TestCredentials),
        conversations: conversations.clone(),
    }));
    let chat = ChatService::new(agents, conversations.clone());

    chat.send_agent_message("a", "b", "latest").await.unwrap();

    let target = conversations.get_conversation("b").await.unwrap();
    let texts: Vec<&str> = target.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["earlier", "reply", "latest"]);
}

#[tokio::test]
async fn delivery_appends_after_existing_history() {
    let (chat, conversations) = engine();
    conversations
        .save_conversation(
            "b",
            vec![Message::user("earlier"), Message::model("reply")],
        )
        .await
        .unwrap();

    chat.send_agent_message("a", "b", "latest").await.unwrap();

    let target = conversations.get_conversation("b").await.unwrap();
    assert_eq!(target.messages.len(), 3);
    assert_eq!(target.messages[0].text, "earlier");
    assert_eq!(target.messages[1].text, "reply");
    assert_eq!(target.messages[2].text, "latest");
}
