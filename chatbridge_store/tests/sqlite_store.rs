//! Conversation store against in-memory SQLite.

use chatbridge_core::{ContextVariables, Speaker, Turn, TurnContent, TurnRecorder};
use chatbridge_store::ConversationStore;
use sea_orm::Database;
use serde_json::json;

async fn store() -> ConversationStore {
    ConversationStore::connect("sqlite::memory:").await.unwrap()
}

fn variables(value: serde_json::Value) -> ContextVariables {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn records_turns_in_order_with_their_shape() {
    let store = store().await;

    store
        .record_turn(&Turn::new(
            "u1",
            "s1",
            Speaker::User,
            "hello".to_string(),
            "01-01-2024_10:00:00:000001",
        ))
        .await
        .unwrap();
    store
        .record_turn(&Turn::new(
            "u1",
            "s1",
            Speaker::Chatbot,
            vec!["Hi!".to_string(), "https://img.test/1.png".to_string()],
            "01-01-2024_10:00:01:000002",
        ))
        .await
        .unwrap();
    store
        .record_turn(&Turn::new(
            "u2",
            "s1",
            Speaker::User,
            "other user".to_string(),
            "01-01-2024_10:00:02:000003",
        ))
        .await
        .unwrap();

    let turns = store.turns_for_session("u1", "s1").await.unwrap();

    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].speaker, Speaker::User);
    assert_eq!(turns[0].content, TurnContent::Single("hello".to_string()));
    assert_eq!(turns[1].speaker, Speaker::Chatbot);
    assert_eq!(
        turns[1].content,
        TurnContent::Many(vec![
            "Hi!".to_string(),
            "https://img.test/1.png".to_string()
        ])
    );
    assert_eq!(turns[1].timestamp, "01-01-2024_10:00:01:000002");
}

#[tokio::test]
async fn context_variables_are_upserted() {
    let store = store().await;

    assert!(store.context_variables("u1", "s1").await.unwrap().is_none());

    store
        .record_context_variables("u1", "s1", &variables(json!({ "step": 1 })))
        .await
        .unwrap();
    store
        .record_context_variables("u1", "s1", &variables(json!({ "step": 2, "name": "Ana" })))
        .await
        .unwrap();

    let stored = store.context_variables("u1", "s1").await.unwrap().unwrap();
    assert_eq!(stored.get("step"), Some(&json!(2)));
    assert_eq!(stored.get("name"), Some(&json!("Ana")));
    assert!(store.context_variables("u1", "s2").await.unwrap().is_none());
}

#[tokio::test]
async fn schema_setup_is_idempotent() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let first = ConversationStore::from_connection(db.clone()).await.unwrap();
    first
        .record_turn(&Turn::new(
            "u1",
            "s1",
            Speaker::User,
            "kept".to_string(),
            "01-01-2024_10:00:00:000001",
        ))
        .await
        .unwrap();

    let second = ConversationStore::from_connection(db).await.unwrap();
    let turns = second.turns_for_session("u1", "s1").await.unwrap();
    assert_eq!(turns.len(), 1);
}

#[tokio::test]
async fn concurrent_context_writes_for_one_session_both_succeed() {
    let store = store().await;
    let first = variables(json!({ "step": 1 }));
    let second = variables(json!({ "step": 2 }));

    let (a, b) = tokio::join!(
        store.record_context_variables("u1", "s1", &first),
        store.record_context_variables("u1", "s1", &second),
    );
    a.unwrap();
    b.unwrap();

    let stored = store.context_variables("u1", "s1").await.unwrap().unwrap();
    assert!(stored == first || stored == second);
}
