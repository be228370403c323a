// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MemoryAgent behaviour over a temp SQLite store and mock model services.

use recall_agent::ForgetOutcome;
use recall_config::model::MemoryConfig;
use recall_memory::NoProgress;
use recall_core::StorageAdapter;
use recall_test_utils::TestHarness;

const PLAN_NAME: &str = r#"["What is the user's name?"]"#;

#[tokio::test]
async fn starts_stale_and_rebuilds_on_first_recall() {
    let mut harness = TestHarness::builder().build().await.unwrap();
    harness.seed(&[("My name is Austin", "Nice to meet you, Austin")]).await.unwrap();
    assert!(harness.agent.is_index_stale());

    harness.mock_provider.add_response(PLAN_NAME.into()).await;
    harness.mock_provider.add_response("yes".into()).await;
    let outcome = harness.agent.recall("What's my name?", &NoProgress).await.unwrap();

    assert!(!harness.agent.is_index_stale());
    assert_eq!(outcome.memories.len(), 1);
    assert_eq!(harness.agent.index().len().await.unwrap(), 1);
}

#[tokio::test]
async fn recall_turn_injects_memories_and_persists() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec![
            PLAN_NAME.into(),
            "yes".into(),
            "Your name is Austin.".into(),
        ])
        .build()
        .await
        .unwrap();
    harness.seed(&[("My name is Austin", "Nice to meet you, Austin")]).await.unwrap();

    let reply = harness
        .agent
        .respond("What's my name?", true, &NoProgress, |_| {})
        .await
        .unwrap();
    assert_eq!(reply.text, "Your name is Austin.");
    let recall = reply.recall.unwrap();
    assert_eq!(recall.queries, vec!["What is the user's name?"]);
    assert_eq!(recall.memories.len(), 1);

    let history = harness.agent.history();
    assert_eq!(history.len(), 3);
    assert!(history[1].content.starts_with("MEMORIES:\n- "));
    assert!(history[1].content.ends_with("USER INPUT: What's my name?"));

    assert!(harness.agent.is_index_stale());
    let rows = harness.storage.fetch_interactions().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].user_input, "What's my name?");
}

#[tokio::test]
async fn plain_message_skips_recall_by_default() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["hi".into()])
        .build()
        .await
        .unwrap();
    let reply = harness
        .agent
        .message("hello", &NoProgress, |_| {})
        .await
        .unwrap();
    assert!(reply.recall.is_none());
    assert_eq!(harness.mock_provider.requests().await.len(), 1);
}

#[tokio::test]
async fn auto_recall_routes_plain_messages() {
    let mut harness = TestHarness::builder()
        .with_memory_config(MemoryConfig {
            auto_recall: true,
            ..MemoryConfig::default()
        })
        .with_mock_responses(vec![r#"["greeting"]"#.into(), "hi".into()])
        .build()
        .await
        .unwrap();
    let reply = harness
        .agent
        .message("hello", &NoProgress, |_| {})
        .await
        .unwrap();
    let recall = reply.recall.unwrap();
    assert_eq!(recall.queries, vec!["greeting"]);
    assert!(recall.memories.is_empty());
    assert_eq!(reply.text, "hi");
}

#[tokio::test]
async fn memorize_then_recall_finds_it() {
    let mut harness = TestHarness::builder().build().await.unwrap();
    harness.agent.rebuild_index().await.unwrap();
    harness.agent.memorize("My favourite colour is green").await.unwrap();
    assert!(harness.agent.is_index_stale());

    harness
        .mock_provider
        .add_response(r#"["favourite colour"]"#.into())
        .await;
    harness.mock_provider.add_response("yes".into()).await;
    let outcome = harness
        .agent
        .recall("what colour do I like?", &NoProgress)
        .await
        .unwrap();
    let texts: Vec<&str> = outcome.memories.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["user_input: My favourite colour is green ai_response: Memory saved."]
    );
}

#[tokio::test]
async fn forget_marks_index_stale_only_when_something_was_forgotten() {
    let mut harness = TestHarness::builder()
        .with_mock_responses(vec!["reply".into()])
        .build()
        .await
        .unwrap();
    harness.agent.rebuild_index().await.unwrap();

    assert_eq!(
        harness.agent.forget_last().await.unwrap(),
        ForgetOutcome::NothingToForget
    );
    assert!(!harness.agent.is_index_stale());

    harness
        .agent
        .respond("hi", false, &NoProgress, |_| {})
        .await
        .unwrap();
    harness.agent.rebuild_index().await.unwrap();
    assert!(matches!(
        harness.agent.forget_last().await.unwrap(),
        ForgetOutcome::Forgotten { .. }
    ));
    assert!(harness.agent.is_index_stale());
    assert_eq!(harness.agent.history().len(), 1);
}

#[tokio::test]
async fn rebuild_on_change_off_keeps_index() {
    let mut harness = TestHarness::builder()
        .with_memory_config(MemoryConfig {
            rebuild_on_change: false,
            ..MemoryConfig::default()
        })
        .build()
        .await
        .unwrap();
    harness.agent.rebuild_index().await.unwrap();
    harness.agent.memorize("something").await.unwrap();
    assert!(!harness.agent.is_index_stale());
    assert_eq!(harness.agent.index().len().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_recall_leaves_session_usable() {
    let mut harness = TestHarness::builder().build().await.unwrap();
    harness.seed(&[("My name is Austin", "Hi")]).await.unwrap();
    harness.mock_embedder.set_failing(true);

    let err = harness
        .agent
        .respond("What's my name?", true, &NoProgress, |_| {})
        .await
        .unwrap_err();
    assert!(err.is_service_unavailable());
    assert_eq!(harness.agent.history().len(), 1);
    assert!(harness.agent.is_index_stale());

    harness.mock_embedder.set_failing(false);
    harness.mock_provider.add_response("fine".into()).await;
    let reply = harness
        .agent
        .respond("hello", false, &NoProgress, |_| {})
        .await
        .unwrap();
    assert_eq!(reply.text, "fine");
}
