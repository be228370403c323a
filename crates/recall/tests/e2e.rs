// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the production adapters: SQLite interaction and
//! vector storage, and the Ollama client against a mock HTTP server.

use std::sync::Arc;

use recall_agent::{ForgetOutcome, MemoryAgent};
use recall_config::model::{StorageConfig, VectorBackend};
use recall_config::RecallConfig;
use recall_core::{StorageAdapter, VectorStoreAdapter};
use recall_memory::NoProgress;
use recall_ollama::{OllamaClient, OllamaEmbedder, OllamaProvider};
use recall_storage::{SqliteStorage, SqliteVectorStore};
use recall_test_utils::MockEmbedder;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers planner and oracle calls (`stream: false`) by inspecting the prompt.
struct Completions;

impl Respond for Completions {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let last = body["messages"]
            .as_array()
            .and_then(|m| m.last())
            .and_then(|m| m["content"].as_str())
            .unwrap_or_default()
            .to_string();

        let content = if let Some((_, context)) = last.split_once("EMBEDDED CONTEXT:") {
            if context.contains("Austin") { "yes" } else { "no" }
        } else {
            r#"["What is the user's name?"]"#
        };
        ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": content},
            "done": true,
            "done_reason": "stop"
        }))
    }
}

/// Embeds each input with the deterministic bag-of-words test embedder.
struct Embeddings(MockEmbedder);

impl Respond for Embeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let embeddings: Vec<Vec<f32>> = body["input"]
            .as_array()
            .map(|inputs| {
                inputs
                    .iter()
                    .map(|t| self.0.embed_text(t.as_str().unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();
        ResponseTemplate::new(200)
            .set_body_json(json!({"model": "nomic-embed-text", "embeddings": embeddings}))
    }
}

async fn mock_ollama() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": false})))
        .respond_with(Completions)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Your name \"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"is Austin.\"},\"done\":false}\n",
            "{\"done\":true,\"done_reason\":\"stop\"}\n"
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(Embeddings(MockEmbedder::new()))
        .mount(&server)
        .await;
    server
}

fn config(base_url: &str, dir: &TempDir) -> RecallConfig {
    let mut config = RecallConfig::default();
    config.ollama.base_url = base_url.to_string();
    config.ollama.timeout_secs = 5;
    config.storage = StorageConfig {
        database_path: dir.path().join("recall.db").to_string_lossy().to_string(),
        wal_mode: true,
    };
    config.agent.system_prompt = Some("You are a test assistant.".into());
    config.memory.vector_backend = VectorBackend::Sqlite;
    config
}

async fn open_agent(config: &RecallConfig) -> (MemoryAgent, Arc<SqliteStorage>) {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await.unwrap();
    let vectors = Arc::new(SqliteVectorStore::new(storage.database().unwrap()));
    let client = OllamaClient::new(&config.ollama).unwrap();
    let provider = Arc::new(OllamaProvider::with_client(
        client.clone(),
        config.ollama.chat_model.clone(),
    ));
    let embedder = Arc::new(OllamaEmbedder::with_client(
        client,
        config.ollama.embedding_model.clone(),
    ));
    let agent = MemoryAgent::from_config(config, provider, embedder, storage.clone(), vectors)
        .await
        .unwrap();
    (agent, storage)
}

#[tokio::test]
async fn recall_turn_over_sqlite_and_ollama() {
    let server = mock_ollama().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server.uri(), &dir);
    let (mut agent, storage) = open_agent(&config).await;

    storage
        .insert_interaction("My name is Austin", "Nice to meet you, Austin")
        .await
        .unwrap();
    storage
        .insert_interaction("I like green tea", "Green tea is lovely")
        .await
        .unwrap();

    let mut streamed = String::new();
    let reply = agent
        .respond("What's my name?", true, &NoProgress, |chunk| {
            streamed.push_str(chunk)
        })
        .await
        .unwrap();

    assert_eq!(reply.text, "Your name is Austin.");
    assert_eq!(streamed, "Your name is Austin.");
    let recall = reply.recall.unwrap();
    assert_eq!(recall.queries, vec!["What is the user's name?"]);
    let memories = recall.memories.into_vec();
    assert_eq!(memories.len(), 1);
    assert!(memories[0].text.contains("My name is Austin"));

    let rows = storage.fetch_interactions().await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].user_input, "What's my name?");
    assert_eq!(rows[2].ai_response, "Your name is Austin.");

    let vectors = SqliteVectorStore::new(storage.database().unwrap());
    assert_eq!(
        vectors.list_collections().await.unwrap(),
        vec!["interactions_memory_g1".to_string()]
    );
    storage.close().await.unwrap();
}

#[tokio::test]
async fn memories_survive_restart() {
    let server = mock_ollama().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server.uri(), &dir);

    {
        let (mut agent, storage) = open_agent(&config).await;
        agent.memorize("My name is Austin").await.unwrap();
        storage.close().await.unwrap();
    }

    let (mut agent, storage) = open_agent(&config).await;
    let outcome = agent.recall("What's my name?", &NoProgress).await.unwrap();
    assert_eq!(outcome.memories.len(), 1);
    assert_eq!(agent.index().len().await.unwrap(), 1);
    storage.close().await.unwrap();
}

#[tokio::test]
async fn forget_removes_the_persisted_exchange() {
    let server = mock_ollama().await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&server.uri(), &dir);
    let (mut agent, storage) = open_agent(&config).await;

    agent
        .respond("hello", false, &NoProgress, |_| {})
        .await
        .unwrap();
    assert_eq!(storage.fetch_interactions().await.unwrap().len(), 1);

    let outcome = agent.forget_last().await.unwrap();
    assert!(matches!(outcome, ForgetOutcome::Forgotten { interaction_id: Some(1) }));
    assert!(storage.fetch_interactions().await.unwrap().is_empty());
    assert_eq!(agent.history().len(), 1);
    storage.close().await.unwrap();
}

#[tokio::test]
async fn unreachable_ollama_fails_the_turn_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = config("http://127.0.0.1:9", &dir);
    let (mut agent, storage) = open_agent(&config).await;

    let err = agent
        .respond("hello", false, &NoProgress, |_| {})
        .await
        .unwrap_err();
    assert!(err.is_service_unavailable(), "unexpected error: {err}");
    assert_eq!(agent.history().len(), 1);
    assert!(storage.fetch_interactions().await.unwrap().is_empty());
    storage.close().await.unwrap();
}
