// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete [`MemoryAgent`] over a temp SQLite
//! database, an in-memory vector store and mock model services.

use std::sync::Arc;

use recall_agent::MemoryAgent;
use recall_config::model::{AgentConfig, MemoryConfig, StorageConfig};
use recall_config::RecallConfig;
use recall_core::{RecallError, StorageAdapter};
use recall_memory::InMemoryVectorStore;
use recall_storage::SqliteStorage;

use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::MockProvider;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    system_prompt: Option<String>,
    memory: MemoryConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            system_prompt: None,
            memory: MemoryConfig::default(),
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = Some(prompt);
        self
    }

    /// Replace the memory pipeline settings.
    pub fn with_memory_config(mut self, memory: MemoryConfig) -> Self {
        self.memory = memory;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RecallError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RecallError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let config = RecallConfig {
            agent: AgentConfig {
                system_prompt: self
                    .system_prompt
                    .or(Some("You are a test assistant.".to_string())),
                ..AgentConfig::default()
            },
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
            },
            memory: self.memory,
            ..RecallConfig::default()
        };

        let mock_provider = Arc::new(MockProvider::with_responses(self.responses));
        let mock_embedder = Arc::new(MockEmbedder::new());
        let vector_store = Arc::new(InMemoryVectorStore::new());

        let agent = MemoryAgent::from_config(
            &config,
            mock_provider.clone(),
            mock_embedder.clone(),
            storage.clone(),
            vector_store.clone(),
        )
        .await?;

        Ok(TestHarness {
            agent,
            mock_provider,
            mock_embedder,
            storage,
            vector_store,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The agent under test.
    pub agent: MemoryAgent,
    /// The mock chat provider, shared by planner, oracle and session.
    pub mock_provider: Arc<MockProvider>,
    /// The mock embedding service.
    pub mock_embedder: Arc<MockEmbedder>,
    /// SQLite interaction store (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Vector collections backing the index.
    pub vector_store: Arc<InMemoryVectorStore>,
    /// Effective configuration.
    pub config: RecallConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Write interactions straight into the store, bypassing the session.
    ///
    /// The agent's index is marked stale so the next recall sees them.
    pub async fn seed(&mut self, interactions: &[(&str, &str)]) -> Result<Vec<i64>, RecallError> {
        let mut ids = Vec::with_capacity(interactions.len());
        for (user_input, ai_response) in interactions {
            ids.push(self.storage.insert_interaction(user_input, ai_response).await?);
        }
        self.agent.mark_index_stale();
        Ok(ids)
    }

    /// Add a response to the mock provider's queue.
    pub async fn add_provider_response(&self, text: String) {
        self.mock_provider.add_response(text).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::Role;
    use recall_memory::NoProgress;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert!(harness.storage.fetch_interactions().await.unwrap().is_empty());
        assert_eq!(harness.agent.history().len(), 1);
        assert_eq!(harness.agent.history()[0].role, Role::System);
        assert_eq!(harness.agent.history()[0].content, "You are a test assistant.");
    }

    #[tokio::test]
    async fn custom_system_prompt() {
        let harness = TestHarness::builder()
            .with_system_prompt("Be brief.".into())
            .build()
            .await
            .unwrap();
        assert_eq!(harness.agent.history()[0].content, "Be brief.");
    }

    #[tokio::test]
    async fn message_returns_mock_response_and_persists() {
        let mut harness = TestHarness::builder()
            .with_mock_responses(vec!["test output".to_string()])
            .build()
            .await
            .unwrap();

        let reply = harness
            .agent
            .message("hello world", &NoProgress, |_| {})
            .await
            .unwrap();
        assert_eq!(reply.text, "test output");

        let rows = harness.storage.fetch_interactions().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_input, "hello world");
        assert_eq!(rows[0].ai_response, "test output");
    }

    #[tokio::test]
    async fn seed_writes_rows_and_marks_stale() {
        let mut harness = TestHarness::builder().build().await.unwrap();
        harness.agent.rebuild_index().await.unwrap();
        let ids = harness.seed(&[("a", "b"), ("c", "d")]).await.unwrap();
        assert_eq!(ids, vec![1, 2]);
        assert!(harness.agent.is_index_stale());
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let mut h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();

        h1.seed(&[("only", "in h1")]).await.unwrap();
        assert_eq!(h1.storage.fetch_interactions().await.unwrap().len(), 1);
        assert!(h2.storage.fetch_interactions().await.unwrap().is_empty());
    }
}
