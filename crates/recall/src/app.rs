// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter wiring shared by the `shell` and `rebuild` commands.

use std::sync::Arc;

use recall_agent::MemoryAgent;
use recall_config::model::VectorBackend;
use recall_config::RecallConfig;
use recall_core::{RecallError, StorageAdapter, VectorStoreAdapter};
use recall_memory::InMemoryVectorStore;
use recall_ollama::{OllamaClient, OllamaEmbedder, OllamaProvider};
use recall_storage::{SqliteStorage, SqliteVectorStore};
use tracing::info;

/// A fully wired agent plus the handles needed to shut it down.
pub struct App {
    pub agent: MemoryAgent,
    storage: Arc<SqliteStorage>,
}

impl App {
    /// Open storage, connect the Ollama adapters and build the agent.
    pub async fn open(config: &RecallConfig) -> Result<Self, RecallError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;

        let vectors = vector_store(config, &storage)?;
        let client = OllamaClient::new(&config.ollama)?;
        let provider = Arc::new(OllamaProvider::with_client(
            client.clone(),
            config.ollama.chat_model.clone(),
        ));
        let embedder = Arc::new(OllamaEmbedder::with_client(
            client,
            config.ollama.embedding_model.clone(),
        ));

        let agent =
            MemoryAgent::from_config(config, provider, embedder, storage.clone(), vectors).await?;
        info!(
            database = %config.storage.database_path,
            backend = ?config.memory.vector_backend,
            "agent ready"
        );
        Ok(Self { agent, storage })
    }

    /// Flush and close the interaction store.
    pub async fn close(self) -> Result<(), RecallError> {
        self.storage.close().await
    }
}

fn vector_store(
    config: &RecallConfig,
    storage: &SqliteStorage,
) -> Result<Arc<dyn VectorStoreAdapter>, RecallError> {
    Ok(match config.memory.vector_backend {
        VectorBackend::Memory => Arc::new(InMemoryVectorStore::new()),
        VectorBackend::Sqlite => Arc::new(SqliteVectorStore::new(storage.database()?)),
    })
}
