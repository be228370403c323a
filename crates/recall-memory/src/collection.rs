// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local vector collections.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use recall_core::types::VectorMatch;
use recall_core::vector::rank_nearest;
use recall_core::{AdapterType, HealthStatus, PluginAdapter, RecallError, VectorStoreAdapter};
use tokio::sync::RwLock;

struct Entry {
    embedding: Vec<f32>,
    document: String,
}

/// In-memory [`VectorStoreAdapter`]. Contents vanish with the process.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, BTreeMap<i64, Entry>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryVectorStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        self.collections.write().await.clear();
        Ok(())
    }
}

#[async_trait]
impl VectorStoreAdapter for InMemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<(), RecallError> {
        self.collections
            .write()
            .await
            .insert(name.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<(), RecallError> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, RecallError> {
        Ok(self.collections.read().await.contains_key(name))
    }

    async fn list_collections(&self) -> Result<Vec<String>, RecallError> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn insert(
        &self,
        collection: &str,
        id: i64,
        embedding: Vec<f32>,
        document: String,
    ) -> Result<(), RecallError> {
        let mut collections = self.collections.write().await;
        let entries = collections.get_mut(collection).ok_or_else(|| {
            RecallError::VectorStore(format!("collection `{collection}` does not exist"))
        })?;
        entries.insert(
            id,
            Entry {
                embedding,
                document,
            },
        );
        Ok(())
    }

    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<VectorMatch>, RecallError> {
        let collections = self.collections.read().await;
        let Some(entries) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(rank_nearest(
            embedding,
            entries
                .iter()
                .map(|(id, e)| (*id, e.document.as_str(), e.embedding.as_slice())),
            k,
        ))
    }

    async fn count(&self, collection: &str) -> Result<usize, RecallError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len))
    }
}
