// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent vector collections stored alongside the interaction log.

use async_trait::async_trait;

use recall_core::types::VectorMatch;
use recall_core::{AdapterType, HealthStatus, PluginAdapter, RecallError, VectorStoreAdapter};

use crate::database::Database;
use crate::queries::vectors;

/// SQLite-backed [`VectorStoreAdapter`].
///
/// Nearest-neighbour search is a full cosine scan of the collection, which is
/// adequate for a personal interaction log.
pub struct SqliteVectorStore {
    db: Database,
}

impl SqliteVectorStore {
    /// Build a store over an already opened (and migrated) database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PluginAdapter for SqliteVectorStore {
    fn name(&self) -> &str {
        "sqlite-vectors"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        // Probing a name that never exists exercises the schema without side effects.
        vectors::collection_exists(&self.db, "").await?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl VectorStoreAdapter for SqliteVectorStore {
    async fn create_collection(&self, name: &str) -> Result<(), RecallError> {
        vectors::create_collection(&self.db, name).await
    }

    async fn delete_collection(&self, name: &str) -> Result<(), RecallError> {
        vectors::delete_collection(&self.db, name).await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, RecallError> {
        vectors::collection_exists(&self.db, name).await
    }

    async fn list_collections(&self) -> Result<Vec<String>, RecallError> {
        vectors::list_collections(&self.db).await
    }

    async fn insert(
        &self,
        collection: &str,
        id: i64,
        embedding: Vec<f32>,
        document: String,
    ) -> Result<(), RecallError> {
        if !vectors::collection_exists(&self.db, collection).await? {
            return Err(RecallError::VectorStore(format!(
                "collection `{collection}` does not exist"
            )));
        }
        vectors::insert_entry(&self.db, collection, id, &embedding, document).await
    }

    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<VectorMatch>, RecallError> {
        vectors::nearest(&self.db, collection, embedding, k).await
    }

    async fn count(&self, collection: &str) -> Result<usize, RecallError> {
        vectors::count(&self.db, collection).await
    }
}
