// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector collection store adapter.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::VectorMatch;

/// Adapter for a store of named vector collections.
///
/// Presence of a collection is reported by [`collection_exists`](Self::collection_exists);
/// callers never infer absence from an error.
#[async_trait]
pub trait VectorStoreAdapter: PluginAdapter {
    /// Creates an empty collection. Creating an existing collection empties it.
    async fn create_collection(&self, name: &str) -> Result<(), RecallError>;

    /// Deletes a collection. Deleting a missing collection is not an error.
    async fn delete_collection(&self, name: &str) -> Result<(), RecallError>;

    /// Whether the named collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool, RecallError>;

    /// Names of every collection, sorted.
    async fn list_collections(&self) -> Result<Vec<String>, RecallError>;

    /// Inserts one entry. Re-inserting an existing id replaces it.
    async fn insert(
        &self,
        collection: &str,
        id: i64,
        embedding: Vec<f32>,
        document: String,
    ) -> Result<(), RecallError>;

    /// Returns up to `k` entries nearest to `embedding`, best first.
    async fn nearest(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<VectorMatch>, RecallError>;

    /// Number of entries in the collection (0 when missing).
    async fn count(&self, collection: &str) -> Result<usize, RecallError>;
}
