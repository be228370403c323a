// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the relational interaction log.

use async_trait::async_trait;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Interaction;

/// Adapter for the persistent interaction store.
///
/// The store is the source of truth for every interaction; the vector index
/// is derived from it.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), RecallError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), RecallError>;

    /// Persists a new interaction and returns its id.
    async fn insert_interaction(
        &self,
        user_input: &str,
        ai_response: &str,
    ) -> Result<i64, RecallError>;

    /// Returns every interaction in id order.
    async fn fetch_interactions(&self) -> Result<Vec<Interaction>, RecallError>;

    /// Deletes the interaction with the highest id.
    ///
    /// Returns the deleted id, or `None` when the store is empty.
    async fn delete_most_recent_interaction(&self) -> Result<Option<i64>, RecallError>;
}
