// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding index over interaction snippets.
//!
//! The index is a derived view of the interaction log: every rebuild embeds
//! the full corpus into a fresh generation collection (`<base>_g<n>`) and
//! only then swaps it in, so queries never observe a half-built index.
//! Similarity is cosine over the embedding vectors.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use recall_config::model::MemoryConfig;
use recall_core::types::EmbeddingInput;
use recall_core::{
    EmbeddingAdapter, Interaction, MemorySnippet, RecallError, SnippetFormat, VectorStoreAdapter,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::progress::{NoProgress, RecallProgress};

/// Vector index of [`MemorySnippet`]s keyed by interaction id.
pub struct EmbeddingIndex {
    store: Arc<dyn VectorStoreAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    base_name: String,
    format: SnippetFormat,
    batch_size: usize,
    /// Collection currently answering queries. `None` until first use.
    active: ArcSwapOption<String>,
    generation: AtomicU64,
    rebuild_lock: Mutex<()>,
}

impl EmbeddingIndex {
    pub fn new(
        store: Arc<dyn VectorStoreAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            base_name: config.collection_name.clone(),
            format: config.snippet_format,
            batch_size: config.embed_batch_size.max(1),
            active: ArcSwapOption::const_empty(),
            generation: AtomicU64::new(0),
            rebuild_lock: Mutex::new(()),
        }
    }

    /// Name of the collection answering queries, if the index was used yet.
    pub fn active_collection(&self) -> Option<String> {
        self.active.load_full().map(|name| name.as_ref().clone())
    }

    /// Number of snippets in the active collection.
    pub async fn len(&self) -> Result<usize, RecallError> {
        match self.active.load_full() {
            Some(name) => self.store.count(&name).await,
            None => Ok(0),
        }
    }

    pub async fn is_empty(&self) -> Result<bool, RecallError> {
        Ok(self.len().await? == 0)
    }

    /// Rebuild from `interactions`. Returns the number of indexed snippets.
    pub async fn rebuild(&self, interactions: &[Interaction]) -> Result<usize, RecallError> {
        self.rebuild_with(interactions, &NoProgress).await
    }

    /// Rebuild from `interactions`, reporting embedding progress.
    ///
    /// On failure the half-built generation is dropped and the previously
    /// active collection keeps serving queries.
    pub async fn rebuild_with(
        &self,
        interactions: &[Interaction],
        progress: &dyn RecallProgress,
    ) -> Result<usize, RecallError> {
        let _guard = self.rebuild_lock.lock().await;

        let snippets = unique_snippets(interactions, self.format);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let name = format!("{}_g{generation}", self.base_name);

        self.store.create_collection(&name).await?;
        if let Err(e) = self.populate(&name, &snippets, progress).await {
            if let Err(cleanup) = self.store.delete_collection(&name).await {
                warn!(collection = %name, error = %cleanup, "failed to drop partial collection");
            }
            return Err(e);
        }

        self.active.store(Some(Arc::new(name.clone())));
        self.drop_stale_collections(&name).await;

        info!(collection = %name, entries = snippets.len(), "index rebuilt");
        Ok(snippets.len())
    }

    /// The `k` snippets nearest to `text`, best first.
    ///
    /// A never-built index is initialized empty and yields no results.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<MemorySnippet>, RecallError> {
        let name = match self.active.load_full() {
            Some(name) => name,
            None => match self.initialize_empty().await? {
                Some(name) => name,
                None => return Ok(Vec::new()),
            },
        };
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embed_one(text).await?;
        let hits = self.store.nearest(&name, &embedding, k).await?;
        debug!(collection = %name, k, hits = hits.len(), "index queried");
        Ok(hits
            .into_iter()
            .map(|hit| MemorySnippet {
                interaction_id: hit.id,
                text: hit.document,
            })
            .collect())
    }

    /// Create the empty base collection for a never-built index.
    ///
    /// Returns the active name when a rebuild finished while we waited for
    /// the lock, `None` when the index was freshly initialized.
    async fn initialize_empty(&self) -> Result<Option<Arc<String>>, RecallError> {
        let _guard = self.rebuild_lock.lock().await;
        if let Some(name) = self.active.load_full() {
            return Ok(Some(name));
        }
        if !self.store.collection_exists(&self.base_name).await? {
            self.store.create_collection(&self.base_name).await?;
        }
        debug!(collection = %self.base_name, "index not built yet; initialized empty collection");
        self.active.store(Some(Arc::new(self.base_name.clone())));
        Ok(None)
    }

    async fn populate(
        &self,
        collection: &str,
        snippets: &[MemorySnippet],
        progress: &dyn RecallProgress,
    ) -> Result<(), RecallError> {
        let total = snippets.len();
        progress.indexed(0, total);

        let mut done = 0;
        for batch in snippets.chunks(self.batch_size) {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: batch.iter().map(|s| s.text.clone()).collect(),
                })
                .await?;
            if output.embeddings.len() != batch.len() {
                return Err(RecallError::Embedding {
                    message: format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        output.embeddings.len()
                    ),
                    source: None,
                });
            }
            for (snippet, embedding) in batch.iter().zip(output.embeddings) {
                self.store
                    .insert(
                        collection,
                        snippet.interaction_id,
                        embedding,
                        snippet.text.clone(),
                    )
                    .await?;
            }
            done += batch.len();
            progress.indexed(done, total);
        }
        Ok(())
    }

    /// Delete earlier generations and the empty placeholder, keeping `current`.
    async fn drop_stale_collections(&self, current: &str) {
        let names = match self.store.list_collections().await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "could not list collections for cleanup");
                return;
            }
        };
        for name in names
            .iter()
            .filter(|n| n.as_str() != current && self.is_own_collection(n))
        {
            if let Err(e) = self.store.delete_collection(name).await {
                warn!(collection = %name, error = %e, "failed to drop stale collection");
            }
        }
    }

    fn is_own_collection(&self, name: &str) -> bool {
        match name.strip_prefix(self.base_name.as_str()) {
            Some("") => true,
            Some(rest) => rest
                .strip_prefix("_g")
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
            None => false,
        }
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RecallError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RecallError::Embedding {
                message: "embedding service returned no vector".into(),
                source: None,
            })
    }
}

/// Serialize interactions, keeping the first occurrence of each id.
fn unique_snippets(interactions: &[Interaction], format: SnippetFormat) -> Vec<MemorySnippet> {
    let mut seen = HashSet::with_capacity(interactions.len());
    interactions
        .iter()
        .filter(|interaction| {
            let fresh = seen.insert(interaction.id);
            if !fresh {
                warn!(id = interaction.id, "duplicate interaction id in corpus; keeping first");
            }
            fresh
        })
        .map(|interaction| MemorySnippet::from_interaction(interaction, format))
        .collect()
}
