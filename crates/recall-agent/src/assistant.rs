// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory agent: a conversation session with recall on top.
//!
//! The embedding index is derived from the interaction log. It starts out
//! stale, and with `rebuild_on_change` every persisted change (a turn, a
//! forget, a memorize) marks it stale again. A stale index is rebuilt in full
//! right before the next recall.

use std::sync::Arc;

use recall_config::model::MemoryConfig;
use recall_config::RecallConfig;
use recall_core::{
    ChatMessage, EmbeddingAdapter, ProviderAdapter, RecallError, StorageAdapter,
    VectorStoreAdapter,
};
use recall_memory::{
    EmbeddingIndex, MemoryRecall, NoProgress, QueryPlanner, RecallOutcome, RecallProgress,
    RelevanceOracle,
};
use tracing::{debug, info};

use crate::prompt::load_system_prompt;
use crate::session::{ConversationSession, ForgetOutcome};

/// Reply to one user turn.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    /// Present when the turn ran the recall pipeline.
    pub recall: Option<RecallOutcome>,
}

/// Conversation session, recall pipeline and index maintenance in one place.
pub struct MemoryAgent {
    session: ConversationSession,
    recall: MemoryRecall,
    storage: Arc<dyn StorageAdapter>,
    rebuild_on_change: bool,
    auto_recall: bool,
    index_stale: bool,
}

impl MemoryAgent {
    pub fn new(
        session: ConversationSession,
        recall: MemoryRecall,
        storage: Arc<dyn StorageAdapter>,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            session,
            recall,
            storage,
            rebuild_on_change: config.rebuild_on_change,
            auto_recall: config.auto_recall,
            index_stale: true,
        }
    }

    /// Wire every component from configuration and the given adapters.
    ///
    /// `storage` must already be initialized.
    pub async fn from_config(
        config: &RecallConfig,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        storage: Arc<dyn StorageAdapter>,
        vectors: Arc<dyn VectorStoreAdapter>,
    ) -> Result<Self, RecallError> {
        let system_prompt = load_system_prompt(&config.agent).await?;
        let index = Arc::new(EmbeddingIndex::new(vectors, embedder, &config.memory));
        let recall = MemoryRecall::new(
            QueryPlanner::new(provider.clone()),
            index,
            RelevanceOracle::new(provider.clone()),
            &config.memory,
        );
        let session = ConversationSession::new(provider, storage.clone(), system_prompt);
        Ok(Self::new(session, recall, storage, &config.memory))
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.session.history()
    }

    pub fn index(&self) -> &Arc<EmbeddingIndex> {
        self.recall.index()
    }

    pub fn is_index_stale(&self) -> bool {
        self.index_stale
    }

    /// Force a rebuild before the next recall.
    pub fn mark_index_stale(&mut self) {
        self.index_stale = true;
    }

    pub async fn rebuild_index(&mut self) -> Result<usize, RecallError> {
        self.rebuild_index_with(&NoProgress).await
    }

    /// Rebuild the index from every stored interaction.
    pub async fn rebuild_index_with(
        &mut self,
        progress: &dyn RecallProgress,
    ) -> Result<usize, RecallError> {
        let interactions = self.storage.fetch_interactions().await?;
        let indexed = self.recall.index().rebuild_with(&interactions, progress).await?;
        self.index_stale = false;
        Ok(indexed)
    }

    /// Run the recall pipeline for `user_input`, rebuilding a stale index first.
    pub async fn recall(
        &mut self,
        user_input: &str,
        progress: &dyn RecallProgress,
    ) -> Result<RecallOutcome, RecallError> {
        if self.index_stale {
            debug!("index stale; rebuilding before recall");
            self.rebuild_index_with(progress).await?;
        }
        self.recall.recall_with(user_input, progress).await
    }

    /// Answer `user_input`, with recall when `with_recall` is set.
    pub async fn respond<F>(
        &mut self,
        user_input: &str,
        with_recall: bool,
        progress: &dyn RecallProgress,
        on_chunk: F,
    ) -> Result<TurnReply, RecallError>
    where
        F: FnMut(&str) + Send,
    {
        let recall = if with_recall {
            Some(self.recall(user_input, progress).await?)
        } else {
            None
        };

        let text = self
            .session
            .send(user_input, recall.as_ref().map(|r| &r.memories), on_chunk)
            .await?;
        self.note_change();
        Ok(TurnReply { text, recall })
    }

    /// Answer a plain message: with recall only when `auto_recall` is on.
    pub async fn message<F>(
        &mut self,
        user_input: &str,
        progress: &dyn RecallProgress,
        on_chunk: F,
    ) -> Result<TurnReply, RecallError>
    where
        F: FnMut(&str) + Send,
    {
        self.respond(user_input, self.auto_recall, progress, on_chunk)
            .await
    }

    pub async fn forget_last(&mut self) -> Result<ForgetOutcome, RecallError> {
        let outcome = self.session.forget_last().await?;
        if matches!(outcome, ForgetOutcome::Forgotten { .. }) {
            self.note_change();
        }
        Ok(outcome)
    }

    pub async fn memorize(&mut self, text: &str) -> Result<i64, RecallError> {
        let id = self.session.memorize(text).await?;
        self.note_change();
        Ok(id)
    }

    fn note_change(&mut self) {
        if self.rebuild_on_change && !self.index_stale {
            info!("interactions changed; index marked stale");
            self.index_stale = true;
        }
    }
}
