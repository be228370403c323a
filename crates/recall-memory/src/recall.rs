// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recall orchestrator: plan, search, judge, accumulate.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use recall_config::model::MemoryConfig;
use recall_core::{MemorySnippet, RecallError};
use tracing::{debug, info};

use crate::index::EmbeddingIndex;
use crate::oracle::RelevanceOracle;
use crate::planner::QueryPlanner;
use crate::progress::{NoProgress, RecallProgress};

/// Relevant snippets in acceptance order, unique by text.
#[derive(Debug, Clone, Default)]
pub struct RecalledMemories {
    snippets: Vec<MemorySnippet>,
    texts: HashSet<String>,
}

impl RecalledMemories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `snippet` unless a snippet with the same text is present.
    pub fn insert(&mut self, snippet: MemorySnippet) -> bool {
        if !self.texts.insert(snippet.text.clone()) {
            return false;
        }
        self.snippets.push(snippet);
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(text)
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemorySnippet> {
        self.snippets.iter()
    }

    pub fn into_vec(self) -> Vec<MemorySnippet> {
        self.snippets
    }
}

impl FromIterator<MemorySnippet> for RecalledMemories {
    fn from_iter<I: IntoIterator<Item = MemorySnippet>>(iter: I) -> Self {
        let mut memories = Self::new();
        for snippet in iter {
            memories.insert(snippet);
        }
        memories
    }
}

/// Result of one recall pass.
#[derive(Debug, Clone, Default)]
pub struct RecallOutcome {
    /// Queries the planner produced.
    pub queries: Vec<String>,
    pub memories: RecalledMemories,
}

/// Composes planner, index and oracle into one recall pass per user turn.
pub struct MemoryRecall {
    planner: QueryPlanner,
    index: Arc<EmbeddingIndex>,
    oracle: RelevanceOracle,
    k_per_query: usize,
    concurrency: usize,
}

impl MemoryRecall {
    pub fn new(
        planner: QueryPlanner,
        index: Arc<EmbeddingIndex>,
        oracle: RelevanceOracle,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            planner,
            index,
            oracle,
            k_per_query: config.results_per_query,
            concurrency: config.oracle_concurrency.max(1),
        }
    }

    pub fn index(&self) -> &Arc<EmbeddingIndex> {
        &self.index
    }

    pub async fn recall(&self, user_input: &str) -> Result<RecallOutcome, RecallError> {
        self.recall_with(user_input, &NoProgress).await
    }

    /// Run one recall pass for `user_input`.
    ///
    /// A snippet already accepted is never judged again. A snippet rejected
    /// for one query may still be accepted for another.
    pub async fn recall_with(
        &self,
        user_input: &str,
        progress: &dyn RecallProgress,
    ) -> Result<RecallOutcome, RecallError> {
        let queries = self.planner.plan(user_input).await?;
        progress.queries_planned(&queries);
        debug!(?queries, "recall queries planned");

        let mut memories = RecalledMemories::new();
        for query in &queries {
            let hits = self.index.query(query, self.k_per_query).await?;
            let found = hits.len();

            let mut in_batch = HashSet::new();
            let candidates: Vec<MemorySnippet> = hits
                .into_iter()
                .filter(|s| !memories.contains(&s.text) && in_batch.insert(s.text.clone()))
                .collect();

            let verdicts: Vec<bool> = stream::iter(
                candidates
                    .iter()
                    .map(|snippet| self.oracle.is_relevant(query, &snippet.text)),
            )
            .buffered(self.concurrency)
            .try_collect()
            .await?;

            let mut accepted = 0;
            for (snippet, relevant) in candidates.into_iter().zip(verdicts) {
                if relevant && memories.insert(snippet) {
                    accepted += 1;
                }
            }
            progress.query_finished(query, found, accepted);
        }

        info!(queries = queries.len(), memories = memories.len(), "recall finished");
        Ok(RecallOutcome { queries, memories })
    }
}

/// The single user-role message carrying recalled memories and the input.
pub fn format_context(memories: &RecalledMemories, user_input: &str) -> String {
    let mut context = String::from("MEMORIES:\n");
    for snippet in memories.iter() {
        context.push_str("- ");
        context.push_str(&snippet.text);
        context.push('\n');
    }
    context.push_str("\nUSER INPUT: ");
    context.push_str(user_input);
    context
}
