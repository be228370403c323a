// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory recall for the Recall assistant.
//!
//! Turns a user utterance into a set of relevant past interactions that can
//! be injected into the conversation as context.
//!
//! ## Architecture
//!
//! - **EmbeddingIndex**: vector index over interaction snippets, rebuilt by
//!   generation swap
//! - **QueryPlanner**: model-driven decomposition into atomic search queries
//! - **RelevanceOracle**: model-driven yes/no relevance judgement
//! - **MemoryRecall**: plan, search and judge for one user turn
//! - **InMemoryVectorStore**: process-local vector collections

pub mod collection;
pub mod index;
pub mod oracle;
pub mod planner;
pub mod progress;
pub mod recall;

pub use collection::InMemoryVectorStore;
pub use index::EmbeddingIndex;
pub use oracle::RelevanceOracle;
pub use planner::QueryPlanner;
pub use progress::{NoProgress, RecallProgress};
pub use recall::{format_context, MemoryRecall, RecallOutcome, RecalledMemories};
