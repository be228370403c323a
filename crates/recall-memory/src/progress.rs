// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress observer for index rebuilds and recall turns.

/// Receives progress notifications. Every method defaults to a no-op.
pub trait RecallProgress: Send + Sync {
    /// The planner produced `queries`.
    fn queries_planned(&self, _queries: &[String]) {}

    /// One query was searched and its candidates judged.
    fn query_finished(&self, _query: &str, _candidates: usize, _accepted: usize) {}

    /// `done` of `total` snippets are embedded and stored. Called with
    /// `done == 0` before the first batch.
    fn indexed(&self, _done: usize, _total: usize) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl RecallProgress for NoProgress {}
