// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat completion service adapter.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::RecallError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse, StreamChunk};

/// A boxed stream of completion chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, RecallError>> + Send>>;

/// Adapter for a chat completion service.
///
/// Used by the query planner and relevance oracle (single-shot) and by the
/// conversation session (streaming).
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, RecallError>;

    /// Sends a completion request and returns a stream of response chunks.
    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream, RecallError>;
}
