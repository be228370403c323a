// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock chat provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured responses,
//! enabling fast, CI-runnable tests without a model server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::Mutex;

use recall_core::types::{CompletionRequest, CompletionResponse, StreamChunk};
use recall_core::{
    AdapterType, ChunkStream, HealthStatus, PluginAdapter, ProviderAdapter, RecallError,
};

type Handler = dyn Fn(&CompletionRequest) -> Result<String, RecallError> + Send + Sync;

/// A mock chat provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. A handler, when set, answers
/// every request instead of the queue.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    handler: Option<Box<Handler>>,
    failing: AtomicBool,
    interrupt_streams: AtomicBool,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            handler: None,
            failing: AtomicBool::new(false),
            interrupt_streams: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider that computes every reply from the request.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, RecallError> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Box::new(handler)),
            ..Self::new()
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// While set, every call fails with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// While set, streams yield their first chunk and then an error.
    pub fn set_interrupt_streams(&self, interrupt: bool) {
        self.interrupt_streams.store(interrupt, Ordering::SeqCst);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    async fn respond(&self, request: CompletionRequest) -> Result<String, RecallError> {
        self.requests.lock().await.push(request.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(RecallError::Provider {
                message: "mock provider unavailable".into(),
                source: None,
            });
        }
        if let Some(handler) = &self.handler {
            return handler(&request);
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, RecallError> {
        let model = request.model.clone().unwrap_or_else(|| "mock-model".into());
        let content = self.respond(request).await?;
        Ok(CompletionResponse {
            content,
            model,
            done_reason: Some("stop".to_string()),
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream, RecallError> {
        let text = self.respond(request).await?;

        // One chunk per word, then a terminal empty chunk.
        let mut chunks: Vec<Result<StreamChunk, RecallError>> = text
            .split_inclusive(' ')
            .map(|word| {
                Ok(StreamChunk {
                    text: word.to_string(),
                    done: false,
                })
            })
            .collect();

        if self.interrupt_streams.load(Ordering::SeqCst) {
            chunks.truncate(1);
            chunks.push(Err(RecallError::Provider {
                message: "mock stream interrupted".into(),
                source: None,
            }));
        } else {
            chunks.push(Ok(StreamChunk {
                text: String::new(),
                done: true,
            }));
        }
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use recall_core::ChatMessage;

    fn request() -> CompletionRequest {
        CompletionRequest::new(vec![ChatMessage::user("hi")])
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request()).await.unwrap();
        assert_eq!(resp.content, "mock response");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec![
            "first".to_string(),
            "second".to_string(),
            "third".to_string(),
        ]);

        assert_eq!(provider.complete(request()).await.unwrap().content, "first");
        assert_eq!(provider.complete(request()).await.unwrap().content, "second");
        assert_eq!(provider.complete(request()).await.unwrap().content, "third");
        // Queue exhausted, falls back to default
        assert_eq!(
            provider.complete(request()).await.unwrap().content,
            "mock response"
        );
    }

    #[tokio::test]
    async fn stream_yields_words_then_done() {
        let provider = MockProvider::with_responses(vec!["streamed text".to_string()]);
        let mut stream = provider.stream(request()).await.unwrap();
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "streamed ");
        assert_eq!(chunks[1].text, "text");
        assert!(chunks[2].done);
    }

    #[tokio::test]
    async fn interrupted_stream_ends_in_error() {
        let provider = MockProvider::with_responses(vec!["a b c".to_string()]);
        provider.set_interrupt_streams(true);
        let results: Vec<_> = provider.stream(request()).await.unwrap().collect().await;
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[tokio::test]
    async fn failing_provider_logs_request() {
        let provider = MockProvider::new();
        provider.set_failing(true);
        assert!(provider.complete(request()).await.is_err());
        assert!(provider.stream(request()).await.is_err());
        assert_eq!(provider.requests().await.len(), 2);

        provider.set_failing(false);
        assert!(provider.complete(request()).await.is_ok());
    }

    #[tokio::test]
    async fn handler_overrides_queue() {
        let provider = MockProvider::with_handler(|req| Ok(format!("{} messages", req.messages.len())));
        provider.add_response("ignored".into()).await;
        assert_eq!(provider.complete(request()).await.unwrap().content, "1 messages");
    }

    #[tokio::test]
    async fn add_response_after_construction() {
        let provider = MockProvider::new();
        provider.add_response("dynamic response".to_string()).await;
        assert_eq!(
            provider.complete(request()).await.unwrap().content,
            "dynamic response"
        );
    }
}
