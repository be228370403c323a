// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama adapters for the Recall memory assistant.
//!
//! This crate implements [`ProviderAdapter`] over Ollama's native `/api/chat`
//! endpoint (single-shot and NDJSON streaming) and [`EmbeddingAdapter`] over
//! the batched `/api/embed` endpoint.

pub mod client;
pub mod embedder;
pub mod stream;
pub mod types;

use async_trait::async_trait;
use recall_config::model::OllamaConfig;
use recall_core::types::{CompletionRequest, CompletionResponse};
use recall_core::{
    AdapterType, ChunkStream, HealthStatus, PluginAdapter, ProviderAdapter, RecallError,
};
use tracing::{debug, info};

pub use client::OllamaClient;
pub use embedder::OllamaEmbedder;

use crate::types::ChatRequest;

/// Ollama chat provider implementing [`ProviderAdapter`].
pub struct OllamaProvider {
    client: OllamaClient,
    model: String,
}

impl OllamaProvider {
    /// Creates a provider for `config.chat_model`.
    pub fn new(config: &OllamaConfig) -> Result<Self, RecallError> {
        let client = OllamaClient::new(config)?;
        info!(model = %config.chat_model, base_url = %client.base_url(), "Ollama provider initialized");
        Ok(Self::with_client(client, config.chat_model.clone()))
    }

    /// Creates a provider sharing an existing client.
    pub fn with_client(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }

    /// The configured chat model.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_chat_request(&self, request: CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages: request.messages,
            stream: false,
        }
    }
}

/// Whether `wanted` is among the `available` tags. A bare name matches its
/// `:latest` tag.
pub fn has_model(available: &[String], wanted: &str) -> bool {
    available.iter().any(|tag| {
        tag == wanted
            || (!wanted.contains(':') && tag.split(':').next() == Some(wanted))
    })
}

/// Health check shared by both adapters: the service answers and `model` is pulled.
pub(crate) async fn check_model(
    client: &OllamaClient,
    adapter: &str,
    model: &str,
) -> Result<HealthStatus, RecallError> {
    let models = client
        .list_models()
        .await
        .map_err(|e| RecallError::HealthCheckFailed {
            name: adapter.to_string(),
            source: Box::new(e),
        })?;
    if has_model(&models, model) {
        Ok(HealthStatus::Healthy)
    } else {
        Ok(HealthStatus::Degraded(format!(
            "model `{model}` is not available; run `ollama pull {model}`"
        )))
    }
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        check_model(&self.client, self.name(), &self.model).await
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        debug!("Ollama provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, RecallError> {
        let chat = self.to_chat_request(request);
        let response = self.client.chat(&chat).await?;
        Ok(CompletionResponse {
            content: response.message.map(|m| m.content).unwrap_or_default(),
            model: if response.model.is_empty() {
                chat.model
            } else {
                response.model
            },
            done_reason: response.done_reason,
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream, RecallError> {
        let chat = self.to_chat_request(request);
        self.client.chat_stream(&chat).await
    }
}
