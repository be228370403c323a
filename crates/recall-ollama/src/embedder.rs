// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter over Ollama's batched `/api/embed` endpoint.

use async_trait::async_trait;
use recall_config::model::OllamaConfig;
use recall_core::types::{EmbeddingInput, EmbeddingOutput};
use recall_core::{AdapterType, EmbeddingAdapter, HealthStatus, PluginAdapter, RecallError};
use tracing::debug;

use crate::client::OllamaClient;
use crate::types::EmbedRequest;

/// Ollama embedding model implementing [`EmbeddingAdapter`].
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    /// Creates an embedder for `config.embedding_model`.
    pub fn new(config: &OllamaConfig) -> Result<Self, RecallError> {
        Ok(Self::with_client(
            OllamaClient::new(config)?,
            config.embedding_model.clone(),
        ))
    }

    /// Creates an embedder sharing an existing client.
    pub fn with_client(client: OllamaClient, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl PluginAdapter for OllamaEmbedder {
    fn name(&self) -> &str {
        "ollama-embed"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, RecallError> {
        crate::check_model(&self.client, self.name(), &self.model).await
    }

    async fn shutdown(&self) -> Result<(), RecallError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, RecallError> {
        if input.texts.is_empty() {
            return Ok(EmbeddingOutput {
                embeddings: Vec::new(),
                dimensions: 0,
            });
        }

        let expected = input.texts.len();
        let response = self
            .client
            .embed(&EmbedRequest {
                model: self.model.clone(),
                input: input.texts,
            })
            .await?;

        if response.embeddings.len() != expected {
            return Err(RecallError::Embedding {
                message: format!(
                    "expected {expected} embeddings, service returned {}",
                    response.embeddings.len()
                ),
                source: None,
            });
        }

        let dimensions = response.embeddings.first().map_or(0, Vec::len);
        if response.embeddings.iter().any(|e| e.len() != dimensions) {
            return Err(RecallError::Embedding {
                message: "service returned embeddings of differing dimensions".into(),
                source: None,
            });
        }

        debug!(count = expected, dimensions, model = %self.model, "texts embedded");
        Ok(EmbeddingOutput {
            embeddings: response.embeddings,
            dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(base_url: &str) -> OllamaEmbedder {
        OllamaEmbedder::new(&OllamaConfig {
            base_url: base_url.to_string(),
            ..OllamaConfig::default()
        })
        .unwrap()
    }

    fn input(texts: &[&str]) -> EmbeddingInput {
        EmbeddingInput {
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn embed_sends_batched_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(serde_json::json!({
                "model": "nomic-embed-text",
                "input": ["a", "b"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "nomic-embed-text",
                "embeddings": [[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = embedder(&server.uri()).embed(input(&["a", "b"])).await.unwrap();
        assert_eq!(out.embeddings.len(), 2);
        assert_eq!(out.dimensions, 3);
    }

    #[tokio::test]
    async fn count_mismatch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.1, 0.2]]
            })))
            .mount(&server)
            .await;

        let err = embedder(&server.uri())
            .embed(input(&["a", "b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RecallError::Embedding { .. }));
    }

    #[tokio::test]
    async fn empty_input_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let out = embedder(&server.uri()).embed(input(&[])).await.unwrap();
        assert!(out.embeddings.is_empty());
    }
}
