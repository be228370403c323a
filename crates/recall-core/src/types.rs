// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the adapter traits and the memory pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Embedding,
    Storage,
    VectorStore,
}

/// Speaker of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation history or model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A persisted exchange between the user and the assistant.
///
/// Rows are immutable once written; the only mutation is deleting the most
/// recent row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Monotonic row id assigned by the store.
    pub id: i64,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub user_input: String,
    pub ai_response: String,
}

/// How an interaction is rendered into snippet text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnippetFormat {
    /// `user_input: <u> ai_response: <a>`
    #[default]
    Labeled,
    /// `prompt: <p> response: <r>`
    PromptResponse,
}

/// Serialized text of one interaction, the unit stored in and retrieved from
/// the vector index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemorySnippet {
    /// Id of the interaction this snippet was built from.
    pub interaction_id: i64,
    pub text: String,
}

impl MemorySnippet {
    /// Serialize an interaction with the given format.
    pub fn from_interaction(interaction: &Interaction, format: SnippetFormat) -> Self {
        let text = match format {
            SnippetFormat::Labeled => format!(
                "user_input: {} ai_response: {}",
                interaction.user_input, interaction.ai_response
            ),
            SnippetFormat::PromptResponse => format!(
                "prompt: {} response: {}",
                interaction.user_input, interaction.ai_response
            ),
        };
        Self {
            interaction_id: interaction.id,
            text,
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model override. `None` uses the provider's configured model.
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
        }
    }
}

/// A complete (non-streamed) chat completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    /// Why generation stopped, if the service reported it.
    pub done_reason: Option<String>,
}

/// One increment of a streamed chat completion.
#[derive(Debug, Clone, Default)]
pub struct StreamChunk {
    /// Text delta, possibly empty.
    pub text: String,
    /// True on the final chunk.
    pub done: bool,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text in input order.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// A nearest-neighbour hit from a vector collection.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: i64,
    pub document: String,
    /// Cosine similarity to the query vector.
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn austin() -> Interaction {
        Interaction {
            id: 1,
            timestamp: "2026-01-01T00:00:00Z".into(),
            user_input: "My name is Austin".into(),
            ai_response: "Nice to meet you, Austin".into(),
        }
    }

    #[test]
    fn labeled_snippet_format() {
        let snippet = MemorySnippet::from_interaction(&austin(), SnippetFormat::Labeled);
        assert_eq!(snippet.interaction_id, 1);
        assert_eq!(
            snippet.text,
            "user_input: My name is Austin ai_response: Nice to meet you, Austin"
        );
    }

    #[test]
    fn prompt_response_snippet_format() {
        let snippet = MemorySnippet::from_interaction(&austin(), SnippetFormat::PromptResponse);
        assert_eq!(
            snippet.text,
            "prompt: My name is Austin response: Nice to meet you, Austin"
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn snippet_format_serde_names() {
        let fmt: SnippetFormat = serde_json::from_str(r#""prompt_response""#).unwrap();
        assert_eq!(fmt, SnippetFormat::PromptResponse);
        assert_eq!(SnippetFormat::default(), SnippetFormat::Labeled);
    }
}
