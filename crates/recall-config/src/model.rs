// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Recall memory assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use recall_core::SnippetFormat;
use serde::{Deserialize, Serialize};

/// Top-level Recall configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecallConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Ollama chat and embedding service settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Interaction store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Memory recall pipeline settings.
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl RecallConfig {
    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant, used in the shell prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
        }
    }
}

fn default_agent_name() -> String {
    "recall".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Ollama service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for chat replies, query planning and relevance checks.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used to embed snippets and search queries.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "llama3".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("recall").join("recall.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "recall.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Where vector collections live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Process-local collections, rebuilt every session.
    #[default]
    Memory,
    /// Collections persisted in the SQLite database next to the interactions.
    Sqlite,
}

/// Memory recall pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Base name of the vector collection holding interaction snippets.
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Nearest snippets fetched per planned search query.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Maximum relevance checks in flight for one query.
    #[serde(default = "default_oracle_concurrency")]
    pub oracle_concurrency: usize,

    /// Texts sent per embedding request during index rebuild.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    /// Vector collection backend.
    #[serde(default)]
    pub vector_backend: VectorBackend,

    /// How interactions are serialized into snippets.
    #[serde(default)]
    pub snippet_format: SnippetFormat,

    /// Mark the index stale whenever the interaction set changes and rebuild
    /// it before the next recall.
    #[serde(default = "default_rebuild_on_change")]
    pub rebuild_on_change: bool,

    /// Run recall for every plain message, not only `/recall`.
    #[serde(default)]
    pub auto_recall: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            collection_name: default_collection_name(),
            results_per_query: default_results_per_query(),
            oracle_concurrency: default_oracle_concurrency(),
            embed_batch_size: default_embed_batch_size(),
            vector_backend: VectorBackend::default(),
            snippet_format: SnippetFormat::default(),
            rebuild_on_change: default_rebuild_on_change(),
            auto_recall: false,
        }
    }
}

fn default_collection_name() -> String {
    "interactions_memory".to_string()
}

fn default_results_per_query() -> usize {
    2
}

fn default_oracle_concurrency() -> usize {
    4
}

fn default_embed_batch_size() -> usize {
    32
}

fn default_rebuild_on_change() -> bool {
    true
}
