// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express. All
//! violations are collected rather than failing on the first one.

use crate::diagnostic::ConfigError;
use crate::model::RecallConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &RecallConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    let base_url = config.ollama.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "ollama.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.ollama.chat_model.trim().is_empty() {
        fail("ollama.chat_model must not be empty".to_string());
    }

    if config.ollama.embedding_model.trim().is_empty() {
        fail("ollama.embedding_model must not be empty".to_string());
    }

    if config.ollama.timeout_secs == 0 {
        fail("ollama.timeout_secs must be at least 1".to_string());
    }

    if config.ollama.connect_timeout_secs == 0 {
        fail("ollama.connect_timeout_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let collection = &config.memory.collection_name;
    if collection.is_empty()
        || !collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        fail(format!(
            "memory.collection_name `{collection}` must be non-empty and use only letters, digits, `_` or `-`"
        ));
    }

    for (key, value) in [
        ("memory.results_per_query", config.memory.results_per_query),
        ("memory.oracle_concurrency", config.memory.oracle_concurrency),
        ("memory.embed_batch_size", config.memory.embed_batch_size),
    ] {
        if value == 0 {
            fail(format!("{key} must be at least 1"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
