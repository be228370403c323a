// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recall memory assistant.

use thiserror::Error;

/// The primary error type used across all Recall adapter traits and pipeline operations.
#[derive(Debug, Error)]
pub enum RecallError {
    /// Configuration errors (invalid values, unreadable prompt files).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat completion service errors (unreachable host, bad status, malformed body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding service errors.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Vector collection store errors (dimension mismatch, write into a missing collection).
    #[error("vector store error: {0}")]
    VectorStore(String),

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecallError {
    /// Whether this error means an external collaborator (model, embedding or
    /// storage backend) could not serve the request.
    ///
    /// These errors fail the current turn but leave the session usable.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            RecallError::Provider { .. }
                | RecallError::Embedding { .. }
                | RecallError::Storage { .. }
                | RecallError::Timeout { .. }
        )
    }
}
