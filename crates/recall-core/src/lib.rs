// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Recall memory assistant.
//!
//! This crate provides the adapter traits for every external collaborator of
//! the memory-recall pipeline (chat completion, embeddings, interaction
//! storage, vector collections), the shared error type, and the common data
//! types passed between them.

pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

pub use error::RecallError;
pub use types::{
    AdapterType, ChatMessage, HealthStatus, Interaction, MemorySnippet, Role, SnippetFormat,
};

pub use traits::{
    ChunkStream, EmbeddingAdapter, PluginAdapter, ProviderAdapter, StorageAdapter,
    VectorStoreAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recall_error_has_all_variants() {
        let _config = RecallError::Config("test".into());
        let _storage = RecallError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = RecallError::Provider {
            message: "test".into(),
            source: None,
        };
        let _embedding = RecallError::Embedding {
            message: "test".into(),
            source: None,
        };
        let _vector = RecallError::VectorStore("test".into());
        let _health = RecallError::HealthCheckFailed {
            name: "test".into(),
            source: Box::new(std::io::Error::other("test")),
        };
        let _timeout = RecallError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = RecallError::Internal("test".into());
    }

    #[test]
    fn service_unavailable_classification() {
        let timeout = RecallError::Timeout {
            duration: std::time::Duration::from_secs(1),
        };
        let provider = RecallError::Provider {
            message: "connection refused".into(),
            source: None,
        };
        assert!(timeout.is_service_unavailable());
        assert!(provider.is_service_unavailable());
        assert!(!RecallError::Config("bad".into()).is_service_unavailable());
        assert!(!RecallError::VectorStore("dim".into()).is_service_unavailable());
    }

    #[test]
    fn adapter_type_display_roundtrip() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Provider,
            AdapterType::Embedding,
            AdapterType::Storage,
            AdapterType::VectorStore,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        assert_eq!(HealthStatus::Healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), HealthStatus::Healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), HealthStatus::Healthy);
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_vector_store_adapter<T: VectorStoreAdapter>() {}
    }
}
