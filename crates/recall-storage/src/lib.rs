// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Recall memory assistant.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single
//! background connection via `tokio-rusqlite`, the interaction log, and an
//! optional persisted vector collection store.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
pub mod vector_store;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use vector_store::SqliteVectorStore;
