// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the interaction
//! database and the Ollama models the assistant depends on.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use recall_config::model::VectorBackend;
use recall_config::RecallConfig;
use recall_core::{HealthStatus, PluginAdapter, RecallError, StorageAdapter, VectorStoreAdapter};
use recall_ollama::{OllamaClient, OllamaEmbedder, OllamaProvider};
use recall_storage::{SqliteStorage, SqliteVectorStore};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `recall doctor` command.
///
/// With `--plain`, disables colored output.
pub async fn run_doctor(
    config: &RecallConfig,
    config_path: Option<&Path>,
    plain: bool,
) -> Result<(), RecallError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = run_checks(config, config_path).await;

    println!();
    println!("  recall doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", format_result(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

/// Run every check in display order.
pub async fn run_checks(config: &RecallConfig, config_path: Option<&Path>) -> Vec<CheckResult> {
    let mut results = vec![check_config(config_path), check_database(config).await];
    results.extend(check_models(config).await);
    if config.memory.vector_backend == VectorBackend::Sqlite {
        results.push(check_vector_store(config).await);
    }
    results
}

fn format_result(result: &CheckResult, use_color: bool) -> String {
    use colored::Colorize;

    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!(
        "    {symbol} {:<20} {message} ({duration_ms}ms)",
        result.name
    )
}

/// Check configuration loads without errors.
fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => recall_config::load_and_validate_path(path),
        None => recall_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the interaction database exists and answers queries.
async fn check_database(config: &RecallConfig) -> CheckResult {
    let start = Instant::now();
    let db_path = &config.storage.database_path;

    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let storage = SqliteStorage::new(config.storage.clone());
    let result = async {
        storage.initialize().await?;
        storage.health_check().await?;
        let count = storage.fetch_interactions().await?.len();
        storage.close().await?;
        Ok::<_, RecallError>(count)
    }
    .await;

    match result {
        Ok(count) => CheckResult::new(
            "Database",
            CheckStatus::Pass,
            format!("{count} interaction(s) stored"),
            start,
        ),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check the chat and embedding models are reachable and pulled.
async fn check_models(config: &RecallConfig) -> Vec<CheckResult> {
    let start = Instant::now();
    let client = match OllamaClient::new(&config.ollama) {
        Ok(client) => client,
        Err(e) => {
            return vec![CheckResult::new(
                "Ollama",
                CheckStatus::Fail,
                e.to_string(),
                start,
            )];
        }
    };

    let provider = OllamaProvider::with_client(client.clone(), config.ollama.chat_model.clone());
    let embedder = OllamaEmbedder::with_client(client, config.ollama.embedding_model.clone());
    vec![
        check_adapter("Chat model", &config.ollama.chat_model, &provider).await,
        check_adapter("Embedding model", &config.ollama.embedding_model, &embedder).await,
    ]
}

async fn check_adapter(name: &str, model: &str, adapter: &dyn PluginAdapter) -> CheckResult {
    let start = Instant::now();
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, model, start),
        Ok(HealthStatus::Degraded(msg)) => CheckResult::new(name, CheckStatus::Warn, msg, start),
        Ok(HealthStatus::Unhealthy(msg)) => CheckResult::new(name, CheckStatus::Fail, msg, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Check the SQLite vector tables when they back the index.
async fn check_vector_store(config: &RecallConfig) -> CheckResult {
    let start = Instant::now();
    if !Path::new(&config.storage.database_path).exists() {
        return CheckResult::new(
            "Vector store",
            CheckStatus::Warn,
            "no database yet",
            start,
        );
    }

    let storage = SqliteStorage::new(config.storage.clone());
    let result = async {
        storage.initialize().await?;
        let vectors = SqliteVectorStore::new(storage.database()?);
        vectors.health_check().await?;
        let collections = vectors.list_collections().await?;
        storage.close().await?;
        Ok::<_, RecallError>(collections.len())
    }
    .await;

    match result {
        Ok(n) => CheckResult::new(
            "Vector store",
            CheckStatus::Pass,
            format!("{n} collection(s)"),
            start,
        ),
        Err(e) => CheckResult::new("Vector store", CheckStatus::Fail, e.to_string(), start),
    }
}
