// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall - a terminal assistant with long-term memory.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod doctor;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use recall_config::RecallConfig;
use recall_core::RecallError;
use tracing::{error, info};

/// Recall - a terminal assistant with long-term memory.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive chat shell (default).
    Shell,
    /// Run diagnostic checks.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Rebuild the embedding index from every stored interaction.
    Rebuild,
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => recall_config::load_and_validate_path(path),
        None => recall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            recall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);
    info!(agent = %config.agent.name, "config loaded");

    let result = match cli.command {
        None | Some(Commands::Shell) => shell::run_shell(config).await,
        Some(Commands::Doctor { plain }) => {
            doctor::run_doctor(&config, cli.config.as_deref(), plain).await
        }
        Some(Commands::Rebuild) => run_rebuild(config).await,
        Some(Commands::Config) => print_config(&config),
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Run the `recall rebuild` command.
async fn run_rebuild(config: RecallConfig) -> Result<(), RecallError> {
    let mut app = app::App::open(&config).await?;
    let progress = shell::ShellProgress::new();
    let indexed = app.agent.rebuild_index_with(&progress).await;
    progress.clear();
    let indexed = indexed?;

    let collection = app.agent.index().active_collection().unwrap_or_default();
    println!("Indexed {indexed} interactions into {collection}");
    app.close().await
}

/// Run the `recall config` command.
fn print_config(config: &RecallConfig) -> Result<(), RecallError> {
    let rendered = config
        .to_toml_string()
        .map_err(|e| RecallError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Initialize the tracing subscriber. Logs go to stderr so they never mix
/// with streamed replies.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recall={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
