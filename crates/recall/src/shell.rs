// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output,
//! readline history and progress bars for index rebuilds and retrieval.

use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use recall_agent::{Command, ForgetOutcome, HELP, MEMORIZED_REPLY};
use recall_config::RecallConfig;
use recall_core::RecallError;
use recall_memory::RecallProgress;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::app::App;

/// Runs the `recall shell` interactive REPL.
///
/// The index is rebuilt once up front. A failed turn prints the error and
/// the loop continues.
pub async fn run_shell(config: RecallConfig) -> Result<(), RecallError> {
    let mut app = App::open(&config).await?;
    let progress = ShellProgress::new();

    let mut rl = DefaultEditor::new()
        .map_err(|e| RecallError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!(
        "Type {} for commands, {} to exit.\n",
        "/help".yellow(),
        "/quit".yellow()
    );

    if let Err(e) = app.agent.rebuild_index_with(&progress).await {
        progress.clear();
        warn!(error = %e, "initial index rebuild failed");
        eprintln!(
            "{}: {e} (memories will be indexed on the next /recall)",
            "warning".red()
        );
    }

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let command = match Command::parse(&line) {
                    Ok(command) => command,
                    Err(usage) => {
                        println!("{}", usage.to_string().yellow());
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                if let Err(e) = handle_command(&mut app, command, &progress).await {
                    progress.clear();
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                break;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                break;
            }
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    app.close().await
}

async fn handle_command(
    app: &mut App,
    command: Command,
    progress: &ShellProgress,
) -> Result<(), RecallError> {
    match command {
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
        Command::Forget => match app.agent.forget_last().await? {
            ForgetOutcome::Forgotten { .. } => println!("{}", "Last exchange forgotten.".dimmed()),
            ForgetOutcome::NothingToForget => println!("{}", "Nothing to forget.".dimmed()),
        },
        Command::Memorize(text) => {
            app.agent.memorize(&text).await?;
            println!("{}", MEMORIZED_REPLY.dimmed());
        }
        Command::Recall(text) => {
            app.agent
                .respond(&text, true, progress, print_chunk)
                .await?;
            println!("\n");
        }
        Command::Message(text) => {
            app.agent.message(&text, progress, print_chunk).await?;
            println!("\n");
        }
    }
    Ok(())
}

fn print_chunk(chunk: &str) {
    print!("{}", chunk.green());
    let _ = std::io::stdout().flush();
}

/// Terminal progress reporting for rebuilds and recall.
///
/// Planned queries are printed in yellow; each phase gets its own bar on
/// stderr, cleared when the phase ends.
#[derive(Default)]
pub struct ShellProgress {
    bar: Mutex<Option<ProgressBar>>,
    queries: AtomicUsize,
    finished: AtomicUsize,
    accepted: AtomicUsize,
}

impl ShellProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&self, len: usize, template: &str, message: &'static str) {
        let bar = ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut slot) = self.bar.lock()
            && let Some(old) = slot.replace(bar)
        {
            old.finish_and_clear();
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = self.bar.lock()
            && let Some(bar) = slot.as_ref()
        {
            f(bar);
        }
    }

    /// Remove any bar left behind by an aborted phase.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(bar) = slot.take()
        {
            bar.finish_and_clear();
        }
    }
}

impl RecallProgress for ShellProgress {
    fn queries_planned(&self, queries: &[String]) {
        for query in queries {
            println!("{}", format!("  searching: {query}").yellow());
        }
        self.queries.store(queries.len(), Ordering::SeqCst);
        self.finished.store(0, Ordering::SeqCst);
        self.accepted.store(0, Ordering::SeqCst);
        self.start(
            queries.len(),
            "{spinner} {msg} [{bar:30}] {pos}/{len}",
            "retrieving memories",
        );
    }

    fn query_finished(&self, _query: &str, _candidates: usize, accepted: usize) {
        let accepted = self.accepted.fetch_add(accepted, Ordering::SeqCst) + accepted;
        let finished = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
        self.with_bar(|bar| bar.inc(1));
        if finished >= self.queries.load(Ordering::SeqCst) {
            self.clear();
            println!(
                "{}",
                format!("{accepted} relevant memories added as context.").dimmed()
            );
        }
    }

    fn indexed(&self, done: usize, total: usize) {
        if done == 0 {
            if total == 0 {
                return;
            }
            self.start(
                total,
                "{spinner} {msg} [{bar:30}] {pos}/{len} ({eta})",
                "indexing memories",
            );
        }
        self.with_bar(|bar| bar.set_position(done as u64));
        if done >= total {
            self.clear();
        }
    }
}
