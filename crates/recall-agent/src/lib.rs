// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation layer of the Recall assistant.
//!
//! [`ConversationSession`] owns the message history and persists every
//! turn. [`MemoryAgent`] puts the recall pipeline and index maintenance on
//! top of it. [`Command`] parses shell input.

pub mod assistant;
pub mod command;
pub mod prompt;
pub mod session;

pub use assistant::{MemoryAgent, TurnReply};
pub use command::{Command, CommandError, HELP};
pub use prompt::load_system_prompt;
pub use session::{ConversationSession, ForgetOutcome, MEMORIZED_REPLY};
