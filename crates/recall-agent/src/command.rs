// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shell command table.

use thiserror::Error;

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/recall <text>`: answer with recalled memories as context.
    Recall(String),
    /// `/forget`: drop the last exchange.
    Forget,
    /// `/memorize <text>`: store text as a memory.
    Memorize(String),
    Help,
    Quit,
    /// Anything that is not a command.
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("usage: {usage}")]
    MissingArgument { usage: &'static str },
    #[error("usage: {usage} (takes no arguments)")]
    UnexpectedArgument { usage: &'static str },
}

#[derive(Clone, Copy)]
enum Kind {
    Recall,
    Forget,
    Memorize,
    Help,
    Quit,
}

struct Entry {
    word: &'static str,
    kind: Kind,
    usage: &'static str,
    takes_text: bool,
}

const COMMANDS: &[Entry] = &[
    Entry {
        word: "/recall",
        kind: Kind::Recall,
        usage: "/recall <message>",
        takes_text: true,
    },
    Entry {
        word: "/forget",
        kind: Kind::Forget,
        usage: "/forget",
        takes_text: false,
    },
    Entry {
        word: "/memorize",
        kind: Kind::Memorize,
        usage: "/memorize <text>",
        takes_text: true,
    },
    Entry {
        word: "/help",
        kind: Kind::Help,
        usage: "/help",
        takes_text: false,
    },
    Entry {
        word: "/quit",
        kind: Kind::Quit,
        usage: "/quit",
        takes_text: false,
    },
    Entry {
        word: "/exit",
        kind: Kind::Quit,
        usage: "/exit",
        takes_text: false,
    },
];

/// Shell help text.
pub const HELP: &str = "\
Commands:
  /recall <message>   answer using relevant memories from earlier conversations
  /forget             forget the last exchange
  /memorize <text>    store text as a memory
  /help               show this help
  /quit, /exit        leave the shell
Anything else is sent to the assistant as a plain message.";

impl Command {
    /// Parse one input line.
    ///
    /// The command word matches case-insensitively and must be followed by
    /// whitespace or the end of the line, so `/recalled` is a plain message.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let Some(entry) = COMMANDS.iter().find(|e| e.word.eq_ignore_ascii_case(word)) else {
            return Ok(Command::Message(line.to_string()));
        };

        match (entry.takes_text, rest.is_empty()) {
            (true, true) => {
                return Err(CommandError::MissingArgument { usage: entry.usage });
            }
            (false, false) => {
                return Err(CommandError::UnexpectedArgument { usage: entry.usage });
            }
            _ => {}
        }

        Ok(match entry.kind {
            Kind::Recall => Command::Recall(rest.to_string()),
            Kind::Forget => Command::Forget,
            Kind::Memorize => Command::Memorize(rest.to_string()),
            Kind::Help => Command::Help,
            Kind::Quit => Command::Quit,
        })
    }
}
