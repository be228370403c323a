// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query planning: decompose one utterance into atomic search queries.

use std::collections::HashSet;
use std::sync::Arc;

use recall_core::types::CompletionRequest;
use recall_core::{ChatMessage, ProviderAdapter, RecallError};
use thiserror::Error;
use tracing::debug;

const PLANNER_INSTRUCTION: &str = "You turn a user's message into the search queries needed to \
find relevant earlier conversations in a vector database. Each query must be short and ask for \
exactly one piece of information. Reply with a bracketed list of quoted strings, for example \
[\"first query\", \"second query\"], and nothing else: no explanation, no numbering, no prose.";

const EXAMPLES: [(&str, &str); 2] = [
    (
        "Write me an email to my car insurance company asking them to lower my premium.",
        r#"["What is the user's name?", "Which car insurance company does the user have?", "What car does the user drive?", "What is the user's current premium?"]"#,
    ),
    (
        "How do I move my text-to-speech setup over to the new API we discussed?",
        r#"["Which text-to-speech library does the user use?", "Which new text-to-speech API did we discuss?", "What language is the user's project written in?"]"#,
    ),
];

/// Language-model backed query planner.
pub struct QueryPlanner {
    provider: Arc<dyn ProviderAdapter>,
}

impl QueryPlanner {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// Plan search queries for `user_input`. Never returns an empty list.
    ///
    /// Unparseable model output falls back to `[user_input]`; service errors
    /// are returned.
    pub async fn plan(&self, user_input: &str) -> Result<Vec<String>, RecallError> {
        let response = self
            .provider
            .complete(CompletionRequest::new(planner_messages(user_input)))
            .await?;
        Ok(queries_or_fallback(&response.content, user_input))
    }
}

fn planner_messages(user_input: &str) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(PLANNER_INSTRUCTION)];
    for (input, queries) in EXAMPLES {
        messages.push(ChatMessage::user(input));
        messages.push(ChatMessage::assistant(queries));
    }
    messages.push(ChatMessage::user(user_input));
    messages
}

/// Parse raw planner output, falling back to `[user_input]` on any failure.
pub fn queries_or_fallback(raw: &str, user_input: &str) -> Vec<String> {
    match parse_query_list(raw) {
        Ok(queries) => queries,
        Err(e) => {
            debug!(error = %e, "planner output unusable; searching with the raw input");
            vec![user_input.to_string()]
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PlanParseError {
    #[error("expected `[` at offset {0}")]
    MissingOpen(usize),
    #[error("expected a quoted string at offset {0}")]
    ExpectedString(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unknown escape `\\{0}`")]
    BadEscape(char),
    #[error("expected `,` or `]` at offset {0}")]
    ExpectedSeparator(usize),
    #[error("unexpected trailing input at offset {0}")]
    TrailingInput(usize),
    #[error("no usable queries")]
    Empty,
}

/// Strict parser for `[ "a", 'b', ]`-style string lists.
///
/// Entries are trimmed; blank and repeated entries are dropped.
pub(crate) fn parse_query_list(raw: &str) -> Result<Vec<String>, PlanParseError> {
    let text = strip_code_fence(raw.trim());
    let mut parser = Parser {
        chars: text.char_indices().collect(),
        pos: 0,
    };

    let items = parser.list()?;
    parser.skip_ws();
    if let Some(offset) = parser.offset() {
        return Err(PlanParseError::TrailingInput(offset));
    }

    let mut seen = HashSet::new();
    let queries: Vec<String> = items
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty() && seen.insert(q.clone()))
        .collect();
    if queries.is_empty() {
        return Err(PlanParseError::Empty);
    }
    Ok(queries)
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // The info string ("json", "python") ends at the first newline, unless the
    // list itself starts on the fence line.
    let body = match rest.split_once('\n') {
        Some((first, tail)) if !first.trim_start().starts_with('[') => tail,
        _ => rest,
    };
    body.trim()
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> Option<usize> {
        self.chars.get(self.pos).map(|(i, _)| *i)
    }

    fn here(&self) -> usize {
        self.offset()
            .unwrap_or_else(|| self.chars.last().map_or(0, |(i, c)| i + c.len_utf8()))
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn list(&mut self) -> Result<Vec<String>, PlanParseError> {
        self.skip_ws();
        if self.peek() != Some('[') {
            return Err(PlanParseError::MissingOpen(self.here()));
        }
        self.pos += 1;

        let mut items = Vec::new();
        self.skip_ws();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(items);
        }

        loop {
            self.skip_ws();
            items.push(self.string()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    self.skip_ws();
                    if self.peek() == Some(']') {
                        self.pos += 1;
                        return Ok(items);
                    }
                }
                Some(']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(PlanParseError::ExpectedSeparator(self.here())),
            }
        }
    }

    fn string(&mut self) -> Result<String, PlanParseError> {
        let start = self.here();
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(PlanParseError::ExpectedString(start)),
        };
        self.pos += 1;

        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(PlanParseError::UnterminatedString(start));
            };
            self.pos += 1;
            match c {
                '\\' => {
                    let escaped = self
                        .peek()
                        .ok_or(PlanParseError::UnterminatedString(start))?;
                    self.pos += 1;
                    out.push(match escaped {
                        '\\' => '\\',
                        '\'' => '\'',
                        '"' => '"',
                        'n' => '\n',
                        't' => '\t',
                        other => return Err(PlanParseError::BadEscape(other)),
                    });
                }
                c if c == quote => return Ok(out),
                c => out.push(c),
            }
        }
    }
}
