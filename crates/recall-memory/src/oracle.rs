// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary relevance classification of retrieved snippets.

use std::sync::Arc;

use recall_core::types::CompletionRequest;
use recall_core::{ChatMessage, ProviderAdapter, RecallError};
use tracing::debug;

const ORACLE_INSTRUCTION: &str = "You decide whether a piece of remembered conversation is \
useful for answering a search query. Answer \"yes\" only if the context directly contains the \
information the query asks for. Otherwise answer \"no\". Reply with the single word yes or no.";

const YES_EXAMPLE: (&str, &str) = (
    "What is the user's name?",
    "user_input: My name is Priya, I work as a nurse ai_response: Nice to meet you, Priya!",
);

const NO_EXAMPLE: (&str, &str) = (
    "Which city does the user live in?",
    "user_input: Can you recommend a good sci-fi novel? ai_response: Try The Left Hand of Darkness.",
);

fn judgement_prompt(query: &str, candidate: &str) -> String {
    format!("SEARCH QUERY: {query}\nEMBEDDED CONTEXT: {candidate}")
}

/// Language-model backed relevance judge.
pub struct RelevanceOracle {
    provider: Arc<dyn ProviderAdapter>,
}

impl RelevanceOracle {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// Whether `candidate` answers the information need of `query`.
    ///
    /// Anything but a clear "yes" counts as irrelevant.
    pub async fn is_relevant(&self, query: &str, candidate: &str) -> Result<bool, RecallError> {
        let messages = vec![
            ChatMessage::system(ORACLE_INSTRUCTION),
            ChatMessage::user(judgement_prompt(YES_EXAMPLE.0, YES_EXAMPLE.1)),
            ChatMessage::assistant("yes"),
            ChatMessage::user(judgement_prompt(NO_EXAMPLE.0, NO_EXAMPLE.1)),
            ChatMessage::assistant("no"),
            ChatMessage::user(judgement_prompt(query, candidate)),
        ];
        let response = self
            .provider
            .complete(CompletionRequest::new(messages))
            .await?;

        let verdict = parse_verdict(&response.content);
        if !verdict && response.content.trim().to_lowercase() != "no" {
            debug!(query, output = %response.content.trim(), "ambiguous relevance verdict treated as no");
        }
        Ok(verdict)
    }
}

/// Fail-closed verdict parsing: true iff the output contains "yes".
pub fn parse_verdict(raw: &str) -> bool {
    raw.trim().to_lowercase().contains("yes")
}
