// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation history backed by the persistent interaction log.
//!
//! History always starts with exactly one system message. Every completed
//! turn appends one user-role message (the raw input, or the memory context
//! message built from it) and one assistant reply, and persists the raw
//! `(input, reply)` pair.

use std::sync::Arc;

use futures::StreamExt;
use recall_core::types::CompletionRequest;
use recall_core::{ChatMessage, ProviderAdapter, RecallError, Role, StorageAdapter};
use recall_memory::{format_context, RecalledMemories};
use tracing::{debug, info, warn};

/// Reply persisted for `memorize` requests.
pub const MEMORIZED_REPLY: &str = "Memory saved.";

/// Result of [`ConversationSession::forget_last`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgetOutcome {
    /// The latest exchange was removed from history. `interaction_id` is the
    /// deleted row, `None` if the store was already empty.
    Forgotten { interaction_id: Option<i64> },
    /// History held no complete exchange; nothing changed.
    NothingToForget,
}

/// A single conversation with the assistant.
pub struct ConversationSession {
    provider: Arc<dyn ProviderAdapter>,
    storage: Arc<dyn StorageAdapter>,
    history: Vec<ChatMessage>,
}

impl ConversationSession {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        storage: Arc<dyn StorageAdapter>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            storage,
            history: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Number of user and assistant messages.
    pub fn turn_messages(&self) -> usize {
        self.history.iter().filter(|m| m.role != Role::System).count()
    }

    /// Run one turn: append the user message, stream the reply through
    /// `on_chunk`, append it and persist `(user_input, reply)`.
    ///
    /// With non-empty `recalled` memories the user message is the memory
    /// context message. On any failure the turn's messages are removed
    /// again and the error is returned.
    pub async fn send<F>(
        &mut self,
        user_input: &str,
        recalled: Option<&RecalledMemories>,
        mut on_chunk: F,
    ) -> Result<String, RecallError>
    where
        F: FnMut(&str) + Send,
    {
        let content = match recalled {
            Some(memories) if !memories.is_empty() => format_context(memories, user_input),
            _ => user_input.to_string(),
        };

        let mark = self.history.len();
        self.history.push(ChatMessage::user(content));
        match self.complete_turn(user_input, &mut on_chunk).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                self.history.truncate(mark);
                warn!(error = %e, "turn failed; history rolled back");
                Err(e)
            }
        }
    }

    async fn complete_turn<F>(
        &mut self,
        user_input: &str,
        on_chunk: &mut F,
    ) -> Result<String, RecallError>
    where
        F: FnMut(&str) + Send,
    {
        let request = CompletionRequest::new(self.history.clone());
        let mut stream = self.provider.stream(request).await?;

        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if !chunk.text.is_empty() {
                on_chunk(&chunk.text);
                reply.push_str(&chunk.text);
            }
            if chunk.done {
                break;
            }
        }
        let reply = reply.trim().to_string();

        self.history.push(ChatMessage::assistant(reply.clone()));
        let id = self.storage.insert_interaction(user_input, &reply).await?;
        debug!(interaction_id = id, "turn persisted");
        Ok(reply)
    }

    /// Delete the latest persisted interaction and drop the latest exchange
    /// from history.
    ///
    /// With fewer than two user/assistant messages in history this does
    /// nothing at all, storage included.
    pub async fn forget_last(&mut self) -> Result<ForgetOutcome, RecallError> {
        if self.turn_messages() < 2 {
            debug!("nothing to forget");
            return Ok(ForgetOutcome::NothingToForget);
        }

        let interaction_id = self.storage.delete_most_recent_interaction().await?;
        if interaction_id.is_none() {
            warn!("interaction store was empty while history was not");
        }
        let keep = self.history.len() - 2;
        self.history.truncate(keep);
        info!(?interaction_id, "last exchange forgotten");
        Ok(ForgetOutcome::Forgotten { interaction_id })
    }

    /// Persist `text` as a memory without a model call or history change.
    pub async fn memorize(&self, text: &str) -> Result<i64, RecallError> {
        let id = self.storage.insert_interaction(text, MEMORIZED_REPLY).await?;
        info!(interaction_id = id, "memory saved");
        Ok(id)
    }
}
