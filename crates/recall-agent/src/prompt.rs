// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt resolution.

use recall_config::model::AgentConfig;
use recall_core::RecallError;
use tracing::info;

/// Resolve the system prompt: `system_prompt_file`, then `system_prompt`,
/// then a built-in default naming the assistant.
///
/// A configured prompt file that cannot be read is a configuration error.
pub async fn load_system_prompt(config: &AgentConfig) -> Result<String, RecallError> {
    if let Some(ref file_path) = config.system_prompt_file {
        let content = tokio::fs::read_to_string(file_path).await.map_err(|e| {
            RecallError::Config(format!("cannot read system prompt file `{file_path}`: {e}"))
        })?;
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            info!(path = file_path.as_str(), "loaded system prompt from file");
            return Ok(trimmed.to_string());
        }
    }

    if let Some(ref prompt) = config.system_prompt
        && !prompt.trim().is_empty()
    {
        return Ok(prompt.clone());
    }

    Ok(default_system_prompt(&config.name))
}

fn default_system_prompt(name: &str) -> String {
    format!(
        "You are {name}, an assistant with long-term memory of earlier conversations with this \
         user. Some user messages begin with a MEMORIES section listing past exchanges that may \
         help with the request after USER INPUT. Use those memories when they are relevant, \
         ignore them when they are not, and never mention the memory mechanism itself. If no \
         memories are given, answer normally."
    )
}
