// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NDJSON stream decoder for streamed `/api/chat` responses.
//!
//! Ollama sends one JSON object per line. Byte chunks from the HTTP body do
//! not respect line boundaries, so partial lines are buffered until their
//! newline arrives.

use std::time::Duration;

use futures::future;
use futures::stream::{self, StreamExt};
use recall_core::types::StreamChunk;
use recall_core::{ChunkStream, RecallError};

use crate::client::{transport_error, Service};
use crate::types::ChatResponse;

/// Accumulates bytes and yields complete, non-blank lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append `bytes` and drain every complete line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                lines.push(text.to_string());
            }
        }
        lines
    }

    /// Flush a final line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Decode one NDJSON frame into a chunk.
pub fn decode_line(line: &str) -> Result<StreamChunk, RecallError> {
    let frame: ChatResponse = serde_json::from_str(line).map_err(|e| RecallError::Provider {
        message: format!("malformed stream frame: {e}"),
        source: Some(Box::new(e)),
    })?;
    if let Some(error) = frame.error {
        return Err(RecallError::Provider {
            message: format!("Ollama error: {error}"),
            source: None,
        });
    }
    Ok(StreamChunk {
        text: frame.message.map(|m| m.content).unwrap_or_default(),
        done: frame.done,
    })
}

/// Convert a streaming response body into a stream of [`StreamChunk`]s.
pub fn parse_ndjson_stream(response: reqwest::Response, timeout: Duration) -> ChunkStream {
    let chunks = response
        .bytes_stream()
        .map(Some)
        // Sentinel so the scan can flush an unterminated last line.
        .chain(stream::once(future::ready(None)))
        .scan(LineBuffer::default(), move |lines, item| {
            let decoded: Vec<Result<StreamChunk, RecallError>> = match item {
                Some(Ok(bytes)) => lines.push(&bytes).iter().map(|l| decode_line(l)).collect(),
                Some(Err(e)) => vec![Err(transport_error(Service::Chat, e, timeout))],
                None => lines.finish().iter().map(|l| decode_line(l)).collect(),
            };
            future::ready(Some(stream::iter(decoded)))
        })
        .flatten();

    Box::pin(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn line_buffer_joins_split_lines() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"{\"done\":").is_empty());
        let lines = buf.push(b"false}\n{\"done\":true}\n");
        assert_eq!(lines, vec!["{\"done\":false}", "{\"done\":true}"]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn line_buffer_skips_blank_lines_and_flushes_tail() {
        let mut buf = LineBuffer::default();
        assert_eq!(buf.push(b"\n\r\n{\"a\":1}\n{\"b\"").len(), 1);
        assert_eq!(buf.push(b":2}").len(), 0);
        assert_eq!(buf.finish().as_deref(), Some("{\"b\":2}"));
    }

    #[test]
    fn decode_line_extracts_text() {
        let chunk =
            decode_line(r#"{"message":{"role":"assistant","content":"Hel"},"done":false}"#).unwrap();
        assert_eq!(chunk.text, "Hel");
        assert!(!chunk.done);
    }

    #[test]
    fn decode_line_surfaces_stream_error() {
        let err = decode_line(r#"{"error":"out of memory"}"#).unwrap_err();
        assert!(err.to_string().contains("out of memory"));
    }

    #[test]
    fn decode_line_rejects_garbage() {
        assert!(decode_line("not json").is_err());
    }

    #[tokio::test]
    async fn full_stream_decodes_all_frames() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hello\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\", Austin\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"done_reason\":\"stop\"}"
        );
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-ndjson")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let response = reqwest::get(&server.uri()).await.unwrap();
        let chunks: Vec<_> = parse_ndjson_stream(response, Duration::from_secs(5))
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        let text: String = chunks
            .iter()
            .map(|c| c.as_ref().unwrap().text.as_str())
            .collect();
        assert_eq!(text, "Hello, Austin");
        assert!(chunks[2].as_ref().unwrap().done);
    }
}
