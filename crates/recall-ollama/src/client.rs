// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama native API.
//!
//! Provides [`OllamaClient`] which handles request construction, bounded
//! timeouts, error body decoding and NDJSON streaming. There is no retry
//! logic: a failed call fails the current turn.
//!
//! `timeout_secs` bounds each plain request as a whole. A streamed chat reply
//! may run longer; for it the same value is the longest silence allowed
//! between two reads.

use std::net::IpAddr;
use std::time::Duration;

use recall_config::model::OllamaConfig;
use recall_core::{ChunkStream, RecallError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::stream;
use crate::types::{
    ApiErrorResponse, ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, TagsResponse,
};

/// Which collaborator a request serves; selects the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Service {
    Chat,
    Embedding,
}

impl Service {
    pub(crate) fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> RecallError {
        match self {
            Service::Chat => RecallError::Provider { message, source },
            Service::Embedding => RecallError::Embedding { message, source },
        }
    }
}

/// HTTP client for Ollama communication.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Creates a client from the `[ollama]` config section.
    ///
    /// The base URL is normalized and a warning is logged when it points at a
    /// non-local host.
    pub fn new(config: &OllamaConfig) -> Result<Self, RecallError> {
        let base_url = normalize_base_url(&config.base_url);
        if !is_local_url(&base_url) {
            warn!(
                base_url = %base_url,
                "ollama.base_url points to a non-local host; conversation text will leave this machine"
            );
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .read_timeout(timeout)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| RecallError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The normalized base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/chat` without streaming.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, RecallError> {
        let mut req = request.clone();
        req.stream = false;
        let response = self
            .post(Service::Chat, "/api/chat", &req, Some(self.timeout))
            .await?;
        let body: ChatResponse = self.read_json(Service::Chat, response).await?;
        if let Some(error) = body.error {
            return Err(Service::Chat.error(format!("Ollama error: {error}"), None));
        }
        Ok(body)
    }

    /// `POST /api/chat` with `stream: true`, decoded frame by frame.
    pub async fn chat_stream(&self, request: &ChatRequest) -> Result<ChunkStream, RecallError> {
        let mut req = request.clone();
        req.stream = true;
        let response = self.post(Service::Chat, "/api/chat", &req, None).await?;
        Ok(stream::parse_ndjson_stream(response, self.timeout))
    }

    /// `POST /api/embed` for a batch of texts.
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, RecallError> {
        let response = self
            .post(Service::Embedding, "/api/embed", request, Some(self.timeout))
            .await?;
        self.read_json(Service::Embedding, response).await
    }

    /// `GET /api/tags`: names of the locally available models.
    pub async fn list_models(&self) -> Result<Vec<String>, RecallError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(Service::Chat, e, self.timeout))?;
        let response = check_status(Service::Chat, response).await?;
        let tags: TagsResponse = self.read_json(Service::Chat, response).await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// `total` caps the whole exchange, body included; `None` leaves only the
    /// client's idle read timeout.
    async fn post<T: Serialize>(
        &self,
        service: Service,
        path: &str,
        body: &T,
        total: Option<Duration>,
    ) -> Result<reqwest::Response, RecallError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.post(&url).json(body);
        if let Some(total) = total {
            request = request.timeout(total);
        }
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(service, e, self.timeout))?;
        debug!(status = %response.status(), path, "Ollama response received");
        check_status(service, response).await
    }

    async fn read_json<R: DeserializeOwned>(
        &self,
        service: Service,
        response: reqwest::Response,
    ) -> Result<R, RecallError> {
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(service, e, self.timeout))?;
        serde_json::from_str(&body).map_err(|e| {
            service.error(
                format!("failed to parse Ollama response: {e}"),
                Some(Box::new(e)),
            )
        })
    }
}

/// Turn a non-2xx response into an error carrying the service's message.
async fn check_status(
    service: Service,
    response: reqwest::Response,
) -> Result<reqwest::Response, RecallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) => format!("Ollama returned {status}: {}", api_err.error),
        Err(_) => format!("Ollama returned {status}: {body}"),
    };
    Err(service.error(message, None))
}

/// Map a transport failure, reporting client timeouts as [`RecallError::Timeout`].
pub(crate) fn transport_error(
    service: Service,
    e: reqwest::Error,
    timeout: Duration,
) -> RecallError {
    if e.is_timeout() {
        return RecallError::Timeout { duration: timeout };
    }
    service.error(
        format!("HTTP request to Ollama failed: {e}"),
        Some(Box::new(e)),
    )
}

/// Strip trailing slashes and an OpenAI-compatible `/v1` suffix.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// Whether `url` points at this machine. Unparseable URLs count as local so
/// they fail on use rather than warn here.
pub fn is_local_url(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return true;
    };
    match parsed.host_str() {
        None => true,
        Some(host) if host.eq_ignore_ascii_case("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::ChatMessage;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(&OllamaConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            ..OllamaConfig::default()
        })
        .unwrap()
    }

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "llama3".into(),
            messages: vec![ChatMessage::user("Hello")],
            stream: false,
        }
    }

    #[test]
    fn normalize_strips_slashes_and_v1() {
        assert_eq!(normalize_base_url("http://localhost:11434/"), "http://localhost:11434");
        assert_eq!(normalize_base_url("http://localhost:11434/v1"), "http://localhost:11434");
        assert_eq!(normalize_base_url("http://localhost:11434/v1/"), "http://localhost:11434");
        assert_eq!(normalize_base_url("http://host:11434"), "http://host:11434");
    }

    #[test]
    fn local_url_detection() {
        assert!(is_local_url("http://localhost:11434"));
        assert!(is_local_url("http://127.0.0.1:11434"));
        assert!(is_local_url("http://[::1]:11434"));
        assert!(!is_local_url("http://gpu-box.lan:11434"));
        assert!(!is_local_url("http://10.0.0.5:11434"));
    }

    #[tokio::test]
    async fn chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({"model": "llama3", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "message": {"role": "assistant", "content": "Hi there!"},
                "done": true,
                "done_reason": "stop"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.chat(&test_request()).await.unwrap();
        assert_eq!(response.message.unwrap().content, "Hi there!");
        assert_eq!(response.done_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn chat_error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"error": "model 'llama3' not found"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.chat(&test_request()).await.unwrap_err();
        assert!(matches!(err, RecallError::Provider { .. }));
        assert!(err.to_string().contains("not found"), "got: {err}");
    }

    #[tokio::test]
    async fn chat_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.chat(&test_request()).await.is_err());
    }

    #[tokio::test]
    async fn slow_response_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({"done": true})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(&OllamaConfig {
            base_url: server.uri(),
            timeout_secs: 1,
            ..OllamaConfig::default()
        })
        .unwrap();
        let err = client.chat(&test_request()).await.unwrap_err();
        assert!(matches!(err, RecallError::Timeout { .. }), "got: {err:?}");
        assert!(err.is_service_unavailable());
    }

    /// Serve one chunked NDJSON response, sleeping before each frame.
    async fn drip_server(frames: Vec<(Duration, &'static str)>) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    return;
                }
            }

            let head = "HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\n\
                        transfer-encoding: chunked\r\n\r\n";
            socket.write_all(head.as_bytes()).await.unwrap();
            for (delay, frame) in frames {
                tokio::time::sleep(delay).await;
                let chunk = format!("{:x}\r\n{frame}\n\r\n", frame.len() + 1);
                if socket.write_all(chunk.as_bytes()).await.is_err() {
                    return;
                }
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });
        format!("http://{addr}")
    }

    fn one_second_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(&OllamaConfig {
            base_url: base_url.to_string(),
            timeout_secs: 1,
            ..OllamaConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn long_stream_outlives_request_timeout() {
        use futures::StreamExt;

        let frame = r#"{"message":{"role":"assistant","content":"word "},"done":false}"#;
        let pause = Duration::from_millis(400);
        let base_url = drip_server(vec![
            (Duration::ZERO, frame),
            (pause, frame),
            (pause, frame),
            (pause, frame),
            (pause, r#"{"done":true}"#),
        ])
        .await;

        let client = one_second_client(&base_url);
        let mut stream = client.chat_stream(&test_request()).await.unwrap();
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            reply.push_str(&chunk.unwrap().text);
        }
        assert_eq!(reply, "word word word word ");
    }

    #[tokio::test]
    async fn stalled_stream_times_out() {
        use futures::StreamExt;

        let frame = r#"{"message":{"role":"assistant","content":"Hel"},"done":false}"#;
        let base_url = drip_server(vec![
            (Duration::ZERO, frame),
            (Duration::from_secs(3), r#"{"done":true}"#),
        ])
        .await;

        let client = one_second_client(&base_url);
        let mut stream = client.chat_stream(&test_request()).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().text, "Hel");
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err, RecallError::Timeout { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn embed_errors_use_embedding_variant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"error": "boom"})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .embed(&EmbedRequest {
                model: "nomic-embed-text".into(),
                input: vec!["x".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RecallError::Embedding { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn list_models_reads_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama3:latest"}, {"name": "nomic-embed-text:latest"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["llama3:latest", "nomic-embed-text:latest"]);
    }

    #[tokio::test]
    async fn unreachable_host_is_provider_error() {
        // Port 9 (discard) is closed on test machines.
        let client = test_client("http://127.0.0.1:9");
        let err = client.chat(&test_request()).await.unwrap_err();
        assert!(err.is_service_unavailable(), "got: {err:?}");
    }
}
