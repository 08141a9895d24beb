//! HTTP transport seam.
//!
//! Nodes never talk to `reqwest` directly; they hand an [`HttpRequest`] to
//! whatever [`HttpTransport`] the execution context carries. Production code
//! uses [`ReqwestTransport`], tests use [`crate::mock::MockTransport`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A fully-built outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: &'static str,
    pub url: String,
    /// Header name/value pairs, sent in order.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: Value,
}

impl HttpRequest {
    /// Look up a header value by (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Build the fixed chat-completion request: `POST` with a JSON body and
/// bearer authorisation.
pub fn chat_request<P: Serialize>(
    url: impl Into<String>,
    api_key: &str,
    payload: &P,
) -> Result<HttpRequest, TransportError> {
    let body = serde_json::to_value(payload).map_err(|e| TransportError::Encode(e.to_string()))?;

    Ok(HttpRequest {
        method: "POST",
        url: url.into(),
        headers: vec![
            ("Authorization".to_string(), format!("Bearer {api_key}")),
            ("Content-Type".to_string(), "application/json".to_string()),
        ],
        body,
    })
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure of a single HTTP exchange.
///
/// Every variant is reduced to its message when captured as an item error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The request body could not be serialised.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// Connection refused, DNS failure, timeout, and friends.
    #[error("request failed: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("request failed with status code {status}: {body}")]
    Status { status: u16, body: String },

    /// A 2xx response whose body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Sends one request and returns the decoded JSON response body.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError>;
}

// ---------------------------------------------------------------------------
// reqwest implementation
// ---------------------------------------------------------------------------

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
///
/// Uses the client's default timeouts; nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-configured client (proxies, custom TLS, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<Value, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let body =
            serde_json::to_vec(&request.body).map_err(|e| TransportError::Encode(e.to_string()))?;

        let mut builder = self.client.request(method, request.url.as_str()).body(body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{} {} -> {}", request.method, request.url, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_to(url: String) -> HttpRequest {
        chat_request(url, "secret-key", &json!({ "messages": [] })).unwrap()
    }

    #[test]
    fn chat_request_sets_bearer_and_content_type() {
        let req = request_to("https://example.test/chat".into());
        assert_eq!(req.method, "POST");
        assert_eq!(req.header("authorization"), Some("Bearer secret-key"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body, json!({ "messages": [] }));
    }

    #[tokio::test]
    async fn success_returns_decoded_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer secret-key")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({ "messages": [] })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"result":{"content":"hello"}}"#)
            .create_async()
            .await;

        let body = ReqwestTransport::new()
            .send(request_to(format!("{}/chat", server.url())))
            .await
            .expect("request should succeed");

        mock.assert_async().await;
        assert_eq!(body["result"]["content"], "hello");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let err = ReqwestTransport::new()
            .send(request_to(format!("{}/chat", server.url())))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            TransportError::Status {
                status: 401,
                body: "invalid api key".into()
            }
        );
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = ReqwestTransport::new()
            .send(request_to(format!("{}/chat", server.url())))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error() {
        // Grab a free port, then release it so nothing is listening there.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = ReqwestTransport::new()
            .send(request_to(format!("http://127.0.0.1:{port}/chat")))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Network(_)));
    }
}
