//! Sending chat-completion requests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::credential::ApiKey;
use super::{ChatError, ChatResult, Message};

/// Fixed timeout for one chat-completion request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f64 = 0.7;

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f64,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            temperature: TEMPERATURE,
        }
    }
}

/// Status and body of a provider response, whatever the status was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build the chat-completions endpoint for an API base.
pub fn completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

/// Something that can deliver a chat request to a provider.
///
/// Non-2xx statuses are returned as responses; only transport failures are
/// errors.
#[async_trait]
pub trait ChatDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        api_base: &str,
        request: &ChatRequest<'_>,
        api_key: Option<&ApiKey>,
    ) -> ChatResult<RawResponse>;
}

/// Dispatcher backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpDispatcher {
    client: Client,
    timeout: Duration,
}

impl HttpDispatcher {
    /// Create a dispatcher with the standard request timeout.
    pub fn new() -> ChatResult<Self> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    /// Create a dispatcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> ChatResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, timeout })
    }

    fn transport_error(&self, err: reqwest::Error) -> ChatError {
        ChatError::from_transport(err, self.timeout)
    }
}

#[async_trait]
impl ChatDispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        api_base: &str,
        request: &ChatRequest<'_>,
        api_key: Option<&ApiKey>,
    ) -> ChatResult<RawResponse> {
        let url = completions_url(api_base);
        debug!(url = %url, model = request.model, messages = request.messages.len(), "sending request");

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request);

        match api_key {
            Some(key) => {
                debug!(authorization = %key.redacted_header(), "request headers");
                builder = builder.header("Authorization", format!("Bearer {}", key.expose()));
            }
            None => debug!("request headers: no authorization"),
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(status, "received response");

        Ok(RawResponse { status, body })
    }
}
