//! Chat client core.
//!
//! A single call turns a model configuration and a conversation into reply
//! text. It runs four stages in order:
//! - provider inference from the configuration or the API base URL
//! - API key discovery (environment, config, compatible-mode aliases)
//! - dispatch of the `/chat/completions` request
//! - normalization of the response into display text
//!
//! Failures are folded into [`Reply::Error`] at the boundary so callers can
//! always print what they get back.

mod credential;
mod dispatch;
mod error;
mod normalize;
mod provider;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

pub use crate::message::{Message, Role};
pub use credential::{redact_key, resolve_credential, ApiKey, EnvLookup, KeySource, ProcessEnv};
pub use dispatch::{
    completions_url, ChatDispatcher, ChatRequest, HttpDispatcher, RawResponse, REQUEST_TIMEOUT,
    TEMPERATURE,
};
pub use error::{ChatError, ChatResult};
pub use normalize::{normalize, strip_reasoning, ResponseShape, UNPARSEABLE_LOCAL_RESPONSE};
pub use provider::{is_local, resolve_provider, ProviderId, LOCAL_PROVIDER, UNKNOWN_PROVIDER};

/// Configuration for one model entry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL, e.g. `https://api.deepseek.com/v1`.
    pub api_base: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Explicit provider name. Inferred from `api_base` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Inline API key, used when the provider's environment variable is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ModelConfig {
    pub fn new(api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            model: model.into(),
            provider: None,
            api_key: None,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_deref().map(redact_key))
            .finish()
    }
}

/// Outcome of a chat call, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The assistant's answer.
    Text(String),
    /// A human-readable description of what went wrong.
    Error(String),
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) | Reply::Error(text) => text,
        }
    }
}

impl From<ChatResult<String>> for Reply {
    fn from(result: ChatResult<String>) -> Self {
        match result {
            Ok(text) => Reply::Text(text),
            Err(e) => Reply::Error(format!("Error: {}", e)),
        }
    }
}

/// Client that sends conversations to whichever provider a config points at.
///
/// Holds no per-call state, so one client can serve any number of sessions.
#[derive(Clone)]
pub struct ChatClient {
    dispatcher: Arc<dyn ChatDispatcher>,
    env: Arc<dyn EnvLookup>,
}

impl ChatClient {
    /// Client using HTTP and the process environment.
    pub fn new() -> ChatResult<Self> {
        Ok(Self::with_parts(
            Arc::new(HttpDispatcher::new()?),
            Arc::new(ProcessEnv),
        ))
    }

    /// Client with explicit collaborators.
    pub fn with_parts(dispatcher: Arc<dyn ChatDispatcher>, env: Arc<dyn EnvLookup>) -> Self {
        Self { dispatcher, env }
    }

    /// Send `messages` and return the reply text, or the first failure.
    #[instrument(name = "chat", skip_all, fields(model = %config.model))]
    pub async fn complete(&self, config: &ModelConfig, messages: &[Message]) -> ChatResult<String> {
        let provider = resolve_provider(config)?;
        debug!(%provider, "resolved provider");

        let api_key = resolve_credential(&provider, config, self.env.as_ref())?;

        let request = ChatRequest::new(&config.model, messages);
        let response = self
            .dispatcher
            .dispatch(&config.api_base, &request, api_key.as_ref())
            .await?;

        if !response.is_success() {
            return Err(ChatError::Http {
                status: response.status,
                body: response.body,
            });
        }

        normalize(&config.api_base, &response.body)
    }

    /// Send `messages` and always come back with something printable.
    pub async fn send(&self, config: &ModelConfig, messages: &[Message]) -> Reply {
        let result = self.complete(config, messages).await;
        if let Err(e) = &result {
            error!(error = %e, "chat request failed");
        }
        Reply::from(result)
    }
}
