//! Errors produced while turning a conversation into a reply.

use std::time::Duration;

use thiserror::Error;

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Everything that can go wrong between configuration and reply text.
///
/// None of these are retried. At the boundary of the client they are rendered
/// into a human-readable string (see [`super::Reply`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// No provider token could be derived from the configuration.
    #[error(
        "unable to determine the API provider; set the `provider` field in the model \
         configuration or use a standard URL"
    )]
    UnresolvableProvider,

    /// The provider needs a key and none was found.
    #[error("{env_var} is not set and no api_key is configured for this model")]
    MissingCredential { env_var: String },

    /// The provider answered with a non-2xx status.
    #[error("API request failed (status {status}): {body}")]
    Http { status: u16, body: String },

    /// The request did not complete in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure.
    #[error("error calling the AI API: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("could not parse the API response: {0}")]
    Parse(String),
}

impl ChatError {
    /// The environment variable the user should set, if this is a credential error.
    pub fn missing_env_var(&self) -> Option<&str> {
        match self {
            Self::MissingCredential { env_var } => Some(env_var),
            _ => None,
        }
    }

    /// Classify a transport failure from a client configured with `timeout`.
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {}", err))
        } else {
            Self::Network(err.to_string())
        }
    }
}
