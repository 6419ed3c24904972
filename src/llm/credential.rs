//! API key discovery and redaction.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use super::provider::{is_local, ProviderId};
use super::{ChatError, ChatResult, ModelConfig};

/// Marker that compatible-mode endpoints carry in their URL.
const COMPATIBLE_MODE_MARKER: &str = "compatible-mode";

/// Vendors reachable through a compatible-mode endpoint whose key lives under
/// their own name rather than the domain-derived provider's.
const COMPATIBLE_ALIASES: &[(&str, &str)] = &[
    ("dashscope", "DASHSCOPE_API_KEY"),
    ("baichuan", "BAICHUAN_API_KEY"),
];

/// Mask placed in the middle of a redacted key.
const MASK: &str = "****";

/// Source of environment variables.
///
/// The client never reads the process environment directly so that key
/// discovery can be exercised with an in-memory map.
pub trait EnvLookup: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Where a key was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// `<PROVIDER>_API_KEY`.
    Environment(String),
    /// `api_key` in the model configuration.
    Config,
    /// A vendor alias for a compatible-mode endpoint.
    CompatibleAlias(String),
}

/// A resolved API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    value: String,
    source: KeySource,
}

impl ApiKey {
    pub fn new(value: impl Into<String>, source: KeySource) -> Self {
        Self {
            value: value.into(),
            source,
        }
    }

    /// The raw key, for the Authorization header.
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> &KeySource {
        &self.source
    }

    /// The key with its middle masked.
    pub fn redacted(&self) -> String {
        redact_key(&self.value)
    }

    /// `Bearer <redacted>`, safe to log.
    pub fn redacted_header(&self) -> String {
        format!("Bearer {}", self.redacted())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &self.redacted())
            .field("source", &self.source)
            .finish()
    }
}

/// Mask a key for display: first 4 and last 4 characters survive when the key
/// is longer than 10 characters, otherwise nothing does.
pub fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 10 {
        return MASK.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{MASK}{tail}")
}

/// Find the API key for `provider`, or `None` when none is needed.
///
/// Lookup order: `<PROVIDER>_API_KEY`, the configured `api_key`, then the
/// vendor aliases for compatible-mode URLs. Empty values count as absent.
pub fn resolve_credential(
    provider: &ProviderId,
    config: &ModelConfig,
    env: &dyn EnvLookup,
) -> ChatResult<Option<ApiKey>> {
    let api_base = config.api_base.as_str();
    if provider.is_local() || is_local(api_base) {
        debug!(%provider, "local model, no API key required");
        return Ok(None);
    }

    let env_var = provider.env_var_name();
    debug!(%provider, env_var = %env_var, "looking up API key");
    if let Some(key) = non_empty(env.var(&env_var)) {
        return Ok(Some(ApiKey::new(key, KeySource::Environment(env_var))));
    }

    if let Some(key) = non_empty(config.api_key.clone()) {
        debug!("using API key from model configuration");
        return Ok(Some(ApiKey::new(key, KeySource::Config)));
    }

    if api_base.contains(COMPATIBLE_MODE_MARKER) {
        let alias = COMPATIBLE_ALIASES
            .iter()
            .find(|(vendor, _)| api_base.contains(vendor));
        if let Some((_, alias_var)) = alias {
            debug!(env_var = alias_var, "compatible-mode endpoint, trying vendor key");
            if let Some(key) = non_empty(env.var(alias_var)) {
                return Ok(Some(ApiKey::new(
                    key,
                    KeySource::CompatibleAlias(alias_var.to_string()),
                )));
            }
        }
    }

    Err(ChatError::MissingCredential { env_var })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
