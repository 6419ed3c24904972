//! Provider inference.
//!
//! There is no registry of provider adapters. A provider is a lowercase token
//! taken from the configuration or guessed from the shape of `api_base`, and it
//! is only ever used to name an environment variable and to recognise local
//! models.

use std::fmt;

use reqwest::Url;
use tracing::{debug, error};

use super::{ChatError, ChatResult, ModelConfig};

/// Provider used for anything served from the local machine.
pub const LOCAL_PROVIDER: &str = "ollama";

/// Provider used when `api_base` is not a parseable URL.
pub const UNKNOWN_PROVIDER: &str = "unknown";

/// Substrings of `api_base` that mark a local model server.
const LOCAL_MARKERS: &[&str] = &["localhost", "127.0.0.1"];

/// Second-level labels that never name a vendor.
const GENERIC_LABELS: &[&str] = &["com", "org", "net", "io"];

/// Leading path segments that never name a vendor.
const VERSION_SEGMENTS: &[&str] = &["v1", "v2", "v3", "api"];

/// Returns true when `api_base` points at the local machine.
pub fn is_local(api_base: &str) -> bool {
    LOCAL_MARKERS.iter().any(|marker| api_base.contains(marker))
}

/// Identifier of a chat provider, e.g. `openai` or `deepseek`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the local model provider.
    pub fn is_local(&self) -> bool {
        self.0 == LOCAL_PROVIDER
    }

    /// Name of the environment variable holding this provider's key.
    pub fn env_var_name(&self) -> String {
        format!("{}_API_KEY", self.0.to_uppercase())
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step of the URL heuristic. Rules are tried in order and the first
/// non-empty token wins.
struct UrlRule {
    name: &'static str,
    infer: fn(&Url) -> Option<String>,
}

const URL_RULES: &[UrlRule] = &[
    UrlRule {
        name: "domain",
        infer: from_domain,
    },
    UrlRule {
        name: "path",
        infer: from_path,
    },
    UrlRule {
        name: "hostname",
        infer: from_hostname,
    },
];

/// Determine the provider for a model configuration.
///
/// An explicit `provider` always wins. Otherwise local URLs map to
/// [`LOCAL_PROVIDER`], unparseable URLs map to [`UNKNOWN_PROVIDER`], and
/// everything else goes through the URL rules.
pub fn resolve_provider(config: &ModelConfig) -> ChatResult<ProviderId> {
    if let Some(explicit) = config.provider.as_deref().filter(|p| !p.is_empty()) {
        return Ok(ProviderId::new(explicit.to_lowercase()));
    }

    let api_base = config.api_base.as_str();
    if is_local(api_base) {
        debug!(api_base, "detected local model server");
        return Ok(ProviderId::new(LOCAL_PROVIDER));
    }

    let url = match Url::parse(api_base) {
        Ok(url) => url,
        Err(e) => {
            error!(api_base, "failed to parse API base URL: {}", e);
            return Ok(ProviderId::new(UNKNOWN_PROVIDER));
        }
    };
    debug!(host = url.host_str().unwrap_or(""), "inferring provider from URL");

    for rule in URL_RULES {
        if let Some(token) = (rule.infer)(&url) {
            debug!(rule = rule.name, provider = %token, "inferred provider");
            return Ok(ProviderId::new(token));
        }
    }

    Err(ChatError::UnresolvableProvider)
}

fn host(url: &Url) -> &str {
    url.host_str().unwrap_or("")
}

fn non_empty(token: &str) -> Option<String> {
    (!token.is_empty()).then(|| token.to_string())
}

/// `api.openai.com` -> `openai`, `chat.example.co.uk` -> `co`,
/// `foo.vendor.com` -> `vendor`.
fn from_domain(url: &Url) -> Option<String> {
    let labels: Vec<&str> = host(url).split('.').collect();
    if labels.len() < 2 {
        return None;
    }

    let second_last = labels[labels.len() - 2];
    if !GENERIC_LABELS.contains(&second_last) {
        non_empty(second_last)
    } else if labels.len() > 2 {
        non_empty(labels[labels.len() - 3])
    } else {
        None
    }
}

/// `http://gateway/deepseek/v1` -> `deepseek`.
fn from_path(url: &Url) -> Option<String> {
    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let first = path.split('/').next().unwrap_or("");
    if VERSION_SEGMENTS.contains(&first) {
        return None;
    }
    non_empty(first)
}

/// Last resort: the whole hostname, dots replaced with underscores.
fn from_hostname(url: &Url) -> Option<String> {
    non_empty(&host(url).replace('.', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_base: &str) -> ModelConfig {
        ModelConfig::new(api_base, "some-model")
    }

    fn resolve(api_base: &str) -> String {
        resolve_provider(&config(api_base)).unwrap().to_string()
    }

    #[test]
    fn test_explicit_provider_is_lowercased() {
        let mut cfg = config("https://api.openai.com/v1");
        cfg.provider = Some("DeepSeek".to_string());
        assert_eq!(resolve_provider(&cfg).unwrap().as_str(), "deepseek");
    }

    #[test]
    fn test_explicit_provider_beats_localhost() {
        let mut cfg = config("http://localhost:11434/v1");
        cfg.provider = Some("custom".to_string());
        assert_eq!(resolve_provider(&cfg).unwrap().as_str(), "custom");
    }

    #[test]
    fn test_empty_explicit_provider_is_ignored() {
        let mut cfg = config("https://api.openai.com/v1");
        cfg.provider = Some(String::new());
        assert_eq!(resolve_provider(&cfg).unwrap().as_str(), "openai");
    }

    #[test]
    fn test_vendor_api_hosts() {
        for vendor in ["openai", "deepseek", "mistral", "groq"] {
            assert_eq!(resolve(&format!("https://api.{vendor}.com/v1")), vendor);
        }
    }

    #[test]
    fn test_local_urls_resolve_to_ollama() {
        assert_eq!(resolve("http://localhost:11434/v1"), "ollama");
        assert_eq!(resolve("http://127.0.0.1:8080"), "ollama");
    }

    #[test]
    fn test_non_generic_second_level_label() {
        assert_eq!(
            resolve("https://dashscope.aliyuncs.com/compatible-mode/v1"),
            "aliyuncs"
        );
        assert_eq!(resolve("https://api.moonshot.cn/v1"), "moonshot");
    }

    #[test]
    fn test_generic_tld_uses_label_before_it() {
        assert_eq!(resolve("https://example.com/v1"), "example");
        assert_eq!(resolve("https://chat.vendor.io/v1"), "vendor");
    }

    #[test]
    fn test_generic_second_level_uses_third_label() {
        assert_eq!(resolve("https://chat.acme.com.org/v1"), "acme");
    }

    #[test]
    fn test_single_label_host_uses_path_then_hostname() {
        assert_eq!(resolve("http://gateway/deepseek/v1"), "deepseek");
        assert_eq!(resolve("http://gateway/api/chat"), "gateway");
    }

    #[test]
    fn test_malformed_url_is_unknown() {
        assert_eq!(resolve("not a url"), UNKNOWN_PROVIDER);
        assert_eq!(resolve("api.openai.com/v1"), UNKNOWN_PROVIDER);
    }

    #[test]
    fn test_unresolvable_when_every_rule_is_empty() {
        let err = resolve_provider(&config("file:///")).unwrap_err();
        assert_eq!(err, ChatError::UnresolvableProvider);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let cfg = config("https://api.deepseek.com/v1");
        assert_eq!(resolve_provider(&cfg), resolve_provider(&cfg));
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(ProviderId::new("deepseek").env_var_name(), "DEEPSEEK_API_KEY");
        assert_eq!(ProviderId::new("example_com").env_var_name(), "EXAMPLE_COM_API_KEY");
    }

    #[test]
    fn test_is_local() {
        assert!(is_local("http://localhost:11434"));
        assert!(is_local("http://127.0.0.1:1234/v1"));
        assert!(!is_local("https://api.openai.com/v1"));
        assert!(ProviderId::new(LOCAL_PROVIDER).is_local());
    }
}
