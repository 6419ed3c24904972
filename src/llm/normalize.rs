//! Extracting display text from a provider response.

use serde_json::Value;
use tracing::debug;

use super::provider::is_local;
use super::{ChatError, ChatResult};

/// Returned when a local model response has no recognisable content.
pub const UNPARSEABLE_LOCAL_RESPONSE: &str = "Could not parse the local model response";

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// The two response layouts we understand.
///
/// Chosen from the API base alone, never from the response content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Ollama-style `{"message": {"content": ...}}`, with a lenient fallback.
    Local,
    /// OpenAI-style `{"choices": [{"message": {"content": ...}}]}`.
    Standard,
}

impl ResponseShape {
    pub fn for_api_base(api_base: &str) -> Self {
        if is_local(api_base) {
            Self::Local
        } else {
            Self::Standard
        }
    }
}

/// Turn a successful response body into the text shown to the user.
pub fn normalize(api_base: &str, body: &str) -> ChatResult<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ChatError::Parse(format!("response is not valid JSON: {}", e)))?;

    let content = match ResponseShape::for_api_base(api_base) {
        ResponseShape::Local => local_content(&value),
        ResponseShape::Standard => standard_content(&value)?,
    };

    Ok(strip_reasoning(&content))
}

fn choice_content(value: &Value) -> Option<&str> {
    value.pointer("/choices/0/message/content")?.as_str()
}

fn local_content(value: &Value) -> String {
    if let Some(content) = value.pointer("/message/content").and_then(Value::as_str) {
        debug!("parsed local model response");
        return content.to_string();
    }

    debug!("local response has no message.content, trying choices");
    match choice_content(value) {
        Some(content) if !content.is_empty() => content.to_string(),
        _ => UNPARSEABLE_LOCAL_RESPONSE.to_string(),
    }
}

fn standard_content(value: &Value) -> ChatResult<String> {
    debug!("parsing standard chat-completion response");
    choice_content(value)
        .map(str::to_string)
        .ok_or_else(|| ChatError::Parse("missing choices[0].message.content".to_string()))
}

/// Drop a `<think>...</think>` block at the very start of `content`, then trim.
///
/// Blocks anywhere else are kept. An unterminated opening tag is kept too.
pub fn strip_reasoning(content: &str) -> String {
    let rest = content
        .strip_prefix(THINK_OPEN)
        .and_then(|inner| inner.find(THINK_CLOSE).map(|end| &inner[end + THINK_CLOSE.len()..]))
        .unwrap_or(content);
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REMOTE: &str = "https://api.deepseek.com/v1";
    const LOCAL: &str = "http://localhost:11434/v1";

    #[test]
    fn test_standard_shape_strips_think() {
        let body = r#"{"choices":[{"message":{"content":"<think>reasoning</think>Hello"}}]}"#;
        assert_eq!(normalize(REMOTE, body).unwrap(), "Hello");
    }

    #[test]
    fn test_local_shape() {
        let body = r#"{"message":{"content":"Hi there"}}"#;
        assert_eq!(normalize(LOCAL, body).unwrap(), "Hi there");
    }

    #[test]
    fn test_local_shape_falls_back_to_choices() {
        let body = r#"{"choices":[{"message":{"content":"  from choices \n"}}]}"#;
        assert_eq!(normalize(LOCAL, body).unwrap(), "from choices");
    }

    #[test]
    fn test_local_shape_placeholder() {
        assert_eq!(normalize(LOCAL, "{}").unwrap(), UNPARSEABLE_LOCAL_RESPONSE);
        let empty_choice = r#"{"choices":[{"message":{"content":""}}]}"#;
        assert_eq!(
            normalize(LOCAL, empty_choice).unwrap(),
            UNPARSEABLE_LOCAL_RESPONSE
        );
    }

    #[test]
    fn test_local_empty_message_content_is_kept() {
        let body = r#"{"message":{"content":""}}"#;
        assert_eq!(normalize(LOCAL, body).unwrap(), "");
    }

    #[test]
    fn test_standard_shape_without_choices_is_parse_error() {
        let err = normalize(REMOTE, r#"{"message":{"content":"Hi"}}"#).unwrap_err();
        assert!(matches!(err, ChatError::Parse(_)));

        let err = normalize(REMOTE, r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ChatError::Parse(_)));

        let err = normalize(REMOTE, r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert!(matches!(err, ChatError::Parse(_)));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(normalize(REMOTE, "oops"), Err(ChatError::Parse(_))));
        assert!(matches!(normalize(LOCAL, "oops"), Err(ChatError::Parse(_))));
    }

    #[test]
    fn test_shape_selected_by_url_only() {
        assert_eq!(ResponseShape::for_api_base(LOCAL), ResponseShape::Local);
        assert_eq!(
            ResponseShape::for_api_base("http://127.0.0.1:1234"),
            ResponseShape::Local
        );
        assert_eq!(ResponseShape::for_api_base(REMOTE), ResponseShape::Standard);
    }

    #[test]
    fn test_strip_reasoning_multiline() {
        let text = "<think>\nstep one\nstep two\n</think>\n\nAnswer";
        assert_eq!(strip_reasoning(text), "Answer");
    }

    #[test]
    fn test_strip_reasoning_only_at_start() {
        assert_eq!(
            strip_reasoning("Hello <think>x</think> world"),
            "Hello <think>x</think> world"
        );
        assert_eq!(strip_reasoning(" <think>x</think>y"), "<think>x</think>y");
    }

    #[test]
    fn test_strip_reasoning_stops_at_first_close() {
        assert_eq!(
            strip_reasoning("<think>a</think>b<think>c</think>d"),
            "b<think>c</think>d"
        );
    }

    #[test]
    fn test_strip_reasoning_unterminated() {
        assert_eq!(strip_reasoning("<think>never closed"), "<think>never closed");
    }

    #[test]
    fn test_strip_reasoning_is_case_sensitive() {
        assert_eq!(strip_reasoning("<THINK>x</THINK>y"), "<THINK>x</THINK>y");
    }
}
