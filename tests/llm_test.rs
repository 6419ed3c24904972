//! End-to-end tests of the chat client against a mock HTTP server.
//!
//! The mock server listens on 127.0.0.1, so the full client always treats it
//! as a local model. Standard-shape parsing is covered by driving the
//! dispatcher directly and normalizing with a remote API base.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cao::llm::{
    normalize, ApiKey, ChatClient, ChatDispatcher, ChatError, ChatRequest, HttpDispatcher,
    KeySource, Message, ModelConfig, Reply, UNPARSEABLE_LOCAL_RESPONSE,
};
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Log sink shared between a test and its scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn client() -> ChatClient {
    ChatClient::with_parts(
        Arc::new(HttpDispatcher::new().unwrap()),
        Arc::new(HashMap::<String, String>::new()),
    )
}

fn conversation() -> Vec<Message> {
    vec![Message::system("You are Cao."), Message::user("Hello")]
}

#[tokio::test]
async fn test_local_model_roundtrip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "model": "qwen2.5-coder:7b",
            "messages": [
                {"role": "system", "content": "You are Cao."},
                {"role": "user", "content": "Hello"}
            ],
            "temperature": 0.7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "qwen2.5-coder:7b",
            "message": {"role": "assistant", "content": "<think>\nhmm\n</think>\n\nHi there"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ModelConfig::new(format!("{}/v1", server.uri()), "qwen2.5-coder:7b");
    let reply = client().send(&config, &conversation()).await;

    assert_eq!(reply, Reply::Text("Hi there".to_string()));
}

#[tokio::test]
async fn test_local_model_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": {"content": "ok"}
        })))
        .mount(&server)
        .await;

    let config = ModelConfig::new(server.uri(), "llama").with_api_key("sk-ignored-for-local");
    let reply = client().send(&config, &conversation()).await;
    assert_eq!(reply, Reply::Text("ok".to_string()));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_local_model_unrecognised_body_gives_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"done": true})))
        .mount(&server)
        .await;

    let config = ModelConfig::new(server.uri(), "llama");
    let reply = client().send(&config, &conversation()).await;
    assert_eq!(reply, Reply::Text(UNPARSEABLE_LOCAL_RESPONSE.to_string()));
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
        .mount(&server)
        .await;

    let config = ModelConfig::new(server.uri(), "missing-model");
    let err = client()
        .complete(&config, &conversation())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ChatError::Http {
            status: 404,
            body: "model not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_timeout_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": {"content": "late"}}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let dispatcher = HttpDispatcher::with_timeout(Duration::from_millis(50)).unwrap();
    let client = ChatClient::with_parts(Arc::new(dispatcher), Arc::new(HashMap::<String, String>::new()));
    let config = ModelConfig::new(server.uri(), "llama");

    let err = client.complete(&config, &conversation()).await.unwrap_err();
    assert_eq!(err, ChatError::Timeout(Duration::from_millis(50)));
    assert_eq!(err.to_string(), "request timed out after 50ms");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = ModelConfig::new(uri, "llama");
    let reply = client().send(&config, &conversation()).await;
    assert!(reply.is_error());
    assert!(reply.text().starts_with("Error: "));
}

#[tokio::test]
async fn test_dispatcher_sends_bearer_and_standard_body_normalizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-abcdef1234567890"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "<think>reasoning</think>Hello"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let messages = conversation();
    let request = ChatRequest::new("deepseek-chat", &messages);
    let key = ApiKey::new(
        "sk-abcdef1234567890",
        KeySource::Environment("DEEPSEEK_API_KEY".to_string()),
    );
    let response = HttpDispatcher::new()
        .unwrap()
        .dispatch(&format!("{}/v1", server.uri()), &request, Some(&key))
        .await
        .unwrap();

    assert!(response.is_success());
    assert_eq!(
        normalize("https://api.deepseek.com/v1", &response.body).unwrap(),
        "Hello"
    );
}

#[tokio::test]
async fn test_dispatcher_logs_only_redacted_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    // Current-thread test runtime, so the thread-local default covers the await.
    let _guard = tracing::subscriber::set_default(subscriber);

    let messages = conversation();
    let request = ChatRequest::new("deepseek-chat", &messages);
    let key = ApiKey::new(
        "sk-abcdef1234567890",
        KeySource::Environment("DEEPSEEK_API_KEY".to_string()),
    );
    HttpDispatcher::new()
        .unwrap()
        .dispatch(&server.uri(), &request, Some(&key))
        .await
        .unwrap();

    let output = logs.contents();
    assert!(output.contains("Bearer sk-a****7890"), "{output}");
    assert!(!output.contains("abcdef1234"), "{output}");
}
