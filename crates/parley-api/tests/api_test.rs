//! Router-level tests: the full middleware stack with a fake completion client

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use parley_api::{build_router, AppState, Config};
use parley_llm::{CompletionClient, CompletionPayload, FoundryClient, UpstreamError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Clone, Copy)]
enum Outcome {
    Reply,
    Unauthorized,
    RateLimited,
    Timeout,
    ServerError,
    Panic,
    Slow,
}

/// Records every payload and answers with a fixed outcome
struct FakeClient {
    outcome: Outcome,
    seen: Mutex<Vec<CompletionPayload>>,
}

impl FakeClient {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn send(&self, payload: &CompletionPayload) -> Result<String, UpstreamError> {
        self.seen.lock().unwrap().push(payload.clone());
        match self.outcome {
            Outcome::Reply => Ok("Hi there".to_string()),
            Outcome::Unauthorized => Err(UpstreamError::from_status(401, "bad key xyz".into())),
            Outcome::RateLimited => Err(UpstreamError::from_status(429, String::new())),
            Outcome::Timeout => Err(UpstreamError::Timeout(Duration::from_secs(30))),
            Outcome::ServerError => Err(UpstreamError::from_status(502, "gateway".into())),
            Outcome::Panic => panic!("client exploded"),
            Outcome::Slow => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok("too late".to_string())
            }
        }
    }
}

fn test_vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
    let mut vars: HashMap<String, String> = [
        ("AZURE_AI_ENDPOINT", "https://test.openai.azure.com/chat/completions"),
        ("AZURE_AI_API_KEY", "test-key"),
    ]
    .iter()
    .chain(extra.iter())
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    vars.insert("ENV".to_string(), "test".to_string());
    vars
}

fn test_config() -> Config {
    let mut config = Config::from_env(test_vars(&[])).unwrap();
    config.server.static_dir = "does-not-exist".into();
    config
}

fn app_with(config: Config, client: Arc<dyn CompletionClient>) -> Router {
    build_router(Arc::new(AppState::new(config, client)))
}

fn app(client: Arc<FakeClient>) -> Router {
    app_with(test_config(), client)
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_chat_success() {
    let client = FakeClient::new(Outcome::Reply);
    let response = app(client.clone())
        .oneshot(chat_request(json!({
            "message": "Hello",
            "conversation_history": [
                {"role": "user", "content": "Earlier"},
                {"role": "assistant", "content": "Reply"}
            ]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], "Hi there");
    assert!(body["conversation_id"].as_str().unwrap().parse::<i64>().is_ok());

    let seen = client.seen.lock().unwrap();
    let messages = &seen[0].messages;
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].content, "Earlier");
    assert_eq!(messages[3].content, "Hello");
    assert!(seen[0].data_sources.is_empty());
}

#[tokio::test]
async fn test_chat_with_retrieval_attaches_data_source() {
    let client = FakeClient::new(Outcome::Reply);
    let mut config = Config::from_env(test_vars(&[
        ("AZURE_SEARCH_ENDPOINT", "https://search.example.net"),
        ("AZURE_SEARCH_INDEX", "docs"),
        ("AZURE_SEARCH_API_KEY", "search-key"),
    ]))
    .unwrap();
    config.server.static_dir = "does-not-exist".into();

    let response = app_with(config, client.clone())
        .oneshot(chat_request(json!({"message": "What does the handbook say?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(client.seen.lock().unwrap()[0].data_sources.len(), 1);
}

#[tokio::test]
async fn test_missing_message_rejected_without_upstream_call() {
    for body in [
        json!({}),
        json!({"message": ""}),
        json!({"message": 42}),
        json!({"message": null}),
    ] {
        let client = FakeClient::new(Outcome::Reply);
        let response = app(client.clone()).oneshot(chat_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Message is required and must be a string");
        assert_eq!(client.calls(), 0);
    }
}

#[tokio::test]
async fn test_malformed_history_rejected() {
    let client = FakeClient::new(Outcome::Reply);
    let response = app(client.clone())
        .oneshot(chat_request(json!({
            "message": "Hello",
            "conversation_history": [{"role": "narrator", "content": "x"}]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_invalid_json_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app(FakeClient::new(Outcome::Reply)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let mut config = test_config();
    config.server.body_limit_bytes = 64;
    let client = FakeClient::new(Outcome::Reply);

    let response = app_with(config, client.clone())
        .oneshot(chat_request(json!({"message": "x".repeat(1024)})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failures_mapped() {
    let cases = [
        (Outcome::Unauthorized, StatusCode::UNAUTHORIZED, "Invalid API key or unauthorized access"),
        (Outcome::RateLimited, StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded. Please try again later."),
        (Outcome::Timeout, StatusCode::REQUEST_TIMEOUT, "Request timeout. Please try again."),
        (Outcome::ServerError, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error. Please try again later."),
    ];

    for (outcome, status, message) in cases {
        let client = FakeClient::new(outcome);
        let response = app(client.clone())
            .oneshot(chat_request(json!({"message": "Hello"})))
            .await
            .unwrap();

        assert_eq!(response.status(), status);
        let body = json_body(response).await;
        assert_eq!(body["error"], message);
        assert_eq!(client.calls(), 1, "no retries");
    }
}

#[tokio::test]
async fn test_unauthorized_message_mentions_unauthorized() {
    let response = app(FakeClient::new(Outcome::Unauthorized))
        .oneshot(chat_request(json!({"message": "Hello"})))
        .await
        .unwrap();

    let body = json_body(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("unauthorized"));
    assert!(!error.contains("xyz"));
}

#[tokio::test]
async fn test_panic_becomes_generic_500() {
    let response = app(FakeClient::new(Outcome::Panic))
        .oneshot(chat_request(json!({"message": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Something went wrong!");
}

#[tokio::test]
async fn test_request_timeout_is_json_408() {
    let mut config = test_config();
    config.server.request_timeout_secs = 1;

    let response = app_with(config, FakeClient::new(Outcome::Slow))
        .oneshot(chat_request(json!({"message": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json_body(response).await["error"], "Request timeout. Please try again.");
}

#[tokio::test]
async fn test_health() {
    let response = app(FakeClient::new(Outcome::Reply))
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_unknown_routes_are_json_404() {
    let requests = [
        Request::get("/api/unknown").body(Body::empty()).unwrap(),
        Request::get("/api/chat").body(Body::empty()).unwrap(),
        Request::post("/api/health").body(Body::empty()).unwrap(),
        Request::post("/missing.html").body(Body::empty()).unwrap(),
    ];

    for request in requests {
        let uri = request.uri().clone();
        let response = app(FakeClient::new(Outcome::Reply)).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(json_body(response).await["error"], "Endpoint not found");
    }
}

#[tokio::test]
async fn test_static_index_served_with_security_headers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Parley</h1>").unwrap();

    let mut config = test_config();
    config.server.static_dir = dir.path().to_path_buf();

    let response = app_with(config, FakeClient::new(Outcome::Reply))
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
    assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>Parley</h1>");
}

#[tokio::test]
async fn test_end_to_end_against_mock_upstream() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"From upstream"}}]}"#)
        .create_async()
        .await;

    let mut config = Config::from_env(test_vars(&[])).unwrap();
    config.azure_ai_endpoint = format!("{}/chat/completions", server.url());
    config.server.static_dir = "does-not-exist".into();

    let client = FoundryClient::from_config(&config.upstream_config()).unwrap();
    let response = app_with(config, Arc::new(client))
        .oneshot(chat_request(json!({"message": "Hello"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["response"], "From upstream");
    mock.assert_async().await;
}
