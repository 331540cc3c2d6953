//! HTTP-level tests for the Azure OpenAI provider against an in-process server

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use finchat_domain::CompletionProvider;
use finchat_llm::{AzureOpenAiProvider, CompletionConfig, LlmError};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::net::TcpListener;

const CHAT_PATH: &str = "/openai/deployments/GPT4o-API/chat/completions";

/// Start a server on an ephemeral port and return its base URL
async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn provider_for(base_url: &str) -> AzureOpenAiProvider {
    AzureOpenAiProvider::new(CompletionConfig::new(base_url, "test-key")).unwrap()
}

/// Echoes what it received so the test can inspect the request shape
async fn echo_handler(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let summary = json!({
        "api_key": headers.get("api-key").and_then(|v| v.to_str().ok()),
        "api_version": params.get("api-version"),
        "body": body,
    });
    Json(json!({
        "choices": [
            { "message": { "role": "assistant", "content": summary.to_string() } }
        ]
    }))
}

#[tokio::test]
async fn test_complete_sends_two_message_exchange() {
    let base = spawn_server(Router::new().route(CHAT_PATH, post(echo_handler))).await;
    let provider = provider_for(&base);

    let raw = provider
        .complete("You are a helpful assistant.", "What was revenue?")
        .await
        .unwrap();
    let echoed: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(echoed["api_key"], "test-key");
    assert_eq!(echoed["api_version"], "2023-05-15");
    let body = &echoed["body"];
    assert_eq!(body["max_tokens"], 1000);
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are a helpful assistant.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "What was revenue?");
}

#[tokio::test]
async fn test_unauthorized_maps_to_status_error() {
    let app = Router::new().route(
        CHAT_PATH,
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": { "code": "401", "message": "Access denied" } })),
            )
        }),
    );
    let provider = provider_for(&spawn_server(app).await);

    let result = provider.complete("sys", "prompt").await;
    assert_eq!(
        result,
        Err(LlmError::Status {
            status: 401,
            message: "Access denied".to_string()
        })
    );
}

#[tokio::test]
async fn test_rate_limit_is_distinguished() {
    let app = Router::new().route(
        CHAT_PATH,
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exhausted") }),
    );
    let provider = provider_for(&spawn_server(app).await);

    let result = provider.complete("sys", "prompt").await;
    assert_eq!(result, Err(LlmError::RateLimitExceeded("quota exhausted".into())));
}

#[tokio::test]
async fn test_empty_choices_is_empty_response() {
    let app = Router::new().route(CHAT_PATH, post(|| async { Json(json!({ "choices": [] })) }));
    let provider = provider_for(&spawn_server(app).await);

    let result = provider.complete("sys", "prompt").await;
    assert_eq!(result, Err(LlmError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let app = Router::new().route(CHAT_PATH, post(|| async { "not json" }));
    let provider = provider_for(&spawn_server(app).await);

    let result = provider.complete("sys", "prompt").await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}
