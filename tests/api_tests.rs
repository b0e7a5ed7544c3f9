//! HTTP surface tests over the full router.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::mocks::*;
use serde_json::{Value, json};
use std::sync::Arc;
use synthesis::api::routes::create_router;
use synthesis::retrieval::Collaborators;
use synthesis::{AppState, ConfigManager, EngineConfig};

fn server_with(llm: Arc<MockLLMClient>, web: Arc<MockWebSearch>) -> TestServer {
    let engine = orchestrator(llm, Collaborators::new(web, MockDeepResearch::failing()));
    let state = AppState::new(ConfigManager::from_config(EngineConfig::default()), engine);
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(
        MockLLMClient::scripted(tesla_responses),
        MockWebSearch::returning(vec![document(
            "Tesla Q3 deliveries beat expectations",
            "https://news.example.com/tesla-q3",
            "Record quarter",
            0.9,
        )]),
    )
}

#[tokio::test]
async fn test_health() {
    let response = server().get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "llama3.2");
}

#[tokio::test]
async fn test_research_endpoint() {
    let response = server()
        .post("/api/research")
        .json(&json!({"topic": "Tesla stock analysis", "researchType": "web-search"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["summary"], "Tesla delivered a record quarter.");
    assert_eq!(body["keyFindings"].as_array().unwrap().len(), 3);
    assert_eq!(body["sources"][0]["url"], "https://news.example.com/tesla-q3");
    assert!(body["confidence"].as_f64().unwrap() > 0.0);
    assert!(body.get("executionTimeMs").is_some());
}

#[tokio::test]
async fn test_research_endpoint_rejects_unknown_type() {
    let llm = MockLLMClient::scripted(tesla_responses);
    let web = MockWebSearch::returning(vec![]);
    let server = server_with(llm.clone(), web.clone());

    let response = server
        .post("/api/research")
        .json(&json!({"topic": "Tesla", "researchType": "crystal-ball"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("crystal-ball"));
    assert_eq!(llm.calls(), 0);
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_research_endpoint_maps_retrieval_failure() {
    let server = server_with(
        MockLLMClient::scripted(tesla_responses),
        MockWebSearch::failing(),
    );

    let response = server
        .post("/api/research")
        .json(&json!({"topic": "Tesla", "researchType": "web-search"}))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_proprietary_without_corpus_is_server_error() {
    let response = server()
        .post("/api/research")
        .json(&json!({"topic": "Tesla", "researchType": "proprietary-analysis"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_message_endpoint() {
    let response = server()
        .post("/api/agents/research/messages")
        .json(&json!({
            "conversationId": "conv-42",
            "requestId": "req-7",
            "sender": "portfolio-agent",
            "recipient": "research-agent",
            "messageType": "request",
            "content": {
                "type": "research",
                "request": {"topic": "Tesla", "researchType": "web-search"}
            }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["messageType"], "response");
    assert_eq!(body["conversationId"], "conv-42");
    assert_eq!(body["requestId"], "req-7");
    assert_eq!(body["recipient"], "portfolio-agent");
    assert_eq!(body["content"]["type"], "research-result");
}

#[tokio::test]
async fn test_message_endpoint_error_envelope() {
    let response = server()
        .post("/api/agents/research/messages")
        .json(&json!({
            "sender": "ops",
            "recipient": "research-agent",
            "messageType": "request",
            "content": {"type": "summarize"}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["messageType"], "error");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["content"]["errorType"], "unsupported_message");
}

#[tokio::test]
async fn test_message_endpoint_answers_bad_envelope_with_error() {
    let response = server()
        .post("/api/agents/research/messages")
        .json(&json!({
            "recipient": "research-agent",
            "requestId": "req-42",
            "messageType": "request",
            "content": {"type": "research"}
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["messageType"], "error");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["sender"], "research-agent");
    assert_eq!(body["recipient"], "unknown");
    assert_eq!(body["requestId"], "req-42");
    assert_eq!(body["content"]["errorType"], "invalid_input");
}

#[tokio::test]
async fn test_openapi_document() {
    let response = server().get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"].get("/api/research").is_some());
    assert!(body["paths"].get("/health").is_some());
}
