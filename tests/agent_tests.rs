//! Research agent behind the message envelope.

mod common;

use common::mocks::*;
use serde_json::json;
use std::sync::Arc;
use synthesis::agents::research::RESEARCH_AGENT;
use synthesis::agents::{Agent, AgentMessage, MessageType, Priority, ResearchAgent};
use synthesis::retrieval::Collaborators;
use synthesis::types::{AppError, ResearchRequest, ResearchType};

fn agent(llm: Arc<MockLLMClient>, web: Arc<MockWebSearch>) -> ResearchAgent {
    ResearchAgent::new(Arc::new(orchestrator(
        llm,
        Collaborators::new(web, MockDeepResearch::failing()),
    )))
}

fn tesla_web() -> Arc<MockWebSearch> {
    MockWebSearch::returning(vec![document(
        "Tesla Q3 deliveries beat expectations",
        "https://news.example.com/tesla-q3",
        "Record quarter",
        0.9,
    )])
}

#[tokio::test]
async fn test_research_message_round_trip() {
    let agent = agent(MockLLMClient::scripted(tesla_responses), tesla_web());
    let request = AgentMessage::request(
        "portfolio-agent",
        RESEARCH_AGENT,
        json!({
            "type": "research",
            "request": {"topic": "Tesla", "researchType": "web-search"}
        }),
    )
    .with_priority(Priority::Low);

    let reply = agent.handle(request.clone()).await;

    assert_eq!(reply.message_type, MessageType::Response);
    assert_eq!(reply.sender, RESEARCH_AGENT);
    assert_eq!(reply.recipient, "portfolio-agent");
    assert_eq!(reply.conversation_id, request.conversation_id);
    assert_eq!(reply.request_id, request.request_id);
    assert_ne!(reply.id, request.id);
    assert_eq!(reply.priority, Priority::Low);
    assert_eq!(reply.content_type(), Some("research-result"));
    assert_eq!(
        reply.content["result"]["summary"],
        "Tesla delivered a record quarter."
    );
    assert_eq!(
        reply.content["result"]["keyFindings"].as_array().unwrap().len(),
        3
    );
}

#[tokio::test]
async fn test_unsupported_content_type_rejected() {
    let llm = MockLLMClient::scripted(tesla_responses);
    let web = tesla_web();
    let agent = agent(llm.clone(), web.clone());
    let request = AgentMessage::request("ops", RESEARCH_AGENT, json!({"type": "translate"}));

    let reply = agent.handle(request).await;

    assert_eq!(reply.message_type, MessageType::Error);
    assert_eq!(reply.priority, Priority::High);
    assert_eq!(reply.content["errorType"], "unsupported_message");
    assert!(reply.content["error"].as_str().unwrap().contains("translate"));
    assert_eq!(llm.calls(), 0);
    assert_eq!(web.calls(), 0);
}

#[tokio::test]
async fn test_non_request_message_rejected() {
    let agent = agent(MockLLMClient::scripted(tesla_responses), tesla_web());
    let mut message = AgentMessage::request(
        "ops",
        RESEARCH_AGENT,
        json!({"type": "research", "request": {"topic": "Tesla", "researchType": "web-search"}}),
    );
    message.message_type = MessageType::Notification;

    let reply = agent.handle(message).await;

    assert_eq!(reply.message_type, MessageType::Error);
    assert_eq!(reply.content["errorType"], "unsupported_message");
}

#[tokio::test]
async fn test_missing_request_payload() {
    let agent = agent(MockLLMClient::scripted(tesla_responses), tesla_web());
    let reply = agent
        .handle(AgentMessage::request("ops", RESEARCH_AGENT, json!({"type": "research"})))
        .await;

    assert_eq!(reply.content["errorType"], "invalid_input");
}

#[tokio::test]
async fn test_unsupported_research_type_in_envelope() {
    let agent = agent(MockLLMClient::scripted(tesla_responses), tesla_web());
    let reply = agent
        .handle(AgentMessage::request(
            "ops",
            RESEARCH_AGENT,
            json!({"type": "research", "request": {"topic": "Tesla", "researchType": "horoscope"}}),
        ))
        .await;

    assert_eq!(reply.message_type, MessageType::Error);
    assert_eq!(reply.content["errorType"], "unsupported_research_type");
}

#[tokio::test]
async fn test_retrieval_failure_becomes_error_reply() {
    let agent = agent(MockLLMClient::scripted(tesla_responses), MockWebSearch::failing());
    let reply = agent
        .handle(AgentMessage::request(
            "ops",
            RESEARCH_AGENT,
            json!({"type": "research", "request": {"topic": "Tesla", "researchType": "web-search"}}),
        ))
        .await;

    assert_eq!(reply.content["errorType"], "retrieval");
}

#[tokio::test]
async fn test_direct_research_propagates_errors() {
    let agent = agent(MockLLMClient::scripted(tesla_responses), MockWebSearch::failing());
    let err = agent
        .research(&ResearchRequest::new("Tesla", ResearchType::WebSearch))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Retrieval { .. }));
}

#[test]
fn test_agent_identity() {
    let agent = agent(MockLLMClient::new("{}"), tesla_web());
    assert_eq!(agent.name(), RESEARCH_AGENT);
    assert_eq!(agent.capabilities(), &["research"]);
}
