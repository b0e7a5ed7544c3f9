use crate::agents::{Agent, AgentMessage, MessageType};
use crate::research::SynthesisOrchestrator;
use crate::types::{AppError, ResearchRequest, ResearchResult, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

pub const RESEARCH_AGENT: &str = "research-agent";

/// Wraps the [`SynthesisOrchestrator`] behind the agent envelope.
///
/// Accepts `request` envelopes whose content is
/// `{"type": "research", "request": <ResearchRequest>}` and answers with
/// `{"type": "research-result", "result": <ResearchResult>}`.
pub struct ResearchAgent {
    orchestrator: Arc<SynthesisOrchestrator>,
}

impl ResearchAgent {
    pub fn new(orchestrator: Arc<SynthesisOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Direct call without an envelope. Errors propagate to the caller.
    pub async fn research(&self, request: &ResearchRequest) -> Result<ResearchResult> {
        self.orchestrator.synthesize(request).await
    }

    /// Error envelope for a body that is not a readable [`AgentMessage`].
    pub fn reject(&self, raw: &Value, reason: &str) -> AgentMessage {
        let err = AppError::InvalidInput(format!("malformed message envelope: {}", reason));
        tracing::warn!(error = %err, "Agent envelope rejected");
        AgentMessage::rejection(
            raw,
            RESEARCH_AGENT,
            json!({
                "error": err.to_string(),
                "errorType": error_kind(&err),
            }),
        )
    }

    async fn process(&self, message: &AgentMessage) -> Result<Value> {
        if message.message_type != MessageType::Request {
            return Err(AppError::UnsupportedMessage(format!(
                "message type '{}'",
                message.message_type
            )));
        }

        match message.content_type() {
            Some("research") => {
                let request = message.content.get("request").cloned().ok_or_else(|| {
                    AppError::InvalidInput("research content is missing 'request'".to_string())
                })?;
                let result = self.orchestrator.synthesize_json(request).await?;
                let result = serde_json::to_value(result)
                    .map_err(|e| AppError::Internal(format!("Failed to encode result: {}", e)))?;
                Ok(json!({ "type": "research-result", "result": result }))
            }
            Some(other) => Err(AppError::UnsupportedMessage(format!(
                "content type '{}'",
                other
            ))),
            None => Err(AppError::UnsupportedMessage(
                "content has no 'type'".to_string(),
            )),
        }
    }
}

/// Stable machine-readable name for an error kind.
fn error_kind(err: &AppError) -> &'static str {
    match err {
        AppError::UnsupportedResearchType(_) => "unsupported_research_type",
        AppError::UnsupportedMessage(_) => "unsupported_message",
        AppError::InvalidInput(_) => "invalid_input",
        AppError::Configuration(_) => "configuration",
        AppError::Retrieval { .. } => "retrieval",
        AppError::LLM(_) => "llm",
        AppError::Internal(_) => "internal",
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    fn name(&self) -> &str {
        RESEARCH_AGENT
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &["research"]
    }

    async fn handle(&self, message: AgentMessage) -> AgentMessage {
        match self.process(&message).await {
            Ok(content) => message.respond(content),
            Err(e) => {
                tracing::warn!(
                    sender = %message.sender,
                    message_id = %message.id,
                    error = %e,
                    "Research message rejected"
                );
                message.fail(json!({
                    "error": e.to_string(),
                    "errorType": error_kind(&e),
                }))
            }
        }
    }
}
