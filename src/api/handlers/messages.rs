use crate::{
    AppState,
    agents::{Agent, AgentMessage},
};
use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;

/// Deliver an envelope to the research agent.
///
/// Always answers 200 with an envelope: failures, including bodies that are
/// not a valid envelope, come back as `messageType: "error"`.
#[utoipa::path(
    post,
    path = "/api/agents/research/messages",
    request_body = AgentMessage,
    responses(
        (status = 200, description = "Response or error envelope", body = AgentMessage)
    ),
    tag = "agents"
)]
pub async fn research_message(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Json<AgentMessage> {
    let reply = match AgentMessage::deserialize(&payload) {
        Ok(message) => state.research_agent.handle(message).await,
        Err(e) => state.research_agent.reject(&payload, &e.to_string()),
    };
    Json(reply)
}
