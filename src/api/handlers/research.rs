use crate::{
    AppState,
    types::{ResearchRequest, ResearchResult, Result},
};
use axum::{Json, extract::State};
use serde_json::Value;

/// Run one research request
///
/// The body is taken as raw JSON so an unknown `researchType` is reported as
/// an unsupported research type rather than a generic deserialization error.
#[utoipa::path(
    post,
    path = "/api/research",
    request_body = ResearchRequest,
    responses(
        (status = 200, description = "Research completed", body = ResearchResult),
        (status = 400, description = "Invalid request or unsupported research type"),
        (status = 502, description = "A retrieval collaborator failed")
    ),
    tag = "research"
)]
pub async fn research(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<ResearchResult>> {
    let result = state.orchestrator.synthesize_json(payload).await?;
    Ok(Json(result))
}
