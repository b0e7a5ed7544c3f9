//! HTTP API Handlers and Routes
//!
//! The REST surface of the engine, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/research` - Run a research request directly
//! - `POST /api/agents/research/messages` - Send an envelope to the research agent
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! Direct research errors use HTTP status codes (400 for bad requests, 502 for
//! failed retrieval). The message endpoint always answers `200`; failures are
//! carried as `error` envelopes.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Research Synthesis Engine API",
        description = "Topic research across web, deep, market and proprietary sources"
    ),
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::research::research,
        crate::api::handlers::messages::research_message,
    ),
    components(schemas(
        crate::api::handlers::health::HealthResponse,
        crate::types::ResearchRequest,
        crate::types::ResearchParameters,
        crate::types::ResearchType,
        crate::types::ResearchDepth,
        crate::types::Timeframe,
        crate::types::ResearchResult,
        crate::types::ResearchSource,
        crate::types::Trend,
        crate::types::TrendDirection,
        crate::types::TrendStrength,
        crate::types::Pattern,
        crate::types::PredictiveValue,
        crate::types::MarketInsights,
        crate::types::ProprietaryInsights,
        crate::agents::AgentMessage,
        crate::agents::Priority,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "research", description = "Research synthesis"),
        (name = "agents", description = "Inter-agent messaging"),
    )
)]
pub struct ApiDoc;
