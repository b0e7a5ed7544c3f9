use crate::AppState;
use crate::api::handlers;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/research", post(handlers::research::research))
        .route(
            "/agents/research/messages",
            post(handlers::messages::research_message),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api-docs/openapi.json", get(handlers::openapi::openapi_json))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
