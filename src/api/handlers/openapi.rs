use crate::api::ApiDoc;
use axum::Json;
use utoipa::OpenApi;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
