use axum::Json;
use utoipa::OpenApi;

use crate::routes::{chat, health, upload};

#[derive(OpenApi)]
#[openapi(info(
    title = "docchat-server",
    description = "Chat relay with document context",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(upload::UploadApi::openapi());
    root
}

/// Serve the OpenAPI document (`GET /api-docs/openapi.json`).
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(get_docs())
}
