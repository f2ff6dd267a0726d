//! Liveness endpoint.

use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::schemas::chat::PingResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(ping), components(schemas(PingResponse)))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ping", get(ping))
}

/// Heartbeat endpoint. Returns `{"status": "ok"}` with HTTP 200.
#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses(
        (status = 200, description = "Server is alive", body = PingResponse)
    )
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".into(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
