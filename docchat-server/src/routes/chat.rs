//! Session, completion-relay and history routes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::entities::TranscriptStore;
use crate::error::ServerError;
use crate::schemas::chat::{
    AskRequest, AskResponse, HistoryMessage, HistoryResponse, StartChatResponse,
};
use crate::services::{chat, session};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(start_chat, ask, history),
    components(schemas(
        StartChatResponse,
        AskRequest,
        AskResponse,
        HistoryMessage,
        HistoryResponse
    ))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start-chat", post(start_chat))
        .route("/ask", post(ask))
        .route("/history/{chat_id}", get(history))
}

/// Issue a new chat session id (`POST /start-chat`).
#[utoipa::path(
    post,
    path = "/start-chat",
    tag = "chat",
    responses(
        (status = 200, description = "Session id issued", body = StartChatResponse),
    )
)]
pub async fn start_chat() -> Json<StartChatResponse> {
    Json(StartChatResponse {
        chat_id: session::issue_chat_id(),
    })
}

/// Relay a user message to the completion API (`POST /ask`).
///
/// The full stored transcript is sent along with the new message. The turn
/// is persisted only if a reply is obtained. The body is read as JSON whatever
/// its `Content-Type`.
#[utoipa::path(
    post,
    path = "/ask",
    tag = "chat",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Reply generated", body = AskResponse),
        (status = 400, description = "Missing chat_id or message"),
        (status = 500, description = "Completion API or storage failure"),
    )
)]
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AskResponse>, ServerError> {
    let req: AskRequest = serde_json::from_slice(&body)
        .map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let chat_id = req
        .chat_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Invalid or missing chat_id".into()))?;
    let message = req
        .message
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Missing message".into()))?;

    debug!(chat_id = %chat_id, message_len = message.len(), "ask request");

    let response = chat::ask(
        state.store.as_ref(),
        state.completions.as_ref(),
        &chat_id,
        &message,
    )
    .await?;
    Ok(Json(AskResponse { response }))
}

/// Full transcript of a session, oldest first (`GET /history/{chat_id}`).
///
/// Unknown sessions return an empty list.
#[utoipa::path(
    get,
    path = "/history/{chat_id}",
    tag = "chat",
    params(
        ("chat_id" = String, Path, description = "Session whose transcript to return")
    ),
    responses(
        (status = 200, description = "Transcript retrieved", body = HistoryResponse),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let messages = state.store.load(&chat_id).await?;
    Ok(Json(HistoryResponse {
        messages: messages.iter().map(|m| m.to_response()).collect(),
    }))
}
