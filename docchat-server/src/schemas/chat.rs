use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::ChatMessage;

/// Response body for `GET /ping`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    /// Always `"ok"`.
    pub status: String,
}

/// Response body for `POST /start-chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartChatResponse {
    /// Freshly issued session id.
    pub chat_id: String,
}

/// Request body for `POST /ask`.
///
/// Both fields are optional at the wire level so that a missing field is
/// reported as a 400 with a specific message instead of a generic
/// deserialisation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AskRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response body for `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AskResponse {
    /// The assistant reply, as stored in the transcript.
    pub response: String,
}

/// Multipart form accepted by `POST /upload-docx`.
///
/// Only describes the request body in the OpenAPI document; the handler reads
/// the fields from [`axum::extract::Multipart`] directly, so this type is never
/// constructed.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocxForm {
    /// The `.docx` file.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Session the document text is attached to.
    pub chat_id: String,
}

/// Response body for `POST /upload-docx`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Always `"success"`.
    pub status: String,
    pub filename: String,
}

/// One transcript entry as returned by `GET /history/{chat_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

/// Response body for `GET /history/{chat_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub messages: Vec<HistoryMessage>,
}

impl ChatMessage {
    pub fn to_response(&self) -> HistoryMessage {
        HistoryMessage {
            role: self.role.clone(),
            content: self.content.clone(),
            timestamp: self.timestamp.to_rfc3339(),
        }
    }
}
