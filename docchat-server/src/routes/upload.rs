//! Document upload route.
//!
//! Accepts a `.docx` via multipart/form-data together with the `chat_id` it
//! belongs to. The extracted text is stored as a single `system` message so
//! that later `/ask` calls send it to the model as context.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::{UploadDocxForm, UploadResponse};
use crate::services::chat;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(upload_docx), components(schemas(UploadDocxForm, UploadResponse)))]
pub struct UploadApi;

/// Register upload routes. `max_body_bytes` bounds the whole request.
pub fn router(max_body_bytes: usize) -> Router<Arc<AppState>> {
    Router::new().route(
        "/upload-docx",
        post(upload_docx).layer(DefaultBodyLimit::max(max_body_bytes)),
    )
}

/// Attach a document's text to a chat (`POST /upload-docx`).
#[utoipa::path(
    post,
    path = "/upload-docx",
    tag = "documents",
    request_body(content = UploadDocxForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Document stored as context", body = UploadResponse),
        (status = 400, description = "Missing file or chat_id"),
        (status = 413, description = "Upload or its decompressed content too large"),
        (status = 500, description = "Document could not be parsed"),
    )
)]
pub async fn upload_docx(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut chat_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("document.docx").to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                debug!(file_name = %file_name, size_bytes = bytes.len(), "received file upload");
                file = Some((file_name, bytes.to_vec()));
            }
            "chat_id" => {
                chat_id = Some(field.text().await.map_err(multipart_error)?);
            }
            other => debug!(field = %other, "ignoring unknown multipart field"),
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ServerError::BadRequest("Missing file".into()))?;
    let chat_id = chat_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Invalid or missing chat_id".into()))?;

    chat::ingest_document(
        state.store.as_ref(),
        &chat_id,
        &file_name,
        bytes,
        state.config.max_document_part_bytes(),
    )
    .await?;

    Ok(Json(UploadResponse {
        status: "success".into(),
        filename: file_name,
    }))
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
    }
}
