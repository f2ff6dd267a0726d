//! Transcript-level operations behind `/ask` and `/upload-docx`.

use tracing::info;

use crate::entities::{ChatMessage, Role, TranscriptStore};
use crate::error::ServerError;
use crate::services::completion::{CompletionClient, PromptMessage};
use crate::services::document;

/// Relay one user message and record the turn.
///
/// The stored transcript plus `message` is sent to the completion API. Only
/// when a reply comes back are the user message and the reply persisted,
/// together; a failed call leaves the transcript untouched.
pub async fn ask<S, C>(
    store: &S,
    client: &C,
    chat_id: &str,
    message: &str,
) -> Result<String, ServerError>
where
    S: TranscriptStore,
    C: CompletionClient + ?Sized,
{
    let mut history: Vec<PromptMessage> = store
        .load(chat_id)
        .await?
        .into_iter()
        .map(|m| PromptMessage::new(m.role, m.content))
        .collect();
    history.push(PromptMessage::new(Role::User.as_ref(), message));

    let reply = client.complete(&history).await?;

    store.append_turn(chat_id, message, &reply).await?;
    info!(chat_id, history_len = history.len(), reply_len = reply.len(), "turn recorded");
    Ok(reply)
}

/// Parse an uploaded `.docx` and append its text as a `system` message.
///
/// Parsing happens before any write, so a malformed payload stores nothing.
/// `max_part_bytes` bounds the decompressed document XML.
pub async fn ingest_document<S: TranscriptStore>(
    store: &S,
    chat_id: &str,
    filename: &str,
    bytes: Vec<u8>,
    max_part_bytes: u64,
) -> Result<ChatMessage, ServerError> {
    let text =
        tokio::task::spawn_blocking(move || document::extract_text(&bytes, max_part_bytes))
            .await
            .map_err(|e| ServerError::Internal(format!("document parser task failed: {e}")))??;

    let msg = store
        .append(chat_id, Role::System, &document_message(filename, &text))
        .await?;
    info!(chat_id, filename, chars = text.chars().count(), "document uploaded");
    Ok(msg)
}

/// Content of the `system` message recorded for an uploaded document.
pub fn document_message(filename: &str, text: &str) -> String {
    format!("Document uploaded: {filename}. Content:\n{text}")
}

// ── Tests ──────────────────────────────────────────────────────────────────────
