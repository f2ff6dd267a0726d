use std::future::Future;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::SqliteConnection;

use crate::entities::{ChatMessage, Role, SqliteStore};

/// Append-only, session-scoped message log.
pub trait TranscriptStore: Send + Sync + 'static {
    /// Insert one row stamped with the current time.
    fn append(
        &self,
        chat_id: &str,
        role: Role,
        content: &str,
    ) -> impl Future<Output = Result<ChatMessage, sqlx::Error>> + Send;

    /// Insert a user message and its assistant reply, both or neither.
    fn append_turn(
        &self,
        chat_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> impl Future<Output = Result<(ChatMessage, ChatMessage), sqlx::Error>> + Send;

    /// All rows for `chat_id`, oldest first. Unknown ids yield an empty list.
    fn load(
        &self,
        chat_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
}

impl TranscriptStore for SqliteStore {
    async fn append(
        &self,
        chat_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ChatMessage, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        insert_row(&mut conn, chat_id, role, content).await
    }

    async fn append_turn(
        &self,
        chat_id: &str,
        user_content: &str,
        assistant_content: &str,
    ) -> Result<(ChatMessage, ChatMessage), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let user = insert_row(&mut tx, chat_id, Role::User, user_content).await?;
        let assistant = insert_row(&mut tx, chat_id, Role::Assistant, assistant_content).await?;
        tx.commit().await?;
        Ok((user, assistant))
    }

    async fn load(&self, chat_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        // `id` breaks timestamp ties so rows written within the same
        // microsecond keep insertion order.
        let rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
            "SELECT id, chat_id, role, content, timestamp \
             FROM chat_message WHERE chat_id = ?1 ORDER BY timestamp ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, chat_id, role, content, timestamp)| ChatMessage {
                id,
                chat_id,
                role,
                content,
                timestamp: timestamp.parse().unwrap_or_else(|e: chrono::ParseError| {
                    tracing::warn!(raw = %timestamp, error = %e, "failed to parse message timestamp; using now");
                    Utc::now()
                }),
            })
            .collect())
    }
}

async fn insert_row(
    conn: &mut SqliteConnection,
    chat_id: &str,
    role: Role,
    content: &str,
) -> Result<ChatMessage, sqlx::Error> {
    // Truncated to the stored precision so the returned row equals a reload.
    let now = Utc::now().trunc_subsecs(6);
    // A new row never sorts before an earlier row of the same chat, even if
    // the wall clock stepped backwards. Text MAX works because the stored
    // format is fixed-width.
    let (id, stored): (i64, String) = sqlx::query_as(
        "INSERT INTO chat_message (chat_id, role, content, timestamp) \
         SELECT ?1, ?2, ?3, MAX(?4, COALESCE( \
             (SELECT MAX(timestamp) FROM chat_message WHERE chat_id = ?1), '')) \
         RETURNING id, timestamp",
    )
    .bind(chat_id)
    .bind(role.as_ref())
    .bind(content)
    .bind(stored_timestamp(&now))
    .fetch_one(&mut *conn)
    .await?;
    let timestamp = stored
        .parse::<DateTime<Utc>>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(ChatMessage {
        id,
        chat_id: chat_id.to_owned(),
        role: role.to_string(),
        content: content.to_owned(),
        timestamp,
    })
}

/// Fixed-width RFC 3339 so that text order in SQLite equals time order.
fn stored_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
