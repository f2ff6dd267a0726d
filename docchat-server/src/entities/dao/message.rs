use chrono::{DateTime, Utc};
use strum::{AsRefStr, Display, EnumString};

/// Author of a transcript entry.
///
/// The `role` column itself is free text; the server only ever writes these
/// three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Injected context, e.g. an uploaded document.
    System,
    User,
    Assistant,
}

/// A single row in the `chat_message` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Store-assigned sequence number.
    pub id: i64,
    pub chat_id: String,
    /// `"system"`, `"user"`, or `"assistant"` for rows written by this server.
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
