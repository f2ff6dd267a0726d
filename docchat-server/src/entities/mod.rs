//! Persistence layer.
//!
//! [`TranscriptStore`] defines the interface for the append-only chat
//! transcript. The implementation is [`SqliteStore`]; to move to another
//! database, implement [`TranscriptStore`] for a new type and change the
//! concrete type in [`crate::state::AppState`].
//!
//! Trait methods use `impl Future` in their signatures so no `async-trait`
//! boxing is needed on the hot path.

pub mod dao;
pub mod transcript;

pub use dao::{ChatMessage, Role};
pub use transcript::TranscriptStore;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// SQLite-backed transcript store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://chat.db"`.
    /// Migrations are idempotent, so every startup may call this.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::migrate(pool).await
    }

    /// Private in-memory database on a single pinned connection.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // Every connection to `:memory:` is its own database, so the pool
        // must never open a second one or recycle the first.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Total number of rows across all sessions.
    #[cfg(test)]
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_message")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
