//! Server configuration, loaded from environment variables at startup.

/// How far a document part may inflate relative to the upload limit.
const DOCUMENT_EXPANSION_FACTOR: u64 = 16;

/// Runtime configuration for docchat-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set. The completion API key is the one
/// exception: it is read here but only checked on the first `/ask` call.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://chat.db"`). The file is
    /// created if it does not exist.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allow-list. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Directory served under `/static`.
    pub static_dir: String,

    /// Upper bound for a `/upload-docx` request body, in megabytes.
    pub max_upload_size_mb: usize,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_api_docs: bool,

    /// Bearer credential for the completion API.
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion API.
    pub openai_base_url: String,

    /// Model name sent with every completion request.
    pub model: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("DOCCHAT_BIND", "0.0.0.0:8000"),
            database_url: env_or("DOCCHAT_DATABASE_URL", "sqlite://chat.db"),
            log_level: env_or("DOCCHAT_LOG", "info"),
            log_json: env_flag("DOCCHAT_LOG_JSON", false),
            cors_allowed_origins: std::env::var("DOCCHAT_CORS_ORIGINS").ok(),
            static_dir: env_or("DOCCHAT_STATIC_DIR", "static"),
            max_upload_size_mb: parse_env("DOCCHAT_MAX_UPLOAD_SIZE_MB", 20),
            enable_api_docs: env_flag("DOCCHAT_ENABLE_API_DOCS", true),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: env_or("DOCCHAT_MODEL", "gpt-3.5-turbo"),
        }
    }

    /// Upload limit in bytes, as enforced on the `/upload-docx` route.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }

    /// Cap on the decompressed main part of an uploaded document.
    pub fn max_document_part_bytes(&self) -> u64 {
        (self.max_upload_bytes() as u64).saturating_mul(DOCUMENT_EXPANSION_FACTOR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_owned(),
            database_url: "sqlite://chat.db".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            static_dir: "static".to_owned(),
            max_upload_size_mb: 20,
            enable_api_docs: true,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_owned(),
            model: "gpt-3.5-turbo".to_owned(),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
