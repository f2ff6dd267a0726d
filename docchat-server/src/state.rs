//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use minijinja::Environment;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::services::completion::CompletionClient;

/// State shared across all HTTP handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Chat transcript store.
    pub store: Arc<SqliteStore>,
    /// External completion API.
    pub completions: Arc<dyn CompletionClient>,
    /// Compiled page templates.
    pub templates: Arc<Environment<'static>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
