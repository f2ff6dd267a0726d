//! Chat page.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use minijinja::{context, Environment};

use crate::error::ServerError;
use crate::state::AppState;

const CHAT_TEMPLATE: &str = "chat.html";

/// Compile the embedded page templates.
pub fn templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(CHAT_TEMPLATE, include_str!("../../templates/chat.html"))?;
    Ok(env)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home))
}

/// Render the single-page chat client (`GET /`).
pub async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    let page = state
        .templates
        .get_template(CHAT_TEMPLATE)
        .and_then(|t| {
            t.render(context! {
                model => state.config.model.as_str(),
                version => env!("CARGO_PKG_VERSION"),
            })
        })
        .map_err(|e| ServerError::Internal(format!("failed to render {CHAT_TEMPLATE}: {e}")))?;
    Ok(Html(page))
}
