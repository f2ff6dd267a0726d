//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - The chat page and `/static` files
//! - Liveness, session, upload, ask and history routes
//! - Optional OpenAPI document (disable with `DOCCHAT_ENABLE_API_DOCS=false`)

mod chat;
pub mod doc;
mod health;
pub mod page;
mod upload;

use std::sync::Arc;

use axum::routing::get;
use axum::{middleware, Router};
use tower_http::services::ServeDir;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(page::router())
        .merge(health::router())
        .merge(chat::router())
        .merge(upload::router(state.config.max_upload_bytes()))
        .nest_service("/static", ServeDir::new(&state.config.static_dir));

    if state.config.enable_api_docs {
        app = app.route("/api-docs/openapi.json", get(doc::openapi_json));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state.config))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::entities::{Role, SqliteStore, TranscriptStore};
    use crate::testing::{docx_with_paragraphs, ScriptedCompletions};

    const BOUNDARY: &str = "docchat-test-boundary";

    struct Harness {
        app: Router,
        store: Arc<SqliteStore>,
        client: Arc<ScriptedCompletions>,
    }

    async fn harness_with(client: ScriptedCompletions, config: Config) -> Harness {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let client = Arc::new(client);
        let state = Arc::new(AppState {
            config: Arc::new(config),
            store: Arc::clone(&store),
            completions: client.clone(),
            templates: Arc::new(page::templates().unwrap()),
        });
        Harness {
            app: build(state),
            store,
            client,
        }
    }

    async fn harness(client: ScriptedCompletions) -> Harness {
        harness_with(client, Config::default()).await
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// `(name, filename, bytes)` parts encoded as multipart/form-data.
    fn post_multipart(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, filename, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(f) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn ping_is_ok() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) = send(&h.app, get("/ping")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn start_chat_issues_distinct_uuids() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, a) = send(&h.app, Request::post("/start-chat").body(Body::empty()).unwrap()).await;
        let (_, b) = send(&h.app, Request::post("/start-chat").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let a = a["chat_id"].as_str().unwrap().to_owned();
        let b = b["chat_id"].as_str().unwrap().to_owned();
        assert!(uuid::Uuid::parse_str(&a).is_ok());
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn upload_stores_document_as_system_message() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let docx = docx_with_paragraphs(&["Hello", "World"]);
        let (status, body) = send(
            &h.app,
            post_multipart(
                "/upload-docx",
                &[("file", Some("a.docx"), docx.as_slice()), ("chat_id", None, b"c1".as_slice())],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "success", "filename": "a.docx" }));

        let (status, history) = send(&h.app, get("/history/c1")).await;
        assert_eq!(status, StatusCode::OK);
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(
            messages[0]["content"],
            "Document uploaded: a.docx. Content:\nHello\nWorld"
        );
        assert!(messages[0]["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn malformed_upload_is_500_and_writes_nothing() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) = send(
            &h.app,
            post_multipart(
                "/upload-docx",
                &[("chat_id", None, b"c1".as_slice()), ("file", Some("bad.docx"), b"not a document".as_slice())],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert_eq!(h.store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upload_without_chat_id_is_400() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let docx = docx_with_paragraphs(&["Hello"]);
        let (status, _) = send(
            &h.app,
            post_multipart("/upload-docx", &[("file", Some("a.docx"), docx.as_slice())]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upload_over_limit_is_413() {
        let config = Config {
            max_upload_size_mb: 0,
            ..Config::default()
        };
        let h = harness_with(ScriptedCompletions::replying("x"), config).await;
        let docx = docx_with_paragraphs(&["Hello"]);
        let (status, _) = send(
            &h.app,
            post_multipart(
                "/upload-docx",
                &[("file", Some("a.docx"), docx.as_slice()), ("chat_id", None, b"c1".as_slice())],
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(h.store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ask_without_message_is_400_and_writes_nothing() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) = send(&h.app, post_json("/ask", json!({ "chat_id": "c1" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing message");
        assert!(h.client.requests().is_empty());
        assert_eq!(h.store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ask_checks_chat_id_first() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) = send(&h.app, post_json("/ask", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid or missing chat_id");

        let (status, _) =
            send(&h.app, post_json("/ask", json!({ "chat_id": "", "message": "hi" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ask_with_invalid_json_is_400() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let req = Request::post("/ask")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ask_accepts_json_without_content_type() {
        let h = harness(ScriptedCompletions::replying("hello back")).await;
        let req = Request::post("/ask")
            .body(Body::from(r#"{"chat_id":"c","message":"hi"}"#))
            .unwrap();
        let (status, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "hello back");
        assert_eq!(h.store.load("c").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ask_with_empty_body_is_400() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) =
            send(&h.app, Request::post("/ask").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
        assert!(h.client.requests().is_empty());
    }

    #[tokio::test]
    async fn successful_ask_returns_stored_reply() {
        let h = harness(ScriptedCompletions::replying("The document greets the world.")).await;
        h.store.append("c1", Role::System, "Document uploaded: a.docx. Content:\nHello").await.unwrap();

        let (status, body) = send(
            &h.app,
            post_json("/ask", json!({ "chat_id": "c1", "message": "What does it say?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "The document greets the world.");

        let rows = h.store.load("c1").await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].role, "user");
        assert_eq!(rows[1].content, "What does it say?");
        assert_eq!(rows[2].role, "assistant");
        assert_eq!(rows[2].content, body["response"].as_str().unwrap());

        let sent = h.client.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), 2);
        assert_eq!(sent[0][0].role, "system");
    }

    #[tokio::test]
    async fn upstream_failure_is_500_and_writes_nothing() {
        let h = harness(ScriptedCompletions::failing()).await;
        let (status, body) =
            send(&h.app, post_json("/ask", json!({ "chat_id": "c1", "message": "hi" }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("429"));
        assert_eq!(h.store.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn history_of_unknown_chat_is_empty() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) = send(&h.app, get("/history/never-started")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "messages": [] }));
    }

    #[tokio::test]
    async fn trace_id_is_echoed() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let id = "0b7c6a8e-2f44-4c8e-9d0a-3f4b5c6d7e8f";
        let req = Request::get("/ping")
            .header(trace::X_TRACE_ID, id)
            .body(Body::empty())
            .unwrap();
        let resp = h.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[trace::X_TRACE_ID], id);

        let resp = h.app.clone().oneshot(get("/ping")).await.unwrap();
        let generated = resp.headers()[trace::X_TRACE_ID].to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn home_renders_chat_page() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let resp = h.app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("gpt-3.5-turbo"));
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let h = harness(ScriptedCompletions::replying("x")).await;
        let (status, body) = send(&h.app, get("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        for path in ["/ping", "/start-chat", "/ask", "/upload-docx", "/history/{chat_id}"] {
            assert!(body["paths"].get(path).is_some(), "missing {path}");
        }
    }

    #[tokio::test]
    async fn openapi_document_can_be_disabled() {
        let config = Config {
            enable_api_docs: false,
            ..Config::default()
        };
        let h = harness_with(ScriptedCompletions::replying("x"), config).await;
        let resp = h.app.clone().oneshot(get("/api-docs/openapi.json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
