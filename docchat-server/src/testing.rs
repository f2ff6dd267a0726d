//! Shared fixtures for unit tests: `.docx` builders and a scripted
//! completion client.

use std::io::{Cursor, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use zip::write::SimpleFileOptions;

use crate::services::completion::{CompletionClient, CompletionError, PromptMessage};

const DOCUMENT_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
);
const DOCUMENT_CLOSE: &str = r#"<w:sectPr/></w:body></w:document>"#;

/// A ZIP archive holding a single entry.
pub fn zip_with_entry(name: &str, contents: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default())
        .expect("start zip entry");
    writer.write_all(contents.as_bytes()).expect("write zip entry");
    writer.finish().expect("finish zip").into_inner()
}

/// A minimal `.docx` whose body is `body_xml`.
pub fn docx_from_body(body_xml: &str) -> Vec<u8> {
    zip_with_entry(
        "word/document.xml",
        &format!("{DOCUMENT_OPEN}{body_xml}{DOCUMENT_CLOSE}"),
    )
}

/// A minimal `.docx` with one single-run paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    docx_from_body(&body)
}

/// Completion client that answers from a script and records every request.
pub struct ScriptedCompletions {
    reply: Option<String>,
    requests: Mutex<Vec<Vec<PromptMessage>>>,
}

impl ScriptedCompletions {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_owned()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as if rate limited.
    pub fn failing() -> Self {
        Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<PromptMessage>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletions {
    async fn complete(&self, history: &[PromptMessage]) -> Result<String, CompletionError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(history.to_vec());
        self.reply.clone().ok_or_else(|| CompletionError::Status {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "rate limited".into(),
        })
    }
}
