//! `.docx` text extraction.
//!
//! A word-processing document is a ZIP package whose main part,
//! `word/document.xml`, holds the body. Only paragraphs that are direct
//! children of `w:body` are collected, in document order; table cells and
//! headers are not descended into. Within a paragraph, `w:t` text is
//! concatenated, `w:tab` becomes `\t` and `w:br`/`w:cr` become `\n`.
//! Text boxes (`w:txbxContent`, stored twice under `mc:AlternateContent`)
//! are not part of the paragraph text.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Path of the main document part inside the package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Errors raised while reading an uploaded document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The payload is not a readable ZIP package or lacks the main part.
    #[error("not a valid .docx package: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("failed to read document part: {0}")]
    Io(#[from] std::io::Error),

    /// The main part is not well-formed XML.
    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The XML parsed but does not look like a word-processing document.
    #[error("document has no body element")]
    MissingBody,

    #[error("document XML ended with unclosed elements")]
    Truncated,

    /// The main part decompresses to more than the allowed size.
    #[error("document content exceeds {limit} bytes when decompressed")]
    TooLarge { limit: u64 },
}

/// Extract every body-level paragraph of a `.docx` payload, in order.
///
/// At most `max_part_bytes` of decompressed XML are read from the package.
pub fn extract_paragraphs(
    bytes: &[u8],
    max_part_bytes: u64,
) -> Result<Vec<String>, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let part = archive.by_name(DOCUMENT_PART)?;
    let too_large = DocumentError::TooLarge {
        limit: max_part_bytes,
    };
    if part.size() > max_part_bytes {
        return Err(too_large);
    }

    // The declared size is untrusted; bound the actual inflate as well.
    let mut xml = String::new();
    part.take(max_part_bytes.saturating_add(1))
        .read_to_string(&mut xml)?;
    if xml.len() as u64 > max_part_bytes {
        return Err(too_large);
    }
    paragraphs_from_xml(&xml)
}

/// Extract the document text: paragraphs joined with `\n`.
pub fn extract_text(bytes: &[u8], max_part_bytes: u64) -> Result<String, DocumentError> {
    Ok(extract_paragraphs(bytes, max_part_bytes)?.join("\n"))
}

fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut saw_body = false;
    // Open text-box elements; nothing is collected while non-zero.
    let mut hidden_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"body" {
                    saw_body = true;
                }
                if name == b"p" && parent_is(&stack, b"body") {
                    current = Some(String::new());
                }
                if is_hidden(&name) {
                    hidden_depth += 1;
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"body" => saw_body = true,
                    b"p" if parent_is(&stack, b"body") => paragraphs.push(String::new()),
                    _ if hidden_depth > 0 => {}
                    b"tab" if parent_is(&stack, b"r") => push_to(&mut current, "\t"),
                    b"br" | b"cr" if parent_is(&stack, b"r") => push_to(&mut current, "\n"),
                    _ => {}
                }
            }
            Event::Text(t) => {
                if hidden_depth == 0 && parent_is(&stack, b"t") {
                    push_to(&mut current, &t.unescape()?);
                }
            }
            Event::CData(c) => {
                if hidden_depth == 0 && parent_is(&stack, b"t") {
                    push_to(&mut current, &String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                let name = stack.pop();
                if name.as_deref().is_some_and(is_hidden) {
                    hidden_depth = hidden_depth.saturating_sub(1);
                }
                if name.as_deref() == Some(b"p".as_slice()) && parent_is(&stack, b"body") {
                    if let Some(text) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DocumentError::Truncated);
    }
    if !saw_body {
        return Err(DocumentError::MissingBody);
    }
    Ok(paragraphs)
}

/// Text-box containers and the markup-compatibility wrapper around them.
fn is_hidden(local_name: &[u8]) -> bool {
    matches!(local_name, b"txbxContent" | b"AlternateContent")
}

fn parent_is(stack: &[Vec<u8>], local_name: &[u8]) -> bool {
    stack.last().is_some_and(|n| n.as_slice() == local_name)
}

fn push_to(current: &mut Option<String>, text: &str) {
    if let Some(buf) = current.as_mut() {
        buf.push_str(text);
    }
}
