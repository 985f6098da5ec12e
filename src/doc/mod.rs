// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Content normalization
//!
//! Turns raw page bytes plus caller-supplied response metadata into a
//! [`NormalizedDocument`]: a parsed markup tree, the ordered script blocks,
//! and the response headers. Performs no network I/O; external script
//! references are recorded, not fetched.

mod parser;
pub mod tree;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
pub use tree::{MarkupTree, NodeData, NodeId, NodeKind};

/// A response header as provided by the fetch layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub name: String,
    pub value: String,
}

impl ResponseHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Where a script block came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptOrigin {
    /// Inline `<script>` body
    Inline,
    /// External `<script src>` reference, recorded without fetching
    ExternalRef(String),
}

/// One script surface of the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptBlock {
    /// Script source text (empty for external references)
    pub text: String,
    pub origin: ScriptOrigin,
}

/// Normalized document model: immutable once built, owned by the pipeline
/// invocation that created it.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub tree: MarkupTree,
    /// Script blocks in document order
    pub scripts: Vec<ScriptBlock>,
    /// Response headers in the order the caller provided them
    pub headers: Vec<ResponseHeader>,
    /// Source URL or filename
    pub source: String,
    /// Non-fatal irregularities absorbed during normalization
    pub diagnostics: Vec<String>,
}

/// Content-type hints that mean the payload is script text, not markup
const SCRIPT_HINTS: &[&str] = &["javascript", "ecmascript"];

/// Content-type prefixes that cannot be normalized
const BINARY_HINTS: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
];

/// Normalize raw content into a document model.
///
/// Fails with [`Error::UnsupportedContent`] when the payload is neither
/// markup nor plain text. Malformed markup never fails: a partial tree is
/// returned with a diagnostic note.
pub fn normalize(
    raw: &[u8],
    content_type: Option<&str>,
    source: &str,
    headers: Vec<ResponseHeader>,
    max_depth: usize,
) -> Result<NormalizedDocument> {
    let hint = content_type.map(|c| c.to_lowercase()).unwrap_or_default();

    if BINARY_HINTS.iter().any(|b| hint.starts_with(b)) {
        return Err(Error::unsupported_content(
            source,
            format!("binary content type: {}", hint),
        ));
    }
    if looks_binary(raw) {
        return Err(Error::unsupported_content(
            source,
            "payload does not decode as text",
        ));
    }

    let text = String::from_utf8_lossy(raw);

    // Script payloads (uploaded .js, application/javascript responses) are a
    // single script surface with no markup tree.
    if SCRIPT_HINTS.iter().any(|s| hint.contains(s)) || source.ends_with(".js") {
        info!(source, bytes = raw.len(), "normalized script payload");
        return Ok(NormalizedDocument {
            tree: MarkupTree::new(),
            scripts: vec![ScriptBlock {
                text: text.into_owned(),
                origin: ScriptOrigin::Inline,
            }],
            headers,
            source: source.to_string(),
            diagnostics: Vec::new(),
        });
    }

    let parsed = parser::parse_markup(&text, max_depth);
    info!(
        source,
        nodes = parsed.tree.len(),
        scripts = parsed.scripts.len(),
        "normalized document"
    );

    Ok(NormalizedDocument {
        tree: parsed.tree,
        scripts: parsed.scripts,
        headers,
        source: source.to_string(),
        diagnostics: parsed.diagnostics,
    })
}

/// Heuristic binary sniff: NUL bytes or a high share of control characters
/// in the leading window mean this is not text.
fn looks_binary(raw: &[u8]) -> bool {
    let window = &raw[..raw.len().min(8192)];
    if window.contains(&0) {
        return true;
    }
    if window.is_empty() {
        return false;
    }
    let control = window
        .iter()
        .filter(|&&b| b < 0x09 || (b > 0x0d && b < 0x20))
        .count();
    control * 10 > window.len()
}
