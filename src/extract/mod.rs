// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Finding extraction
//!
//! Runs the pattern library against every text surface of a normalized
//! document, maps raw matches to findings with stable ids, de-duplicates,
//! and merges confidence monotonically. A single deterministic pass over a
//! fixed input; nothing is retried or regenerated mid-run.

pub mod config;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::doc::{NormalizedDocument, ScriptOrigin};
use crate::patterns::{
    Category, Confidence, MatchContext, MatchDetail, PatternLibrary, SurfaceKind,
};
pub use config::ScanConfig;

/// Offsets within one surface are folded into buckets of this width, so
/// matches of the same text that drift slightly between re-scans still
/// collapse to one id.
const OFFSET_BUCKET: usize = 256;

/// Declared form submission method. `Unspecified` is a distinct sentinel:
/// a form without a method attribute is never silently treated as GET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Dialog,
    Unspecified,
}

impl FormMethod {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|m| m.trim().to_lowercase()).as_deref() {
            Some("get") => FormMethod::Get,
            Some("post") => FormMethod::Post,
            Some("put") => FormMethod::Put,
            Some("patch") => FormMethod::Patch,
            Some("delete") => FormMethod::Delete,
            Some("dialog") => FormMethod::Dialog,
            _ => FormMethod::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Get => "get",
            FormMethod::Post => "post",
            FormMethod::Put => "put",
            FormMethod::Patch => "patch",
            FormMethod::Delete => "delete",
            FormMethod::Dialog => "dialog",
            FormMethod::Unspecified => "unspecified",
        }
    }
}

/// One declared form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: Option<String>,
    pub field_type: String,
    pub required: bool,
}

/// Where in the document a finding was first seen. The id folds in the
/// surface kind and offset bucket, not this descriptive path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub surface: SurfaceKind,
    pub offset: usize,
    /// Human-readable position hint ("script[0]", "a@href", "form[1]")
    pub path: Option<String>,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(p) => write!(f, "{}:{}", p, self.offset),
            None => write!(f, "{}:{}", self.surface, self.offset),
        }
    }
}

/// Category-specific payload on a finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingDetails {
    Plain,
    Endpoint {
        method_guess: Option<String>,
    },
    Call {
        idiom: String,
    },
    Secret {
        provider: Option<String>,
        entropy: Option<f64>,
    },
    Auth {
        scheme: String,
    },
    DataAttribute {
        attribute: String,
        method: Option<String>,
    },
    Form {
        action: Option<String>,
        method: FormMethod,
        fields: Vec<FormField>,
    },
}

impl From<MatchDetail> for FindingDetails {
    fn from(detail: MatchDetail) -> Self {
        match detail {
            MatchDetail::Plain => FindingDetails::Plain,
            MatchDetail::Endpoint { method_guess } => FindingDetails::Endpoint { method_guess },
            MatchDetail::Call { idiom } => FindingDetails::Call { idiom },
            MatchDetail::Secret { provider, entropy } => {
                FindingDetails::Secret { provider, entropy }
            }
            MatchDetail::Auth { scheme } => FindingDetails::Auth { scheme },
            MatchDetail::DataAttribute { attribute, method } => {
                FindingDetails::DataAttribute { attribute, method }
            }
        }
    }
}

/// One extracted API-surface signal. Produced once per run, never mutated
/// after the run finishes; ids are unique within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub category: Category,
    pub matched_text: String,
    pub confidence: Confidence,
    pub location: Location,
    pub details: FindingDetails,
}

/// Stable id over category, normalized text, surface kind and offset
/// bucket. Truncated SHA-256, 16 hex chars.
fn finding_id(category: Category, text: &str, surface: SurfaceKind, bucket: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(category.key().as_bytes());
    hasher.update(b"|");
    hasher.update(text.trim().as_bytes());
    hasher.update(b"|");
    hasher.update(surface.key().as_bytes());
    hasher.update(b"|");
    hasher.update(bucket.to_string().as_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

/// Accumulates findings keyed by id during one pass; finalized exactly
/// once so partial results are never observable.
struct Accumulator {
    map: BTreeMap<String, Finding>,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Insert or merge. Identical ids collapse; confidence only ever moves
    /// up to the highest any recognizer reported.
    fn add(&mut self, finding: Finding) {
        match self.map.get_mut(&finding.id) {
            Some(existing) => {
                existing.confidence = existing.confidence.max(finding.confidence);
            }
            None => {
                self.map.insert(finding.id.clone(), finding);
            }
        }
    }

    fn finish(self, include_low_confidence: bool) -> Vec<Finding> {
        let mut findings: Vec<Finding> = self
            .map
            .into_values()
            .filter(|f| include_low_confidence || f.confidence > Confidence::Low)
            .collect();
        findings.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));
        findings
    }
}

/// Extract findings from a normalized document.
pub fn extract(
    doc: &NormalizedDocument,
    config: &ScanConfig,
    library: &PatternLibrary,
) -> Vec<Finding> {
    let mut acc = Accumulator::new();

    extract_forms(doc, &mut acc);
    scan_attributes(doc, library, &mut acc);
    scan_text_nodes(doc, library, &mut acc);
    scan_scripts(doc, library, &mut acc);
    scan_headers(doc, library, &mut acc);

    let findings = acc.finish(config.include_low_confidence);
    debug!(
        source = doc.source.as_str(),
        count = findings.len(),
        "extraction pass complete"
    );
    findings
}

/// Structural form extraction. Each form element ordinal is its own
/// offset bucket, so two byte-identical forms stay distinct findings.
fn extract_forms(doc: &NormalizedDocument, acc: &mut Accumulator) {
    for (ordinal, form_id) in doc.tree.elements_by_tag("form").iter().enumerate() {
        let form = doc.tree.get(*form_id);
        let action = form.attr("action").map(|a| a.to_string());
        let method = FormMethod::parse(form.attr("method"));

        let mut fields = Vec::new();
        for tag in ["input", "select", "textarea"] {
            for field_id in doc.tree.descendants_by_tag(*form_id, tag) {
                let node = doc.tree.get(field_id);
                let field_type = match tag {
                    "input" => node.attr("type").unwrap_or("text").to_lowercase(),
                    other => other.to_string(),
                };
                fields.push(FormField {
                    name: node.attr("name").map(|n| n.to_string()),
                    field_type,
                    required: node.has_attr("required"),
                });
            }
        }

        let matched_text = action.clone().unwrap_or_else(|| "form".to_string());
        let id = finding_id(Category::Form, &matched_text, SurfaceKind::Markup, ordinal);
        acc.add(Finding {
            id,
            category: Category::Form,
            matched_text,
            confidence: Confidence::High,
            location: Location {
                surface: SurfaceKind::Markup,
                offset: ordinal,
                path: Some(format!("form[{}]", ordinal)),
            },
            details: FindingDetails::Form {
                action,
                method,
                fields,
            },
        });
    }
}

fn scan_surface(
    text: &str,
    ctx: &MatchContext<'_>,
    path: &str,
    library: &PatternLibrary,
    acc: &mut Accumulator,
) {
    for recognizer in library.recognizers() {
        for m in recognizer.scan(text, ctx) {
            let bucket = m.offset / OFFSET_BUCKET;
            let id = finding_id(m.category, &m.text, ctx.surface, bucket);
            acc.add(Finding {
                id,
                category: m.category,
                matched_text: m.text.trim().to_string(),
                confidence: m.confidence,
                location: Location {
                    surface: ctx.surface,
                    offset: m.offset,
                    path: Some(path.to_string()),
                },
                details: m.detail.into(),
            });
        }
    }
}

fn scan_attributes(doc: &NormalizedDocument, library: &PatternLibrary, acc: &mut Accumulator) {
    for element_id in doc.tree.elements() {
        let node = doc.tree.get(element_id);
        let tag = node.tag_name.as_deref();
        let method_hint = node.attr("data-method");
        for (name, value) in &node.attributes {
            if value.trim().is_empty() {
                continue;
            }
            let ctx = MatchContext {
                surface: SurfaceKind::Attribute,
                tag,
                attribute: Some(name.as_str()),
                method_hint,
            };
            let path = format!("{}@{}", tag.unwrap_or("?"), name);
            scan_surface(value, &ctx, &path, library, acc);
        }
    }
}

fn scan_text_nodes(doc: &NormalizedDocument, library: &PatternLibrary, acc: &mut Accumulator) {
    let ctx = MatchContext::for_surface(SurfaceKind::Text);
    for text_id in doc.tree.text_nodes() {
        let node = doc.tree.get(text_id);
        // Script bodies are their own surface; style sheets carry no API
        // signal worth the false positives
        let parent_tag = node
            .parent
            .map(|p| doc.tree.get(p))
            .and_then(|p| p.tag_name.as_deref());
        if matches!(parent_tag, Some("script") | Some("style")) {
            continue;
        }
        if let Some(text) = node.text.as_deref() {
            scan_surface(text, &ctx, "text", library, acc);
        }
    }
}

fn scan_scripts(doc: &NormalizedDocument, library: &PatternLibrary, acc: &mut Accumulator) {
    for (idx, block) in doc.scripts.iter().enumerate() {
        match &block.origin {
            ScriptOrigin::Inline => {
                let ctx = MatchContext::for_surface(SurfaceKind::Script);
                scan_surface(&block.text, &ctx, &format!("script[{}]", idx), library, acc);
            }
            ScriptOrigin::ExternalRef(src) => {
                // The reference URL itself is the only scannable text
                let ctx = MatchContext {
                    surface: SurfaceKind::Attribute,
                    tag: Some("script"),
                    attribute: Some("src"),
                    method_hint: None,
                };
                scan_surface(src, &ctx, "script@src", library, acc);
            }
        }
    }
}

fn scan_headers(doc: &NormalizedDocument, library: &PatternLibrary, acc: &mut Accumulator) {
    let ctx = MatchContext::for_surface(SurfaceKind::Header);
    for header in &doc.headers {
        let line = format!("{}: {}", header.name, header.value);
        let path = format!("header[{}]", header.name.to_lowercase());
        scan_surface(&line, &ctx, &path, library, acc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{normalize, ResponseHeader};

    fn run(html: &str) -> Vec<Finding> {
        let doc = normalize(html.as_bytes(), Some("text/html"), "test.html", vec![], 3).unwrap();
        extract(&doc, &ScanConfig::default(), &PatternLibrary::new())
    }

    #[test]
    fn test_form_extraction_records_fields_and_method() {
        let findings = run(
            r#"<form method="post" action="/login">
                 <input type="email" name="user" required>
                 <input type="password" name="pass">
               </form>"#,
        );
        let form = findings
            .iter()
            .find(|f| f.category == Category::Form)
            .unwrap();
        match &form.details {
            FindingDetails::Form {
                action,
                method,
                fields,
            } => {
                assert_eq!(action.as_deref(), Some("/login"));
                assert_eq!(*method, FormMethod::Post);
                assert_eq!(fields.len(), 2);
                assert!(fields[0].required);
                assert_eq!(fields[1].field_type, "password");
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_form_without_method_is_unspecified() {
        let findings = run(r#"<form action="/search"><input name="q"></form>"#);
        let form = findings
            .iter()
            .find(|f| f.category == Category::Form)
            .unwrap();
        match &form.details {
            FindingDetails::Form { method, .. } => assert_eq!(*method, FormMethod::Unspecified),
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_identical_forms_stay_distinct() {
        let findings = run(
            r#"<form action="/api/subscribe"></form>
               <form action="/api/subscribe"></form>"#,
        );
        let forms: Vec<_> = findings
            .iter()
            .filter(|f| f.category == Category::Form)
            .collect();
        assert_eq!(forms.len(), 2);
        assert_ne!(forms[0].id, forms[1].id);
    }

    #[test]
    fn test_call_and_url_match_collapse_across_bucket_edge() {
        // Pad the script so the call idiom starts just before a bucket
        // boundary and the URL literal just after it; both recognizers
        // must still agree on one finding. The idiom lands at offset 250,
        // the URL at 257.
        let padding = format!("{};", "x".repeat(249));
        let html = format!(
            r#"<script>{}fetch("https://api.example.com/v1/users")</script>"#,
            padding
        );
        let doc = normalize(html.as_bytes(), Some("text/html"), "t.html", vec![], 3).unwrap();
        let findings = extract(&doc, &ScanConfig::default(), &PatternLibrary::new());
        let endpoints: Vec<_> = findings
            .iter()
            .filter(|f| f.category == Category::Endpoint)
            .collect();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].confidence, Confidence::High);
    }

    #[test]
    fn test_identical_script_blocks_collapse() {
        let findings = run(
            r#"<script>fetch("https://api.example.com/v1/users")</script>
               <script>fetch("https://api.example.com/v1/users")</script>"#,
        );
        let endpoints: Vec<_> = findings
            .iter()
            .filter(|f| f.category == Category::Endpoint)
            .collect();
        assert_eq!(endpoints.len(), 1);
    }

    #[test]
    fn test_confidence_merges_to_maximum() {
        // The bare entropy recognizer flags the token Low; the named
        // assignment flags the same text High. One finding, High.
        let findings = run(
            r#"<script>var apiKey = "aB3xK9mQ2rT7wZ5cJ1nH8dF4gS6pL0vY";</script>"#,
        );
        let secrets: Vec<_> = findings
            .iter()
            .filter(|f| f.category == Category::ApiKeyCandidate)
            .collect();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].confidence, Confidence::High);
    }

    #[test]
    fn test_low_confidence_filter() {
        let html = r#"<script>token = "changeme1";</script>"#;
        let doc = normalize(html.as_bytes(), Some("text/html"), "t.html", vec![], 3).unwrap();
        let lib = PatternLibrary::new();

        let all = extract(&doc, &ScanConfig::default(), &lib);
        assert!(all.iter().any(|f| f.confidence == Confidence::Low));

        let cfg = ScanConfig {
            include_low_confidence: false,
            ..ScanConfig::default()
        };
        let filtered = extract(&doc, &cfg, &lib);
        assert!(filtered.iter().all(|f| f.confidence > Confidence::Low));
    }

    #[test]
    fn test_header_surface_scanned() {
        let headers = vec![ResponseHeader::new("WWW-Authenticate", "Basic realm=\"x\"")];
        let doc = normalize(b"<p>hi</p>", None, "t.html", headers, 3).unwrap();
        let findings = extract(&doc, &ScanConfig::default(), &PatternLibrary::new());
        assert!(findings
            .iter()
            .any(|f| f.category == Category::AuthPattern
                && f.location.surface == SurfaceKind::Header));
    }

    #[test]
    fn test_data_attribute_endpoint() {
        let findings = run(r#"<button data-api="/api/cart" data-method="post">Add</button>"#);
        let attr = findings
            .iter()
            .find(|f| f.category == Category::NetworkAttribute)
            .unwrap();
        assert_eq!(attr.matched_text, "/api/cart");
        match &attr.details {
            FindingDetails::DataAttribute { method, .. } => {
                assert_eq!(method.as_deref(), Some("POST"))
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_findings_sorted_and_ids_unique() {
        let findings = run(
            r#"<a href="/api/a">a</a>
               <form action="/api/b"></form>
               <script>fetch("/api/c")</script>"#,
        );
        let mut ids: Vec<_> = findings.iter().map(|f| f.id.clone()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);

        for pair in findings.windows(2) {
            assert!(pair[0].category <= pair[1].category);
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = r#"<form action="/api/x"></form><script>fetch("/api/y")</script>"#;
        let doc = normalize(html.as_bytes(), Some("text/html"), "t.html", vec![], 3).unwrap();
        let lib = PatternLibrary::new();
        let a = extract(&doc, &ScanConfig::default(), &lib);
        let b = extract(&doc, &ScanConfig::default(), &lib);
        assert_eq!(a, b);
    }
}
