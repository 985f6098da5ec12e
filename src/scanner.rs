// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan orchestration
//!
//! Owns the pattern library and configuration and drives one document
//! through normalize, extract and analyze. Each scan works on its own
//! document and finding set; the library is read-only, so one scanner can
//! serve concurrent callers.

use tracing::info;

use crate::analyze::{analyze, AnalysisResult};
use crate::doc::{normalize, ResponseHeader};
use crate::error::Result;
use crate::extract::{extract, Finding, ScanConfig};
use crate::fetch::FetchedPage;
use crate::patterns::PatternLibrary;
use crate::report::{export, ExportArtifact, ExportFormat};

/// Result of scanning one document
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Source URL or filename
    pub source: String,
    pub findings: Vec<Finding>,
    pub analysis: AnalysisResult,
    /// Non-fatal irregularities absorbed during normalization
    pub diagnostics: Vec<String>,
}

impl ScanOutcome {
    /// Serialize this outcome into an export format.
    pub fn export(&self, format: ExportFormat) -> Result<ExportArtifact> {
        export(&self.findings, &self.analysis, format)
    }
}

/// Document scanner: pattern library plus configuration
pub struct Scanner {
    library: PatternLibrary,
    config: ScanConfig,
}

impl Scanner {
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            library: PatternLibrary::new(),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan raw content: bytes plus caller-supplied response metadata.
    pub fn scan_content(
        &self,
        raw: &[u8],
        content_type: Option<&str>,
        source: &str,
        headers: Vec<ResponseHeader>,
    ) -> Result<ScanOutcome> {
        let doc = normalize(raw, content_type, source, headers, self.config.max_depth)?;
        let findings = extract(&doc, &self.config, &self.library);
        let analysis = analyze(&findings);
        info!(
            source,
            findings = findings.len(),
            concerns = analysis.security_concerns.len(),
            "scan complete"
        );
        Ok(ScanOutcome {
            source: doc.source,
            findings,
            analysis,
            diagnostics: doc.diagnostics,
        })
    }

    /// Scan a fetched page.
    pub fn scan_page(&self, page: &FetchedPage) -> Result<ScanOutcome> {
        self.scan_content(
            &page.body,
            page.content_type.as_deref(),
            &page.url,
            page.headers.clone(),
        )
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::{ArchPattern, Severity};
    use crate::patterns::{Category, Confidence};

    #[test]
    fn test_login_form_and_fetch_call() {
        let html = r#"
            <html><body>
              <form method="post" action="http://example.com/login">
                <input type="text" name="user">
                <input type="password" name="pass">
              </form>
              <script>fetch("https://api.example.com/v1/users")</script>
            </body></html>
        "#;
        let scanner = Scanner::new();
        let outcome = scanner
            .scan_content(html.as_bytes(), Some("text/html"), "https://example.com", vec![])
            .unwrap();

        assert_eq!(outcome.findings.len(), 2);
        let form = outcome
            .findings
            .iter()
            .find(|f| f.category == Category::Form)
            .unwrap();
        assert_eq!(form.confidence, Confidence::High);
        let endpoint = outcome
            .findings
            .iter()
            .find(|f| f.category == Category::Endpoint)
            .unwrap();
        assert_eq!(endpoint.matched_text, "https://api.example.com/v1/users");
        assert_eq!(endpoint.confidence, Confidence::High);

        assert_eq!(
            outcome.analysis.architectural_pattern_guesses[0].pattern,
            ArchPattern::Rest
        );
        assert!(outcome
            .analysis
            .security_concerns
            .iter()
            .any(|c| c.severity == Severity::Medium
                && c.related_finding_ids.contains(&form.id)));

        let csv = outcome.export(ExportFormat::Csv).unwrap();
        assert_eq!(csv.content.lines().count() - 1, 2);
    }

    #[test]
    fn test_assigned_api_key_raises_high_concern() {
        let html = r#"<script>var apiKey = "aB3xK9mQ2rT7wZ5cJ1nH8dF4gS6pL0vY";</script>"#;
        let outcome = Scanner::new()
            .scan_content(html.as_bytes(), Some("text/html"), "page.html", vec![])
            .unwrap();

        let secrets: Vec<_> = outcome
            .findings
            .iter()
            .filter(|f| f.category == Category::ApiKeyCandidate)
            .collect();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].confidence, Confidence::High);

        let concern = outcome
            .analysis
            .security_concerns
            .iter()
            .find(|c| c.severity == Severity::High)
            .unwrap();
        assert!(concern.related_finding_ids.contains(&secrets[0].id));
    }

    #[test]
    fn test_pipeline_output_is_byte_stable() {
        let html = r#"
            <form action="/api/subscribe"><input name="email"></form>
            <a href="/api/items">items</a>
            <script>fetch("/api/cart", { method: "POST" })</script>
        "#;
        let scanner = Scanner::new();
        for format in [
            ExportFormat::Json,
            ExportFormat::Csv,
            ExportFormat::Yaml,
            ExportFormat::Markdown,
        ] {
            let a = scanner
                .scan_content(html.as_bytes(), Some("text/html"), "t.html", vec![])
                .unwrap()
                .export(format)
                .unwrap();
            let b = scanner
                .scan_content(html.as_bytes(), Some("text/html"), "t.html", vec![])
                .unwrap()
                .export(format)
                .unwrap();
            assert_eq!(a.content, b.content);
        }
    }

    #[test]
    fn test_scan_rejects_binary_content() {
        let outcome = Scanner::new().scan_content(
            &[0u8, 1, 2, 3, 0xff],
            Some("application/octet-stream"),
            "blob.bin",
            vec![],
        );
        assert!(outcome.unwrap_err().is_unsupported_content());
    }

    #[test]
    fn test_empty_page_yields_empty_success() {
        let outcome = Scanner::new()
            .scan_content(b"<html><body></body></html>", Some("text/html"), "e.html", vec![])
            .unwrap();
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.analysis.recommendations.len(), 1);
    }
}
