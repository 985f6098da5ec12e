// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Apiscope - API Surface Extraction
//!
//! Extracts API-related signals from web pages and uploaded documents:
//! endpoints, forms, script-embedded network calls, authentication
//! patterns and likely secrets. The core pipeline is pure and synchronous;
//! network I/O lives in the fetch layer only.
//!
//! ## Pipeline
//!
//! raw content -> normalize -> extract -> analyze -> export
//!
//! - Normalization parses markup (best effort, never fails on malformed
//!   input) and collects script blocks and response headers
//! - Extraction runs the pattern library over every text surface,
//!   de-duplicates by stable id and merges confidence monotonically
//! - Analysis ranks architectural pattern guesses and derives security
//!   concerns and recommendations
//! - Export serializes deterministically to JSON, CSV, YAML or Markdown
//!
//! ## Example
//!
//! ```rust
//! use apiscope::{ExportFormat, Scanner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let html = r#"<script>fetch("https://api.example.com/v1/users")</script>"#;
//!     let scanner = Scanner::new();
//!     let outcome = scanner.scan_content(
//!         html.as_bytes(),
//!         Some("text/html"),
//!         "https://example.com",
//!         vec![],
//!     )?;
//!
//!     for finding in &outcome.findings {
//!         println!("{} {} ({})", finding.category, finding.matched_text, finding.confidence);
//!     }
//!     let report = outcome.export(ExportFormat::Markdown)?;
//!     println!("{}", report.content);
//!     Ok(())
//! }
//! ```

pub mod analyze;
pub mod doc;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod patterns;
pub mod report;
pub mod scanner;

// Re-exports for convenience

// Scanning
pub use scanner::{ScanOutcome, Scanner};

// Errors
pub use error::{Error, Result};

// Normalization
pub use doc::{MarkupTree, NormalizedDocument, ResponseHeader, ScriptBlock, ScriptOrigin};

// Patterns
pub use patterns::{Category, Confidence, PatternLibrary, Recognizer, SurfaceKind};

// Extraction
pub use extract::{Finding, FindingDetails, FormField, FormMethod, Location, ScanConfig};

// Analysis
pub use analyze::{
    analyze, AnalysisResult, ArchPattern, PatternGuess, SecurityConcern, Severity,
};

// Export
pub use report::{export, ExportArtifact, ExportFormat};

// Fetching
pub use fetch::{FetchedPage, FetcherConfig, PageFetcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_present() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_pipeline_surface() {
        let scanner = Scanner::new();
        let outcome = scanner
            .scan_content(b"<p>nothing here</p>", Some("text/html"), "t.html", vec![])
            .unwrap();
        assert!(outcome.findings.is_empty());
        assert!(outcome.export(ExportFormat::Json).is_ok());
    }
}
