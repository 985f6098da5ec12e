// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Report and export building
//!
//! Pure serialization of a finding set plus its analysis. Every format is
//! a deterministic function of its input: re-exporting the same data
//! yields byte-identical output. Map keys are sorted, sequences keep the
//! extractor's fixed ordering.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::analyze::AnalysisResult;
use crate::error::{Error, Result};
use crate::extract::Finding;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Yaml,
    Markdown,
}

impl ExportFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Yaml => "application/x-yaml",
            ExportFormat::Markdown => "text/markdown",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Yaml => "yaml",
            ExportFormat::Markdown => "md",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            other => Err(Error::unsupported_format(other)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialized report plus its format
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub content: String,
}

impl ExportArtifact {
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// Serialize findings and analysis into the requested format.
pub fn export(
    findings: &[Finding],
    analysis: &AnalysisResult,
    format: ExportFormat,
) -> Result<ExportArtifact> {
    let content = match format {
        ExportFormat::Json => to_json(findings, analysis)?,
        ExportFormat::Csv => to_csv(findings),
        ExportFormat::Yaml => to_yaml(findings, analysis)?,
        ExportFormat::Markdown => to_markdown(findings, analysis),
    };
    debug!(format = %format, bytes = content.len(), "export built");
    Ok(ExportArtifact { format, content })
}

/// Shared structure for JSON and YAML: findings nested under category
/// keys, analysis alongside. serde_json objects keep sorted keys, so the
/// output is stable.
fn to_value(findings: &[Finding], analysis: &AnalysisResult) -> Result<Value> {
    let mut by_category: BTreeMap<String, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        by_category
            .entry(finding.category.key().to_string())
            .or_default()
            .push(finding);
    }
    Ok(serde_json::json!({
        "analysis": serde_json::to_value(analysis)?,
        "findings": serde_json::to_value(&by_category)?,
    }))
}

fn to_json(findings: &[Finding], analysis: &AnalysisResult) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&to_value(findings, analysis)?)?;
    out.push('\n');
    Ok(out)
}

fn to_csv(findings: &[Finding]) -> String {
    let mut out = String::from("id,category,matched_text,confidence,location\n");
    for finding in findings {
        out.push_str(&csv_field(&finding.id));
        out.push(',');
        out.push_str(&csv_field(finding.category.key()));
        out.push(',');
        out.push_str(&csv_field(&finding.matched_text));
        out.push(',');
        out.push_str(&csv_field(&finding.confidence.to_string()));
        out.push(',');
        out.push_str(&csv_field(&finding.location.to_string()));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_yaml(findings: &[Finding], analysis: &AnalysisResult) -> Result<String> {
    let value = to_value(findings, analysis)?;
    let mut out = String::new();
    match &value {
        Value::Object(map) => {
            for (key, val) in map {
                write_yaml_entry(key, val, 0, &mut out);
            }
        }
        other => write_yaml_value(other, 0, &mut out),
    }
    Ok(out)
}

fn yaml_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn yaml_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(yaml_quote(s)),
        _ => None,
    }
}

/// Double-quoted YAML scalar; control characters are escaped so untrusted
/// matched text cannot produce malformed output.
fn yaml_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\u{:04X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn write_yaml_entry(key: &str, value: &Value, indent: usize, out: &mut String) {
    yaml_indent(out, indent);
    out.push_str(key);
    out.push(':');
    match value {
        Value::Array(items) if items.is_empty() => out.push_str(" []\n"),
        Value::Object(map) if map.is_empty() => out.push_str(" {}\n"),
        Value::Array(_) | Value::Object(_) => {
            out.push('\n');
            write_yaml_value(value, indent + 1, out);
        }
        scalar => {
            out.push(' ');
            // yaml_scalar covers every non-container variant
            out.push_str(&yaml_scalar(scalar).unwrap_or_default());
            out.push('\n');
        }
    }
}

fn write_yaml_value(value: &Value, indent: usize, out: &mut String) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Some(scalar) = yaml_scalar(item) {
                    yaml_indent(out, indent);
                    out.push_str("- ");
                    out.push_str(&scalar);
                    out.push('\n');
                } else {
                    yaml_indent(out, indent);
                    out.push_str("-\n");
                    write_yaml_value(item, indent + 1, out);
                }
            }
        }
        Value::Object(map) => {
            for (key, val) in map {
                write_yaml_entry(key, val, indent, out);
            }
        }
        scalar => {
            yaml_indent(out, indent);
            out.push_str(&yaml_scalar(scalar).unwrap_or_default());
            out.push('\n');
        }
    }
}

fn to_markdown(findings: &[Finding], analysis: &AnalysisResult) -> String {
    let mut out = String::from("# API Surface Report\n\n");

    out.push_str("## Summary\n\n");
    if analysis.summary_counts.is_empty() {
        out.push_str("No findings.\n\n");
    } else {
        out.push_str("| Category | Count |\n|---|---|\n");
        for (category, count) in &analysis.summary_counts {
            out.push_str(&format!("| {} | {} |\n", category, count));
        }
        out.push('\n');
    }

    if !findings.is_empty() {
        out.push_str("## Findings\n\n");
        out.push_str("| Id | Category | Match | Confidence | Location |\n");
        out.push_str("|---|---|---|---|---|\n");
        for finding in findings {
            out.push_str(&format!(
                "| {} | {} | `{}` | {} | {} |\n",
                finding.id,
                finding.category,
                md_cell(&finding.matched_text),
                finding.confidence,
                finding.location,
            ));
        }
        out.push('\n');
    }

    if !analysis.architectural_pattern_guesses.is_empty() {
        out.push_str("## Architectural Pattern\n\n");
        for guess in &analysis.architectural_pattern_guesses {
            out.push_str(&format!("- {} (score {})\n", guess.pattern, guess.score));
        }
        out.push('\n');
    }

    if !analysis.endpoint_templates.is_empty() {
        out.push_str("## Endpoint Templates\n\n");
        for template in &analysis.endpoint_templates {
            out.push_str(&format!("- `{}`\n", template));
        }
        out.push('\n');
    }

    if !analysis.security_concerns.is_empty() {
        out.push_str("## Security Concerns\n\n");
        for concern in &analysis.security_concerns {
            out.push_str(&format!(
                "- **{}**: {} (findings: {})\n",
                concern.severity,
                concern.description,
                concern.related_finding_ids.join(", "),
            ));
        }
        out.push('\n');
    }

    out.push_str("## Recommendations\n\n");
    for recommendation in &analysis.recommendations {
        out.push_str(&format!("- {}\n", recommendation));
    }

    out
}

fn md_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze;
    use crate::doc::normalize;
    use crate::extract::{extract, ScanConfig};
    use crate::patterns::PatternLibrary;

    fn pipeline(html: &str) -> (Vec<Finding>, AnalysisResult) {
        let doc = normalize(html.as_bytes(), Some("text/html"), "t.html", vec![], 3).unwrap();
        let findings = extract(&doc, &ScanConfig::default(), &PatternLibrary::new());
        let analysis = analyze(&findings);
        (findings, analysis)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("YML".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        let err = "xml".parse::<ExportFormat>().unwrap_err();
        assert!(err.is_unsupported_format());
    }

    #[test]
    fn test_mime_and_extension() {
        assert_eq!(ExportFormat::Json.mime(), "application/json");
        assert_eq!(ExportFormat::Csv.mime(), "text/csv");
        assert_eq!(ExportFormat::Yaml.mime(), "application/x-yaml");
        assert_eq!(ExportFormat::Markdown.mime(), "text/markdown");
        assert_eq!(ExportFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_csv_rows_match_findings() {
        let (findings, analysis) = pipeline(
            r#"<form method="post" action="http://example.com/login">
                 <input name="user"><input name="pass">
               </form>
               <script>fetch("https://api.example.com/v1/users")</script>"#,
        );
        let artifact = export(&findings, &analysis, ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = artifact.content.lines().collect();
        assert_eq!(lines[0], "id,category,matched_text,confidence,location");
        assert_eq!(lines.len() - 1, 2);
    }

    #[test]
    fn test_csv_escapes_commas_and_quotes() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_json_round_trip_counts() {
        let (findings, analysis) = pipeline(
            r#"<form action="/api/a"></form>
               <script>fetch("/api/b")</script>"#,
        );
        let artifact = export(&findings, &analysis, ExportFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&artifact.content).unwrap();

        let groups = parsed["findings"].as_object().unwrap();
        for (category, items) in groups {
            let count = analysis.summary_counts.get(category).copied().unwrap_or(0);
            assert_eq!(items.as_array().unwrap().len(), count);
        }
        assert_eq!(groups.len(), analysis.summary_counts.len());
    }

    #[test]
    fn test_exports_are_byte_identical() {
        let (findings, analysis) = pipeline(
            r#"<form action="/api/x"></form>
               <script>fetch("/api/y"); var apiKey = "aB3xK9mQ2rT7wZ5cJ1nH8dF4gS6p";</script>"#,
        );
        for format in [
            ExportFormat::Json,
            ExportFormat::Csv,
            ExportFormat::Yaml,
            ExportFormat::Markdown,
        ] {
            let a = export(&findings, &analysis, format).unwrap();
            let b = export(&findings, &analysis, format).unwrap();
            assert_eq!(a.content, b.content);
        }
    }

    #[test]
    fn test_yaml_structure() {
        let (findings, analysis) = pipeline(r#"<script>fetch("/api/y")</script>"#);
        let artifact = export(&findings, &analysis, ExportFormat::Yaml).unwrap();
        assert!(artifact.content.starts_with("analysis:"));
        assert!(artifact.content.contains("findings:"));
        assert!(artifact.content.contains("endpoint:"));
    }

    #[test]
    fn test_yaml_quotes_control_characters() {
        assert_eq!(yaml_quote("plain"), "\"plain\"");
        assert_eq!(yaml_quote("a\rb\tc"), "\"a\\rb\\tc\"");
        assert_eq!(yaml_quote("say \"hi\"\\"), "\"say \\\"hi\\\"\\\\\"");
        assert_eq!(yaml_quote("bell\u{7}"), "\"bell\\u0007\"");
    }

    #[test]
    fn test_markdown_sections() {
        let (findings, analysis) = pipeline(
            r#"<script>var apiKey = "aB3xK9mQ2rT7wZ5cJ1nH8dF4gS6pL0vY";</script>"#,
        );
        let artifact = export(&findings, &analysis, ExportFormat::Markdown).unwrap();
        assert!(artifact.content.starts_with("# API Surface Report"));
        assert!(artifact.content.contains("## Findings"));
        assert!(artifact.content.contains("## Security Concerns"));
        assert!(artifact.content.contains("## Recommendations"));
    }
}
