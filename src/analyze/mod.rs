// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Finding analysis
//!
//! Derives higher-level judgments from an extracted finding set: an
//! architectural pattern ranking, an ordered list of security concerns,
//! and human-readable recommendations. Pure and deterministic: the same
//! finding set always yields the same result in the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::{Finding, FindingDetails, FormMethod};
use crate::patterns::{Category, Confidence};

/// Candidate API architectural styles. Declaration order is the fixed
/// tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchPattern {
    Rest,
    Graphql,
    Oauth2,
    Soap,
    Custom,
}

impl ArchPattern {
    pub fn key(&self) -> &'static str {
        match self {
            ArchPattern::Rest => "rest",
            ArchPattern::Graphql => "graphql",
            ArchPattern::Oauth2 => "oauth2",
            ArchPattern::Soap => "soap",
            ArchPattern::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ArchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One ranked architectural guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGuess {
    pub pattern: ArchPattern,
    pub score: usize,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(s)
    }
}

/// One security concern tied to the findings that triggered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityConcern {
    pub severity: Severity,
    pub description: String,
    pub related_finding_ids: Vec<String>,
}

/// Analysis output, built once from a finding set and read-only after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub architectural_pattern_guesses: Vec<PatternGuess>,
    pub security_concerns: Vec<SecurityConcern>,
    pub recommendations: Vec<String>,
    /// Per-category finding counts; categories with zero findings are
    /// omitted
    pub summary_counts: BTreeMap<String, usize>,
    /// Distinct endpoint shapes with variable segments templated
    pub endpoint_templates: Vec<String>,
}

/// Collapse variable URL segments: numeric ids to `{id}`, long hex runs
/// to `{hash}`, other long tokens to `{token}`.
pub fn template_url(url: &str) -> String {
    let (prefix, path) = match url.find("://").and_then(|i| {
        url[i + 3..]
            .find('/')
            .map(|j| url.split_at(i + 3 + j))
    }) {
        Some((host, rest)) => (host, rest),
        None => ("", url),
    };

    let path = path.split(['?', '#']).next().unwrap_or(path);
    let templated: Vec<String> = path
        .split('/')
        .map(|seg| {
            if seg.is_empty() {
                String::new()
            } else if seg.chars().all(|c| c.is_ascii_digit()) {
                "{id}".to_string()
            } else if seg.len() >= 16 && seg.chars().all(|c| c.is_ascii_hexdigit()) {
                "{hash}".to_string()
            } else if seg.len() >= 20 && seg.chars().all(|c| c.is_ascii_alphanumeric()) {
                "{token}".to_string()
            } else {
                seg.to_string()
            }
        })
        .collect();

    format!("{}{}", prefix, templated.join("/"))
}

/// Analyze a finding set. Never fails: an empty set yields an empty
/// result with a single note that nothing was detected.
pub fn analyze(findings: &[Finding]) -> AnalysisResult {
    let mut summary_counts = BTreeMap::new();
    for finding in findings {
        *summary_counts
            .entry(finding.category.key().to_string())
            .or_insert(0usize) += 1;
    }

    if findings.is_empty() {
        return AnalysisResult {
            architectural_pattern_guesses: Vec::new(),
            security_concerns: Vec::new(),
            recommendations: vec![
                "No API surface was detected in the analyzed document.".to_string(),
            ],
            summary_counts,
            endpoint_templates: Vec::new(),
        };
    }

    let guesses = guess_patterns(findings);
    let concerns = collect_concerns(findings);
    let recommendations = build_recommendations(findings, &concerns, &summary_counts);
    let endpoint_templates = collect_templates(findings);

    debug!(
        guesses = guesses.len(),
        concerns = concerns.len(),
        "analysis complete"
    );

    AnalysisResult {
        architectural_pattern_guesses: guesses,
        security_concerns: concerns,
        recommendations,
        summary_counts,
        endpoint_templates,
    }
}

fn endpoint_like(finding: &Finding) -> bool {
    matches!(
        finding.category,
        Category::Endpoint | Category::NetworkAttribute | Category::ScriptCall
    )
}

fn guess_patterns(findings: &[Finding]) -> Vec<PatternGuess> {
    let mut scores: BTreeMap<ArchPattern, usize> = BTreeMap::new();

    for finding in findings {
        let text = finding.matched_text.to_lowercase();
        if endpoint_like(finding) {
            if text.contains("graphql") {
                *scores.entry(ArchPattern::Graphql).or_insert(0) += 1;
            } else if text.contains("soap") || text.contains("wsdl") || text.contains("xmlrpc") {
                *scores.entry(ArchPattern::Soap).or_insert(0) += 1;
            } else if text.contains("/api/")
                || text.contains("/rest/")
                || has_version_segment(&text)
                || matches!(finding.details, FindingDetails::Endpoint { .. })
            {
                *scores.entry(ArchPattern::Rest).or_insert(0) += 1;
            } else {
                *scores.entry(ArchPattern::Custom).or_insert(0) += 1;
            }
        }
        if finding.category == Category::AuthPattern {
            if let FindingDetails::Auth { scheme } = &finding.details {
                if scheme == "oauth2" || scheme == "bearer" || scheme == "jwt" {
                    *scores.entry(ArchPattern::Oauth2).or_insert(0) += 1;
                }
            }
        }
    }

    let mut guesses: Vec<PatternGuess> = scores
        .into_iter()
        .filter(|(_, score)| *score > 0)
        .map(|(pattern, score)| PatternGuess { pattern, score })
        .collect();
    // Descending score; ties fall back to the fixed priority order
    guesses.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.pattern.cmp(&b.pattern)));
    guesses
}

fn has_version_segment(text: &str) -> bool {
    text.split(['/', '?']).any(|seg| {
        seg.len() >= 2
            && seg.starts_with('v')
            && seg[1..].chars().all(|c| c.is_ascii_digit())
    })
}

fn collect_concerns(findings: &[Finding]) -> Vec<SecurityConcern> {
    let mut concerns = Vec::new();

    for finding in findings {
        match finding.category {
            Category::ApiKeyCandidate => {
                let severity = if finding.confidence == Confidence::High {
                    Severity::High
                } else {
                    Severity::Medium
                };
                concerns.push(SecurityConcern {
                    severity,
                    description: format!(
                        "Possible credential exposed in page content ({} confidence)",
                        finding.confidence
                    ),
                    related_finding_ids: vec![finding.id.clone()],
                });
            }
            Category::Form => {
                if let FindingDetails::Form { action, method, .. } = &finding.details {
                    if *method == FormMethod::Unspecified {
                        concerns.push(SecurityConcern {
                            severity: Severity::Medium,
                            description: "Form declares no submission method".to_string(),
                            related_finding_ids: vec![finding.id.clone()],
                        });
                    }
                    if let Some(action) = action {
                        if action.starts_with("http://") {
                            concerns.push(SecurityConcern {
                                severity: Severity::Medium,
                                description: format!(
                                    "Form submits over plaintext HTTP to {}",
                                    action
                                ),
                                related_finding_ids: vec![finding.id.clone()],
                            });
                        }
                    }
                }
            }
            Category::AuthPattern => {
                if let FindingDetails::Auth { scheme } = &finding.details {
                    if scheme == "basic" {
                        concerns.push(SecurityConcern {
                            severity: Severity::High,
                            description: "Basic authentication in use; credentials travel \
                                          base64-encoded, not encrypted"
                                .to_string(),
                            related_finding_ids: vec![finding.id.clone()],
                        });
                    }
                }
            }
            _ => {}
        }
    }

    concerns.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.related_finding_ids.cmp(&b.related_finding_ids))
    });
    concerns
}

fn build_recommendations(
    findings: &[Finding],
    concerns: &[SecurityConcern],
    summary_counts: &BTreeMap<String, usize>,
) -> Vec<String> {
    fn push_unique(recommendations: &mut Vec<String>, text: String) {
        if !recommendations.contains(&text) {
            recommendations.push(text);
        }
    }
    let mut recommendations = Vec::new();

    for concern in concerns {
        let text = match concern.severity {
            Severity::High => format!("Address immediately: {}.", concern.description),
            Severity::Medium => format!("Review: {}.", concern.description),
            Severity::Low => format!("Consider: {}.", concern.description),
        };
        push_unique(&mut recommendations, text);
    }

    if !summary_counts.contains_key(Category::AuthPattern.key()) {
        push_unique(
            &mut recommendations,
            "No authentication patterns were detected; verify the API actually requires \
             authentication."
                .to_string(),
        );
    }
    if findings.iter().any(endpoint_like) && !summary_counts.contains_key(Category::Form.key()) {
        push_unique(
            &mut recommendations,
            "Endpoints were found without forms; confirm CSRF protection on state-changing \
             requests."
                .to_string(),
        );
    }
    let endpoint_count = summary_counts
        .get(Category::Endpoint.key())
        .copied()
        .unwrap_or(0);
    if endpoint_count >= 5 {
        push_unique(
            &mut recommendations,
            format!(
                "{} distinct endpoints were detected; publish an OpenAPI description so the \
                 surface is documented and reviewable.",
                endpoint_count
            ),
        );
    }

    recommendations
}

fn collect_templates(findings: &[Finding]) -> Vec<String> {
    let mut templates: Vec<String> = findings
        .iter()
        .filter(|f| f.category == Category::Endpoint)
        .map(|f| template_url(&f.matched_text))
        .collect();
    templates.sort();
    templates.dedup();
    templates
}
