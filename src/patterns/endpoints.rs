// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Endpoint URL recognition

use regex::Regex;

use super::{Category, Confidence, MatchContext, MatchDetail, RawMatch, Recognizer};

/// Recognizes API-looking URLs and paths in any text surface.
///
/// Absolute URLs whose path looks like an API are High confidence;
/// bare relative paths are Medium.
pub struct ApiPathRecognizer {
    abs_url: Regex,
    rel_path: Regex,
    api_like: Regex,
}

impl ApiPathRecognizer {
    pub fn new() -> Self {
        Self {
            abs_url: Regex::new(r#"https?://[^\s"'`<>()]+"#).unwrap(),
            rel_path: Regex::new(
                r"(?i)(/(?:api|rest|graphql|swagger|openapi)(?:/[A-Za-z0-9_\-./{}]*)?|/v\d+/[A-Za-z0-9_\-./{}]+)",
            )
            .unwrap(),
            api_like: Regex::new(r"(?i)/api/|/rest/|/graphql|/swagger|/openapi|/v\d+/").unwrap(),
        }
    }

    fn is_api_like(&self, url: &str) -> bool {
        self.api_like.is_match(url)
    }
}

impl Default for ApiPathRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for ApiPathRecognizer {
    fn name(&self) -> &'static str {
        "api-path"
    }

    fn category(&self) -> Category {
        Category::Endpoint
    }

    fn scan(&self, text: &str, _ctx: &MatchContext<'_>) -> Vec<RawMatch> {
        let mut matches = Vec::new();

        for m in self.abs_url.find_iter(text) {
            let url = m.as_str().trim_end_matches(['.', ',', ';']);
            if !self.is_api_like(url) {
                continue;
            }
            matches.push(RawMatch {
                offset: m.start(),
                text: url.to_string(),
                category: Category::Endpoint,
                confidence: Confidence::High,
                detail: MatchDetail::Endpoint { method_guess: None },
            });
        }

        for m in self.rel_path.find_iter(text) {
            // Skip path fragments inside absolute URLs; those are matched
            // above with the full URL as text.
            if let Some(prev) = text[..m.start()].chars().next_back() {
                if prev.is_ascii_alphanumeric() || prev == '.' || prev == ':' || prev == '/' {
                    continue;
                }
            }
            matches.push(RawMatch {
                offset: m.start(),
                text: m.as_str().to_string(),
                category: Category::Endpoint,
                confidence: Confidence::Medium,
                detail: MatchDetail::Endpoint { method_guess: None },
            });
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::SurfaceKind;

    fn ctx() -> MatchContext<'static> {
        MatchContext::for_surface(SurfaceKind::Script)
    }

    #[test]
    fn test_absolute_api_url_high() {
        let rec = ApiPathRecognizer::new();
        let matches = rec.scan(r#"fetch("https://api.example.com/v1/users")"#, &ctx());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "https://api.example.com/v1/users");
        assert_eq!(matches[0].confidence, Confidence::High);
    }

    #[test]
    fn test_relative_api_path_medium() {
        let rec = ApiPathRecognizer::new();
        let matches = rec.scan(r#"<a href="/api/orders">Orders</a>"#, &ctx());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "/api/orders");
        assert_eq!(matches[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_path_inside_absolute_url_not_doubled() {
        let rec = ApiPathRecognizer::new();
        let matches = rec.scan("https://example.com/api/users", &ctx());
        assert_eq!(matches.len(), 1);
        assert!(matches[0].text.starts_with("https://"));
    }

    #[test]
    fn test_plain_url_ignored() {
        let rec = ApiPathRecognizer::new();
        assert!(rec.scan("https://example.com/about.html", &ctx()).is_empty());
        assert!(rec.scan("no urls here", &ctx()).is_empty());
    }

    #[test]
    fn test_graphql_and_swagger_paths() {
        let rec = ApiPathRecognizer::new();
        assert_eq!(rec.scan(r#"url: "/graphql""#, &ctx()).len(), 1);
        assert_eq!(rec.scan(r#"see "/swagger/index.html""#, &ctx()).len(), 1);
    }
}
