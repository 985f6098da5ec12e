// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client call idioms in script text
//!
//! fetch/axios/jQuery/XMLHttpRequest/WebSocket. A call with a URL literal
//! yields an Endpoint finding for the URL (the idiom is the evidence); a
//! call without a capturable URL yields a ScriptCall finding.

use regex::Regex;

use super::{Category, Confidence, MatchContext, MatchDetail, RawMatch, Recognizer};

pub struct CallIdiomRecognizer {
    fetch_literal: Regex,
    fetch_method: Regex,
    axios_literal: Regex,
    jquery_ajax: Regex,
    jquery_short: Regex,
    xhr_open: Regex,
    websocket: Regex,
    fetch_dynamic: Regex,
    xhr_ctor: Regex,
}

impl CallIdiomRecognizer {
    pub fn new() -> Self {
        Self {
            fetch_literal: Regex::new(r#"fetch\s*\(\s*["'`]([^"'`]+)["'`]"#).unwrap(),
            fetch_method: Regex::new(r#"(?i)method\s*:\s*["'`]([a-z]+)["'`]"#).unwrap(),
            axios_literal: Regex::new(
                r#"(?i)axios\.(get|post|put|patch|delete|head|options)\s*\(\s*["'`]([^"'`]+)["'`]"#,
            )
            .unwrap(),
            jquery_ajax: Regex::new(
                r#"\$\.ajax\s*\(\s*\{[^}]*url\s*:\s*["'`]([^"'`]+)["'`]"#,
            )
            .unwrap(),
            jquery_short: Regex::new(r#"\$\.(get|post)\s*\(\s*["'`]([^"'`]+)["'`]"#).unwrap(),
            xhr_open: Regex::new(
                r#"(?i)\.open\s*\(\s*["'`](get|post|put|patch|delete|head|options)["'`]\s*,\s*["'`]([^"'`]+)["'`]"#,
            )
            .unwrap(),
            websocket: Regex::new(r#"new\s+WebSocket\s*\(\s*["'`]([^"'`]+)["'`]"#).unwrap(),
            fetch_dynamic: Regex::new(r#"fetch\s*\(\s*([A-Za-z_$][^"'`),]*)[,)]"#).unwrap(),
            xhr_ctor: Regex::new(r"new\s+XMLHttpRequest\s*\(").unwrap(),
        }
    }

    fn endpoint(offset: usize, url: &str, method: Option<String>) -> RawMatch {
        RawMatch {
            offset,
            text: url.to_string(),
            category: Category::Endpoint,
            confidence: Confidence::High,
            detail: MatchDetail::Endpoint {
                method_guess: method,
            },
        }
    }

    fn call(offset: usize, snippet: &str, idiom: &str, confidence: Confidence) -> RawMatch {
        RawMatch {
            offset,
            text: snippet.to_string(),
            category: Category::ScriptCall,
            confidence,
            detail: MatchDetail::Call {
                idiom: idiom.to_string(),
            },
        }
    }
}

impl Default for CallIdiomRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Recognizer for CallIdiomRecognizer {
    fn name(&self) -> &'static str {
        "call-idiom"
    }

    fn category(&self) -> Category {
        Category::ScriptCall
    }

    fn scan(&self, text: &str, _ctx: &MatchContext<'_>) -> Vec<RawMatch> {
        let mut matches = Vec::new();

        // Endpoint offsets point at the URL literal, not the idiom, so a
        // plain URL recognizer hitting the same text lands in the same
        // offset bucket and the findings collapse.
        for cap in self.fetch_literal.captures_iter(text) {
            let whole = cap.get(0).unwrap();
            let url = cap.get(1).unwrap();
            // A method option in the trailing init object window counts as
            // a guess, never a confirmed method.
            let mut end = text.len().min(whole.end() + 200);
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            let window = &text[whole.end()..end];
            let method = self
                .fetch_method
                .captures(window)
                .map(|c| c[1].to_uppercase());
            matches.push(Self::endpoint(url.start(), url.as_str(), method));
        }

        for cap in self.axios_literal.captures_iter(text) {
            let url = cap.get(2).unwrap();
            matches.push(Self::endpoint(
                url.start(),
                url.as_str(),
                Some(cap[1].to_uppercase()),
            ));
        }

        for cap in self.jquery_ajax.captures_iter(text) {
            let url = cap.get(1).unwrap();
            matches.push(Self::endpoint(url.start(), url.as_str(), None));
        }

        for cap in self.jquery_short.captures_iter(text) {
            let url = cap.get(2).unwrap();
            matches.push(Self::endpoint(
                url.start(),
                url.as_str(),
                Some(cap[1].to_uppercase()),
            ));
        }

        for cap in self.xhr_open.captures_iter(text) {
            let url = cap.get(2).unwrap();
            matches.push(Self::endpoint(
                url.start(),
                url.as_str(),
                Some(cap[1].to_uppercase()),
            ));
        }

        for cap in self.websocket.captures_iter(text) {
            let url = cap.get(1).unwrap();
            matches.push(Self::endpoint(url.start(), url.as_str(), None));
        }

        // Dynamic calls: the URL is not a literal, so record the idiom
        for cap in self.fetch_dynamic.captures_iter(text) {
            let whole = cap.get(0).unwrap();
            matches.push(Self::call(
                whole.start(),
                &format!("fetch({})", cap[1].trim_end()),
                "fetch",
                Confidence::Medium,
            ));
        }

        for m in self.xhr_ctor.find_iter(text) {
            matches.push(Self::call(
                m.start(),
                "new XMLHttpRequest()",
                "xhr",
                Confidence::Low,
            ));
        }

        matches
    }
}
