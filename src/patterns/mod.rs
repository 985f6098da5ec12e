// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Pattern library: a versioned registry of named recognizers
//!
//! Each recognizer is a pure matching rule for one category of API signal.
//! Recognizers are independent and order-insensitive for correctness; the
//! registry order only affects display. New recognizers can be added
//! without touching the extractor's control flow.

mod auth;
mod calls;
mod endpoints;
mod secrets;

use serde::{Deserialize, Serialize};

pub use auth::AuthIdiomRecognizer;
pub use calls::CallIdiomRecognizer;
pub use endpoints::ApiPathRecognizer;
pub use secrets::{AssignedSecretRecognizer, EntropyTokenRecognizer, ProviderKeyRecognizer};
pub use secrets::shannon_entropy;

/// Pattern catalogue version, bumped when recognizers change behavior
pub const LIBRARY_VERSION: &str = "1";

/// Finding category. Declaration order is the fixed display/export order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Endpoint,
    Form,
    ScriptCall,
    NetworkAttribute,
    ApiKeyCandidate,
    AuthPattern,
}

impl Category {
    /// Stable string key used in ids and export keys
    pub fn key(&self) -> &'static str {
        match self {
            Category::Endpoint => "endpoint",
            Category::Form => "form",
            Category::ScriptCall => "script_call",
            Category::NetworkAttribute => "network_attribute",
            Category::ApiKeyCandidate => "api_key_candidate",
            Category::AuthPattern => "auth_pattern",
        }
    }

    /// All categories in fixed order
    pub fn all() -> &'static [Category] {
        &[
            Category::Endpoint,
            Category::Form,
            Category::ScriptCall,
            Category::NetworkAttribute,
            Category::ApiKeyCandidate,
            Category::AuthPattern,
        ]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Match confidence. Ordering is Low < Medium < High so merges can take
/// the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        f.write_str(s)
    }
}

/// Which text surface of the document a match came from. Surface identity
/// is the kind, not the instance: identical text in two script blocks
/// collapses to one finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    /// Structural markup element (forms)
    Markup,
    /// Attribute value
    Attribute,
    /// Text node content
    Text,
    /// Script block source
    Script,
    /// Response header line
    Header,
}

impl SurfaceKind {
    pub fn key(&self) -> &'static str {
        match self {
            SurfaceKind::Markup => "markup",
            SurfaceKind::Attribute => "attribute",
            SurfaceKind::Text => "text",
            SurfaceKind::Script => "script",
            SurfaceKind::Header => "header",
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Context handed to recognizers alongside the surface text
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub surface: SurfaceKind,
    /// Owning element tag, when scanning attributes or element text
    pub tag: Option<&'a str>,
    /// Attribute name, when scanning an attribute value
    pub attribute: Option<&'a str>,
    /// Sibling `data-method` value, when the element declares one
    pub method_hint: Option<&'a str>,
}

impl<'a> MatchContext<'a> {
    pub fn for_surface(surface: SurfaceKind) -> Self {
        Self {
            surface,
            tag: None,
            attribute: None,
            method_hint: None,
        }
    }
}

/// Category-specific payload attached to a raw match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchDetail {
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
}

/// One raw recognizer hit, offsets relative to the scanned surface
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub offset: usize,
    pub text: String,
    /// Category for the resulting finding; recognizers may hint a category
    /// other than their own default (e.g. a call idiom capturing a URL
    /// literal yields an Endpoint)
    pub category: Category,
    pub confidence: Confidence,
    pub detail: MatchDetail,
}

/// A named pure-matching rule targeting one category of signal
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> Category;
    fn scan(&self, text: &str, ctx: &MatchContext<'_>) -> Vec<RawMatch>;
}

/// Read-only recognizer registry, safely shared across concurrent
/// pipeline invocations.
pub struct PatternLibrary {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl PatternLibrary {
    /// Build the default catalogue
    pub fn new() -> Self {
        let mut lib = Self {
            recognizers: Vec::new(),
        };
        lib.register(Box::new(ApiPathRecognizer::new()));
        lib.register(Box::new(CallIdiomRecognizer::new()));
        lib.register(Box::new(NetworkAttributeRecognizer));
        lib.register(Box::new(ProviderKeyRecognizer::new()));
        lib.register(Box::new(AssignedSecretRecognizer::new()));
        lib.register(Box::new(EntropyTokenRecognizer::new()));
        lib.register(Box::new(AuthIdiomRecognizer::new()));
        lib
    }

    /// Add a recognizer to the catalogue
    pub fn register(&mut self, recognizer: Box<dyn Recognizer>) {
        self.recognizers.push(recognizer);
    }

    /// Recognizers in registration order
    pub fn recognizers(&self) -> impl Iterator<Item = &dyn Recognizer> {
        self.recognizers.iter().map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches `data-api`-style and htmx attributes declaring network targets
pub struct NetworkAttributeRecognizer;

const NETWORK_ATTRS: &[&str] = &["data-api", "data-url", "data-endpoint", "data-action"];
const HTMX_ATTRS: &[(&str, &str)] = &[
    ("hx-get", "GET"),
    ("hx-post", "POST"),
    ("hx-put", "PUT"),
    ("hx-patch", "PATCH"),
    ("hx-delete", "DELETE"),
];

impl Recognizer for NetworkAttributeRecognizer {
    fn name(&self) -> &'static str {
        "network-attribute"
    }

    fn category(&self) -> Category {
        Category::NetworkAttribute
    }

    fn scan(&self, text: &str, ctx: &MatchContext<'_>) -> Vec<RawMatch> {
        let Some(attr) = ctx.attribute else {
            return Vec::new();
        };
        if text.trim().is_empty() {
            return Vec::new();
        }

        let method = if NETWORK_ATTRS.contains(&attr) {
            ctx.method_hint.map(|m| m.to_uppercase())
        } else if let Some(&(_, verb)) = HTMX_ATTRS.iter().find(|(a, _)| *a == attr) {
            Some(verb.to_string())
        } else {
            return Vec::new();
        };

        vec![RawMatch {
            offset: 0,
            text: text.to_string(),
            category: Category::NetworkAttribute,
            confidence: Confidence::Medium,
            detail: MatchDetail::DataAttribute {
                attribute: attr.to_string(),
                method,
            },
        }]
    }
}
