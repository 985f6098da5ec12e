// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for apiscope
//!
//! Only two error conditions cross the core pipeline boundary:
//! unsupported input content and unsupported export formats. Everything
//! else (malformed markup, recognizer misses) is absorbed as diagnostics
//! or reduced confidence.

use thiserror::Error;

/// Result type alias for apiscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apiscope
#[derive(Error, Debug)]
pub enum Error {
    /// Input is neither markup nor plain text
    #[error("Unsupported content from {source_name}: {reason}")]
    UnsupportedContent { source_name: String, reason: String },

    /// Export builder given an unknown format
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// HTTP request failed (fetch layer only)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error (CLI file handling)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an unsupported-content error
    pub fn unsupported_content(
        source_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::UnsupportedContent {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported-format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Error::UnsupportedFormat(format.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this error means the input itself cannot be processed
    pub fn is_unsupported_content(&self) -> bool {
        matches!(self, Error::UnsupportedContent { .. })
    }

    /// Check if this error came from an export call
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }

    /// Check if this is a network error (fetch layer)
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_content() {
        let err = Error::unsupported_content("blob.bin", "binary payload");
        assert!(err.is_unsupported_content());
        assert!(!err.is_unsupported_format());
        assert!(err.to_string().contains("blob.bin"));
    }

    #[test]
    fn test_unsupported_format() {
        let err = Error::unsupported_format("xlsx");
        assert!(err.is_unsupported_format());
        assert_eq!(err.to_string(), "Unsupported export format: xlsx");
    }
}
