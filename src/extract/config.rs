// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};

/// Pipeline configuration supplied by the caller.
///
/// `max_depth` bounds structural nesting (iframe srcdoc) during
/// normalization; it is not a crawl depth. `timeout_secs` is advisory and
/// consumed by the fetch layer only; the core pipeline performs no I/O
/// and never enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_include_low_confidence")]
    pub include_low_confidence: bool,
}

fn default_max_depth() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_include_low_confidence() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            timeout_secs: default_timeout_secs(),
            include_low_confidence: default_include_low_confidence(),
        }
    }
}
