//! Request classification

use serde::{Deserialize, Serialize};

use crate::patterns::PatternSet;

/// Block/allow decision for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub blocked: bool,
    /// Pattern that caused the block, for diagnostics
    pub matched: Option<String>,
}

impl ClassificationResult {
    pub fn allowed() -> Self {
        Self {
            blocked: false,
            matched: None,
        }
    }

    pub fn blocked_by(pattern: &str) -> Self {
        Self {
            blocked: true,
            matched: Some(pattern.to_string()),
        }
    }
}

/// Classify a request URL against a pattern set.
///
/// Blocked when any pattern is a case-sensitive substring of `url`. Which
/// pattern gets reported when several match is unspecified.
pub fn classify(url: &str, patterns: &PatternSet) -> ClassificationResult {
    match patterns.find_match(url) {
        Some(pattern) => ClassificationResult::blocked_by(pattern),
        None => ClassificationResult::allowed(),
    }
}
