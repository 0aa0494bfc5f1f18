// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource-link extraction.

use linkrelay_core::RelayError;
use regex::Regex;

/// Finds resource links in message text.
///
/// All configured patterns are compiled into one alternation so matches come
/// back left to right, non-overlapping, in a single pass. Repeated links are
/// kept: each occurrence becomes its own request.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    pattern: Regex,
}

impl LinkExtractor {
    pub fn new(patterns: &[String]) -> Result<Self, RelayError> {
        if patterns.is_empty() {
            return Err(RelayError::Config(
                "at least one link pattern is required".into(),
            ));
        }

        let combined = patterns
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&combined)
            .map_err(|e| RelayError::Config(format!("invalid link pattern: {e}")))?;

        Ok(Self { pattern })
    }

    /// Links in `text`, in order of appearance, exactly as written.
    pub fn extract<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .collect()
    }
}
