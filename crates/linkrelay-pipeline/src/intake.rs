// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admission rules for inbound messages.

use std::collections::HashSet;

use linkrelay_config::model::IntakeConfig;
use linkrelay_core::{InboundMessage, PeerId};

/// Decides which inbound messages may produce link requests.
#[derive(Debug, Clone, Default)]
pub struct IntakeFilter {
    sources: HashSet<PeerId>,
    blocked_texts: Vec<String>,
}

impl IntakeFilter {
    pub fn from_config(config: &IntakeConfig) -> Self {
        Self {
            sources: config.sources.iter().copied().map(PeerId).collect(),
            blocked_texts: config
                .blocked_texts
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// Whether the message was posted in an admitted chat.
    ///
    /// An empty source list admits every chat.
    pub fn admits_source(&self, message: &InboundMessage) -> bool {
        self.sources.is_empty() || self.sources.contains(&message.chat)
    }

    /// The first blocked phrase the text contains, compared case-insensitively.
    pub fn blocked_phrase(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.blocked_texts
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }
}
