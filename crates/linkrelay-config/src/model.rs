// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! Every struct uses `#[serde(deny_unknown_fields)]` so typos are rejected at
//! startup instead of silently falling back to defaults.

use std::time::Duration;

use linkrelay_core::MediaKind;
use serde::{Deserialize, Serialize};

/// Top-level linkrelay configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Process-level settings.
    #[serde(default)]
    pub daemon: DaemonConfig,

    /// Telegram transport settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Which inbound messages feed the pipeline.
    #[serde(default)]
    pub intake: IntakeConfig,

    /// The two external responders and their reply contract.
    #[serde(default)]
    pub responders: RespondersConfig,

    /// Where resolved artifacts are published.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Bounded waits.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// Thumbnail storage.
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    /// Instance name used in logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between pipeline status log lines. `0` disables them.
    #[serde(default = "default_status_interval_secs")]
    pub status_interval_secs: u64,

    /// Seconds to wait for the pipeline to settle on shutdown.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// Number of settled request summaries kept for diagnostics.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            status_interval_secs: default_status_interval_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_name() -> String {
    "linkrelay".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_status_interval_secs() -> u64 {
    300
}

fn default_shutdown_grace_secs() -> u64 {
    45
}

fn default_history_limit() -> usize {
    100
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. `None` means no transport can be started.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Alternative Bot-API-compatible endpoint (e.g. a self-hosted server).
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Intake filtering and link extraction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeConfig {
    /// Chats whose messages are submitted. Empty admits every chat except
    /// the responders.
    #[serde(default)]
    pub sources: Vec<i64>,

    /// Case-insensitive substrings that cause a message to be dropped.
    #[serde(default)]
    pub blocked_texts: Vec<String>,

    /// Regular expressions recognising resource links.
    #[serde(default = "default_link_patterns")]
    pub link_patterns: Vec<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            blocked_texts: Vec::new(),
            link_patterns: default_link_patterns(),
        }
    }
}

fn default_link_patterns() -> Vec<String> {
    vec![r#"https?://[^\s<>"']+"#.to_string()]
}

/// The external responder pair.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RespondersConfig {
    /// Peer id of the first responder (receives the source text).
    #[serde(default)]
    pub first: Option<i64>,

    /// Peer id of the second responder (receives the forwarded artifact).
    #[serde(default)]
    pub second: Option<i64>,

    /// Phrase the second responder includes in its completion reply.
    #[serde(default = "default_sentinel_phrase")]
    pub sentinel_phrase: String,

    /// Media categories from the first responder that are worth forwarding.
    #[serde(default = "default_qualifying_media")]
    pub qualifying_media: Vec<MediaKind>,
}

impl Default for RespondersConfig {
    fn default() -> Self {
        Self {
            first: None,
            second: None,
            sentinel_phrase: default_sentinel_phrase(),
            qualifying_media: default_qualifying_media(),
        }
    }
}

/// Completion marker used by the second responder.
pub const DEFAULT_SENTINEL_PHRASE: &str = "HERE IS YOUR LINK";

fn default_sentinel_phrase() -> String {
    DEFAULT_SENTINEL_PHRASE.to_string()
}

fn default_qualifying_media() -> Vec<MediaKind> {
    vec![
        MediaKind::Video,
        MediaKind::Audio,
        MediaKind::Voice,
        MediaKind::Document,
        MediaKind::Animation,
    ]
}

/// Publication target.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Chat id of the destination feed.
    #[serde(default)]
    pub destination: Option<i64>,
}

/// Bounded waits governing each request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutsConfig {
    /// Ceiling on the wait for a terminal signal after dispatch.
    #[serde(default = "default_resolution_secs")]
    pub resolution_secs: u64,

    /// How old the in-flight hop may be for a reply without reply-linkage
    /// to be attributed to it.
    #[serde(default = "default_recency_window_secs")]
    pub recency_window_secs: u64,

    /// Extra time granted once a reply has been matched and publication
    /// has started.
    #[serde(default = "default_publish_grace_secs")]
    pub publish_grace_secs: u64,

    /// Queued requests older than this are settled without dispatch.
    #[serde(default)]
    pub queue_ttl_secs: Option<u64>,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            resolution_secs: default_resolution_secs(),
            recency_window_secs: default_recency_window_secs(),
            publish_grace_secs: default_publish_grace_secs(),
            queue_ttl_secs: None,
        }
    }
}

impl TimeoutsConfig {
    pub fn resolution(&self) -> Duration {
        Duration::from_secs(self.resolution_secs)
    }

    pub fn recency_window(&self) -> Duration {
        Duration::from_secs(self.recency_window_secs)
    }

    pub fn publish_grace(&self) -> Duration {
        Duration::from_secs(self.publish_grace_secs)
    }

    pub fn queue_ttl(&self) -> Option<Duration> {
        self.queue_ttl_secs.map(Duration::from_secs)
    }
}

fn default_resolution_secs() -> u64 {
    300
}

fn default_recency_window_secs() -> u64 {
    60
}

fn default_publish_grace_secs() -> u64 {
    30
}

/// Thumbnail storage configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Directory for preserved previews. `None` keeps them in memory.
    #[serde(default)]
    pub dir: Option<String>,
}
