// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialisation validation.
//!
//! Checks constraints serde cannot express: required peers, distinct
//! responders, compilable link patterns and coherent timeouts.

use linkrelay_core::MediaKind;

use crate::diagnostic::ConfigError;
use crate::model::RelayConfig;

/// Validate a deserialised configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let responders = &config.responders;
    match (responders.first, responders.second) {
        (None, _) => invalid("responders.first must be set".to_string()),
        (_, None) => invalid("responders.second must be set".to_string()),
        (Some(first), Some(second)) if first == second => invalid(format!(
            "responders.first and responders.second must differ, both are {first}"
        )),
        _ => {}
    }

    if config.publish.destination.is_none() {
        invalid("publish.destination must be set".to_string());
    }

    if let Some(destination) = config.publish.destination
        && config.intake.sources.contains(&destination)
    {
        invalid(format!(
            "publish.destination {destination} is also listed in intake.sources"
        ));
    }

    if responders.sentinel_phrase.trim().is_empty() {
        invalid("responders.sentinel_phrase must not be empty".to_string());
    }

    if responders.qualifying_media.is_empty() {
        invalid("responders.qualifying_media must list at least one media kind".to_string());
    }
    for kind in &responders.qualifying_media {
        if matches!(kind, MediaKind::Photo | MediaKind::Sticker) {
            invalid(format!(
                "responders.qualifying_media must not include `{kind}`"
            ));
        }
    }

    if config.intake.link_patterns.is_empty() {
        invalid("intake.link_patterns must not be empty".to_string());
    }
    for (i, pattern) in config.intake.link_patterns.iter().enumerate() {
        if let Err(e) = regex::Regex::new(pattern) {
            invalid(format!("intake.link_patterns[{i}] does not compile: {e}"));
        }
    }

    let timeouts = &config.timeouts;
    if timeouts.resolution_secs == 0 {
        invalid("timeouts.resolution_secs must be greater than 0".to_string());
    }
    if timeouts.recency_window_secs > timeouts.resolution_secs {
        invalid(format!(
            "timeouts.recency_window_secs ({}) must not exceed timeouts.resolution_secs ({})",
            timeouts.recency_window_secs, timeouts.resolution_secs
        ));
    }
    if config.daemon.shutdown_grace_secs <= timeouts.publish_grace_secs {
        invalid(format!(
            "daemon.shutdown_grace_secs ({}) must exceed timeouts.publish_grace_secs ({})",
            config.daemon.shutdown_grace_secs, timeouts.publish_grace_secs
        ));
    }
    if timeouts.queue_ttl_secs == Some(0) {
        invalid("timeouts.queue_ttl_secs must be greater than 0 when set".to_string());
    }

    if let Some(ref dir) = config.thumbnails.dir
        && dir.trim().is_empty()
    {
        invalid("thumbnails.dir must not be empty when set".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
