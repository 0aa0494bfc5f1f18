// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for inbound messages and a relay config wired to fixed peers.

use linkrelay_config::RelayConfig;
use linkrelay_core::{Attachment, InboundMessage, MediaKind, MessageId, PeerId};

pub const SOURCE_CHAT: PeerId = PeerId(-100_100);
pub const FIRST_RESPONDER: PeerId = PeerId(7_001);
pub const SECOND_RESPONDER: PeerId = PeerId(7_002);
pub const DESTINATION: PeerId = PeerId(-100_300);

/// A config with both responders and the destination set.
///
/// Resolution timeout 300s, recency window 60s, publish grace 30s.
pub fn relay_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.intake.sources = vec![SOURCE_CHAT.0];
    config.responders.first = Some(FIRST_RESPONDER.0);
    config.responders.second = Some(SECOND_RESPONDER.0);
    config.publish.destination = Some(DESTINATION.0);
    config
}

/// A plain text message posted by `from` in its own chat.
pub fn text(id: i32, from: i64, body: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(id),
        chat: PeerId(from),
        author: PeerId(from),
        text: Some(body.to_string()),
        caption: None,
        attachment: None,
        reply_to: None,
        received_at: chrono::Utc::now(),
    }
}

/// A message carrying an attachment of `kind` and an optional caption.
pub fn media(id: i32, from: i64, kind: MediaKind, caption: &str, file_id: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(id),
        chat: PeerId(from),
        author: PeerId(from),
        text: None,
        caption: (!caption.is_empty()).then(|| caption.to_string()),
        attachment: Some(Attachment {
            kind,
            file_id: file_id.to_string(),
            file_name: None,
            mime_type: None,
        }),
        reply_to: None,
        received_at: chrono::Utc::now(),
    }
}

pub fn photo(id: i32, from: i64, caption: &str, file_id: &str) -> InboundMessage {
    media(id, from, MediaKind::Photo, caption, file_id)
}

/// Marks `message` as a reply to `target`.
pub fn replying(mut message: InboundMessage, target: MessageId) -> InboundMessage {
    message.reply_to = Some(target);
    message
}
