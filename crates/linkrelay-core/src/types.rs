// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the relay pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a chat, user, bot or channel on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub i64);

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message within the chat it was posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}

/// Category of an attachment carried by a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Voice,
    Document,
    Animation,
    VideoNote,
    Sticker,
}

impl MediaKind {
    /// Whether the kind can serve as a thumbnail for the published post.
    pub fn is_preview(self) -> bool {
        matches!(self, MediaKind::Photo | MediaKind::Document)
    }
}

/// A reference to media hosted by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: MediaKind,
    /// Transport-side handle used to download the file.
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Bytes ready to be uploaded as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub kind: MediaKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A message delivered by the transport's inbound stream.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    /// Chat the message was posted in.
    pub chat: PeerId,
    /// Who wrote it (the user, bot or channel behind the post).
    pub author: PeerId,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub attachment: Option<Attachment>,
    /// Message this one replies to, when the transport exposes the linkage.
    pub reply_to: Option<MessageId>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Body and caption joined by a newline, in that order.
    ///
    /// Returns an empty string when the message carries neither.
    pub fn combined_text(&self) -> String {
        match (self.text.as_deref(), self.caption.as_deref()) {
            (Some(body), Some(caption)) => format!("{body}\n{caption}"),
            (Some(body), None) => body.to_string(),
            (None, Some(caption)) => caption.to_string(),
            (None, None) => String::new(),
        }
    }

    /// The kind of the attached media, if any.
    pub fn media_kind(&self) -> Option<MediaKind> {
        self.attachment.as_ref().map(|a| a.kind)
    }
}
