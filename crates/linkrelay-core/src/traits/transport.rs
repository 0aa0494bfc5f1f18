// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for the chat network the relay runs on.

use async_trait::async_trait;

use crate::error::RelayError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MediaBlob, MessageId, PeerId};

/// The chat transport the pipeline sends through and listens on.
///
/// Session management, authentication and flood-control backoff live behind
/// this trait. The pipeline only sees fire-and-forget sends that return the
/// identity of the posted message, plus a stream of inbound messages.
#[async_trait]
pub trait Transport: PluginAdapter {
    /// Establishes the connection and starts delivering inbound messages.
    async fn connect(&mut self) -> Result<(), RelayError>;

    /// Posts plain text and returns the new message's identity.
    async fn send_text(&self, to: PeerId, text: &str) -> Result<MessageId, RelayError>;

    /// Uploads media with a caption and returns the new message's identity.
    async fn send_media(
        &self,
        to: PeerId,
        media: MediaBlob,
        caption: &str,
    ) -> Result<MessageId, RelayError>;

    /// Downloads the attachment carried by `message`.
    async fn fetch_media(&self, message: &InboundMessage) -> Result<Vec<u8>, RelayError>;

    /// Forwards `message` as-is to `to` and returns the forwarded copy's identity.
    async fn forward(&self, message: &InboundMessage, to: PeerId)
    -> Result<MessageId, RelayError>;

    /// Receives the next inbound message.
    ///
    /// Returns [`RelayError::TransportClosed`] once the stream has ended.
    async fn receive(&self) -> Result<InboundMessage, RelayError>;
}
