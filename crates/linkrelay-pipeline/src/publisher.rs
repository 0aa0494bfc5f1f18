// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Posts resolved bodies to the destination.

use std::sync::Arc;

use linkrelay_core::{MessageId, PeerId, Transport};
use metrics::counter;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::thumbnail::{ThumbnailHandle, ThumbnailStore};

pub struct Publisher {
    transport: Arc<dyn Transport>,
    thumbnails: Arc<ThumbnailStore>,
    destination: PeerId,
}

impl Publisher {
    pub fn new(
        transport: Arc<dyn Transport>,
        thumbnails: Arc<ThumbnailStore>,
        destination: PeerId,
    ) -> Self {
        Self {
            transport,
            thumbnails,
            destination,
        }
    }

    /// Posts `body` with the preserved preview attached, if any.
    ///
    /// A failed attachment upload is retried once as plain text. Only when
    /// that also fails does the request fail.
    pub async fn publish(
        &self,
        body: &str,
        thumbnail: Option<&ThumbnailHandle>,
    ) -> Result<MessageId, PipelineError> {
        if let Some(handle) = thumbnail {
            let sent = match self.thumbnails.resolve(handle).await {
                Ok(blob) => self.transport.send_media(self.destination, blob, body).await,
                Err(e) => Err(e),
            };
            match sent {
                Ok(message_id) => {
                    info!(destination = %self.destination, %message_id, "published with thumbnail");
                    return Ok(message_id);
                }
                Err(e) => {
                    counter!("linkrelay_publish_fallback_total").increment(1);
                    warn!(
                        request_id = %handle.owner,
                        error = %e,
                        "attachment publish failed, falling back to text"
                    );
                }
            }
        }

        match self.transport.send_text(self.destination, body).await {
            Ok(message_id) => {
                info!(destination = %self.destination, %message_id, "published");
                Ok(message_id)
            }
            Err(e) => Err(PipelineError::PublishFailure {
                reason: e.to_string(),
            }),
        }
    }
}
