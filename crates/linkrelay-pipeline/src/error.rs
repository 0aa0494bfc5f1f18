// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure taxonomy for requests moving through the pipeline.
//!
//! None of these is fatal to the process. Each either settles a single
//! request or is dropped after logging.

use std::time::Duration;

use thiserror::Error;

use crate::correlation::Hop;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source message's preview could not be preserved. The request
    /// proceeds and is published text-only.
    #[error("thumbnail unavailable: {reason}")]
    ThumbnailUnavailable { reason: String },

    /// Sending to a responder failed. Not retried.
    #[error("dispatch to {hop} responder failed: {reason}")]
    DispatchTransport { hop: Hop, reason: String },

    /// A responder message matched no known request.
    #[error("no request correlates with {hop} reply")]
    CorrelationMiss { hop: Hop },

    /// No terminal signal arrived within the resolution ceiling.
    #[error("no resolution within {after:?}")]
    ResolutionTimeout { after: Duration },

    /// Sat in the queue longer than the configured TTL.
    #[error("expired after {after:?} in queue")]
    QueueExpired { after: Duration },

    /// Both the attachment send and the text-only fallback failed.
    #[error("publish failed: {reason}")]
    PublishFailure { reason: String },

    /// The pipeline stopped before the request settled.
    #[error("pipeline shut down")]
    Shutdown,

    #[error("internal error: {0}")]
    Internal(String),
}
