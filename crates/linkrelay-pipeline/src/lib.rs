// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Link resolution pipeline.
//!
//! Inbound messages are scanned for links. Each link becomes a
//! [`LinkRequest`] that is relayed, one at a time, through two external
//! responders reachable only over the chat [`Transport`]. The second
//! responder's completion reply is republished to the destination together
//! with the preview preserved from the source message.
//!
//! [`Transport`]: linkrelay_core::Transport

pub mod correlation;
pub mod error;
pub mod extractor;
pub mod intake;
pub mod matcher;
pub mod pipeline;
pub mod publisher;
pub mod request;
pub mod scheduler;
pub mod shutdown;
pub mod thumbnail;

pub use correlation::{CorrelationTable, Hop};
pub use error::PipelineError;
pub use extractor::LinkExtractor;
pub use intake::IntakeFilter;
pub use pipeline::{PipelineSettings, RelayPipeline, SchedulerState};
pub use publisher::Publisher;
pub use request::{LinkRequest, MatchStrategy, Outcome, RequestId, RequestState, RequestSummary};
pub use thumbnail::{ThumbnailHandle, ThumbnailStats, ThumbnailStore};
