// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for linkrelay.
//!
//! Holds the error type, the transport-facing message model and the adapter
//! traits shared by the pipeline, the Telegram transport and the test mocks.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RelayError;
pub use types::{
    AdapterType, Attachment, HealthStatus, InboundMessage, MediaBlob, MediaKind, MessageId, PeerId,
};

pub use traits::{PluginAdapter, Transport};
