// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the linkrelay workspace.

use thiserror::Error;

/// The primary error type used by adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Configuration errors (missing token, invalid identifiers).
    #[error("configuration error: {0}")]
    Config(String),

    /// A transport call failed (send, forward, download, rate limiting).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The transport's inbound stream has ended; nothing more will arrive.
    #[error("transport inbound stream closed")]
    TransportClosed,

    /// A message did not carry the media an operation needed.
    #[error("media error: {message}")]
    Media { message: String },

    /// Local blob storage failed (thumbnail directory, file IO).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Builds a [`RelayError::Transport`] from any error source.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RelayError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error means the transport connection itself is gone.
    ///
    /// This is the only condition the relay treats as process-fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RelayError::TransportClosed)
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Storage {
            source: Box::new(e),
        }
    }
}
