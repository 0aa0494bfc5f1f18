// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for linkrelay integration tests.
//!
//! - [`MockTransport`] - in-process transport with injectable inbound
//!   traffic, captured outbound traffic and switchable failures
//! - [`fixtures`] - message builders and a ready-to-validate config

pub mod fixtures;
pub mod mock_transport;

pub use mock_transport::{MockTransport, Sent};
