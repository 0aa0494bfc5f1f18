// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correlation between outbound message identities and requests.
//!
//! The transport has no request/response pairing, so every message sent to
//! a responder is recorded here under its hop. Replies are traced back by
//! the message they reply to. When a request moves from the first responder
//! to the second, its key is rewritten in one step ([`CorrelationTable::rebind`]).

use std::collections::HashMap;

use linkrelay_core::MessageId;
use serde::Serialize;
use strum::Display;

use crate::request::RequestId;

/// One leg of the two-stage relay. Keys from different hops never alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Hop {
    First,
    Second,
}

/// Bidirectional map between `(hop, message)` keys and request ids.
///
/// A request holds at most one key at a time. Not internally synchronised;
/// the pipeline keeps it behind its state lock.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    by_key: HashMap<(Hop, MessageId), RequestId>,
    by_request: HashMap<RequestId, (Hop, MessageId)>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `external_id`, sent on `hop`, belongs to `request`.
    ///
    /// Any key the request held before is dropped, and a key previously
    /// owned by another request is taken over.
    pub fn bind(&mut self, hop: Hop, external_id: MessageId, request: RequestId) {
        if let Some(previous) = self.by_request.remove(&request) {
            self.by_key.remove(&previous);
        }
        if let Some(displaced) = self.by_key.insert((hop, external_id), request) {
            self.by_request.remove(&displaced);
        }
        self.by_request.insert(request, (hop, external_id));
    }

    /// Request owning `external_id` on `hop`. Unknown identities are the
    /// common case and simply return `None`.
    pub fn lookup(&self, hop: Hop, external_id: MessageId) -> Option<RequestId> {
        self.by_key.get(&(hop, external_id)).copied()
    }

    /// The key currently held by `request`.
    pub fn key_of(&self, request: RequestId) -> Option<(Hop, MessageId)> {
        self.by_request.get(&request).copied()
    }

    /// Moves the request behind `(old_hop, old_id)` to `(new_hop, new_id)`.
    ///
    /// Returns the request id on success. When the old key is not bound
    /// nothing is inserted and `None` is returned.
    pub fn rebind(
        &mut self,
        old_hop: Hop,
        old_id: MessageId,
        new_hop: Hop,
        new_id: MessageId,
    ) -> Option<RequestId> {
        let request = self.unbind(old_hop, old_id)?;
        self.bind(new_hop, new_id, request);
        Some(request)
    }

    /// Removes a key, returning the request it pointed at.
    pub fn unbind(&mut self, hop: Hop, external_id: MessageId) -> Option<RequestId> {
        let request = self.by_key.remove(&(hop, external_id))?;
        self.by_request.remove(&request);
        Some(request)
    }

    /// Removes whatever key `request` still holds.
    pub fn unbind_request(&mut self, request: RequestId) -> Option<(Hop, MessageId)> {
        let key = self.by_request.remove(&request)?;
        self.by_key.remove(&key);
        Some(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
