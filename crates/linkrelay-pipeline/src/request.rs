// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unit of work and its lifecycle.

use chrono::{DateTime, Utc};
use linkrelay_core::MessageId;
use serde::Serialize;
use strum::Display;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::thumbnail::ThumbnailHandle;

/// Opaque identifier assigned to every [`LinkRequest`] at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a request. States only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestState {
    Queued,
    DispatchedFirstHop,
    AwaitingSecondHop,
    Published,
    TimedOut,
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Published | RequestState::TimedOut | RequestState::Failed
        )
    }

    /// Whether the request occupies the single dispatch slot.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            RequestState::DispatchedFirstHop | RequestState::AwaitingSecondHop
        )
    }
}

/// How a responder reply was attributed to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStrategy {
    /// The reply explicitly referenced the message we sent.
    MatchedByReply,
    /// No reply-linkage; attributed to the in-flight request because its
    /// hop started within the recency window.
    MatchedByRecency,
}

/// A link discovered in an inbound message, tracked until it settles.
#[derive(Debug)]
pub struct LinkRequest {
    pub id: RequestId,
    /// Matched substring, never rewritten.
    pub link: String,
    /// Original body and caption; sent verbatim to the first responder.
    pub source_text: String,
    pub thumbnail_ref: Option<ThumbnailHandle>,
    pub state: RequestState,
    pub created_at: DateTime<Utc>,
    pub(crate) admitted: Instant,
}

impl LinkRequest {
    pub(crate) fn new(
        id: RequestId,
        link: String,
        source_text: String,
        thumbnail_ref: Option<ThumbnailHandle>,
    ) -> Self {
        Self {
            id,
            link,
            source_text,
            thumbnail_ref,
            state: RequestState::Queued,
            created_at: Utc::now(),
            admitted: Instant::now(),
        }
    }

    pub(crate) fn summary(&self) -> RequestSummary {
        RequestSummary {
            id: self.id,
            link: self.link.clone(),
            state: self.state,
            has_thumbnail: self.thumbnail_ref.is_some(),
            created_at: self.created_at,
            matched_by: None,
            published_as: None,
            reason: None,
        }
    }
}

/// Read-only view of a request for operator diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSummary {
    pub id: RequestId,
    pub link: String,
    pub state: RequestState,
    pub has_thumbnail: bool,
    pub created_at: DateTime<Utc>,
    /// Set once a first-hop reply has been attributed.
    pub matched_by: Option<MatchStrategy>,
    /// Destination message, for published requests.
    pub published_as: Option<MessageId>,
    /// Why the request timed out or failed.
    pub reason: Option<String>,
}

/// The terminal signal that settles a dispatched request.
#[derive(Debug)]
pub enum Outcome {
    Published { message_id: MessageId },
    TimedOut(PipelineError),
    Failed(PipelineError),
}

impl Outcome {
    pub fn state(&self) -> RequestState {
        match self {
            Outcome::Published { .. } => RequestState::Published,
            Outcome::TimedOut(_) => RequestState::TimedOut,
            Outcome::Failed(_) => RequestState::Failed,
        }
    }

    /// Label used for the outcome metric.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Outcome::Published { .. } => "published",
            Outcome::TimedOut(_) => "timed_out",
            Outcome::Failed(_) => "failed",
        }
    }

    pub(crate) fn reason(&self) -> Option<String> {
        match self {
            Outcome::Published { .. } => None,
            Outcome::TimedOut(e) | Outcome::Failed(e) => Some(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_and_in_flight_states_are_disjoint() {
        let all = [
            RequestState::Queued,
            RequestState::DispatchedFirstHop,
            RequestState::AwaitingSecondHop,
            RequestState::Published,
            RequestState::TimedOut,
            RequestState::Failed,
        ];
        for state in all {
            assert!(!(state.is_terminal() && state.is_in_flight()), "{state}");
        }
        assert!(!RequestState::Queued.is_terminal());
        assert!(!RequestState::Queued.is_in_flight());
    }

    #[test]
    fn outcome_maps_to_terminal_state() {
        let published = Outcome::Published {
            message_id: MessageId(7),
        };
        assert_eq!(published.state(), RequestState::Published);
        assert!(published.reason().is_none());

        let timed_out = Outcome::TimedOut(PipelineError::ResolutionTimeout {
            after: std::time::Duration::from_secs(5),
        });
        assert_eq!(timed_out.state(), RequestState::TimedOut);
        assert!(timed_out.reason().unwrap().contains("5s"));
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn state_serializes_snake_case() {
        let json = serde_json::to_string(&RequestState::AwaitingSecondHop).unwrap();
        assert_eq!(json, "\"awaiting_second_hop\"");
        assert_eq!(
            MatchStrategy::MatchedByRecency.to_string(),
            "matched_by_recency"
        );
    }
}
