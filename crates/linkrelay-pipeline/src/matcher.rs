// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response matchers for the two responder hops.

use std::time::Duration;

use linkrelay_core::InboundMessage;
use metrics::counter;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::correlation::Hop;
use crate::error::PipelineError;
use crate::pipeline::{PipelineState, RelayPipeline};
use crate::request::{MatchStrategy, Outcome, RequestId, RequestState};

impl PipelineState {
    /// Traces a responder message back to the request it answers.
    ///
    /// A reply-linked message is looked up by the message it replies to.
    /// Without linkage, the in-flight request is assumed if it is waiting on
    /// `hop` and that hop started within `recency_window`.
    pub(crate) fn resolve_origin(
        &self,
        hop: Hop,
        message: &InboundMessage,
        recency_window: Duration,
    ) -> Result<(RequestId, MatchStrategy), PipelineError> {
        if let Some(target) = message.reply_to {
            return self
                .correlation
                .lookup(hop, target)
                .map(|id| (id, MatchStrategy::MatchedByReply))
                .ok_or(PipelineError::CorrelationMiss { hop });
        }

        self.in_flight
            .as_ref()
            .filter(|f| {
                matches!(self.correlation.key_of(f.request.id), Some((h, _)) if h == hop)
                    && f.hop_started.elapsed() <= recency_window
            })
            .map(|f| (f.request.id, MatchStrategy::MatchedByRecency))
            .ok_or(PipelineError::CorrelationMiss { hop })
    }
}

fn record_miss(message: &InboundMessage, err: &PipelineError, hop: Hop) {
    counter!("linkrelay_correlation_miss_total", "hop" => hop.to_string()).increment(1);
    debug!(message_id = %message.id, error = %err, "discarding uncorrelated responder message");
}

impl RelayPipeline {
    /// Handles a message authored by the first responder.
    ///
    /// Qualifying media answering the in-flight request is forwarded to the
    /// second responder and the request's correlation key moves to the
    /// forwarded copy. Everything else is discarded.
    pub async fn on_first_hop_reply(&self, message: &InboundMessage) {
        let qualifies = message
            .media_kind()
            .is_some_and(|kind| self.settings.qualifying_media.contains(&kind));
        if !qualifies {
            debug!(
                message_id = %message.id,
                kind = ?message.media_kind(),
                "ignoring non-qualifying first responder message"
            );
            return;
        }

        let (id, strategy, old_id) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if let Some(in_flight) = state.in_flight.as_mut()
                && in_flight.park_if_sending(Hop::First, message)
            {
                return;
            }
            let (id, strategy) =
                match state.resolve_origin(Hop::First, message, self.settings.recency_window) {
                    Ok(found) => found,
                    Err(e) => return record_miss(message, &e, Hop::First),
                };

            // Claimed by an earlier reply when `sending` is already set.
            let Some(in_flight) = state.in_flight.as_mut().filter(|f| {
                f.request.id == id
                    && f.request.state == RequestState::DispatchedFirstHop
                    && f.sending.is_none()
            }) else {
                return;
            };
            let Some((Hop::First, old_id)) = state.correlation.key_of(id) else {
                return;
            };
            in_flight.matched_by = Some(strategy);
            in_flight.sending = Some(Hop::Second);
            (id, strategy, old_id)
        };

        let ceiling = self.settings.resolution_timeout;
        let forwarded = match timeout(
            ceiling,
            self.transport.forward(message, self.settings.second_responder),
        )
        .await
        {
            Ok(Ok(new_id)) => Ok(new_id),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("forward did not complete within {ceiling:?}")),
        };

        let parked = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let Some(in_flight) = state.in_flight.as_mut().filter(|f| f.request.id == id) else {
                debug!(request_id = %id, "request settled while forwarding");
                return;
            };
            in_flight.sending = None;

            match forwarded {
                Ok(new_id) => {
                    if state
                        .correlation
                        .rebind(Hop::First, old_id, Hop::Second, new_id)
                        .is_some()
                    {
                        in_flight.request.state = RequestState::AwaitingSecondHop;
                        in_flight.hop_started = tokio::time::Instant::now();
                        info!(
                            request_id = %id,
                            matched_by = %strategy,
                            forwarded_as = %new_id,
                            "first responder replied, forwarded to second responder"
                        );
                    }
                    std::mem::take(&mut in_flight.parked)
                }
                Err(reason) => {
                    warn!(request_id = %id, error = %reason, "forward to second responder failed");
                    if let Some(completion) = in_flight.completion.take() {
                        let _ = completion.send(Outcome::Failed(PipelineError::DispatchTransport {
                            hop: Hop::Second,
                            reason,
                        }));
                    }
                    return;
                }
            }
        };

        for message in parked {
            self.on_second_hop_reply(&message).await;
        }
    }

    /// Handles a message authored by the second responder.
    ///
    /// A message carrying the sentinel phrase that answers the in-flight
    /// request is published with the request's thumbnail, and the outcome
    /// is handed to the scheduler. Publication that outlasts the publish
    /// grace period is abandoned and reported as failed.
    pub async fn on_second_hop_reply(&self, message: &InboundMessage) {
        let body = message.combined_text();
        let has_sentinel = body.contains(self.settings.sentinel_phrase.as_str());

        let (id, thumbnail, completion) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            if let Some(in_flight) = state.in_flight.as_mut()
                && in_flight.park_if_sending(Hop::Second, message)
            {
                return;
            }
            let (id, strategy) =
                match state.resolve_origin(Hop::Second, message, self.settings.recency_window) {
                    Ok(found) => found,
                    Err(e) if has_sentinel => return record_miss(message, &e, Hop::Second),
                    Err(_) => {
                        debug!(message_id = %message.id, "ignoring second responder chatter");
                        return;
                    }
                };

            if !has_sentinel {
                if strategy == MatchStrategy::MatchedByReply {
                    counter!("linkrelay_sentinel_missing_total").increment(1);
                    warn!(
                        request_id = %id,
                        message_id = %message.id,
                        "second responder replied without the sentinel phrase"
                    );
                } else {
                    debug!(message_id = %message.id, "ignoring second responder chatter");
                }
                return;
            }

            let Some(in_flight) = state
                .in_flight
                .as_mut()
                .filter(|f| f.request.id == id && f.request.state == RequestState::AwaitingSecondHop)
            else {
                return;
            };
            // Already settled or claimed.
            let Some(completion) = in_flight.completion.take() else {
                return;
            };
            state.correlation.unbind_request(id);
            (id, in_flight.request.thumbnail_ref.clone(), completion)
        };

        info!(request_id = %id, "second responder delivered, publishing");
        let grace = self.settings.publish_grace;
        let outcome = match timeout(grace, self.publisher.publish(&body, thumbnail.as_ref())).await {
            Ok(Ok(message_id)) => Outcome::Published { message_id },
            Ok(Err(e)) => Outcome::Failed(e),
            Err(_) => Outcome::Failed(PipelineError::PublishFailure {
                reason: format!("publication did not complete within {grace:?}"),
            }),
        };
        let _ = completion.send(outcome);
    }
}
