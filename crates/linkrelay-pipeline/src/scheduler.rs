// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight dispatch loop.
//!
//! One request at a time is sent to the first responder and waited on.
//! The send and the wait share one resolution deadline, and the request is
//! fully cleaned up before the next queued request is popped. The state lock
//! is never held across a transport call; replies that race an outbound send
//! are parked on the in-flight slot and replayed once the key is bound.

use linkrelay_core::{InboundMessage, MessageId};
use tokio::sync::oneshot;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::correlation::Hop;
use crate::error::PipelineError;
use crate::pipeline::{InFlight, RelayPipeline, SchedulerState};
use crate::request::{LinkRequest, Outcome, RequestId, RequestState};

impl RelayPipeline {
    pub(crate) async fn run_scheduler(&self, cancel: CancellationToken) {
        debug!("scheduler started");
        while let Some(request) = self.next_request(&cancel).await {
            if let Some(ttl) = self.settings.queue_ttl {
                let waited = request.admitted.elapsed();
                if waited > ttl {
                    let outcome = Outcome::TimedOut(PipelineError::QueueExpired { after: waited });
                    self.finalize(request, outcome, None).await;
                    continue;
                }
            }
            self.dispatch(request, &cancel).await;
        }
        debug!("scheduler stopped");
    }

    /// Pops the next queued request, sleeping while the queue is empty.
    async fn next_request(&self, cancel: &CancellationToken) -> Option<LinkRequest> {
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            if let Some(request) = self.state.lock().await.queue.pop_front() {
                return Some(request);
            }
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = self.wake.notified() => {}
            }
        }
    }

    async fn dispatch(&self, mut request: LinkRequest, cancel: &CancellationToken) {
        let id = request.id;
        if cancel.is_cancelled() {
            self.finalize(request, Outcome::Failed(PipelineError::Shutdown), None)
                .await;
            return;
        }

        let deadline = Instant::now() + self.settings.resolution_timeout;
        let (completion, outcome_rx) = oneshot::channel();
        let text = request.source_text.clone();
        request.state = RequestState::DispatchedFirstHop;
        info!(request_id = %id, link = %request.link, "dispatching to first responder");
        {
            let mut state = self.state.lock().await;
            state.scheduler = SchedulerState::Dispatching;
            let mut in_flight = InFlight::new(request, completion);
            in_flight.sending = Some(Hop::First);
            state.in_flight = Some(in_flight);
        }

        let send = self.transport.send_text(self.settings.first_responder, &text);
        let sent = tokio::select! {
            sent = timeout_at(deadline, send) => match sent {
                Ok(Ok(message_id)) => Ok(message_id),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err("send did not complete before the resolution deadline".to_string()),
            },
            _ = cancel.cancelled() => {
                self.settle_in_flight(id, Outcome::Failed(PipelineError::Shutdown)).await;
                return;
            }
        };

        let outcome = match sent {
            Ok(message_id) => {
                let parked = self.bind_first_hop(id, message_id).await;
                debug!(request_id = %id, %message_id, "awaiting first responder");
                for message in parked {
                    self.on_first_hop_reply(&message).await;
                }
                self.await_outcome(id, deadline, outcome_rx, cancel).await
            }
            Err(reason) => Outcome::Failed(PipelineError::DispatchTransport {
                hop: Hop::First,
                reason,
            }),
        };

        self.settle_in_flight(id, outcome).await;
    }

    /// Binds the sent message to `id` and returns replies parked meanwhile.
    async fn bind_first_hop(&self, id: RequestId, message_id: MessageId) -> Vec<InboundMessage> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.correlation.bind(Hop::First, message_id, id);
        state.scheduler = SchedulerState::Waiting;
        match state.in_flight.as_mut().filter(|f| f.request.id == id) {
            Some(in_flight) => {
                in_flight.sending = None;
                in_flight.hop_started = Instant::now();
                std::mem::take(&mut in_flight.parked)
            }
            None => Vec::new(),
        }
    }

    /// Waits for a matcher to settle `id`, up to the resolution deadline.
    async fn await_outcome(
        &self,
        id: RequestId,
        deadline: Instant,
        mut outcome_rx: oneshot::Receiver<Outcome>,
        cancel: &CancellationToken,
    ) -> Outcome {
        let ceiling = self.settings.resolution_timeout;
        let interrupted = tokio::select! {
            waited = timeout_at(deadline, &mut outcome_rx) => match waited {
                Ok(Ok(outcome)) => return outcome,
                Ok(Err(_)) => return completion_dropped(),
                Err(_) => Outcome::TimedOut(PipelineError::ResolutionTimeout { after: ceiling }),
            },
            _ = cancel.cancelled() => Outcome::Failed(PipelineError::Shutdown),
        };

        if self.revoke_completion(id).await {
            return interrupted;
        }

        // A matcher claimed the request. Its publication is bounded by the
        // publish grace period and always reports back.
        debug!(request_id = %id, "waiting for claimed request to publish");
        outcome_rx.await.unwrap_or_else(|_| completion_dropped())
    }

    /// Takes the completion sender away from the matchers.
    ///
    /// Returns `false` when a matcher already holds it.
    async fn revoke_completion(&self, id: RequestId) -> bool {
        let mut state = self.state.lock().await;
        state
            .in_flight
            .as_mut()
            .filter(|f| f.request.id == id)
            .and_then(|f| f.completion.take())
            .is_some()
    }

    /// Removes the in-flight request from every table and runs cleanup.
    async fn settle_in_flight(&self, id: RequestId, outcome: Outcome) {
        let taken = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let taken = state.in_flight.take_if(|f| f.request.id == id);
            state.correlation.unbind_request(id);
            taken
        };

        match taken {
            Some(in_flight) => {
                self.finalize(in_flight.request, outcome, in_flight.matched_by)
                    .await;
            }
            None => warn!(request_id = %id, "in-flight request vanished before settling"),
        }

        self.state.lock().await.scheduler = SchedulerState::Idle;
    }
}

fn completion_dropped() -> Outcome {
    Outcome::Failed(PipelineError::Internal(
        "completion dropped without an outcome".into(),
    ))
}
