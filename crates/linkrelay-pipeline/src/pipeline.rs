// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The relay pipeline: intake, shared state, run loop and terminal cleanup.
//!
//! [`RelayPipeline`] is a cheap-to-clone handle. The scheduler task and the
//! inbound routing loop share one [`PipelineState`] behind a mutex; every
//! mutation of the queue, the in-flight slot and the correlation table is
//! serialized through it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use linkrelay_config::RelayConfig;
use linkrelay_core::{InboundMessage, MediaKind, PeerId, RelayError, Transport};
use metrics::counter;
use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, Notify, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, info, warn};

use crate::correlation::{CorrelationTable, Hop};
use crate::error::PipelineError;
use crate::extractor::LinkExtractor;
use crate::intake::IntakeFilter;
use crate::publisher::Publisher;
use crate::request::{LinkRequest, MatchStrategy, Outcome, RequestId, RequestSummary};
use crate::thumbnail::{ThumbnailHandle, ThumbnailStats, ThumbnailStore};

/// Scheduler state machine: `Idle -> Dispatching -> Waiting -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Dispatching,
    Waiting,
}

/// Resolved runtime parameters, taken from a validated [`RelayConfig`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub first_responder: PeerId,
    pub second_responder: PeerId,
    pub destination: PeerId,
    pub sentinel_phrase: String,
    pub qualifying_media: Vec<MediaKind>,
    pub resolution_timeout: Duration,
    pub recency_window: Duration,
    pub publish_grace: Duration,
    pub queue_ttl: Option<Duration>,
    pub history_limit: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let peer = |value: Option<i64>, key: &str| {
            value
                .map(PeerId)
                .ok_or_else(|| RelayError::Config(format!("{key} is not set")))
        };

        Ok(Self {
            first_responder: peer(config.responders.first, "responders.first")?,
            second_responder: peer(config.responders.second, "responders.second")?,
            destination: peer(config.publish.destination, "publish.destination")?,
            sentinel_phrase: config.responders.sentinel_phrase.clone(),
            qualifying_media: config.responders.qualifying_media.clone(),
            resolution_timeout: config.timeouts.resolution(),
            recency_window: config.timeouts.recency_window(),
            publish_grace: config.timeouts.publish_grace(),
            queue_ttl: config.timeouts.queue_ttl(),
            history_limit: config.daemon.history_limit,
        })
    }
}

/// The request occupying the single dispatch slot.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub request: LinkRequest,
    /// When the current hop's outbound message was sent.
    pub hop_started: Instant,
    pub matched_by: Option<MatchStrategy>,
    /// Taken by whichever side settles the request first.
    pub completion: Option<oneshot::Sender<Outcome>>,
    /// Hop whose outbound message is on the wire and not yet bound.
    pub sending: Option<Hop>,
    /// Responder messages that arrived for `sending` before its key was bound.
    pub parked: Vec<InboundMessage>,
}

impl InFlight {
    pub(crate) fn new(request: LinkRequest, completion: oneshot::Sender<Outcome>) -> Self {
        Self {
            request,
            hop_started: Instant::now(),
            matched_by: None,
            completion: Some(completion),
            sending: None,
            parked: Vec::new(),
        }
    }

    /// Holds `message` back if it answers the hop currently being sent.
    pub(crate) fn park_if_sending(&mut self, hop: Hop, message: &InboundMessage) -> bool {
        if self.sending != Some(hop) {
            return false;
        }
        debug!(message_id = %message.id, %hop, "parking reply until the outbound send completes");
        self.parked.push(message.clone());
        true
    }
}

#[derive(Debug)]
pub(crate) struct PipelineState {
    pub scheduler: SchedulerState,
    pub queue: VecDeque<LinkRequest>,
    pub in_flight: Option<InFlight>,
    pub correlation: CorrelationTable,
    pub history: VecDeque<RequestSummary>,
}

impl PipelineState {
    pub(crate) fn new() -> Self {
        Self {
            scheduler: SchedulerState::Idle,
            queue: VecDeque::new(),
            in_flight: None,
            correlation: CorrelationTable::new(),
            history: VecDeque::new(),
        }
    }

    fn record(&mut self, summary: RequestSummary, limit: usize) {
        if limit == 0 {
            return;
        }
        while self.history.len() >= limit {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }
}

/// Handle to a running (or runnable) relay pipeline.
#[derive(Clone)]
pub struct RelayPipeline {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) thumbnails: Arc<ThumbnailStore>,
    pub(crate) extractor: Arc<LinkExtractor>,
    pub(crate) intake: Arc<IntakeFilter>,
    pub(crate) publisher: Arc<Publisher>,
    pub(crate) settings: Arc<PipelineSettings>,
    pub(crate) state: Arc<Mutex<PipelineState>>,
    pub(crate) wake: Arc<Notify>,
}

impl RelayPipeline {
    /// Builds a pipeline from validated configuration.
    pub fn new(config: &RelayConfig, transport: Arc<dyn Transport>) -> Result<Self, RelayError> {
        let settings = PipelineSettings::from_config(config)?;
        let thumbnails = match config.thumbnails.dir.as_deref() {
            Some(dir) => ThumbnailStore::on_disk(dir)?,
            None => ThumbnailStore::in_memory(),
        };
        let extractor = LinkExtractor::new(&config.intake.link_patterns)?;
        let intake = IntakeFilter::from_config(&config.intake);
        Ok(Self::from_parts(
            settings,
            transport,
            Arc::new(thumbnails),
            extractor,
            intake,
        ))
    }

    pub fn from_parts(
        settings: PipelineSettings,
        transport: Arc<dyn Transport>,
        thumbnails: Arc<ThumbnailStore>,
        extractor: LinkExtractor,
        intake: IntakeFilter,
    ) -> Self {
        let publisher = Publisher::new(
            Arc::clone(&transport),
            Arc::clone(&thumbnails),
            settings.destination,
        );
        Self {
            transport,
            thumbnails,
            extractor: Arc::new(extractor),
            intake: Arc::new(intake),
            publisher: Arc::new(publisher),
            settings: Arc::new(settings),
            state: Arc::new(Mutex::new(PipelineState::new())),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Extracts every link in `message` and queues one request per link.
    ///
    /// The message's preview, if any, is captured once and each request
    /// gets its own copy. Returns the queued request ids in extraction
    /// order; an empty result means nothing was queued.
    pub async fn submit(&self, message: &InboundMessage) -> Vec<RequestId> {
        let text = message.combined_text();

        if let Some(phrase) = self.intake.blocked_phrase(&text) {
            warn!(
                message_id = %message.id,
                chat = %message.chat,
                phrase,
                "dropping message containing blocked text"
            );
            return Vec::new();
        }

        let links: Vec<String> = self
            .extractor
            .extract(&text)
            .into_iter()
            .map(str::to_owned)
            .collect();
        if links.is_empty() {
            debug!(message_id = %message.id, "no links in message");
            return Vec::new();
        }
        counter!("linkrelay_links_extracted_total").increment(links.len() as u64);

        let mut requests = Vec::with_capacity(links.len());
        let mut preview: Option<ThumbnailHandle> = None;
        for (index, link) in links.into_iter().enumerate() {
            let id = RequestId::new();
            let thumbnail = if index == 0 {
                preview = self
                    .thumbnails
                    .capture(self.transport.as_ref(), message, id)
                    .await;
                preview.clone()
            } else if let Some(handle) = &preview {
                self.thumbnails.copy_for(handle, id).await
            } else {
                None
            };
            requests.push(LinkRequest::new(id, link, text.clone(), thumbnail));
        }

        let ids: Vec<RequestId> = requests.iter().map(|r| r.id).collect();
        {
            let mut state = self.state.lock().await;
            for request in requests {
                info!(
                    request_id = %request.id,
                    link = %request.link,
                    thumbnail = request.thumbnail_ref.is_some(),
                    "link queued"
                );
                state.queue.push_back(request);
            }
        }
        self.wake.notify_one();
        ids
    }

    /// Summaries of the in-flight request followed by queued ones.
    pub async fn current_state(&self) -> Vec<RequestSummary> {
        let state = self.state.lock().await;
        let in_flight = state.in_flight.iter().map(|f| {
            let mut summary = f.request.summary();
            summary.matched_by = f.matched_by;
            summary
        });
        in_flight
            .chain(state.queue.iter().map(LinkRequest::summary))
            .collect()
    }

    /// The most recent terminal summaries, oldest first.
    pub async fn recent_outcomes(&self) -> Vec<RequestSummary> {
        self.state.lock().await.history.iter().cloned().collect()
    }

    pub async fn scheduler_state(&self) -> SchedulerState {
        self.state.lock().await.scheduler
    }

    /// Number of live correlation entries. Zero whenever nothing is in flight.
    pub async fn bound_correlations(&self) -> usize {
        self.state.lock().await.correlation.len()
    }

    pub fn thumbnail_stats(&self) -> ThumbnailStats {
        self.thumbnails.stats()
    }

    /// Runs the scheduler and routes inbound traffic until `cancel` fires or
    /// the transport's inbound stream closes.
    ///
    /// On exit the in-flight request and every queued request are settled
    /// through the normal cleanup path. Dropping the future also stops the
    /// scheduler; [`settle_remaining`](Self::settle_remaining) then settles
    /// what was left.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), RelayError> {
        let scheduler_cancel = cancel.child_token();
        let scheduler = {
            let pipeline = self.clone();
            let token = scheduler_cancel.clone();
            AbortOnDropHandle::new(tokio::spawn(
                async move { pipeline.run_scheduler(token).await },
            ))
        };

        info!(
            first = %self.settings.first_responder,
            second = %self.settings.second_responder,
            destination = %self.settings.destination,
            "relay pipeline running"
        );

        let result = loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break Ok(()),
                received = self.transport.receive() => received,
            };
            match received {
                Ok(message) => self.route(message).await,
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "transport closed, stopping pipeline");
                    break Err(e);
                }
                Err(e) => warn!(error = %e, "failed to receive message"),
            }
        };

        scheduler_cancel.cancel();
        if let Err(e) = scheduler.await {
            error!(error = %e, "scheduler task ended abnormally");
        }
        self.drain_queue().await;
        info!("relay pipeline stopped");
        result
    }

    async fn route(&self, message: InboundMessage) {
        let settings = &self.settings;
        if message.author == settings.first_responder {
            self.on_first_hop_reply(&message).await;
        } else if message.author == settings.second_responder {
            self.on_second_hop_reply(&message).await;
        } else if message.chat == settings.destination {
            debug!(message_id = %message.id, "ignoring message in destination chat");
        } else if !self.intake.admits_source(&message) {
            debug!(chat = %message.chat, "ignoring message from unadmitted chat");
        } else {
            self.submit(&message).await;
        }
    }

    /// Settles whatever is still live after [`run`](Self::run) was cut short.
    ///
    /// Used when the run task is aborted before it could drain: the in-flight
    /// request and every queued request fail with `Shutdown` and their
    /// thumbnails are released.
    pub async fn settle_remaining(&self) {
        let in_flight = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.scheduler = SchedulerState::Idle;
            let taken = state.in_flight.take();
            if let Some(f) = &taken {
                state.correlation.unbind_request(f.request.id);
            }
            taken
        };
        if let Some(f) = in_flight {
            self.finalize(f.request, Outcome::Failed(PipelineError::Shutdown), f.matched_by)
                .await;
        }
        self.drain_queue().await;
    }

    /// Settles every queued request as failed by shutdown.
    async fn drain_queue(&self) {
        let drained: Vec<LinkRequest> = self.state.lock().await.queue.drain(..).collect();
        if !drained.is_empty() {
            info!(count = drained.len(), "settling queued requests on shutdown");
        }
        for request in drained {
            self.finalize(request, Outcome::Failed(PipelineError::Shutdown), None)
                .await;
        }
    }

    /// The single terminal path. Consumes the request so it runs once.
    ///
    /// Callers must already have removed the request from the queue or the
    /// in-flight slot and unbound its correlation key.
    pub(crate) async fn finalize(
        &self,
        mut request: LinkRequest,
        outcome: Outcome,
        matched_by: Option<MatchStrategy>,
    ) {
        request.state = outcome.state();
        self.thumbnails.release(request.thumbnail_ref.as_ref()).await;
        counter!("linkrelay_requests_total", "outcome" => outcome.label()).increment(1);

        match &outcome {
            Outcome::Published { message_id } => info!(
                request_id = %request.id,
                link = %request.link,
                %message_id,
                "request published"
            ),
            Outcome::TimedOut(e) => warn!(
                request_id = %request.id,
                link = %request.link,
                error = %e,
                "request timed out"
            ),
            Outcome::Failed(e) => warn!(
                request_id = %request.id,
                link = %request.link,
                error = %e,
                "request failed"
            ),
        }

        let mut summary = request.summary();
        summary.matched_by = matched_by;
        summary.reason = outcome.reason();
        if let Outcome::Published { message_id } = outcome {
            summary.published_as = Some(message_id);
        }
        self.state
            .lock()
            .await
            .record(summary, self.settings.history_limit);
    }
}
