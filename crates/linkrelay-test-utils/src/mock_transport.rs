// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use linkrelay_core::{
    AdapterType, HealthStatus, InboundMessage, MediaBlob, MessageId, PeerId, PluginAdapter,
    RelayError, Transport,
};

/// One captured outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        to: PeerId,
        id: MessageId,
        text: String,
    },
    Media {
        to: PeerId,
        id: MessageId,
        media: MediaBlob,
        caption: String,
    },
    Forward {
        to: PeerId,
        id: MessageId,
        original: MessageId,
    },
}

impl Sent {
    pub fn to(&self) -> PeerId {
        match self {
            Sent::Text { to, .. } | Sent::Media { to, .. } | Sent::Forward { to, .. } => *to,
        }
    }

    pub fn id(&self) -> MessageId {
        match self {
            Sent::Text { id, .. } | Sent::Media { id, .. } | Sent::Forward { id, .. } => *id,
        }
    }
}

/// A transport whose network is a pair of in-memory queues.
///
/// - **inbound**: messages injected via [`inject`](Self::inject) are
///   returned by `receive()` in order
/// - **sent**: every successful send, upload and forward is captured with
///   the message id it was assigned
///
/// Message ids are assigned from a single counter starting at 1000.
pub struct MockTransport {
    inbound: Mutex<VecDeque<InboundMessage>>,
    notify: Notify,
    closed: AtomicBool,
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    failing_text_peers: Mutex<HashSet<PeerId>>,
    fail_media: AtomicBool,
    fail_forward: AtomicBool,
    fail_fetch: AtomicBool,
    delays: Mutex<HashMap<PeerId, Duration>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1000),
            failing_text_peers: Mutex::new(HashSet::new()),
            fail_media: AtomicBool::new(false),
            fail_forward: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// Queues a message for the next `receive()`.
    pub async fn inject(&self, message: InboundMessage) {
        self.inbound.lock().await.push_back(message);
        self.notify.notify_one();
    }

    /// Ends the inbound stream once the queue is drained.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Whether every injected message has been picked up.
    pub async fn inbound_drained(&self) -> bool {
        self.inbound.lock().await.is_empty()
    }

    pub async fn sent(&self) -> Vec<Sent> {
        self.sent.lock().await.clone()
    }

    /// Captured calls addressed to `peer`, in send order.
    pub async fn sent_to(&self, peer: PeerId) -> Vec<Sent> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|s| s.to() == peer)
            .cloned()
            .collect()
    }

    /// Id of the most recent message sent to `peer`.
    pub async fn last_sent_to(&self, peer: PeerId) -> Option<MessageId> {
        self.sent_to(peer).await.last().map(Sent::id)
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn fail_send_text_to(&self, peer: PeerId) {
        self.failing_text_peers.lock().await.insert(peer);
    }

    pub fn fail_send_media(&self, fail: bool) {
        self.fail_media.store(fail, Ordering::SeqCst);
    }

    pub fn fail_forward(&self, fail: bool) {
        self.fail_forward.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Makes every send, upload and forward to `peer` take `delay` before it
    /// is captured. A call dropped mid-delay is never captured.
    pub async fn delay_sends_to(&self, peer: PeerId, delay: Duration) {
        self.delays.lock().await.insert(peer, delay);
    }

    async fn hold(&self, to: PeerId) {
        let delay = self.delays.lock().await.get(&to).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    /// The bytes `fetch_media` returns for an attachment with `file_id`.
    pub fn bytes_for(file_id: &str) -> Vec<u8> {
        format!("media:{file_id}").into_bytes()
    }

    fn assign_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn refused(what: &str) -> RelayError {
        RelayError::Transport {
            message: format!("mock {what} refused"),
            source: None,
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, RelayError> {
        if self.closed.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("closed".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), RelayError> {
        self.close();
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), RelayError> {
        Ok(())
    }

    async fn send_text(&self, to: PeerId, text: &str) -> Result<MessageId, RelayError> {
        self.hold(to).await;
        if self.failing_text_peers.lock().await.contains(&to) {
            return Err(Self::refused("send_text"));
        }
        let id = self.assign_id();
        self.sent.lock().await.push(Sent::Text {
            to,
            id,
            text: text.to_string(),
        });
        Ok(id)
    }

    async fn send_media(
        &self,
        to: PeerId,
        media: MediaBlob,
        caption: &str,
    ) -> Result<MessageId, RelayError> {
        self.hold(to).await;
        if self.fail_media.load(Ordering::SeqCst) {
            return Err(Self::refused("send_media"));
        }
        let id = self.assign_id();
        self.sent.lock().await.push(Sent::Media {
            to,
            id,
            media,
            caption: caption.to_string(),
        });
        Ok(id)
    }

    async fn fetch_media(&self, message: &InboundMessage) -> Result<Vec<u8>, RelayError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::refused("fetch_media"));
        }
        message
            .attachment
            .as_ref()
            .map(|a| Self::bytes_for(&a.file_id))
            .ok_or_else(|| RelayError::Media {
                message: format!("message {} has no attachment", message.id),
            })
    }

    async fn forward(
        &self,
        message: &InboundMessage,
        to: PeerId,
    ) -> Result<MessageId, RelayError> {
        self.hold(to).await;
        if self.fail_forward.load(Ordering::SeqCst) {
            return Err(Self::refused("forward"));
        }
        let id = self.assign_id();
        self.sent.lock().await.push(Sent::Forward {
            to,
            id,
            original: message.id,
        });
        Ok(id)
    }

    async fn receive(&self) -> Result<InboundMessage, RelayError> {
        loop {
            if let Some(message) = self.inbound.lock().await.pop_front() {
                return Ok(message);
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(RelayError::TransportClosed);
            }
            self.notify.notified().await;
        }
    }
}
