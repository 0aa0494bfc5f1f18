// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use linkrelay_config::RelayConfig;
use linkrelay_core::{MessageId, RelayError, Transport};
use linkrelay_pipeline::{
    IntakeFilter, LinkExtractor, PipelineSettings, RelayPipeline, ThumbnailStore,
};
use linkrelay_test_utils::MockTransport;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Relay {
    pub transport: Arc<MockTransport>,
    pub pipeline: RelayPipeline,
    pub cancel: CancellationToken,
    handle: JoinHandle<Result<(), RelayError>>,
}

impl Relay {
    pub fn start(config: &RelayConfig) -> Self {
        let transport = Arc::new(MockTransport::new());
        let dyn_transport: Arc<dyn Transport> = transport.clone();
        let pipeline = RelayPipeline::new(config, dyn_transport).unwrap();
        Self::launch(transport, pipeline)
    }

    /// Starts with a thumbnail store the test keeps a handle to.
    pub fn start_with_thumbnails(config: &RelayConfig, thumbnails: Arc<ThumbnailStore>) -> Self {
        let transport = Arc::new(MockTransport::new());
        let dyn_transport: Arc<dyn Transport> = transport.clone();
        let pipeline = RelayPipeline::from_parts(
            PipelineSettings::from_config(config).unwrap(),
            dyn_transport,
            thumbnails,
            LinkExtractor::new(&config.intake.link_patterns).unwrap(),
            IntakeFilter::from_config(&config.intake),
        );
        Self::launch(transport, pipeline)
    }

    fn launch(transport: Arc<MockTransport>, pipeline: RelayPipeline) -> Self {
        let cancel = CancellationToken::new();
        let handle = {
            let pipeline = pipeline.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { pipeline.run(cancel).await })
        };
        Self {
            transport,
            pipeline,
            cancel,
            handle,
        }
    }

    /// Delivers `message` and lets every task run until idle.
    pub async fn deliver(&self, message: linkrelay_core::InboundMessage) {
        self.transport.inject(message).await;
        idle().await;
    }

    pub async fn last_to(&self, peer: linkrelay_core::PeerId) -> MessageId {
        self.transport.last_sent_to(peer).await.unwrap()
    }

    pub async fn stop(self) -> Result<(), RelayError> {
        self.cancel.cancel();
        self.handle.await.unwrap()
    }

    /// Kills the run task without letting it drain.
    pub async fn abort(self) -> RelayPipeline {
        self.handle.abort();
        let _ = self.handle.await;
        self.pipeline
    }

    pub async fn join(self) -> Result<(), RelayError> {
        self.handle.await.unwrap()
    }
}

/// With a paused clock, returns once every other task is blocked.
pub async fn idle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub async fn elapse(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
