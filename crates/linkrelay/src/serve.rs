// SPDX-FileCopyrightText: 2026 Linkrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `linkrelay serve` command implementation.
//!
//! Connects the Telegram transport, runs the relay pipeline until a
//! shutdown signal arrives, and logs a periodic status line.

use std::sync::Arc;
use std::time::Duration;

use linkrelay_config::RelayConfig;
use linkrelay_core::{HealthStatus, RelayError, Transport};
use linkrelay_pipeline::{RelayPipeline, RequestState, shutdown};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[cfg(feature = "telegram")]
use linkrelay_telegram::TelegramTransport;

/// Runs the relay until SIGINT/SIGTERM or until the transport closes.
pub async fn run_serve(config: RelayConfig) -> Result<(), RelayError> {
    init_tracing(&config.daemon.log_level);
    info!(name = %config.daemon.name, "starting linkrelay serve");

    let transport = connect_transport(&config).await?;
    match transport.health_check().await {
        Ok(HealthStatus::Healthy) => info!(transport = transport.name(), "transport healthy"),
        Ok(status) => warn!(transport = transport.name(), ?status, "transport not healthy"),
        Err(e) => warn!(transport = transport.name(), error = %e, "transport health check failed"),
    }

    let pipeline = RelayPipeline::new(&config, Arc::clone(&transport))?;
    let cancel = shutdown::install_signal_handler();

    if config.daemon.status_interval_secs > 0 {
        spawn_status_log(
            pipeline.clone(),
            Duration::from_secs(config.daemon.status_interval_secs),
            cancel.clone(),
        );
    }

    let mut run = {
        let pipeline = pipeline.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { pipeline.run(cancel).await })
    };

    let joined = tokio::select! {
        joined = &mut run => Some(joined),
        _ = cancel.cancelled() => {
            let grace = Duration::from_secs(config.daemon.shutdown_grace_secs);
            let drained = shutdown::drain_within(&mut run, grace).await;
            if drained.is_none() {
                warn!(?grace, "pipeline did not drain in time, aborting");
                run.abort();
                let _ = (&mut run).await;
                pipeline.settle_remaining().await;
            }
            drained
        }
    };
    cancel.cancel();

    if let Err(e) = transport.shutdown().await {
        warn!(error = %e, "transport shutdown failed");
    }

    let stats = pipeline.thumbnail_stats();
    info!(
        thumbnails_acquired = stats.acquired,
        thumbnails_released = stats.released,
        "linkrelay stopped"
    );

    match joined {
        Some(Ok(result)) => result,
        Some(Err(e)) => Err(RelayError::Internal(format!("pipeline task failed: {e}"))),
        None => Ok(()),
    }
}

#[cfg(feature = "telegram")]
async fn connect_transport(config: &RelayConfig) -> Result<Arc<dyn Transport>, RelayError> {
    let mut transport = TelegramTransport::new(&config.telegram)?;
    transport.connect().await?;
    Ok(Arc::new(transport))
}

#[cfg(not(feature = "telegram"))]
async fn connect_transport(_config: &RelayConfig) -> Result<Arc<dyn Transport>, RelayError> {
    Err(RelayError::Config(
        "no transport compiled in; rebuild with the `telegram` feature".into(),
    ))
}

fn spawn_status_log(pipeline: RelayPipeline, every: Duration, cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let live = pipeline.current_state().await;
            let queued = live.iter().filter(|s| s.state == RequestState::Queued).count();
            let in_flight = live.iter().find(|s| s.state.is_in_flight());
            let recent = pipeline.recent_outcomes().await;
            let published = recent
                .iter()
                .filter(|s| s.state == RequestState::Published)
                .count();
            let scheduler = pipeline.scheduler_state().await;
            info!(
                %scheduler,
                queued,
                in_flight = in_flight.map(|s| s.link.as_str()).unwrap_or("-"),
                recent_published = published,
                recent_total = recent.len(),
                "relay status"
            );
        }
    });
}

/// Initializes the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("linkrelay={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
