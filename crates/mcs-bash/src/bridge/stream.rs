//! Two-way bridge between a pair of endpoints

use std::sync::Arc;
use std::time::Duration;

use mcs_core::config::BridgeConfig;
use mcs_core::Endpoint;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::gate::CompletionGate;
use super::relay::{Direction, RelayReport, RelayTask};

/// Result of a bridge run.
///
/// A report is `None` when its task panicked or was still blocked in a
/// read when an interrupted bridge gave up waiting for it.
#[derive(Debug)]
pub struct BridgeReport {
    /// First endpoint to second endpoint
    pub forward: Option<RelayReport>,
    /// Second endpoint to first endpoint
    pub reverse: Option<RelayReport>,
    /// Whether the bridge was stopped by its shutdown token
    pub interrupted: bool,
}

/// Relays bytes between two endpoints until both directions finish
#[derive(Debug, Clone, Default)]
pub struct StreamBridge {
    config: BridgeConfig,
}

impl StreamBridge {
    /// Create a bridge with the given settings
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Bridge settings
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Relay `a -> b` and `b -> a` concurrently.
    ///
    /// Returns once both directions have stopped. If `shutdown` fires first,
    /// both relay tasks are cancelled and the bridge waits at most
    /// `teardown_grace` for them; a task parked in a read is left behind.
    /// Relay I/O failures are logged by the failing task and never fail the
    /// bridge.
    pub async fn run(&self, a: Endpoint, b: Endpoint, shutdown: &CancellationToken) -> BridgeReport {
        let (a_name, a_source, a_sink) = a.into_parts();
        let (b_name, b_source, b_sink) = b.into_parts();

        let gate = Arc::new(CompletionGate::new(2));
        let forward_cancel = CancellationToken::new();
        let reverse_cancel = CancellationToken::new();

        let forward = RelayTask::new(
            Direction::Forward,
            a_source,
            b_sink,
            forward_cancel.clone(),
            Arc::clone(&gate),
        )
        .with_chunk_size(self.config.chunk_size);

        let reverse = RelayTask::new(
            Direction::Reverse,
            b_source,
            a_sink,
            reverse_cancel.clone(),
            Arc::clone(&gate),
        )
        .with_chunk_size(self.config.chunk_size);

        tracing::info!("Bridging {} <-> {}", a_name, b_name);

        let forward_handle = tokio::task::spawn_blocking(move || forward.run());
        let reverse_handle = tokio::task::spawn_blocking(move || reverse.run());

        let interrupted = tokio::select! {
            biased;
            _ = gate.wait() => false,
            _ = shutdown.cancelled() => true,
        };

        if interrupted {
            tracing::debug!("Bridge interrupted, cancelling relay tasks");
            forward_cancel.cancel();
            reverse_cancel.cancel();

            let grace = self.config.teardown_grace;
            if tokio::time::timeout(grace, gate.wait()).await.is_err() {
                tracing::warn!(
                    "{} relay task(s) still blocked after {:?}, leaving them behind",
                    gate.remaining(),
                    grace
                );
            }
        }

        // Tasks that counted the gate down are about to return; anything
        // else is parked in a read and may never come back.
        let settle = if gate.is_open() { None } else { Some(JOIN_SETTLE) };

        let report = BridgeReport {
            forward: collect(forward_handle, Direction::Forward, settle).await,
            reverse: collect(reverse_handle, Direction::Reverse, settle).await,
            interrupted,
        };

        tracing::info!(
            "Bridge {} <-> {} finished (forward: {}, reverse: {}, interrupted: {})",
            a_name,
            b_name,
            describe(&report.forward),
            describe(&report.reverse),
            report.interrupted
        );

        report
    }
}

/// Upper bound on joining a task while another one is known to be stuck
const JOIN_SETTLE: Duration = Duration::from_millis(100);

async fn collect(
    handle: JoinHandle<RelayReport>,
    direction: Direction,
    settle: Option<Duration>,
) -> Option<RelayReport> {
    let joined = match settle {
        None => handle.await,
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => return None,
        },
    };

    match joined {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::error!("Relay {} task failed: {}", direction, e);
            None
        }
    }
}

fn describe(report: &Option<RelayReport>) -> String {
    match report {
        Some(r) => format!("{:?}, {} bytes", r.outcome, r.bytes),
        None => "abandoned".to_string(),
    }
}
