//! Snapshot publication boundary.
//!
//! The consumer loop hands each freshly taken `Snapshot` to a `SnapshotSink`
//! and never learns what is on the other side. The terminal dashboard sits
//! behind [`ChannelSink`]; headless runs use [`LogSink`]. A slow sink costs
//! at most a bounded pause per record, never an unbounded stall.

use {
    crate::stats::Snapshot,
    async_trait::async_trait,
    std::{sync::Arc, time::Duration},
    tokio::sync::{mpsc, RwLock},
};

/// Shared cell holding the most recent snapshot for the renderer.
pub type LatestSnapshot = Arc<RwLock<Option<Snapshot>>>;

#[derive(Debug)]
pub enum SinkError {
    Closed,
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Closed => write!(f, "Snapshot sink closed"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Receiver side of snapshot publication. Called once per successfully
/// decoded record, always with an immutable copy of the state.
#[async_trait]
pub trait SnapshotSink: Send {
    async fn publish(&mut self, snapshot: Snapshot) -> Result<(), SinkError>;
}

/// Headless sink: one summary log line per snapshot.
pub struct LogSink;

#[async_trait]
impl SnapshotSink for LogSink {
    async fn publish(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        let parts: Vec<String> = snapshot
            .categories
            .iter()
            .map(|c| {
                format!(
                    "{}: avg {:.1} ({:.1}%)",
                    c.category, c.average_score, c.share_pct
                )
            })
            .collect();
        log::info!(
            "📊 {} events | {}",
            snapshot.total_events,
            parts.join(" | ")
        );
        Ok(())
    }
}

/// Sink feeding the render task over a bounded channel.
///
/// When the renderer applies backpressure the send waits at most
/// `send_timeout`, then drops the frame with a warning; the next record's
/// snapshot supersedes it anyway. Only a closed channel (renderer gone) is
/// reported to the caller.
pub struct ChannelSink {
    tx: mpsc::Sender<Snapshot>,
    send_timeout: Duration,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Snapshot>, send_timeout: Duration) -> Self {
        Self { tx, send_timeout }
    }
}

#[async_trait]
impl SnapshotSink for ChannelSink {
    async fn publish(&mut self, snapshot: Snapshot) -> Result<(), SinkError> {
        match self.tx.send_timeout(snapshot, self.send_timeout).await {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendTimeoutError::Timeout(_)) => {
                log::warn!("⚠️ Renderer backpressure, dropping snapshot");
                Ok(())
            }
            Err(mpsc::error::SendTimeoutError::Closed(_)) => Err(SinkError::Closed),
        }
    }
}

/// Background task that receives snapshots from the channel and stores the
/// latest into the shared cell read by the UI.
pub async fn snapshot_relay_task(mut rx: mpsc::Receiver<Snapshot>, latest: LatestSnapshot) {
    log::info!("Snapshot relay task started");

    while let Some(snapshot) = rx.recv().await {
        let mut cell = latest.write().await;
        *cell = Some(snapshot);
    }

    log::info!("Snapshot relay task stopped");
}
