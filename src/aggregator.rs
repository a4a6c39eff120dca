// Aggregation pass: one task owns the running RealtimeMetrics and merges decoded node
// snapshots received over a bounded channel. Producers never touch the accumulator.

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::merge::Mergeable;
use crate::models::RealtimeMetrics;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Snapshots buffered before `submit` waits on the aggregation task.
    pub channel_capacity: usize,
    /// Log progress every N merged snapshots; 0 disables.
    pub progress_log_every: u64,
}

/// Result of an aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationPass {
    pub metrics: RealtimeMetrics,
    /// Number of snapshots merged.
    pub snapshots: u64,
}

impl AggregationPass {
    /// Merges one snapshot. Returns false once a final snapshot has been merged.
    pub fn absorb(&mut self, snapshot: &RealtimeMetrics) -> bool {
        self.metrics.merge(snapshot);
        self.snapshots += 1;
        !snapshot.is_final
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("aggregation pass has finished; snapshot not merged")]
    Closed,
}

/// Sending side of an aggregation pass. Cloneable; the pass ends when every handle is dropped.
#[derive(Debug, Clone)]
pub struct AggregatorHandle {
    tx: mpsc::Sender<RealtimeMetrics>,
}

impl AggregatorHandle {
    /// Queues a snapshot for merging. Each snapshot must be submitted at most once per pass.
    pub async fn submit(&self, snapshot: RealtimeMetrics) -> Result<(), AggregatorError> {
        self.tx
            .send(snapshot)
            .await
            .map_err(|_| AggregatorError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawns the aggregation task. Await the join handle for the merged result.
///
/// The task stops after merging a snapshot flagged `final`; snapshots still queued behind
/// it are discarded and later submits fail with [`AggregatorError::Closed`].
pub fn spawn(config: AggregatorConfig) -> (AggregatorHandle, JoinHandle<AggregationPass>) {
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let handle = tokio::spawn(run(rx, config.progress_log_every));
    (AggregatorHandle { tx }, handle)
}

#[instrument(skip(rx))]
async fn run(mut rx: mpsc::Receiver<RealtimeMetrics>, progress_log_every: u64) -> AggregationPass {
    let mut pass = AggregationPass::default();
    while let Some(snapshot) = rx.recv().await {
        let more = pass.absorb(&snapshot);
        if progress_log_every > 0 && pass.snapshots % progress_log_every == 0 {
            info!(
                snapshots = pass.snapshots,
                hosts = pass.metrics.hosts.len(),
                "aggregation progress"
            );
        }
        if !more {
            debug!(snapshots = pass.snapshots, "final snapshot merged");
            break;
        }
    }
    debug!(
        snapshots = pass.snapshots,
        errors = pass.metrics.errors.len(),
        "aggregation pass complete"
    );
    pass
}

/// Folds a stream of snapshots, stopping after a final snapshot.
pub async fn aggregate_stream<S>(stream: S) -> AggregationPass
where
    S: Stream<Item = RealtimeMetrics>,
{
    let mut stream = std::pin::pin!(stream);
    let mut pass = AggregationPass::default();
    while let Some(snapshot) = stream.next().await {
        if !pass.absorb(&snapshot) {
            break;
        }
    }
    pass
}

/// Synchronous counterpart of [`aggregate_stream`].
pub fn aggregate<I>(snapshots: I) -> AggregationPass
where
    I: IntoIterator<Item = RealtimeMetrics>,
{
    let mut pass = AggregationPass::default();
    for snapshot in snapshots {
        if !pass.absorb(&snapshot) {
            break;
        }
    }
    pass
}
