// Metric models: scalar accumulators, windowed records, interval series,
// per-category containers and the top-level snapshot.

mod api;
mod disk;
mod jobs;
mod realtime;
mod replication;
mod rpc;
mod scanner;
mod segmented;
mod system;
mod timed;

pub use api::{ApiMetrics, ApiStats};
pub use disk::{DiskMetric, DiskSetKey, ParseDiskSetKeyError};
pub use jobs::{BatchJobMetrics, JobMetric, SiteResyncMetrics};
pub use realtime::{Metrics, RealtimeMetrics};
pub use replication::{ReplicationMetrics, ReplicationStats};
pub use rpc::{ConnectionStats, RpcMetrics, RpcStats};
pub use scanner::ScannerMetrics;
pub use segmented::IntervalSeries;
pub use system::{
    CpuMetrics, CpuTimes, LoadAvg, MemInfo, MemMetrics, NetDevStats, NetMetrics, OsMetrics,
    ProcessIo, ProcessMem, ProcessMetrics, SensorStats,
};
pub use timed::{DiskIoStats, TimedAction};
