// Per-node snapshot / cluster view: one optional container per metric category,
// plus breakdowns by host, drive and erasure set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    ApiMetrics, BatchJobMetrics, CpuMetrics, DiskMetric, DiskSetKey, MemMetrics, NetMetrics,
    OsMetrics, ProcessMetrics, ReplicationMetrics, RpcMetrics, ScannerMetrics, SiteResyncMetrics,
};
use crate::merge::{Mergeable, merge_keyed, merge_opt};

/// Category containers. A category absent from a source is skipped when merging.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scanner: Option<ScannerMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<DiskMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_jobs: Option<BatchJobMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_resync: Option<SiteResyncMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net: Option<NetMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem: Option<MemMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc: Option<RpcMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication: Option<ReplicationMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessMetrics>,
}

impl Mergeable for Metrics {
    fn merge(&mut self, other: &Self) {
        merge_opt(&mut self.scanner, &other.scanner);
        merge_opt(&mut self.disk, &other.disk);
        merge_opt(&mut self.os, &other.os);
        merge_opt(&mut self.batch_jobs, &other.batch_jobs);
        merge_opt(&mut self.site_resync, &other.site_resync);
        merge_opt(&mut self.net, &other.net);
        merge_opt(&mut self.mem, &other.mem);
        merge_opt(&mut self.cpu, &other.cpu);
        merge_opt(&mut self.rpc, &other.rpc);
        merge_opt(&mut self.api, &other.api);
        merge_opt(&mut self.replication, &other.replication);
        merge_opt(&mut self.process, &other.process);
    }
}

/// One node's snapshot, or the running cluster-wide merge of many.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealtimeMetrics {
    /// Collection errors reported by nodes; concatenated, never deduplicated.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub hosts: Vec<String>,
    pub aggregated: Metrics,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_host: BTreeMap<String, Metrics>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_disk: BTreeMap<String, DiskMetric>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_disk_set: BTreeMap<DiskSetKey, DiskMetric>,
    /// Set on the last snapshot of a stream.
    #[serde(rename = "final")]
    pub is_final: bool,
}

impl RealtimeMetrics {
    /// Snapshot for a single host whose aggregated view is also its by-host entry.
    pub fn for_host(host: impl Into<String>, metrics: Metrics) -> Self {
        let host = host.into();
        Self {
            hosts: vec![host.clone()],
            by_host: BTreeMap::from([(host, metrics.clone())]),
            aggregated: metrics,
            ..Default::default()
        }
    }
}

impl Mergeable for RealtimeMetrics {
    fn merge(&mut self, other: &Self) {
        self.errors.extend(other.errors.iter().cloned());
        self.hosts.extend(other.hosts.iter().cloned());
        self.hosts.sort();
        self.hosts.dedup();
        self.aggregated.merge(&other.aggregated);
        merge_keyed(&mut self.by_host, &other.by_host);
        merge_keyed(&mut self.by_disk, &other.by_disk);
        merge_keyed(&mut self.by_disk_set, &other.by_disk_set);
        self.is_final |= other.is_final;
    }
}
