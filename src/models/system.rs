// Host-level categories: OS operations and sensors, CPU, memory, network and process stats

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimedAction;
use crate::merge::{Mergeable, Uniform, bound, latest, merge_counts, merge_keyed};

/// Temperature readings of one sensor, in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorStats {
    pub samples: u64,
    pub total_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Readings at or above the sensor's critical threshold.
    pub critical: u64,
}

impl SensorStats {
    pub fn reading(temp: f64, critical_at: f64) -> Self {
        Self {
            samples: 1,
            total_temp: temp,
            min_temp: temp,
            max_temp: temp,
            critical: u64::from(critical_at > 0.0 && temp >= critical_at),
        }
    }

    pub fn avg_temp(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.total_temp / self.samples as f64)
    }
}

impl Mergeable for SensorStats {
    fn merge(&mut self, other: &Self) {
        let mine_empty = self.samples == 0;
        let theirs_empty = other.samples == 0;
        self.min_temp = bound(self.min_temp, mine_empty, other.min_temp, theirs_empty, f64::min);
        self.max_temp = bound(self.max_temp, mine_empty, other.max_temp, theirs_empty, f64::max);
        self.samples = self.samples.wrapping_add(other.samples);
        self.total_temp += other.total_temp;
        self.critical = self.critical.wrapping_add(other.critical);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OsMetrics {
    pub collected_at: DateTime<Utc>,
    pub life_time_ops: BTreeMap<String, u64>,
    pub last_minute: BTreeMap<String, TimedAction>,
    pub sensors: BTreeMap<String, SensorStats>,
}

impl Mergeable for OsMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        merge_counts(&mut self.life_time_ops, &other.life_time_ops);
        merge_keyed(&mut self.last_minute, &other.last_minute);
        merge_keyed(&mut self.sensors, &other.sensors);
    }
}

/// Cumulative CPU time per mode, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub nice: f64,
    pub iowait: f64,
    pub irq: f64,
    pub softirq: f64,
    pub steal: f64,
    pub guest: f64,
    pub guest_nice: f64,
}

impl CpuTimes {
    pub fn total(&self) -> f64 {
        self.user
            + self.system
            + self.idle
            + self.nice
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

impl Mergeable for CpuTimes {
    fn merge(&mut self, other: &Self) {
        self.user += other.user;
        self.system += other.system;
        self.idle += other.idle;
        self.nice += other.nice;
        self.iowait += other.iowait;
        self.irq += other.irq;
        self.softirq += other.softirq;
        self.steal += other.steal;
        self.guest += other.guest;
        self.guest_nice += other.guest_nice;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadAvg {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

impl Mergeable for LoadAvg {
    fn merge(&mut self, other: &Self) {
        self.load1 += other.load1;
        self.load5 += other.load5;
        self.load15 += other.load15;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuMetrics {
    pub collected_at: DateTime<Utc>,
    pub nodes: u64,
    pub cpu_count: u64,
    pub times: CpuTimes,
    /// Load averages summed over `nodes`.
    pub load: LoadAvg,
}

impl CpuMetrics {
    pub fn avg_load(&self) -> Option<LoadAvg> {
        if self.nodes == 0 {
            return None;
        }
        let n = self.nodes as f64;
        Some(LoadAvg {
            load1: self.load.load1 / n,
            load5: self.load.load5 / n,
            load15: self.load.load15 / n,
        })
    }
}

impl Mergeable for CpuMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.nodes = self.nodes.wrapping_add(other.nodes);
        self.cpu_count = self.cpu_count.wrapping_add(other.cpu_count);
        self.times.merge(&other.times);
        self.load.merge(&other.load);
    }
}

/// Memory figures in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemInfo {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub available: u64,
    pub shared: u64,
    pub cache: u64,
    pub buffers: u64,
    pub swap_space_total: u64,
    pub swap_space_free: u64,
    /// cgroup memory limit, zero when unlimited.
    pub limit: u64,
}

impl Mergeable for MemInfo {
    fn merge(&mut self, other: &Self) {
        self.total = self.total.wrapping_add(other.total);
        self.used = self.used.wrapping_add(other.used);
        self.free = self.free.wrapping_add(other.free);
        self.available = self.available.wrapping_add(other.available);
        self.shared = self.shared.wrapping_add(other.shared);
        self.cache = self.cache.wrapping_add(other.cache);
        self.buffers = self.buffers.wrapping_add(other.buffers);
        self.swap_space_total = self.swap_space_total.wrapping_add(other.swap_space_total);
        self.swap_space_free = self.swap_space_free.wrapping_add(other.swap_space_free);
        self.limit = self.limit.wrapping_add(other.limit);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemMetrics {
    pub collected_at: DateTime<Utc>,
    pub nodes: u64,
    pub info: MemInfo,
}

impl Mergeable for MemMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.nodes = self.nodes.wrapping_add(other.nodes);
        self.info.merge(&other.info);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetDevStats {
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errors: u64,
    pub rx_dropped: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errors: u64,
    pub tx_dropped: u64,
}

impl Mergeable for NetDevStats {
    fn merge(&mut self, other: &Self) {
        self.rx_bytes = self.rx_bytes.wrapping_add(other.rx_bytes);
        self.rx_packets = self.rx_packets.wrapping_add(other.rx_packets);
        self.rx_errors = self.rx_errors.wrapping_add(other.rx_errors);
        self.rx_dropped = self.rx_dropped.wrapping_add(other.rx_dropped);
        self.tx_bytes = self.tx_bytes.wrapping_add(other.tx_bytes);
        self.tx_packets = self.tx_packets.wrapping_add(other.tx_packets);
        self.tx_errors = self.tx_errors.wrapping_add(other.tx_errors);
        self.tx_dropped = self.tx_dropped.wrapping_add(other.tx_dropped);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetMetrics {
    pub collected_at: DateTime<Utc>,
    pub interface_name: Uniform<String>,
    pub stats: NetDevStats,
}

impl Mergeable for NetMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.interface_name.merge(&other.interface_name);
        self.stats.merge(&other.stats);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessIo {
    pub read_count: u64,
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessMem {
    pub rss: u64,
    pub vms: u64,
    pub swap: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessMetrics {
    pub collected_at: DateTime<Utc>,
    /// Number of server processes merged into this record.
    pub count: u64,
    pub cpu_percent: f64,
    pub voluntary_ctx_switches: u64,
    pub involuntary_ctx_switches: u64,
    pub io: ProcessIo,
    pub mem: ProcessMem,
    pub num_connections: u64,
    pub num_fds: u64,
    pub num_threads: u64,
    pub minor_page_faults: u64,
    pub major_page_faults: u64,
    pub running_secs: f64,
}

impl Mergeable for ProcessMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.count = self.count.wrapping_add(other.count);
        self.cpu_percent += other.cpu_percent;
        self.voluntary_ctx_switches = self
            .voluntary_ctx_switches
            .wrapping_add(other.voluntary_ctx_switches);
        self.involuntary_ctx_switches = self
            .involuntary_ctx_switches
            .wrapping_add(other.involuntary_ctx_switches);
        self.io.read_count = self.io.read_count.wrapping_add(other.io.read_count);
        self.io.write_count = self.io.write_count.wrapping_add(other.io.write_count);
        self.io.read_bytes = self.io.read_bytes.wrapping_add(other.io.read_bytes);
        self.io.write_bytes = self.io.write_bytes.wrapping_add(other.io.write_bytes);
        self.mem.rss = self.mem.rss.wrapping_add(other.mem.rss);
        self.mem.vms = self.mem.vms.wrapping_add(other.mem.vms);
        self.mem.swap = self.mem.swap.wrapping_add(other.mem.swap);
        self.num_connections = self.num_connections.wrapping_add(other.num_connections);
        self.num_fds = self.num_fds.wrapping_add(other.num_fds);
        self.num_threads = self.num_threads.wrapping_add(other.num_threads);
        self.minor_page_faults = self.minor_page_faults.wrapping_add(other.minor_page_faults);
        self.major_page_faults = self.major_page_faults.wrapping_add(other.major_page_faults);
        self.running_secs += other.running_secs;
    }
}
