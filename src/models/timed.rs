// Scalar accumulators: timed operations and block device counters

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::merge::Mergeable;

/// Count, accumulated time and bytes of one kind of operation. Times are nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimedAction {
    pub count: u64,
    pub acc_time: u64,
    pub min_time: u64,
    pub max_time: u64,
    pub bytes: u64,
}

impl TimedAction {
    /// Mean duration per operation, truncated to whole nanoseconds.
    pub fn avg(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.acc_time / self.count)
    }

    pub fn avg_bytes(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        self.bytes / self.count
    }

    /// Adds a single observed operation.
    pub fn record(&mut self, elapsed: Duration, bytes: u64) {
        let ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.merge(&TimedAction {
            count: 1,
            acc_time: ns,
            min_time: ns,
            max_time: ns,
            bytes,
        });
    }
}

impl Mergeable for TimedAction {
    fn merge(&mut self, other: &Self) {
        if other.count > 0 {
            if self.count == 0 {
                self.min_time = other.min_time;
                self.max_time = other.max_time;
            } else {
                self.min_time = self.min_time.min(other.min_time);
                self.max_time = self.max_time.max(other.max_time);
            }
        }
        self.count = self.count.wrapping_add(other.count);
        self.acc_time = self.acc_time.wrapping_add(other.acc_time);
        self.bytes = self.bytes.wrapping_add(other.bytes);
    }
}

/// Block device counters as reported by /proc/diskstats. All fields are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskIoStats {
    pub read_ios: u64,
    pub read_merges: u64,
    pub read_sectors: u64,
    pub read_ticks: u64,
    pub write_ios: u64,
    pub write_merges: u64,
    pub write_sectors: u64,
    pub write_ticks: u64,
    pub current_ios: u64,
    pub total_ticks: u64,
    pub req_ticks: u64,
    pub discard_ios: u64,
    pub discard_merges: u64,
    pub discard_sectors: u64,
    pub discard_ticks: u64,
    pub flush_ios: u64,
    pub flush_ticks: u64,
}

impl Mergeable for DiskIoStats {
    fn merge(&mut self, other: &Self) {
        self.read_ios = self.read_ios.wrapping_add(other.read_ios);
        self.read_merges = self.read_merges.wrapping_add(other.read_merges);
        self.read_sectors = self.read_sectors.wrapping_add(other.read_sectors);
        self.read_ticks = self.read_ticks.wrapping_add(other.read_ticks);
        self.write_ios = self.write_ios.wrapping_add(other.write_ios);
        self.write_merges = self.write_merges.wrapping_add(other.write_merges);
        self.write_sectors = self.write_sectors.wrapping_add(other.write_sectors);
        self.write_ticks = self.write_ticks.wrapping_add(other.write_ticks);
        self.current_ios = self.current_ios.wrapping_add(other.current_ios);
        self.total_ticks = self.total_ticks.wrapping_add(other.total_ticks);
        self.req_ticks = self.req_ticks.wrapping_add(other.req_ticks);
        self.discard_ios = self.discard_ios.wrapping_add(other.discard_ios);
        self.discard_merges = self.discard_merges.wrapping_add(other.discard_merges);
        self.discard_sectors = self.discard_sectors.wrapping_add(other.discard_sectors);
        self.discard_ticks = self.discard_ticks.wrapping_add(other.discard_ticks);
        self.flush_ios = self.flush_ios.wrapping_add(other.flush_ios);
        self.flush_ticks = self.flush_ticks.wrapping_add(other.flush_ticks);
    }
}
