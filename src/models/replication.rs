// Bucket replication statistics

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IntervalSeries;
use crate::merge::{Mergeable, TimeWindow, bound, latest, merge_keyed};

/// Replication events over a sampling window. Durations are seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicationStats {
    pub nodes: u64,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub events: u64,
    pub bytes: u64,
    pub failed_events: u64,
    pub failed_bytes: u64,
    pub event_time_secs: f64,
    pub event_time_min: f64,
    pub event_time_max: f64,
}

impl ReplicationStats {
    pub fn avg_event_time(&self) -> Option<Duration> {
        if self.events == 0 {
            return None;
        }
        Duration::try_from_secs_f64(self.event_time_secs / self.events as f64).ok()
    }
}

impl Mergeable for ReplicationStats {
    fn merge(&mut self, other: &Self) {
        let mine_empty = self.events == 0;
        let theirs_empty = other.events == 0;
        self.window.merge_with(&other.window, mine_empty, theirs_empty);
        self.event_time_min = bound(
            self.event_time_min,
            mine_empty,
            other.event_time_min,
            theirs_empty,
            f64::min,
        );
        self.event_time_max = bound(
            self.event_time_max,
            mine_empty,
            other.event_time_max,
            theirs_empty,
            f64::max,
        );
        self.nodes = self.nodes.wrapping_add(other.nodes);
        self.events = self.events.wrapping_add(other.events);
        self.bytes = self.bytes.wrapping_add(other.bytes);
        self.failed_events = self.failed_events.wrapping_add(other.failed_events);
        self.failed_bytes = self.failed_bytes.wrapping_add(other.failed_bytes);
        self.event_time_secs += other.event_time_secs;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicationMetrics {
    pub collected_at: DateTime<Utc>,
    pub active: u64,
    pub queued: u64,
    pub last_minute: ReplicationStats,
    pub last_day: IntervalSeries<ReplicationStats>,
    pub since_start: ReplicationStats,
    /// Stats per replication target ARN.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_target: BTreeMap<String, ReplicationStats>,
}

impl Mergeable for ReplicationMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.active = self.active.wrapping_add(other.active);
        self.queued = self.queued.wrapping_add(other.queued);
        self.last_minute.merge(&other.last_minute);
        self.last_day.add(&other.last_day);
        self.since_start.merge(&other.since_start);
        merge_keyed(&mut self.by_target, &other.by_target);
    }
}
