// Inter-node RPC: connection counters, windowed call stats and the RpcMetrics category

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IntervalSeries;
use crate::merge::{Mergeable, TimeWindow, bound, latest, merge_keyed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStats {
    pub connected: u64,
    pub disconnected: u64,
    pub reconnect_count: u64,
    pub outgoing_streams: u64,
    pub incoming_streams: u64,
    pub outgoing_bytes: u64,
    pub incoming_bytes: u64,
    pub outgoing_messages: u64,
    pub incoming_messages: u64,
    pub out_queue: u64,
}

impl Mergeable for ConnectionStats {
    fn merge(&mut self, other: &Self) {
        self.connected = self.connected.wrapping_add(other.connected);
        self.disconnected = self.disconnected.wrapping_add(other.disconnected);
        self.reconnect_count = self.reconnect_count.wrapping_add(other.reconnect_count);
        self.outgoing_streams = self.outgoing_streams.wrapping_add(other.outgoing_streams);
        self.incoming_streams = self.incoming_streams.wrapping_add(other.incoming_streams);
        self.outgoing_bytes = self.outgoing_bytes.wrapping_add(other.outgoing_bytes);
        self.incoming_bytes = self.incoming_bytes.wrapping_add(other.incoming_bytes);
        self.outgoing_messages = self.outgoing_messages.wrapping_add(other.outgoing_messages);
        self.incoming_messages = self.incoming_messages.wrapping_add(other.incoming_messages);
        self.out_queue = self.out_queue.wrapping_add(other.out_queue);
    }
}

/// RPC call statistics over a sampling window. Durations are seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcStats {
    pub nodes: u64,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub calls: u64,
    pub errors: u64,
    pub incoming_bytes: u64,
    pub outgoing_bytes: u64,
    pub call_time_secs: f64,
    pub call_time_min: f64,
    pub call_time_max: f64,
}

impl Mergeable for RpcStats {
    fn merge(&mut self, other: &Self) {
        let mine_empty = self.calls == 0;
        let theirs_empty = other.calls == 0;
        self.window.merge_with(&other.window, mine_empty, theirs_empty);
        self.call_time_min = bound(
            self.call_time_min,
            mine_empty,
            other.call_time_min,
            theirs_empty,
            f64::min,
        );
        self.call_time_max = bound(
            self.call_time_max,
            mine_empty,
            other.call_time_max,
            theirs_empty,
            f64::max,
        );
        self.nodes = self.nodes.wrapping_add(other.nodes);
        self.calls = self.calls.wrapping_add(other.calls);
        self.errors = self.errors.wrapping_add(other.errors);
        self.incoming_bytes = self.incoming_bytes.wrapping_add(other.incoming_bytes);
        self.outgoing_bytes = self.outgoing_bytes.wrapping_add(other.outgoing_bytes);
        self.call_time_secs += other.call_time_secs;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RpcMetrics {
    pub collected_at: DateTime<Utc>,
    pub connections: ConnectionStats,
    pub last_minute: RpcStats,
    pub last_day: IntervalSeries<RpcStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pong_time: Option<DateTime<Utc>>,
    /// Ping latency measured at `last_pong_time`.
    pub last_ping_ms: f64,
    pub max_ping_dur_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connect_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_destination: BTreeMap<String, RpcMetrics>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_caller: BTreeMap<String, RpcMetrics>,
}

impl Mergeable for RpcMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.connections.merge(&other.connections);
        self.last_minute.merge(&other.last_minute);
        self.last_day.add(&other.last_day);

        // Pong time and its latency travel together; on equal times the higher latency wins.
        if (other.last_pong_time, other.last_ping_ms) > (self.last_pong_time, self.last_ping_ms) {
            self.last_pong_time = other.last_pong_time;
            self.last_ping_ms = other.last_ping_ms;
        }
        self.max_ping_dur_ms = self.max_ping_dur_ms.max(other.max_ping_dur_ms);
        if other.last_connect_time > self.last_connect_time {
            self.last_connect_time = other.last_connect_time;
        }

        merge_keyed(&mut self.by_destination, &other.by_destination);
        merge_keyed(&mut self.by_caller, &other.by_caller);
    }
}
