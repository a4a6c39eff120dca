// S3 API request statistics: the windowed ApiStats record and the ApiMetrics category

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::IntervalSeries;
use crate::merge::{Mergeable, TimeWindow, bound, latest, merge_keyed};

/// Request statistics over a sampling window. Durations are seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiStats {
    /// Number of nodes that contributed to this record.
    pub nodes: u64,
    #[serde(flatten)]
    pub window: TimeWindow,
    /// Sum of node wall time spent collecting.
    pub wall_time_secs: f64,
    pub requests: u64,
    pub incoming_bytes: u64,
    pub outgoing_bytes: u64,
    pub errors_4xx: u64,
    pub errors_5xx: u64,
    pub canceled: u64,
    pub rejected_auth: u64,
    pub rejected_header: u64,
    pub rejected_time: u64,
    pub rejected_invalid: u64,
    pub request_time_secs: f64,
    pub req_read_secs: f64,
    pub resp_secs: f64,
    pub resp_ttfb_secs: f64,
    pub request_time_min: f64,
    pub request_time_max: f64,
    pub ttfb_min: f64,
    pub ttfb_max: f64,
}

impl ApiStats {
    pub fn avg_request_time(&self) -> Option<Duration> {
        per_request(self.request_time_secs, self.requests)
    }

    pub fn avg_ttfb(&self) -> Option<Duration> {
        per_request(self.resp_ttfb_secs, self.requests)
    }

    /// Requests per second over the window; `None` while the window is unknown.
    pub fn requests_per_sec(&self) -> Option<f64> {
        self.window.secs().map(|secs| self.requests as f64 / secs)
    }

    pub fn errors(&self) -> u64 {
        self.errors_4xx + self.errors_5xx
    }
}

fn per_request(total_secs: f64, requests: u64) -> Option<Duration> {
    if requests == 0 {
        return None;
    }
    Duration::try_from_secs_f64(total_secs / requests as f64).ok()
}

impl Mergeable for ApiStats {
    fn merge(&mut self, other: &Self) {
        let mine_empty = self.requests == 0;
        let theirs_empty = other.requests == 0;
        self.window.merge_with(&other.window, mine_empty, theirs_empty);

        self.request_time_min = bound(
            self.request_time_min,
            mine_empty,
            other.request_time_min,
            theirs_empty,
            f64::min,
        );
        self.request_time_max = bound(
            self.request_time_max,
            mine_empty,
            other.request_time_max,
            theirs_empty,
            f64::max,
        );
        self.ttfb_min = bound(self.ttfb_min, mine_empty, other.ttfb_min, theirs_empty, f64::min);
        self.ttfb_max = bound(self.ttfb_max, mine_empty, other.ttfb_max, theirs_empty, f64::max);

        self.nodes = self.nodes.wrapping_add(other.nodes);
        self.wall_time_secs += other.wall_time_secs;
        self.requests = self.requests.wrapping_add(other.requests);
        self.incoming_bytes = self.incoming_bytes.wrapping_add(other.incoming_bytes);
        self.outgoing_bytes = self.outgoing_bytes.wrapping_add(other.outgoing_bytes);
        self.errors_4xx = self.errors_4xx.wrapping_add(other.errors_4xx);
        self.errors_5xx = self.errors_5xx.wrapping_add(other.errors_5xx);
        self.canceled = self.canceled.wrapping_add(other.canceled);
        self.rejected_auth = self.rejected_auth.wrapping_add(other.rejected_auth);
        self.rejected_header = self.rejected_header.wrapping_add(other.rejected_header);
        self.rejected_time = self.rejected_time.wrapping_add(other.rejected_time);
        self.rejected_invalid = self.rejected_invalid.wrapping_add(other.rejected_invalid);
        self.request_time_secs += other.request_time_secs;
        self.req_read_secs += other.req_read_secs;
        self.resp_secs += other.resp_secs;
        self.resp_ttfb_secs += other.resp_ttfb_secs;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiMetrics {
    pub collected_at: DateTime<Utc>,
    pub active_requests: u64,
    pub queued_requests: u64,
    pub last_minute: ApiStats,
    /// Last-minute stats per API name (e.g. "PutObject").
    pub last_minute_api: BTreeMap<String, ApiStats>,
    pub last_day: IntervalSeries<ApiStats>,
    pub last_day_api: BTreeMap<String, IntervalSeries<ApiStats>>,
    pub since_start: ApiStats,
}

impl ApiMetrics {
    pub fn last_day_total(&self) -> ApiStats {
        self.last_day.total()
    }
}

impl Mergeable for ApiMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.active_requests = self.active_requests.wrapping_add(other.active_requests);
        self.queued_requests = self.queued_requests.wrapping_add(other.queued_requests);
        self.last_minute.merge(&other.last_minute);
        merge_keyed(&mut self.last_minute_api, &other.last_minute_api);
        self.last_day.add(&other.last_day);
        merge_keyed(&mut self.last_day_api, &other.last_day_api);
        self.since_start.merge(&other.since_start);
    }
}
