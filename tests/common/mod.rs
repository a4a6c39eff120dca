// Shared test helpers

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use clustermetrics::merge::TimeWindow;
use clustermetrics::models::*;

/// Base time aligned to a minute, so 60s series anchored here need no rounding.
pub const T0: i64 = 1_700_000_040;

pub fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn api_stats(requests: u64, request_time_secs: f64, min: f64, max: f64) -> ApiStats {
    ApiStats {
        nodes: 1,
        window: TimeWindow::new(t(T0), t(T0 + 60)),
        requests,
        incoming_bytes: requests * 100,
        outgoing_bytes: requests * 1000,
        request_time_secs,
        request_time_min: min,
        request_time_max: max,
        ..Default::default()
    }
}

pub fn requests(n: u64) -> ApiStats {
    ApiStats {
        requests: n,
        ..Default::default()
    }
}

/// A 60s series starting at `first` with one bucket per entry of `counts`.
pub fn series(first: i64, counts: &[u64]) -> IntervalSeries<ApiStats> {
    IntervalSeries {
        interval_secs: 60,
        first_time: t(first),
        segments: counts.iter().map(|&n| requests(n)).collect(),
    }
}

pub fn bucket_requests(s: &IntervalSeries<ApiStats>) -> Vec<u64> {
    s.segments.iter().map(|seg| seg.requests).collect()
}

pub fn disk(n_disks: u64, pool: usize, set: usize) -> DiskMetric {
    DiskMetric {
        collected_at: t(T0),
        n_disks,
        pool_idx: pool.into(),
        set_idx: set.into(),
        ..Default::default()
    }
}

/// One node's snapshot with API, disk and CPU categories filled in.
pub fn node_snapshot(host: &str, requests: u64, pool: usize, set: usize) -> RealtimeMetrics {
    let metrics = Metrics {
        api: Some(ApiMetrics {
            collected_at: t(T0 + 60),
            active_requests: 1,
            last_minute: api_stats(requests, requests as f64 * 0.5, 0.25, 1.0),
            last_day: series(T0, &[requests, requests * 2]),
            ..Default::default()
        }),
        disk: Some(disk(4, pool, set)),
        cpu: Some(CpuMetrics {
            collected_at: t(T0 + 60),
            nodes: 1,
            cpu_count: 8,
            load: LoadAvg {
                load1: 1.5,
                load5: 1.0,
                load15: 0.5,
            },
            ..Default::default()
        }),
        ..Default::default()
    };
    let mut snapshot = RealtimeMetrics::for_host(host, metrics);
    let disk_id = format!("{host}-drive1");
    snapshot
        .by_disk
        .insert(disk_id, snapshot.aggregated.disk.clone().unwrap_or_default());
    snapshot.by_disk_set.insert(
        DiskSetKey::new(pool, set),
        snapshot.aggregated.disk.clone().unwrap_or_default(),
    );
    snapshot
}
