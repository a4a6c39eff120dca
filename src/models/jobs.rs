// Batch job progress and site replication resync. Both carry state that is taken from
// the most recently updated source rather than summed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::merge::{Mergeable, Uniform, latest, merge_keyed};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobMetric {
    pub job_id: String,
    pub job_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    pub retry_attempts: u64,
    pub complete: bool,
    pub failed: bool,
    pub objects: u64,
    pub objects_failed: u64,
    pub bytes_transferred: u64,
    pub bytes_failed: u64,
    /// Bucket and object the job was working on at `last_update`.
    pub bucket: String,
    pub object: String,
}

type JobProgress<'a> = (
    Option<DateTime<Utc>>,
    (bool, bool),
    (u64, u64),
    (u64, u64),
    u64,
    (&'a str, &'a str),
    (Option<DateTime<Utc>>, &'a str),
);

impl JobMetric {
    /// Orders two reports of the same job: latest update first, then furthest progress.
    fn progress(&self) -> JobProgress<'_> {
        (
            self.last_update,
            (self.complete, self.failed),
            (self.objects, self.objects_failed),
            (self.bytes_transferred, self.bytes_failed),
            self.retry_attempts,
            (self.bucket.as_str(), self.object.as_str()),
            (self.start_time, self.job_type.as_str()),
        )
    }
}

impl Mergeable for JobMetric {
    fn merge(&mut self, other: &Self) {
        if other.progress() > self.progress() {
            self.clone_from(other);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchJobMetrics {
    pub collected_at: DateTime<Utc>,
    pub jobs: BTreeMap<String, JobMetric>,
}

impl Mergeable for BatchJobMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        merge_keyed(&mut self.jobs, &other.jobs);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteResyncMetrics {
    pub collected_at: DateTime<Utc>,
    pub resync_id: Uniform<String>,
    pub deployment_id: Uniform<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
    pub num_buckets: u64,
    pub replicated_size: u64,
    pub replicated_count: u64,
    pub failed_size: u64,
    pub failed_count: u64,
    pub failed_buckets: Vec<String>,
    pub bucket: String,
    pub object: String,
}

impl Mergeable for SiteResyncMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.resync_id.merge(&other.resync_id);
        self.deployment_id.merge(&other.deployment_id);

        let later = (other.last_update, &other.status, &other.bucket, &other.object)
            > (self.last_update, &self.status, &self.bucket, &self.object);
        if later {
            self.last_update = other.last_update;
            self.status.clone_from(&other.status);
            self.bucket.clone_from(&other.bucket);
            self.object.clone_from(&other.object);
        }
        self.start_time = match (self.start_time, other.start_time) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        self.num_buckets = self.num_buckets.wrapping_add(other.num_buckets);
        self.replicated_size = self.replicated_size.wrapping_add(other.replicated_size);
        self.replicated_count = self.replicated_count.wrapping_add(other.replicated_count);
        self.failed_size = self.failed_size.wrapping_add(other.failed_size);
        self.failed_count = self.failed_count.wrapping_add(other.failed_count);
        self.failed_buckets.extend(other.failed_buckets.iter().cloned());
        self.failed_buckets.sort();
        self.failed_buckets.dedup();
    }
}
