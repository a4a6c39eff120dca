// Data scanner progress and activity

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimedAction;
use crate::merge::{Mergeable, latest, merge_counts, merge_keyed};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScannerMetrics {
    pub collected_at: DateTime<Utc>,
    pub current_cycle: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_started: Option<DateTime<Utc>>,
    pub cycles_completed_at: Vec<DateTime<Utc>>,
    pub ongoing_buckets: u64,
    pub life_time_ops: BTreeMap<String, u64>,
    pub life_time_ilm: BTreeMap<String, u64>,
    pub last_minute_actions: BTreeMap<String, TimedAction>,
    pub last_minute_ilm: BTreeMap<String, TimedAction>,
    pub active_paths: Vec<String>,
}

impl Mergeable for ScannerMetrics {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);

        // Cycle state is copied as a unit from whichever side is further along.
        let ahead = (
            other.current_cycle,
            other.cycles_completed_at.len(),
            other.current_started,
            &other.cycles_completed_at,
        ) > (
            self.current_cycle,
            self.cycles_completed_at.len(),
            self.current_started,
            &self.cycles_completed_at,
        );
        if ahead {
            self.current_cycle = other.current_cycle;
            self.current_started = other.current_started;
            self.cycles_completed_at.clone_from(&other.cycles_completed_at);
        }

        self.ongoing_buckets = self.ongoing_buckets.wrapping_add(other.ongoing_buckets);
        merge_counts(&mut self.life_time_ops, &other.life_time_ops);
        merge_counts(&mut self.life_time_ilm, &other.life_time_ilm);
        merge_keyed(&mut self.last_minute_actions, &other.last_minute_actions);
        merge_keyed(&mut self.last_minute_ilm, &other.last_minute_ilm);
        self.active_paths.extend(other.active_paths.iter().cloned());
        self.active_paths.sort();
    }
}
