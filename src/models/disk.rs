// Drive metrics and the (pool, set) key used for per-erasure-set breakdowns

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{DiskIoStats, IntervalSeries, TimedAction};
use crate::merge::{Mergeable, Uniform, latest, merge_counts, merge_keyed};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskMetric {
    pub collected_at: DateTime<Utc>,
    pub n_disks: u64,
    pub offline: u64,
    pub healing: u64,
    pub pool_idx: Uniform<usize>,
    pub set_idx: Uniform<usize>,
    pub disk_idx: Uniform<usize>,
    pub drive_model: Uniform<String>,
    pub life_time_ops: BTreeMap<String, u64>,
    /// Last-minute operations per storage API call (e.g. "ReadAll").
    pub last_minute: BTreeMap<String, TimedAction>,
    pub last_day: BTreeMap<String, IntervalSeries<TimedAction>>,
    pub io_stats: DiskIoStats,
}

impl DiskMetric {
    /// Number of drives neither offline nor healing.
    pub fn online(&self) -> u64 {
        self.n_disks.saturating_sub(self.offline.saturating_add(self.healing))
    }
}

impl Mergeable for DiskMetric {
    fn merge(&mut self, other: &Self) {
        latest(&mut self.collected_at, other.collected_at);
        self.n_disks = self.n_disks.wrapping_add(other.n_disks);
        self.offline = self.offline.wrapping_add(other.offline);
        self.healing = self.healing.wrapping_add(other.healing);

        self.pool_idx.merge(&other.pool_idx);
        self.set_idx.merge(&other.set_idx);
        self.disk_idx.merge(&other.disk_idx);
        // A set index is meaningless without a single pool, a disk index without a single set.
        if self.pool_idx.is_mixed() {
            self.set_idx.collapse();
        }
        if self.set_idx.is_mixed() {
            self.disk_idx.collapse();
        }
        self.drive_model.merge(&other.drive_model);

        merge_counts(&mut self.life_time_ops, &other.life_time_ops);
        merge_keyed(&mut self.last_minute, &other.last_minute);
        merge_keyed(&mut self.last_day, &other.last_day);
        self.io_stats.merge(&other.io_stats);
    }
}

/// Identifies one erasure set. String form is `"<pool>:<set>"`, which is also its map key on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiskSetKey {
    pub pool: usize,
    pub set: usize,
}

impl DiskSetKey {
    pub fn new(pool: usize, set: usize) -> Self {
        Self { pool, set }
    }
}

impl fmt::Display for DiskSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pool, self.set)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid disk set key {0:?}, expected \"<pool>:<set>\"")]
pub struct ParseDiskSetKeyError(String);

impl FromStr for DiskSetKey {
    type Err = ParseDiskSetKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDiskSetKeyError(s.to_string());
        let (pool, set) = s.split_once(':').ok_or_else(err)?;
        Ok(Self {
            pool: pool.trim().parse().map_err(|_| err())?,
            set: set.trim().parse().map_err(|_| err())?,
        })
    }
}

impl Serialize for DiskSetKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DiskSetKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_set_key_parses_and_displays() {
        let key: DiskSetKey = "2:5".parse().unwrap();
        assert_eq!(key, DiskSetKey::new(2, 5));
        assert_eq!(key.to_string(), "2:5");
    }

    #[test]
    fn disk_set_key_rejects_garbage() {
        assert!("2".parse::<DiskSetKey>().is_err());
        assert!("a:1".parse::<DiskSetKey>().is_err());
        assert!("1:-1".parse::<DiskSetKey>().is_err());
    }

    #[test]
    fn set_collapse_cascades_to_disk_only() {
        let mut a = DiskMetric {
            pool_idx: Uniform::Same(0),
            set_idx: Uniform::Same(1),
            disk_idx: Uniform::Same(3),
            ..Default::default()
        };
        let b = DiskMetric {
            pool_idx: Uniform::Same(0),
            set_idx: Uniform::Same(2),
            disk_idx: Uniform::Same(3),
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.pool_idx.get(), Some(&0));
        assert!(a.set_idx.is_mixed());
        assert!(a.disk_idx.is_mixed());
    }
}
