// Fixed-width time-bucketed series of mergeable records (e.g. last-day API stats).
// Two series with the same bucket width are merged onto a common timeline.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::merge::Mergeable;

/// Buckets of `interval_secs` width starting at `first_time`; bucket `i` covers
/// `[first_time + i*interval, first_time + (i+1)*interval)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntervalSeries<T> {
    pub interval_secs: u32,
    pub first_time: DateTime<Utc>,
    pub segments: Vec<T>,
}

impl<T: Mergeable + Default + Clone> IntervalSeries<T> {
    /// Empty series whose anchor is `first_time` rounded down to a multiple of the interval.
    pub fn new(first_time: DateTime<Utc>, interval_secs: u32) -> Self {
        Self {
            interval_secs,
            first_time: align(first_time, interval_secs),
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    fn step(&self) -> i64 {
        i64::from(self.interval_secs)
    }

    fn end_secs(&self) -> i64 {
        self.first_time.timestamp() + self.step() * self.segments.len() as i64
    }

    /// Exclusive end of the last bucket, clamped to the latest representable time.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.bucket_start(self.segments.len())
    }

    /// Total time covered by all buckets.
    pub fn span(&self) -> TimeDelta {
        TimeDelta::try_seconds(self.step() * self.segments.len() as i64).unwrap_or(TimeDelta::MAX)
    }

    fn bucket_start(&self, idx: usize) -> DateTime<Utc> {
        TimeDelta::try_seconds(self.step() * idx as i64)
            .and_then(|offset| self.first_time.checked_add_signed(offset))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// The bucket covering `at`, if any.
    pub fn segment_at(&self, at: DateTime<Utc>) -> Option<&T> {
        if self.interval_secs == 0 || at < self.first_time {
            return None;
        }
        let idx = (at.timestamp() - self.first_time.timestamp()) / self.step();
        self.segments.get(usize::try_from(idx).ok()?)
    }

    /// Buckets paired with their start time.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, &T)> {
        self.segments
            .iter()
            .enumerate()
            .map(move |(i, seg)| (self.bucket_start(i), seg))
    }

    /// Merges `value` into the bucket covering `at`, growing the timeline as needed.
    pub fn record(&mut self, at: DateTime<Utc>, value: &T) {
        if self.interval_secs == 0 {
            return;
        }
        let mut one = Self::new(at, self.interval_secs);
        one.segments.push(value.clone());
        self.add(&one);
    }

    /// Merges `other` into `self`.
    ///
    /// An empty receiver becomes a deep copy of `other`. Series with different (or zero)
    /// bucket widths cannot be combined and are silently left as they are. Series sharing
    /// anchor and length are summed bucket by bucket; anything else is resampled onto a
    /// new bucket array covering the union of both spans.
    pub fn add(&mut self, other: &Self) {
        if other.segments.is_empty() {
            return;
        }
        if self.segments.is_empty() {
            self.clone_from(other);
            return;
        }
        if self.interval_secs != other.interval_secs || self.interval_secs == 0 {
            debug!(
                interval_secs = self.interval_secs,
                other_interval_secs = other.interval_secs,
                "bucket widths differ; series not merged"
            );
            return;
        }
        if self.first_time == other.first_time && self.segments.len() == other.segments.len() {
            for (mine, theirs) in self.segments.iter_mut().zip(&other.segments) {
                mine.merge(theirs);
            }
            return;
        }

        let step = self.step();
        let mine_start = self.first_time.timestamp();
        let theirs_start = other.first_time.timestamp();
        let start = mine_start.min(theirs_start);
        let end = self.end_secs().max(other.end_secs());
        let total_slots = (end - start + step - 1) / step;

        let mut segments = vec![T::default(); total_slots as usize];
        let mine_offset = ((mine_start - start) / step) as usize;
        for (i, seg) in std::mem::take(&mut self.segments).into_iter().enumerate() {
            if let Some(slot) = segments.get_mut(mine_offset + i) {
                *slot = seg;
            }
        }
        let theirs_offset = ((theirs_start - start) / step) as usize;
        for (i, seg) in other.segments.iter().enumerate() {
            if let Some(slot) = segments.get_mut(theirs_offset + i) {
                slot.merge(seg);
            }
        }

        if theirs_start < mine_start {
            self.first_time = other.first_time;
        }
        self.segments = segments;
    }

    /// Every bucket folded into one record.
    pub fn total(&self) -> T {
        let mut total = T::default();
        for seg in &self.segments {
            total.merge(seg);
        }
        total
    }
}

impl<T: Mergeable + Default + Clone> Mergeable for IntervalSeries<T> {
    fn merge(&mut self, other: &Self) {
        self.add(other);
    }
}

fn align(t: DateTime<Utc>, interval_secs: u32) -> DateTime<Utc> {
    if interval_secs == 0 {
        return t;
    }
    let secs = t.timestamp();
    let aligned = secs - secs.rem_euclid(i64::from(interval_secs));
    DateTime::from_timestamp(aligned, 0).unwrap_or(t)
}
