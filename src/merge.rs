// Merge algebra shared by every accumulator: the Mergeable trait, uniform-identity
// tracking, time-window tracking and the helpers for bounded and keyed fields.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An accumulator whose only mutator is `merge`. The `Default` value is the merge identity.
///
/// Merging never fails: inconsistent inputs degrade (no-op or collapse to unset) instead.
/// Merging is not idempotent; merging the same value twice counts it twice.
pub trait Mergeable {
    fn merge(&mut self, other: &Self);
}

/// A field that is only meaningful while every merged source reports the same value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Uniform<T> {
    /// No source has reported a value yet.
    #[default]
    Empty,
    /// Every source so far agreed on this value.
    Same(T),
    /// Two sources disagreed. Absorbing: no later merge restores a value.
    Mixed,
}

impl<T> Uniform<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Uniform::Same(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Uniform::Mixed)
    }

    pub fn collapse(&mut self) {
        *self = Uniform::Mixed;
    }
}

impl<T> From<T> for Uniform<T> {
    fn from(v: T) -> Self {
        Uniform::Same(v)
    }
}

impl<T: PartialEq + Clone> Mergeable for Uniform<T> {
    fn merge(&mut self, other: &Self) {
        match other {
            Uniform::Empty => {}
            Uniform::Mixed => self.collapse(),
            Uniform::Same(theirs) => match self {
                Uniform::Empty => *self = Uniform::Same(theirs.clone()),
                Uniform::Same(mine) => {
                    if mine != theirs {
                        *self = Uniform::Mixed;
                    }
                }
                Uniform::Mixed => {}
            },
        }
    }
}

/// Start/end of the sampling window a windowed record covers.
/// Both ends are cleared the first time two non-empty sources disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
        }
    }

    /// Window length in seconds, when both ends are known and ordered.
    pub fn secs(&self) -> Option<f64> {
        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return None;
        };
        let ms = (end - start).num_milliseconds();
        (ms > 0).then(|| ms as f64 / 1000.0)
    }

    /// Merge `other` into `self`. The flags tell whether each owning record has samples yet:
    /// an empty side defers entirely to the other one, so its window never counts as a conflict.
    pub fn merge_with(&mut self, other: &TimeWindow, mine_empty: bool, theirs_empty: bool) {
        if mine_empty {
            *self = *other;
            return;
        }
        if theirs_empty {
            return;
        }
        if conflicts(self.start_time, other.start_time) || conflicts(self.end_time, other.end_time)
        {
            *self = TimeWindow::default();
        }
    }
}

fn conflicts(mine: Option<DateTime<Utc>>, theirs: Option<DateTime<Utc>>) -> bool {
    matches!((mine, theirs), (Some(a), Some(b)) if a != b)
}

/// Two-sided selection for a min/max pair where either side may not have samples yet.
/// An empty side never contributes its zero value.
pub fn bound<V: Copy>(
    mine: V,
    mine_empty: bool,
    theirs: V,
    theirs_empty: bool,
    pick: fn(V, V) -> V,
) -> V {
    match (mine_empty, theirs_empty) {
        (true, _) => theirs,
        (false, true) => mine,
        (false, false) => pick(mine, theirs),
    }
}

/// Keeps the later of two timestamps.
pub fn latest(mine: &mut DateTime<Utc>, theirs: DateTime<Utc>) {
    if theirs > *mine {
        *mine = theirs;
    }
}

/// Keys present only in `other` are deep-copied; keys on both sides are merged.
pub fn merge_keyed<K, V>(mine: &mut BTreeMap<K, V>, other: &BTreeMap<K, V>)
where
    K: Ord + Clone,
    V: Mergeable + Clone,
{
    for (key, theirs) in other {
        match mine.entry(key.clone()) {
            Entry::Vacant(e) => {
                e.insert(theirs.clone());
            }
            Entry::Occupied(mut e) => e.get_mut().merge(theirs),
        }
    }
}

pub fn merge_counts(mine: &mut BTreeMap<String, u64>, other: &BTreeMap<String, u64>) {
    for (key, n) in other {
        let count = mine.entry(key.clone()).or_default();
        *count = count.wrapping_add(*n);
    }
}

/// Merges an optional category: absent on the other side leaves `mine` untouched.
pub fn merge_opt<T: Mergeable + Default>(mine: &mut Option<T>, other: &Option<T>) {
    if let Some(theirs) = other {
        mine.get_or_insert_with(T::default).merge(theirs);
    }
}
