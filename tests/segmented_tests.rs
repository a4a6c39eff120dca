// Interval series: same-timeline sums, resampling of shifted series, totals

mod common;

use chrono::{DateTime, TimeDelta, Utc};
use clustermetrics::merge::Mergeable;
use clustermetrics::models::*;
use common::*;

#[test]
fn aligned_series_sum_bucket_by_bucket() {
    let mut a = series(T0, &[5, 7]);
    a.add(&series(T0, &[3, 2]));
    assert_eq!(a.first_time, t(T0));
    assert_eq!(bucket_requests(&a), vec![8, 9]);
}

#[test]
fn shifted_series_are_resampled_onto_union() {
    let mut a = series(T0, &[1, 2]);
    a.add(&series(T0 + 60, &[10, 20]));
    assert_eq!(a.first_time, t(T0));
    assert_eq!(bucket_requests(&a), vec![1, 12, 20]);
    assert_eq!(a.end_time(), t(T0 + 180));
}

#[test]
fn earlier_other_moves_anchor_back() {
    let mut a = series(T0 + 120, &[4]);
    a.add(&series(T0, &[1, 2]));
    assert_eq!(a.first_time, t(T0));
    assert_eq!(bucket_requests(&a), vec![1, 2, 4]);
}

#[test]
fn disjoint_series_leave_zero_gap() {
    let mut a = series(T0, &[1]);
    a.add(&series(T0 + 240, &[2]));
    assert_eq!(bucket_requests(&a), vec![1, 0, 0, 0, 2]);
    assert_eq!(a.span(), TimeDelta::seconds(300));
}

#[test]
fn same_anchor_different_length_resamples() {
    let mut a = series(T0, &[1, 1, 1]);
    a.add(&series(T0, &[2]));
    assert_eq!(bucket_requests(&a), vec![3, 1, 1]);
}

#[test]
fn empty_receiver_takes_a_copy() {
    let source = series(T0, &[6, 6]);
    let mut a: IntervalSeries<ApiStats> = IntervalSeries::default();
    a.add(&source);
    assert_eq!(a, source);

    a.add(&series(T0, &[1, 1]));
    assert_eq!(bucket_requests(&source), vec![6, 6]);
    assert_eq!(bucket_requests(&a), vec![7, 7]);
}

#[test]
fn empty_other_is_a_no_op() {
    let mut a = series(T0, &[1, 2]);
    let before = a.clone();
    a.add(&IntervalSeries {
        interval_secs: 300,
        ..Default::default()
    });
    assert_eq!(a, before);
}

#[test]
fn mismatched_interval_is_silently_dropped() {
    let mut a = series(T0, &[1, 2]);
    let before = a.clone();
    let mut other = series(T0, &[5, 5]);
    other.interval_secs = 300;
    a.add(&other);
    assert_eq!(a, before);
}

#[test]
fn zero_interval_is_silently_dropped() {
    let mut a = series(T0, &[1]);
    a.interval_secs = 0;
    let before = a.clone();
    let mut other = series(T0, &[5]);
    other.interval_secs = 0;
    a.add(&other);
    assert_eq!(a, before);
}

#[test]
fn total_is_conserved_across_resample() {
    let a = series(T0, &[3, 4, 5]);
    let b = series(T0 + 120, &[7, 8]);
    let mut merged = a.clone();
    merged.add(&b);

    let mut expected = a.total();
    expected.merge(&b.total());
    assert_eq!(merged.total().requests, expected.requests);
    assert_eq!(merged.total().requests, 27);
    // Union of [T0, T0+180) and [T0+120, T0+240).
    assert_eq!(merged.first_time, t(T0));
    assert_eq!(merged.end_time(), t(T0 + 240));
}

#[test]
fn resample_is_order_independent() {
    let a = series(T0, &[1, 2]);
    let b = series(T0 + 60, &[3]);
    let c = series(T0 + 180, &[4, 5]);

    let mut left = a.clone();
    left.add(&b);
    left.add(&c);

    let mut bc = b.clone();
    bc.add(&c);
    let mut right = a.clone();
    right.add(&bc);

    let mut reversed = c.clone();
    reversed.add(&b);
    reversed.add(&a);

    assert_eq!(bucket_requests(&left), vec![1, 5, 0, 4, 5]);
    assert_eq!(left, right);
    assert_eq!(left, reversed);
}

#[test]
fn new_aligns_anchor_to_interval() {
    let s: IntervalSeries<ApiStats> = IntervalSeries::new(t(T0 + 59), 60);
    assert_eq!(s.first_time, t(T0));
    assert!(s.is_empty());
}

#[test]
fn record_places_values_by_time() {
    let mut s: IntervalSeries<ApiStats> = IntervalSeries::new(t(T0), 60);
    s.record(t(T0 + 5), &requests(1));
    s.record(t(T0 + 65), &requests(2));
    s.record(t(T0 + 10), &requests(4));
    s.record(t(T0 - 30), &requests(8));

    assert_eq!(s.first_time, t(T0 - 60));
    assert_eq!(bucket_requests(&s), vec![8, 5, 2]);
    assert_eq!(s.segment_at(t(T0 + 119)).map(|x| x.requests), Some(2));
    assert_eq!(s.segment_at(t(T0 + 120)), None);
    assert_eq!(s.segment_at(t(T0 - 61)), None);

    let starts: Vec<_> = s.iter().map(|(at, _)| at).collect();
    assert_eq!(starts, vec![t(T0 - 60), t(T0), t(T0 + 60)]);
}

#[test]
fn timed_action_series_share_the_algorithm() {
    let one = |count| TimedAction {
        count,
        acc_time: count * 10,
        min_time: 10,
        max_time: 10,
        bytes: 0,
    };
    let mut a = IntervalSeries {
        interval_secs: 60,
        first_time: t(T0),
        segments: vec![one(1), one(2)],
    };
    a.merge(&IntervalSeries {
        interval_secs: 60,
        first_time: t(T0 + 60),
        segments: vec![one(3)],
    });
    assert_eq!(a.len(), 2);
    assert_eq!(a.total().count, 6);
    assert_eq!(a.segments[1].count, 5);
}

#[test]
fn far_apart_series_still_cover_the_union() {
    let gap = (1 << 20) + 10;
    let one = |count| TimedAction {
        count,
        ..Default::default()
    };
    let mut a = IntervalSeries {
        interval_secs: 1,
        first_time: t(T0),
        segments: vec![one(5)],
    };
    a.add(&IntervalSeries {
        interval_secs: 1,
        first_time: t(T0 + gap),
        segments: vec![one(7)],
    });
    assert_eq!(a.len(), gap as usize + 1);
    assert_eq!(a.total().count, 12);
    assert_eq!(a.end_time(), t(T0 + gap + 1));
    assert_eq!(a.segment_at(t(T0 + gap)).map(|s| s.count), Some(7));
}

#[test]
fn extreme_anchor_clamps_instead_of_panicking() {
    let s = IntervalSeries {
        interval_secs: 60,
        first_time: DateTime::<Utc>::MAX_UTC - TimeDelta::seconds(30),
        segments: vec![requests(1), requests(2)],
    };
    assert_eq!(s.end_time(), DateTime::<Utc>::MAX_UTC);
    let starts: Vec<_> = s.iter().map(|(at, _)| at).collect();
    assert_eq!(starts[0], s.first_time);
    assert_eq!(starts[1], DateTime::<Utc>::MAX_UTC);
    assert_eq!(s.span(), TimeDelta::seconds(120));
}
