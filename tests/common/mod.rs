#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use climgroup::{calendar::Period, Coord, LabeledArray};

pub fn daily(start: &str, n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").expect("valid start date");
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

/// Daily `tas` series starting at `start`.
pub fn tas_series(values: Vec<f64>, start: &str) -> LabeledArray {
    let time = daily(start, values.len());
    LabeledArray::time_series(time, values)
        .expect("valid series")
        .with_name("tas")
}

pub fn arange(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Stack series along a new leading `lat` dimension.
pub fn stack_lat(parts: &[LabeledArray]) -> LabeledArray {
    let lat = Coord::Int((0..parts.len() as i64).collect());
    LabeledArray::stack(parts, "lat", Some(lat)).expect("stackable series")
}

/// Per-period means computed with plain loops, in key order.
pub fn group_means(values: &[f64], time: &[NaiveDate], period: Option<Period>) -> Vec<f64> {
    windowed_group_means(values, time, period, 1)
}

/// Per-period means over a centered window, skipping samples outside the series.
pub fn windowed_group_means(
    values: &[f64],
    time: &[NaiveDate],
    period: Option<Period>,
    window: usize,
) -> Vec<f64> {
    let half = (window / 2) as isize;
    let n = values.len() as isize;
    let mut acc: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (t, date) in time.iter().enumerate() {
        let key = period.map_or(0, |p| p.key(*date));
        let entry = acc.entry(key).or_insert((0.0, 0));
        for w in 0..window as isize {
            let src = t as isize + w - half;
            if (0..n).contains(&src) && !values[src as usize].is_nan() {
                entry.0 += values[src as usize];
                entry.1 += 1;
            }
        }
    }
    acc.values().map(|(sum, count)| sum / *count as f64).collect()
}

/// Element-wise comparison treating two NaNs as equal.
pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if a.is_nan() && e.is_nan() {
            continue;
        }
        assert!(
            approx::relative_eq!(*a, *e, epsilon = 1e-9, max_relative = 1e-9),
            "index {i}: {a} != {e}"
        );
    }
}
