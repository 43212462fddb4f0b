//! Station-varying Manning's n.
//!
//! Rows carry an optional n override; a defined n applies from its own
//! station rightwards until the next override. This model is independent of
//! the per-zone n used for slice conveyance.

use serde::Serialize;

use crate::error::{Error, Result};

/// Runs narrower than this are dropped from explicit plot segments.
pub const PLOT_SEGMENT_TOLERANCE: f64 = 1e-9;

/// Consecutive explicit rows whose n differ by no more than this share a run.
const SAME_N_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoughnessRow {
    pub station: f64,
    pub n: Option<f64>,
}

impl RoughnessRow {
    pub fn new(station: f64, n: Option<f64>) -> Self {
        RoughnessRow { station, n }
    }

    /// The row's n if it is a usable number.
    pub fn defined_n(&self) -> Option<f64> {
        self.n.filter(|n| n.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoughnessSegment {
    pub left: f64,
    pub right: f64,
    pub n: f64,
}

fn sorted_rows(rows: &[RoughnessRow]) -> Vec<RoughnessRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| a.station.total_cmp(&b.station));
    sorted
}

/// Build `[station_i, station_i+1)` segments carrying the latest defined n.
///
/// Fails with [`Error::MissingInitialRoughness`] when the leftmost row, after
/// sorting by station, has no finite n (or there are no rows at all).
pub fn build_segments(rows: &[RoughnessRow]) -> Result<Vec<RoughnessSegment>> {
    let sorted = sorted_rows(rows);
    let first = sorted.first();
    let mut current = first
        .and_then(RoughnessRow::defined_n)
        .ok_or(Error::MissingInitialRoughness {
            station: first.map(|r| r.station),
        })?;

    let mut segments = Vec::with_capacity(sorted.len().saturating_sub(1));
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        segments.push(RoughnessSegment {
            left: a.station,
            right: b.station,
            n: current,
        });
        if let Some(n) = b.defined_n() {
            current = n;
        }
    }
    Ok(segments)
}

/// Truncate segments to `[left, right]`, dropping any left with no width.
pub fn clip_segments(segments: &[RoughnessSegment], left: f64, right: f64) -> Vec<RoughnessSegment> {
    segments
        .iter()
        .filter_map(|s| {
            let l = s.left.max(left);
            let r = s.right.min(right);
            (r > l).then_some(RoughnessSegment {
                left: l,
                right: r,
                n: s.n,
            })
        })
        .collect()
}

/// Plot-oriented segments built only from rows with an explicit n.
///
/// Equal consecutive values form one run, the last run extends to `right`,
/// and the span left of the first explicit row takes that row's n.
pub fn explicit_segments(rows: &[RoughnessRow], left: f64, right: f64) -> Vec<RoughnessSegment> {
    let explicit: Vec<(f64, f64)> = sorted_rows(rows)
        .iter()
        .filter_map(|r| r.defined_n().map(|n| (r.station, n)))
        .collect();
    let Some(&(first_station, first_n)) = explicit.first() else {
        return Vec::new();
    };

    let mut runs = Vec::new();
    if first_station > left {
        runs.push(RoughnessSegment {
            left,
            right: first_station,
            n: first_n,
        });
    }

    let (mut run_start, mut run_n) = (first_station, first_n);
    for &(station, n) in &explicit[1..] {
        if (n - run_n).abs() > SAME_N_TOLERANCE {
            runs.push(RoughnessSegment {
                left: run_start,
                right: station,
                n: run_n,
            });
            run_start = station;
            run_n = n;
        }
    }
    runs.push(RoughnessSegment {
        left: run_start,
        right,
        n: run_n,
    });

    runs.into_iter()
        .map(|s| RoughnessSegment {
            left: s.left.max(left),
            right: s.right.min(right),
            n: s.n,
        })
        .filter(|s| s.right > s.left + PLOT_SEGMENT_TOLERANCE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(left: f64, right: f64, n: f64) -> RoughnessSegment {
        RoughnessSegment { left, right, n }
    }

    #[test]
    fn carries_n_rightwards_after_sorting() {
        let rows = [
            RoughnessRow::new(5.0, Some(f64::NAN)),
            RoughnessRow::new(0.0, Some(0.03)),
            RoughnessRow::new(10.0, Some(0.05)),
        ];
        let segments = build_segments(&rows).unwrap();
        assert_eq!(segments, vec![seg(0.0, 5.0, 0.03), seg(5.0, 10.0, 0.03)]);
    }

    #[test]
    fn override_applies_from_its_own_station() {
        let rows = [
            RoughnessRow::new(0.0, Some(0.03)),
            RoughnessRow::new(5.0, Some(0.06)),
            RoughnessRow::new(8.0, None),
            RoughnessRow::new(10.0, None),
        ];
        let segments = build_segments(&rows).unwrap();
        assert_eq!(
            segments,
            vec![seg(0.0, 5.0, 0.03), seg(5.0, 8.0, 0.06), seg(8.0, 10.0, 0.06)]
        );
    }

    #[test]
    fn missing_leftmost_n_is_an_error() {
        let rows = [
            RoughnessRow::new(5.0, Some(f64::NAN)),
            RoughnessRow::new(3.0, None),
        ];
        match build_segments(&rows) {
            Err(Error::MissingInitialRoughness { station }) => assert_eq!(station, Some(3.0)),
            other => panic!("expected MissingInitialRoughness, got {other:?}"),
        }
        assert!(matches!(
            build_segments(&[]),
            Err(Error::MissingInitialRoughness { station: None })
        ));
    }

    #[test]
    fn single_row_has_no_segments() {
        let segments = build_segments(&[RoughnessRow::new(1.0, Some(0.04))]).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn clip_truncates_and_drops_empty() {
        let segments = vec![seg(0.0, 5.0, 0.03), seg(5.0, 10.0, 0.04), seg(10.0, 15.0, 0.05)];
        assert_eq!(
            clip_segments(&segments, 3.0, 10.0),
            vec![seg(3.0, 5.0, 0.03), seg(5.0, 10.0, 0.04)]
        );
        assert!(clip_segments(&segments, 7.0, 7.0).is_empty());
    }

    #[test]
    fn explicit_runs_merge_equal_values() {
        let rows = [
            RoughnessRow::new(2.0, Some(0.04)),
            RoughnessRow::new(4.0, None),
            RoughnessRow::new(6.0, Some(0.04)),
            RoughnessRow::new(8.0, Some(0.06)),
        ];
        assert_eq!(
            explicit_segments(&rows, 0.0, 12.0),
            vec![seg(0.0, 2.0, 0.04), seg(2.0, 8.0, 0.04), seg(8.0, 12.0, 0.06)]
        );
        assert!(explicit_segments(&[RoughnessRow::new(1.0, None)], 0.0, 5.0).is_empty());
    }

    #[test]
    fn explicit_runs_clamp_to_window() {
        let rows = [
            RoughnessRow::new(-5.0, Some(0.03)),
            RoughnessRow::new(20.0, Some(0.05)),
        ];
        assert_eq!(explicit_segments(&rows, 0.0, 10.0), vec![seg(0.0, 10.0, 0.03)]);
    }
}
