//! Piecewise-linear bed geometry: window clipping, wetted-section integration
//! at a stage, and wet-interval canonicalization.
//!
//! Every operator here skips bed pairs whose station delta is not strictly
//! positive, so unsorted or duplicated stations degrade instead of failing.

use serde::Serialize;

/// Two stations closer than this are the same station. Used when collapsing
/// clipped vertices, merging wet intervals and walking partition targets.
pub const STATION_TOLERANCE: f64 = 1e-12;

// Bed vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub station: f64,
    pub elevation: f64,
}

impl Point {
    pub fn new(station: f64, elevation: f64) -> Self {
        Point { station, elevation }
    }
}

// Contiguous submerged station range [left, right]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WetInterval {
    pub left: f64,
    pub right: f64,
}

impl WetInterval {
    pub fn new(left: f64, right: f64) -> Self {
        WetInterval { left, right }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Wetted properties of a polyline below a stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageGeometry {
    pub area: f64,
    pub perimeter: f64,
    pub top_width: f64,
    pub wet_intervals: Vec<WetInterval>,
}

impl StageGeometry {
    /// Area over wetted perimeter, zero when either is not positive.
    pub fn hydraulic_radius(&self) -> f64 {
        if self.area > 0.0 && self.perimeter > 0.0 {
            self.area / self.perimeter
        } else {
            0.0
        }
    }

    /// Area over top width, zero for a dry section.
    pub fn hydraulic_depth(&self) -> f64 {
        if self.top_width > 0.0 {
            self.area / self.top_width
        } else {
            0.0
        }
    }
}

/// Append `p`, replacing the last point instead when the two coincide.
///
/// Points sharing a station but not an elevation are both kept: that pair is
/// a vertical step, which later operators skip as a zero-width segment.
pub(crate) fn push_point(out: &mut Vec<Point>, p: Point) {
    match out.last_mut() {
        Some(last)
            if (last.station - p.station).abs() <= STATION_TOLERANCE
                && (last.elevation - p.elevation).abs() <= STATION_TOLERANCE =>
        {
            *last = p
        }
        _ => out.push(p),
    }
}

/// Restrict `bed` to the station window `[left, right]`.
///
/// Segments straddling a window edge are cut by linear interpolation at the
/// edge; vertices inside the window are kept as-is, including both ends of a
/// vertical step. An empty or inverted window yields an empty polyline.
pub fn clip_polyline(bed: &[Point], left: f64, right: f64) -> Vec<Point> {
    let mut out = Vec::new();
    if !(right > left) {
        return out;
    }

    for pair in bed.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dx = p2.station - p1.station;
        if !(dx > 0.0) || p2.station <= left || p1.station >= right {
            continue;
        }

        let slope = (p2.elevation - p1.elevation) / dx;
        let at = |x: f64| Point::new(x, p1.elevation + slope * (x - p1.station));

        let start = if p1.station >= left { p1 } else { at(left) };
        let end = if p2.station <= right { p2 } else { at(right) };

        // a start behind the last output only follows a skipped reversed pair
        let behind = out
            .last()
            .is_some_and(|last: &Point| start.station < last.station - STATION_TOLERANCE);
        if !behind {
            push_point(&mut out, start);
        }
        push_point(&mut out, end);
    }

    out
}

/// Sort intervals by left edge and fold overlapping or touching neighbours.
///
/// The result is ascending and pairwise disjoint with every gap wider than
/// [`STATION_TOLERANCE`].
pub fn merge_intervals(mut intervals: Vec<WetInterval>) -> Vec<WetInterval> {
    intervals.sort_by(|a, b| a.left.total_cmp(&b.left));

    let mut merged: Vec<WetInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.left <= last.right + STATION_TOLERANCE => {
                last.right = last.right.max(interval.right);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

pub fn total_wet_width(intervals: &[WetInterval]) -> f64 {
    intervals.iter().map(WetInterval::width).sum()
}

/// Integrate wetted area, perimeter and top width of `polyline` at `stage`.
///
/// A vertex is submerged when its elevation is at or below the stage. For a
/// segment crossing the waterline only the submerged part contributes.
pub fn integrate_stage(polyline: &[Point], stage: f64) -> StageGeometry {
    let mut area = 0.0;
    let mut perimeter = 0.0;
    let mut pieces = Vec::new();

    for pair in polyline.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let dx = p2.station - p1.station;
        if !(dx > 0.0) {
            continue;
        }

        let rel1 = p1.elevation - stage;
        let rel2 = p2.elevation - stage;
        let dz = p2.elevation - p1.elevation;

        match (rel1 <= 0.0, rel2 <= 0.0) {
            (true, true) => {
                area += 0.5 * (-rel1 - rel2) * dx;
                perimeter += dx.hypot(dz);
                pieces.push(WetInterval::new(p1.station, p2.station));
            }
            (false, false) => {}
            (wet_start, _) => {
                let t = (stage - p1.elevation) / dz;
                let xi = p1.station + t * dx;
                let slope_len = (1.0 + (dz / dx).powi(2)).sqrt();

                if wet_start {
                    let width = (xi - p1.station).abs();
                    area += 0.5 * -rel1 * width;
                    perimeter += slope_len * width;
                    pieces.push(WetInterval::new(p1.station, xi));
                } else {
                    let width = (p2.station - xi).abs();
                    area += 0.5 * -rel2 * width;
                    perimeter += slope_len * width;
                    pieces.push(WetInterval::new(xi, p2.station));
                }
            }
        }
    }

    let wet_intervals = merge_intervals(pieces);
    let top_width = total_wet_width(&wet_intervals);

    StageGeometry {
        area,
        perimeter,
        top_width,
        wet_intervals,
    }
}

/// Clip `bed` to `[left, right]` and integrate the result at `stage`.
pub fn integrate_window(bed: &[Point], stage: f64, left: f64, right: f64) -> StageGeometry {
    if !(right > left) {
        return StageGeometry::default();
    }
    let window = clip_polyline(bed, left, right);
    if window.len() < 2 {
        return StageGeometry::default();
    }
    integrate_stage(&window, stage)
}
