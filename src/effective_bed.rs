//! Effective (conveyance) bed construction.
//!
//! Obstructions and active ineffective-flow areas raise a local floor under
//! the water rather than subtracting area afterwards, so wetted perimeter
//! follows the raised floor too. The result dominates the raw bed at every
//! station.

use serde::Deserialize;
use tracing::{debug, trace};

use crate::geometry::{Point, clip_polyline, push_point};

// Blocked station range, always active
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Obstruction {
    pub left: f64,
    pub right: f64,
    pub top: f64,
}

impl Obstruction {
    fn is_valid(&self) -> bool {
        self.left.is_finite() && self.right.is_finite() && self.top.is_finite() && self.right > self.left
    }

    fn covers(&self, x: f64) -> bool {
        self.is_valid() && x >= self.left && x <= self.right
    }
}

// Station range that carries no flow while active
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct IneffectiveArea {
    pub left: f64,
    pub right: f64,
    pub elevation: f64,
    #[serde(default)]
    pub permanent: bool,
}

impl IneffectiveArea {
    /// Active when permanent, otherwise until the stage rises above `elevation`.
    pub fn is_active(&self, stage: f64) -> bool {
        self.permanent || stage <= self.elevation
    }

    fn covers(&self, x: f64) -> bool {
        if !(self.left.is_finite() && self.right.is_finite() && self.elevation.is_finite()) {
            return false;
        }
        x >= self.left.min(self.right) && x <= self.left.max(self.right)
    }
}

/// Obstructions and ineffective areas of one cross-section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowObstacles {
    pub obstructions: Vec<Obstruction>,
    pub ineffective_areas: Vec<IneffectiveArea>,
}

impl FlowObstacles {
    pub fn new(obstructions: Vec<Obstruction>, ineffective_areas: Vec<IneffectiveArea>) -> Self {
        FlowObstacles {
            obstructions,
            ineffective_areas,
        }
    }

    /// Floor elevation imposed at station `x` for `stage`, or `None` when no
    /// obstruction or active ineffective area covers it.
    pub fn floor_at(&self, x: f64, stage: f64) -> Option<f64> {
        let obstruction_tops = self
            .obstructions
            .iter()
            .filter(|o| o.covers(x))
            .map(|o| o.top);
        let area_elevations = self
            .ineffective_areas
            .iter()
            .filter(|a| a.covers(x) && a.is_active(stage))
            .map(|a| a.elevation);

        obstruction_tops.chain(area_elevations).reduce(f64::max)
    }

    fn edge_stations(&self) -> impl Iterator<Item = f64> + '_ {
        let obstruction_edges = self.obstructions.iter().flat_map(|o| [o.left, o.right]);
        let area_edges = self.ineffective_areas.iter().flat_map(|a| [a.left, a.right]);
        obstruction_edges.chain(area_edges).filter(|x| x.is_finite())
    }
}

// Clamp one sub-bed segment to `floor`, splitting where it crosses
fn push_clamped(eff: &mut Vec<Point>, p1: Point, p2: Point, floor: Option<f64>) {
    let Some(f) = floor else {
        push_point(eff, p1);
        push_point(eff, p2);
        return;
    };

    let (z1, z2) = (p1.elevation, p2.elevation);
    if z1 >= f && z2 >= f {
        push_point(eff, p1);
        push_point(eff, p2);
    } else if z1 <= f && z2 <= f {
        push_point(eff, Point::new(p1.station, f));
        push_point(eff, Point::new(p2.station, f));
    } else {
        let slope = (z2 - z1) / (p2.station - p1.station);
        let xi = p1.station + (f - z1) / slope;
        if z1 < f {
            push_point(eff, Point::new(p1.station, f));
            push_point(eff, Point::new(xi, f));
            push_point(eff, p2);
        } else {
            push_point(eff, p1);
            push_point(eff, Point::new(xi, f));
            push_point(eff, Point::new(p2.station, f));
        }
    }
}

/// Build the effective bed of `bed` at `stage`.
///
/// The bed is cut at its own vertices and at every obstacle edge. Each window
/// is clamped to the floor found at its midpoint, so floor changes at an edge
/// appear as a vertical step in the output.
pub fn build_effective_bed(bed: &[Point], stage: f64, obstacles: &FlowObstacles) -> Vec<Point> {
    let mut cuts: Vec<f64> = bed
        .iter()
        .map(|p| p.station)
        .chain(obstacles.edge_stations())
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();
    debug!(cuts = cuts.len(), stage, "building effective bed");

    let mut eff = Vec::with_capacity(cuts.len() * 2);
    for window in cuts.windows(2) {
        let (xa, xb) = (window[0], window[1]);
        if !(xb > xa) {
            continue;
        }
        let sub_bed = clip_polyline(bed, xa, xb);
        if sub_bed.len() < 2 {
            continue;
        }

        let floor = obstacles.floor_at(0.5 * (xa + xb), stage);
        trace!(xa, xb, ?floor, "effective bed window");

        for pair in sub_bed.windows(2) {
            let (p1, p2) = (pair[0], pair[1]);
            if !(p2.station > p1.station) {
                continue;
            }
            push_clamped(&mut eff, p1, p2, floor);
        }
    }

    if eff.is_empty() {
        let (min, max) = bed
            .iter()
            .map(|p| p.station)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let clipped = clip_polyline(bed, min, max);
        return if clipped.is_empty() { bed.to_vec() } else { clipped };
    }
    eff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::integrate_stage;

    fn bed(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, z)| Point::new(x, z)).collect()
    }

    fn flat() -> Vec<Point> {
        bed(&[(0.0, 0.0), (20.0, 0.0)])
    }

    #[test]
    fn no_obstacles_reproduces_bed() {
        let b = bed(&[(0.0, 10.0), (10.0, 0.0), (20.0, 10.0)]);
        let eff = build_effective_bed(&b, 5.0, &FlowObstacles::default());
        assert_eq!(eff, b);
    }

    #[test]
    fn obstruction_raises_floor_with_steps() {
        let obstacles = FlowObstacles::new(
            vec![Obstruction {
                left: 5.0,
                right: 10.0,
                top: 3.0,
            }],
            vec![],
        );
        let eff = build_effective_bed(&flat(), 2.0, &obstacles);
        assert_eq!(
            eff,
            bed(&[(0.0, 0.0), (5.0, 0.0), (5.0, 3.0), (10.0, 3.0), (10.0, 0.0), (20.0, 0.0)])
        );

        let g = integrate_stage(&eff, 2.0);
        assert!((g.area - 30.0).abs() < 1e-12);
        assert!((g.top_width - 15.0).abs() < 1e-12);
        assert_eq!(g.wet_intervals.len(), 2);
    }

    #[test]
    fn floor_splits_crossing_segment() {
        let b = bed(&[(0.0, 0.0), (10.0, 10.0)]);
        let obstacles = FlowObstacles::new(
            vec![Obstruction {
                left: 0.0,
                right: 10.0,
                top: 4.0,
            }],
            vec![],
        );
        let eff = build_effective_bed(&b, 8.0, &obstacles);
        assert_eq!(eff, bed(&[(0.0, 4.0), (4.0, 4.0), (10.0, 10.0)]));
    }

    #[test]
    fn ineffective_area_flips_at_its_elevation() {
        let obstacles = FlowObstacles::new(
            vec![],
            vec![IneffectiveArea {
                left: 12.0,
                right: 4.0,
                elevation: 5.0,
                permanent: false,
            }],
        );
        assert_eq!(obstacles.floor_at(8.0, 4.0), Some(5.0));
        assert_eq!(obstacles.floor_at(8.0, 5.0), Some(5.0));
        assert_eq!(obstacles.floor_at(8.0, 6.0), None);
        assert_eq!(obstacles.floor_at(2.0, 4.0), None);

        // no memory between calls
        let eff_low = build_effective_bed(&flat(), 4.0, &obstacles);
        let eff_high = build_effective_bed(&flat(), 6.0, &obstacles);
        let eff_low_again = build_effective_bed(&flat(), 4.0, &obstacles);
        assert!(eff_low.iter().any(|p| p.elevation == 5.0));
        assert!(eff_high.iter().all(|p| p.elevation == 0.0));
        assert_eq!(eff_low, eff_low_again);
    }

    #[test]
    fn permanent_area_ignores_stage() {
        let obstacles = FlowObstacles::new(
            vec![],
            vec![IneffectiveArea {
                left: 0.0,
                right: 5.0,
                elevation: 1.0,
                permanent: true,
            }],
        );
        assert_eq!(obstacles.floor_at(2.0, 100.0), Some(1.0));
    }

    #[test]
    fn overlapping_floors_take_the_highest() {
        let obstacles = FlowObstacles::new(
            vec![Obstruction {
                left: 0.0,
                right: 10.0,
                top: 2.0,
            }],
            vec![IneffectiveArea {
                left: 5.0,
                right: 15.0,
                elevation: 3.0,
                permanent: false,
            }],
        );
        assert_eq!(obstacles.floor_at(7.0, 1.0), Some(3.0));
        assert_eq!(obstacles.floor_at(7.0, 4.0), Some(2.0));
    }

    #[test]
    fn invalid_obstacles_are_ignored() {
        let obstacles = FlowObstacles::new(
            vec![
                Obstruction {
                    left: 10.0,
                    right: 5.0,
                    top: 3.0,
                },
                Obstruction {
                    left: 0.0,
                    right: 5.0,
                    top: f64::NAN,
                },
            ],
            vec![],
        );
        assert_eq!(obstacles.floor_at(7.0, 1.0), None);
        assert_eq!(obstacles.floor_at(2.0, 1.0), None);
    }

    #[test]
    fn effective_bed_dominates_raw_bed() {
        let b = bed(&[(0.0, 6.0), (4.0, 1.0), (9.0, 0.0), (14.0, 2.0), (20.0, 7.0)]);
        let obstacles = FlowObstacles::new(
            vec![Obstruction {
                left: 3.0,
                right: 6.0,
                top: 1.5,
            }],
            vec![IneffectiveArea {
                left: 12.0,
                right: 18.0,
                elevation: 4.0,
                permanent: false,
            }],
        );
        let eff = build_effective_bed(&b, 3.0, &obstacles);
        for p in &eff {
            let raw = clip_polyline(&b, p.station - 1e-9, p.station + 1e-9);
            let lowest = raw.iter().map(|q| q.elevation).fold(f64::INFINITY, f64::min);
            assert!(p.elevation >= lowest - 1e-6, "{p:?} below raw bed");
        }
    }
}
