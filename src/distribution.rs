//! Conveyance-weighted discharge distribution across a cross-section.
//!
//! Each zone's wet width is cut into slices of equal wetted width. Slices get
//! a raw Manning conveyance, and the supplied total discharge is then shared
//! out in proportion to it. Conveyance acts only as a spatial weighting: the
//! slice discharges always add back up to the total.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{PhysicalConstants, SliceCounts, ZoneRoughness};
use crate::geometry::{Point, STATION_TOLERANCE, WetInterval, integrate_window, total_wet_width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Zone {
    #[serde(rename = "LOB")]
    LeftOverbank,
    #[serde(rename = "Chan")]
    Channel,
    #[serde(rename = "ROB")]
    RightOverbank,
}

impl Zone {
    /// Zones in output order.
    pub const ALL: [Zone; 3] = [Zone::LeftOverbank, Zone::Channel, Zone::RightOverbank];

    pub fn label(self) -> &'static str {
        match self {
            Zone::LeftOverbank => "LOB",
            Zone::Channel => "Chan",
            Zone::RightOverbank => "ROB",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stations delimiting the three zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBoundaries {
    pub domain_left: f64,
    pub left_bank: f64,
    pub right_bank: f64,
    pub domain_right: f64,
}

impl ZoneBoundaries {
    pub fn window(&self, zone: Zone) -> (f64, f64) {
        match zone {
            Zone::LeftOverbank => (self.domain_left, self.left_bank),
            Zone::Channel => (self.left_bank, self.right_bank),
            Zone::RightOverbank => (self.right_bank, self.domain_right),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub zone: Zone,
    /// 1-based position within the zone
    pub index: usize,
    pub left: f64,
    pub right: f64,
    pub area: f64,
    pub perimeter: f64,
    pub top_width: f64,
    pub hydraulic_radius: f64,
    pub hydraulic_depth: f64,
    pub n: f64,
    pub raw_conveyance: f64,
    pub raw_discharge: f64,
    pub conveyance: f64,
    pub discharge: f64,
    pub velocity: f64,
    pub shear_stress: f64,
    pub stream_power: f64,
    pub midpoint: f64,
    pub percent_of_conveyance: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Σ raw slice conveyance
    pub sum_raw_conveyance: f64,
    /// target / raw conveyance ratio applied to every slice
    pub scale_ratio: f64,
    /// conveyance implied by the total discharge and slope
    pub target_conveyance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionResult {
    pub slices: Vec<Slice>,
    pub boundaries: Vec<f64>,
    pub diagnostics: Diagnostics,
}

impl DistributionResult {
    pub fn total_discharge(&self) -> f64 {
        self.slices.iter().map(|s| s.discharge).sum()
    }

    pub fn zone_discharge(&self, zone: Zone) -> f64 {
        self.slices
            .iter()
            .filter(|s| s.zone == zone)
            .map(|s| s.discharge)
            .sum()
    }
}

/// Slices before the discharge scaling step.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDistribution {
    pub slices: Vec<Slice>,
    pub boundaries: Vec<f64>,
}

impl RawDistribution {
    pub fn sum_raw_conveyance(&self) -> f64 {
        self.slices.iter().map(|s| s.raw_conveyance).sum()
    }

    pub fn sum_raw_discharge(&self) -> f64 {
        self.slices.iter().map(|s| s.raw_discharge).sum()
    }

    /// Scale raw conveyance so the slices carry `total_discharge`.
    pub fn scale(self, phys: &PhysicalConstants, total_discharge: f64) -> DistributionResult {
        let sum_raw_conveyance = self.sum_raw_conveyance();
        let target_conveyance = if phys.sqrt_slope > 0.0 {
            total_discharge / phys.sqrt_slope
        } else {
            0.0
        };
        let scale_ratio = if sum_raw_conveyance > 0.0 {
            target_conveyance / sum_raw_conveyance
        } else {
            0.0
        };

        let mut slices = self.slices;
        for slice in &mut slices {
            slice.conveyance = scale_ratio * slice.raw_conveyance;
            slice.discharge = slice.conveyance * phys.sqrt_slope;
            slice.velocity = if slice.area > 0.0 {
                slice.discharge / slice.area
            } else {
                0.0
            };
            slice.stream_power = slice.shear_stress * slice.velocity;
            slice.midpoint = 0.5 * (slice.left + slice.right);
            slice.percent_of_conveyance = if target_conveyance > 0.0 {
                100.0 * slice.conveyance / target_conveyance
            } else {
                0.0
            };
        }

        DistributionResult {
            slices,
            boundaries: self.boundaries,
            diagnostics: Diagnostics {
                sum_raw_conveyance,
                scale_ratio,
                target_conveyance,
            },
        }
    }
}

/// Split merged wet intervals into `slice_count` pieces of equal wet width.
///
/// Returns `slice_count + 1` stations from the leftmost to the rightmost wet
/// edge (fewer interior stations if rounding exhausts the intervals early),
/// or nothing for a zero count or a dry zone.
pub fn partition_by_width(intervals: &[WetInterval], slice_count: usize) -> Vec<f64> {
    let total = total_wet_width(intervals);
    let (Some(first), Some(last)) = (intervals.first(), intervals.last()) else {
        return Vec::new();
    };
    if slice_count < 1 || !(total > 0.0) {
        return Vec::new();
    }

    let step = total / slice_count as f64;
    let mut bounds = Vec::with_capacity(slice_count + 1);
    bounds.push(first.left);

    let (mut acc, mut target, mut idx) = (0.0, 0.0, 0);
    while bounds.len() < slice_count {
        target += step;
        while idx < intervals.len() && acc + intervals[idx].width() < target - STATION_TOLERANCE {
            acc += intervals[idx].width();
            idx += 1;
        }
        let Some(interval) = intervals.get(idx) else {
            break;
        };
        bounds.push(interval.left + (target - acc));
    }

    bounds.push(last.right);
    bounds
}

fn raw_conveyance(manning_k: f64, n: f64, area: f64, hydraulic_radius: f64) -> f64 {
    if area > 0.0 && hydraulic_radius > 0.0 {
        (manning_k / n) * area * hydraulic_radius.powf(2.0 / 3.0)
    } else {
        0.0
    }
}

/// Partition every zone and integrate raw hydraulics per slice.
pub fn build_slices(
    effective_bed: &[Point],
    stage: f64,
    zones: &ZoneBoundaries,
    roughness: &ZoneRoughness,
    phys: &PhysicalConstants,
    counts: &SliceCounts,
) -> RawDistribution {
    let mut slices = Vec::new();
    let mut boundaries = Vec::new();

    for zone in Zone::ALL {
        let (left, right) = zones.window(zone);
        let wet = integrate_window(effective_bed, stage, left, right).wet_intervals;
        let bounds = partition_by_width(&wet, counts.get(zone));
        if bounds.is_empty() {
            debug!(%zone, left, right, "zone has no wet width");
        }

        let n = roughness.resolve(zone);
        for (i, pair) in bounds.windows(2).enumerate() {
            let (slice_left, slice_right) = (pair[0], pair[1]);
            let geom = integrate_window(effective_bed, stage, slice_left, slice_right);
            let hydraulic_radius = geom.hydraulic_radius();
            let raw_conveyance = raw_conveyance(phys.manning_k, n, geom.area, hydraulic_radius);
            trace!(%zone, slice = i + 1, area = geom.area, raw_conveyance, "slice");

            slices.push(Slice {
                zone,
                index: i + 1,
                left: slice_left,
                right: slice_right,
                area: geom.area,
                perimeter: geom.perimeter,
                top_width: geom.top_width,
                hydraulic_radius,
                hydraulic_depth: geom.hydraulic_depth(),
                n,
                raw_conveyance,
                raw_discharge: raw_conveyance * phys.sqrt_slope,
                conveyance: 0.0,
                discharge: 0.0,
                velocity: 0.0,
                shear_stress: phys.unit_weight * hydraulic_radius * phys.slope,
                stream_power: 0.0,
                midpoint: 0.0,
                percent_of_conveyance: 0.0,
            });
        }
        boundaries.extend(bounds);
    }

    RawDistribution { slices, boundaries }
}

/// Distribute `total_discharge` across conveyance slices of the effective bed.
pub fn distribute(
    effective_bed: &[Point],
    stage: f64,
    zones: &ZoneBoundaries,
    roughness: &ZoneRoughness,
    phys: &PhysicalConstants,
    counts: &SliceCounts,
    total_discharge: f64,
) -> DistributionResult {
    build_slices(effective_bed, stage, zones, roughness, phys, counts).scale(phys, total_discharge)
}
