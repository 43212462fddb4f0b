//! One cross-section evaluation at one stage: effective bed, levee-limited
//! zones, section summary and the discharge distribution.

use tracing::{debug, warn};

use crate::config::ChannelSetup;
use crate::distribution::{DistributionResult, ZoneBoundaries, build_slices};
use crate::effective_bed::{FlowObstacles, build_effective_bed};
use crate::geometry::{Point, StageGeometry, integrate_window};
use crate::levee::{Levees, clip_domain};
use crate::section::CrossSection;

/// Obstacles and levees in effect for a cross-section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydraulicContext {
    pub obstacles: FlowObstacles,
    pub levees: Levees,
}

/// Where the total discharge to distribute comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discharge {
    /// Supplied by the caller.
    Specified(f64),
    /// Σ raw Manning discharge of the slices at this stage.
    Manning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub stage: f64,
    pub total_discharge: f64,
    pub effective_bed: Vec<Point>,
    pub zones: ZoneBoundaries,
    /// Whole-section wetted geometry inside the levee-clipped domain.
    pub summary: StageGeometry,
    pub distribution: DistributionResult,
}

/// Bank stations default to the domain edges and are held inside it.
fn zone_boundaries(section: &CrossSection, domain_left: f64, domain_right: f64) -> ZoneBoundaries {
    let hold = |x: f64| x.max(domain_left).min(domain_right);
    ZoneBoundaries {
        domain_left,
        left_bank: hold(section.left_bank().unwrap_or(domain_left)),
        right_bank: hold(section.right_bank().unwrap_or(domain_right)),
        domain_right,
    }
}

pub fn analyze(
    section: &CrossSection,
    context: &HydraulicContext,
    setup: &ChannelSetup,
    stage: f64,
    discharge: Discharge,
) -> Analysis {
    let phys = setup.physical_constants();
    if !(phys.slope > 0.0) {
        warn!(slope = phys.slope, "non-positive slope, conveyance cannot carry discharge");
    }

    let effective_bed = build_effective_bed(section.points(), stage, &context.obstacles);
    let (raw_left, raw_right) = section.domain().unwrap_or((0.0, 0.0));
    let (domain_left, domain_right) = clip_domain(stage, raw_left, raw_right, &context.levees);
    if (domain_left, domain_right) != (raw_left, raw_right) {
        debug!(domain_left, domain_right, "levees narrow the domain");
    }

    let zones = zone_boundaries(section, domain_left, domain_right);
    let summary = integrate_window(&effective_bed, stage, domain_left, domain_right);

    let raw = build_slices(
        &effective_bed,
        stage,
        &zones,
        &setup.roughness,
        &phys,
        &setup.slices,
    );
    let total_discharge = match discharge {
        Discharge::Specified(q) => q,
        Discharge::Manning => raw.sum_raw_discharge(),
    };
    if total_discharge > 0.0 && !(raw.sum_raw_conveyance() > 0.0) {
        warn!(stage, total_discharge, "no conveyance at this stage, discharge is not distributed");
    }
    let distribution = raw.scale(&phys, total_discharge);

    Analysis {
        stage,
        total_discharge,
        effective_bed,
        zones,
        summary,
        distribution,
    }
}
