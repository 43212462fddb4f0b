//! Cross-section hydraulic geometry and conveyance distribution.
//!
//! Given a bed profile, a stage, flow obstacles, levees and a total
//! discharge, the engine builds the effective bed, splits the wetted section
//! into overbank and channel slices of equal wetted width, and shares the
//! discharge out by Manning conveyance.
//!
//! ```
//! use conveyance_rs::{
//!     ChannelSetup, CrossSection, Discharge, HydraulicContext, SectionRow, SliceCounts,
//!     UnitSystem, ZoneRoughness, analyze,
//! };
//!
//! let section = CrossSection::from_rows(&[
//!     SectionRow::new(0.0, 4.0),
//!     SectionRow::new(10.0, 0.0),
//!     SectionRow::new(20.0, 4.0),
//! ]);
//! let setup = ChannelSetup {
//!     units: UnitSystem::Si,
//!     slope: 0.001,
//!     roughness: ZoneRoughness::default(),
//!     slices: SliceCounts::default(),
//! };
//! let analysis = analyze(&section, &HydraulicContext::default(), &setup, 2.0, Discharge::Specified(12.0));
//! assert!((analysis.distribution.total_discharge() - 12.0).abs() < 1e-9);
//! ```

pub mod analysis;
pub mod config;
pub mod distribution;
pub mod effective_bed;
pub mod error;
pub mod geometry;
pub mod io;
pub mod levee;
pub mod roughness;
pub mod section;
pub mod series;

pub use analysis::{Analysis, Discharge, HydraulicContext, analyze};
pub use config::{ChannelSetup, PhysicalConstants, SliceCounts, UnitSystem, ZoneRoughness};
pub use distribution::{Diagnostics, DistributionResult, Slice, Zone, ZoneBoundaries, distribute};
pub use effective_bed::{FlowObstacles, IneffectiveArea, Obstruction, build_effective_bed};
pub use error::{Error, Result};
pub use geometry::{Point, StageGeometry, WetInterval};
pub use levee::{Levee, Levees};
pub use section::{BankTag, CrossSection, SectionRow};
pub use series::{SeriesOutcome, SeriesRecord, run_series};
