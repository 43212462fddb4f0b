use clap::ValueEnum;

use crate::distribution::Zone;

// Column name mapping for CSV inputs
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    pub station: String,
    pub elevation: String,
    pub tag: String,
    pub n: String,
    pub stage: String,
    pub discharge: String,
    pub time: String,
}

impl ColumnConfig {
    pub fn new() -> Self {
        ColumnConfig {
            station: "station".to_string(),
            elevation: "elevation".to_string(),
            tag: "tag".to_string(),
            n: "n".to_string(),
            stage: "stage".to_string(),
            discharge: "discharge".to_string(),
            time: "time".to_string(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig::new()
    }
}

// Output format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    #[value(name = "netcdf")]
    NetCdf,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnitSystem {
    /// Feet, cfs, lb/ft³
    #[default]
    Us,
    /// Metres, m³/s, N/m³
    Si,
}

impl UnitSystem {
    /// Manning's equation coefficient (1.486 in US customary units).
    pub fn manning_k(self) -> f64 {
        match self {
            UnitSystem::Us => 1.486,
            UnitSystem::Si => 1.0,
        }
    }

    /// Unit weight of water.
    pub fn unit_weight(self) -> f64 {
        match self {
            UnitSystem::Us => 62.4,
            UnitSystem::Si => 9810.0,
        }
    }
}

/// Constants entering Manning conveyance and bed shear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub slope: f64,
    pub manning_k: f64,
    pub unit_weight: f64,
    pub sqrt_slope: f64,
}

impl PhysicalConstants {
    /// A slope that is not positive gives `sqrt_slope = 0`.
    pub fn new(slope: f64, manning_k: f64, unit_weight: f64) -> Self {
        let sqrt_slope = if slope > 0.0 { slope.sqrt() } else { 0.0 };
        PhysicalConstants {
            slope,
            manning_k,
            unit_weight,
            sqrt_slope,
        }
    }

    pub fn for_units(slope: f64, units: UnitSystem) -> Self {
        PhysicalConstants::new(slope, units.manning_k(), units.unit_weight())
    }
}

/// Manning's n used when a zone has no usable value.
pub const DEFAULT_MANNING_N: f64 = 0.035;

// Per-zone Manning's n
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoneRoughness {
    pub left_overbank: Option<f64>,
    pub channel: Option<f64>,
    pub right_overbank: Option<f64>,
}

impl ZoneRoughness {
    pub fn resolve(&self, zone: Zone) -> f64 {
        let configured = match zone {
            Zone::LeftOverbank => self.left_overbank,
            Zone::Channel => self.channel,
            Zone::RightOverbank => self.right_overbank,
        };
        configured
            .filter(|n| n.is_finite() && *n > 0.0)
            .unwrap_or(DEFAULT_MANNING_N)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceCounts {
    pub left_overbank: usize,
    pub channel: usize,
    pub right_overbank: usize,
}

impl SliceCounts {
    pub fn get(&self, zone: Zone) -> usize {
        match zone {
            Zone::LeftOverbank => self.left_overbank,
            Zone::Channel => self.channel,
            Zone::RightOverbank => self.right_overbank,
        }
    }
}

impl Default for SliceCounts {
    fn default() -> Self {
        SliceCounts {
            left_overbank: 1,
            channel: 1,
            right_overbank: 1,
        }
    }
}

// Hydraulic parameters of one cross-section evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSetup {
    pub units: UnitSystem,
    pub slope: f64,
    pub roughness: ZoneRoughness,
    pub slices: SliceCounts,
}

impl ChannelSetup {
    pub fn physical_constants(&self) -> PhysicalConstants {
        PhysicalConstants::for_units(self.slope, self.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roughness_falls_back_to_default() {
        let roughness = ZoneRoughness {
            left_overbank: Some(-0.1),
            channel: Some(0.028),
            right_overbank: Some(f64::NAN),
        };
        assert_eq!(roughness.resolve(Zone::LeftOverbank), DEFAULT_MANNING_N);
        assert_eq!(roughness.resolve(Zone::Channel), 0.028);
        assert_eq!(roughness.resolve(Zone::RightOverbank), DEFAULT_MANNING_N);
        assert_eq!(ZoneRoughness::default().resolve(Zone::Channel), 0.035);
    }

    #[test]
    fn non_positive_slope_has_zero_root() {
        assert_eq!(PhysicalConstants::for_units(0.0, UnitSystem::Us).sqrt_slope, 0.0);
        assert_eq!(PhysicalConstants::for_units(-1e-3, UnitSystem::Si).sqrt_slope, 0.0);
        let phys = PhysicalConstants::for_units(0.0004, UnitSystem::Si);
        assert!((phys.sqrt_slope - 0.02).abs() < 1e-15);
        assert_eq!(phys.unit_weight, 9810.0);
    }
}
