use clap::{Args, Parser, Subcommand};
use conveyance_rs::config::OutputFormat;
use conveyance_rs::{ChannelSetup, Levee, Levees, SliceCounts, UnitSystem, ZoneRoughness};
use std::path::PathBuf;

/// Distribute discharge across a river cross-section by Manning conveyance
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single stage
    Distribute(DistributeArgs),
    /// Evaluate a CSV of stage/discharge records in parallel
    Series(SeriesArgs),
}

#[derive(Args, Debug)]
pub struct SectionArgs {
    /// Cross-section CSV with station, elevation and optional tag (LB/RB) and n columns
    pub cross_section: PathBuf,

    #[arg(long, value_enum, default_value_t = UnitSystem::Us)]
    pub units: UnitSystem,

    /// Energy slope (ft/ft or m/m)
    #[arg(long)]
    pub slope: f64,

    #[arg(long)]
    pub n_lob: Option<f64>,
    #[arg(long)]
    pub n_chan: Option<f64>,
    #[arg(long)]
    pub n_rob: Option<f64>,

    #[arg(long, default_value_t = 1)]
    pub slices_lob: usize,
    #[arg(long, default_value_t = 1)]
    pub slices_chan: usize,
    #[arg(long, default_value_t = 1)]
    pub slices_rob: usize,

    /// Left bank station, overrides the LB tag
    #[arg(long)]
    pub left_bank: Option<f64>,
    /// Right bank station, overrides the RB tag
    #[arg(long)]
    pub right_bank: Option<f64>,

    /// Obstructions CSV (left,right,top)
    #[arg(long)]
    pub obstructions: Option<PathBuf>,
    /// Ineffective flow areas CSV (left,right,elevation[,permanent])
    #[arg(long)]
    pub ineffective: Option<PathBuf>,

    /// Left levee as STATION,CREST
    #[arg(long, value_parser = parse_levee)]
    pub left_levee: Option<Levee>,
    /// Right levee as STATION,CREST
    #[arg(long, value_parser = parse_levee)]
    pub right_levee: Option<Levee>,
}

impl SectionArgs {
    pub fn setup(&self) -> ChannelSetup {
        ChannelSetup {
            units: self.units,
            slope: self.slope,
            roughness: ZoneRoughness {
                left_overbank: self.n_lob,
                channel: self.n_chan,
                right_overbank: self.n_rob,
            },
            slices: SliceCounts {
                left_overbank: self.slices_lob,
                channel: self.slices_chan,
                right_overbank: self.slices_rob,
            },
        }
    }

    pub fn levees(&self) -> Levees {
        Levees {
            left: self.left_levee.unwrap_or_default(),
            right: self.right_levee.unwrap_or_default(),
        }
    }
}

#[derive(Args, Debug)]
pub struct DistributeArgs {
    #[command(flatten)]
    pub section: SectionArgs,

    /// Water-surface elevation
    #[arg(long, required_unless_present = "depth", conflicts_with = "depth")]
    pub stage: Option<f64>,

    /// Depth above the thalweg, converted to a stage
    #[arg(long)]
    pub depth: Option<f64>,

    /// Total discharge; omitted means the section's own Manning discharge
    #[arg(long)]
    pub discharge: Option<f64>,

    /// Also build station-varying roughness from the n column
    #[arg(long)]
    pub station_roughness: bool,

    /// Slice CSV output; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub section: SectionArgs,

    /// CSV of stage,discharge[,time] records
    pub records: PathBuf,

    #[arg(long, default_value_t = num_cpus::get())]
    pub threads: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    #[arg(short, long, default_value = "series_results.csv")]
    pub output: PathBuf,

    #[arg(long, default_value = "series_results.nc")]
    pub netcdf_output: PathBuf,
}

fn parse_levee(value: &str) -> Result<Levee, String> {
    let (station, crest) = value
        .split_once(',')
        .ok_or_else(|| format!("expected STATION,CREST, got '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("'{}': {}", s.trim(), e))
    };
    Ok(Levee::new(parse(station)?, parse(crest)?))
}

pub fn get_args() -> Cli {
    Cli::parse()
}
