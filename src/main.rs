use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Commands, DistributeArgs, SectionArgs, SeriesArgs, get_args};
use conveyance_rs::config::{ColumnConfig, OutputFormat};
use conveyance_rs::io::csv as csv_io;
use conveyance_rs::io::results::SeriesResults;
use conveyance_rs::roughness::clip_segments;
use conveyance_rs::{CrossSection, Discharge, FlowObstacles, HydraulicContext, Zone, analyze, run_series};

fn main() -> Result<()> {
    let cli = get_args();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let column_config = ColumnConfig::new();
    match cli.command {
        Commands::Distribute(args) => run_distribute(&args, &column_config),
        Commands::Series(args) => run_series_command(&args, &column_config),
    }
}

fn load_section(args: &SectionArgs, column_config: &ColumnConfig) -> Result<(CrossSection, HydraulicContext)> {
    let rows = csv_io::load_cross_section(&args.cross_section, column_config)
        .with_context(|| format!("Failed to read cross-section: {:?}", args.cross_section))?;
    let section = CrossSection::from_rows(&rows).with_banks(args.left_bank, args.right_bank);
    if section.points().len() < 2 {
        warn!(points = section.points().len(), "cross-section has fewer than two points");
    }

    let obstructions = match &args.obstructions {
        Some(path) => csv_io::load_obstructions(path)
            .with_context(|| format!("Failed to read obstructions: {:?}", path))?,
        None => Vec::new(),
    };
    let ineffective_areas = match &args.ineffective {
        Some(path) => csv_io::load_ineffective_areas(path)
            .with_context(|| format!("Failed to read ineffective areas: {:?}", path))?,
        None => Vec::new(),
    };
    info!(
        points = section.points().len(),
        obstructions = obstructions.len(),
        ineffective_areas = ineffective_areas.len(),
        "loaded cross-section"
    );

    let context = HydraulicContext {
        obstacles: FlowObstacles::new(obstructions, ineffective_areas),
        levees: args.levees(),
    };
    Ok((section, context))
}

fn run_distribute(args: &DistributeArgs, column_config: &ColumnConfig) -> Result<()> {
    let (section, context) = load_section(&args.section, column_config)?;
    let setup = args.section.setup();

    let stage = match (args.stage, args.depth) {
        (Some(stage), _) => stage,
        (None, Some(depth)) => section
            .stage_from_depth(depth)
            .context("Cannot convert depth to stage for an empty cross-section")?,
        (None, None) => bail!("Either --stage or --depth is required"),
    };
    let discharge = args.discharge.map_or(Discharge::Manning, Discharge::Specified);

    let analysis = analyze(&section, &context, &setup, stage, discharge);
    let summary = &analysis.summary;
    info!(
        stage,
        area = summary.area,
        perimeter = summary.perimeter,
        top_width = summary.top_width,
        hydraulic_radius = summary.hydraulic_radius(),
        "section geometry"
    );
    for zone in Zone::ALL {
        info!(%zone, discharge = analysis.distribution.zone_discharge(zone), "zone discharge");
    }
    let diagnostics = &analysis.distribution.diagnostics;
    info!(
        total_discharge = analysis.total_discharge,
        sum_raw_conveyance = diagnostics.sum_raw_conveyance,
        scale_ratio = diagnostics.scale_ratio,
        target_conveyance = diagnostics.target_conveyance,
        "distribution"
    );
    let (left_ratio, right_ratio) = section.bank_slope_ratios();
    info!(?left_ratio, ?right_ratio, "bank slope ratios (H:V)");

    if args.station_roughness {
        let segments = section
            .roughness_segments()
            .context("Failed to build station-varying roughness")?;
        let zones = &analysis.zones;
        for segment in clip_segments(&segments, zones.domain_left, zones.domain_right) {
            info!(left = segment.left, right = segment.right, n = segment.n, "roughness segment");
        }
        for run in section.explicit_roughness() {
            info!(left = run.left, right = run.right, n = run.n, "explicit roughness run");
        }
    }

    match &args.output {
        Some(path) => {
            let mut wtr = csv_io::create_csv_writer(path)
                .with_context(|| format!("Failed to create output: {:?}", path))?;
            csv_io::write_slices(&mut wtr, &analysis.distribution.slices)?;
            info!("Slice results saved to {}", path.display());
        }
        None => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            csv_io::write_slices(&mut wtr, &analysis.distribution.slices)?;
        }
    }
    Ok(())
}

fn run_series_command(args: &SeriesArgs, column_config: &ColumnConfig) -> Result<()> {
    let (section, context) = load_section(&args.section, column_config)?;
    let setup = args.section.setup();

    let records = csv_io::load_series(&args.records, column_config)
        .with_context(|| format!("Failed to read records: {:?}", args.records))?;
    if records.is_empty() {
        bail!("No records found in {:?}", args.records);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("Failed to build thread pool")?;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({eta})")?
            .progress_chars("#>-"),
    );

    let outcomes = pool.install(|| run_series(&section, &context, &setup, &records, &pb));
    pb.finish_and_clear();

    if matches!(args.format, OutputFormat::Csv | OutputFormat::Both) {
        let mut wtr = csv_io::create_csv_writer(&args.output)
            .with_context(|| format!("Failed to create output: {:?}", args.output))?;
        csv_io::write_series(&mut wtr, &outcomes)?;
        info!("CSV results saved to {}", args.output.display());
    }

    if matches!(args.format, OutputFormat::NetCdf | OutputFormat::Both) {
        let results = SeriesResults::from_outcomes(&outcomes);
        write_netcdf(args, &results)?;
    }
    Ok(())
}

#[cfg(feature = "netcdf")]
fn write_netcdf(args: &SeriesArgs, results: &SeriesResults) -> Result<()> {
    let title = format!("Conveyance distribution for {}", args.section.cross_section.display());
    conveyance_rs::io::netcdf::write_netcdf_output(&args.netcdf_output, results, &title)
        .with_context(|| format!("Failed to write NetCDF: {:?}", args.netcdf_output))?;
    info!("NetCDF results saved to {}", args.netcdf_output.display());
    Ok(())
}

#[cfg(not(feature = "netcdf"))]
fn write_netcdf(args: &SeriesArgs, results: &SeriesResults) -> Result<()> {
    bail!(
        "NetCDF output ({} records to {:?}) requires building with the `netcdf` feature",
        results.record_ids.len(),
        args.netcdf_output
    )
}
