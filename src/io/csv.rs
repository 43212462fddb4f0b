use crate::config::ColumnConfig;
use crate::distribution::Slice;
use crate::effective_bed::{IneffectiveArea, Obstruction};
use crate::error::{Error, Result};
use crate::section::{BankTag, SectionRow};
use crate::series::{SeriesOutcome, SeriesRecord};
use chrono::NaiveDateTime;
use csv::{Reader, ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Timestamp layout of the optional series time column.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn reader<R: Read>(input: R) -> Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn required_column(headers: &StringRecord, name: &str) -> Result<usize> {
    column(headers, name).ok_or_else(|| Error::InvalidRecord {
        line: 1,
        message: format!("missing column '{}'", name),
    })
}

// Blank cells are absent; anything else must parse
fn optional_f64(record: &StringRecord, index: Option<usize>, name: &str) -> Result<Option<f64>> {
    let Some(raw) = index.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<f64>().map(Some).map_err(|e| Error::InvalidRecord {
        line: line_of(record),
        message: format!("{} '{}': {}", name, raw, e),
    })
}

/// Read cross-section rows. Rows with a blank station or elevation are
/// skipped, as trailing blank grid rows are.
pub fn read_cross_section<R: Read>(input: R, config: &ColumnConfig) -> Result<Vec<SectionRow>> {
    let mut rdr = reader(input);
    let headers = rdr.headers()?.clone();
    let station_idx = required_column(&headers, &config.station)?;
    let elevation_idx = required_column(&headers, &config.elevation)?;
    let tag_idx = column(&headers, &config.tag);
    let n_idx = column(&headers, &config.n);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let station = optional_f64(&record, Some(station_idx), &config.station)?;
        let elevation = optional_f64(&record, Some(elevation_idx), &config.elevation)?;
        let (Some(station), Some(elevation)) = (station, elevation) else {
            continue;
        };

        rows.push(SectionRow {
            station,
            elevation,
            tag: tag_idx.and_then(|i| record.get(i)).and_then(BankTag::parse),
            n: optional_f64(&record, n_idx, &config.n)?,
        });
    }
    Ok(rows)
}

pub fn load_cross_section(path: &Path, config: &ColumnConfig) -> Result<Vec<SectionRow>> {
    read_cross_section(open(path)?, config)
}

/// Read obstructions with `left,right,top` headers.
pub fn read_obstructions<R: Read>(input: R) -> Result<Vec<Obstruction>> {
    let mut rdr = reader(input);
    let obstructions = rdr.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(obstructions)
}

pub fn load_obstructions(path: &Path) -> Result<Vec<Obstruction>> {
    read_obstructions(open(path)?)
}

/// Read ineffective areas with `left,right,elevation[,permanent]` headers.
pub fn read_ineffective_areas<R: Read>(input: R) -> Result<Vec<IneffectiveArea>> {
    let mut rdr = reader(input);
    let areas = rdr.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(areas)
}

pub fn load_ineffective_areas(path: &Path) -> Result<Vec<IneffectiveArea>> {
    read_ineffective_areas(open(path)?)
}

/// Read stage/discharge records. Blank values are kept as NaN so the series
/// runner can skip them without losing record positions.
pub fn read_series<R: Read>(input: R, config: &ColumnConfig) -> Result<Vec<SeriesRecord>> {
    let mut rdr = reader(input);
    let headers = rdr.headers()?.clone();
    let stage_idx = required_column(&headers, &config.stage)?;
    let discharge_idx = required_column(&headers, &config.discharge)?;
    let time_idx = column(&headers, &config.time);

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let time = match time_idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty()) {
            Some(raw) => Some(NaiveDateTime::parse_from_str(raw, TIME_FORMAT)?),
            None => None,
        };
        records.push(SeriesRecord {
            time,
            stage: optional_f64(&record, Some(stage_idx), &config.stage)?.unwrap_or(f64::NAN),
            discharge: optional_f64(&record, Some(discharge_idx), &config.discharge)?
                .unwrap_or(f64::NAN),
        });
    }
    Ok(records)
}

pub fn load_series(path: &Path, config: &ColumnConfig) -> Result<Vec<SeriesRecord>> {
    read_series(open(path)?, config)
}

// Create CSV writer with headers
pub fn create_csv_writer(path: &Path) -> Result<Writer<File>> {
    Ok(WriterBuilder::new().has_headers(true).from_path(path)?)
}

/// Column order of [`Slice`] as serialized.
pub const SLICE_HEADER: [&str; 19] = [
    "zone",
    "index",
    "left",
    "right",
    "area",
    "perimeter",
    "top_width",
    "hydraulic_radius",
    "hydraulic_depth",
    "n",
    "raw_conveyance",
    "raw_discharge",
    "conveyance",
    "discharge",
    "velocity",
    "shear_stress",
    "stream_power",
    "midpoint",
    "percent_of_conveyance",
];

/// Write one row per slice, headers taken from the slice fields.
///
/// A dry section still gets the header row.
pub fn write_slices<W: Write>(wtr: &mut Writer<W>, slices: &[Slice]) -> Result<()> {
    if slices.is_empty() {
        wtr.write_record(SLICE_HEADER)?;
    }
    for slice in slices {
        wtr.serialize(slice)?;
    }
    wtr.flush()?;
    Ok(())
}

const SERIES_HEADER: [&str; 12] = [
    "record",
    "time",
    "stage",
    "total_discharge",
    "zone",
    "slice",
    "left",
    "right",
    "area",
    "velocity",
    "discharge",
    "percent_of_conveyance",
];

/// Write one row per slice per evaluated record.
pub fn write_series<W: Write>(wtr: &mut Writer<W>, outcomes: &[SeriesOutcome]) -> Result<()> {
    wtr.write_record(SERIES_HEADER)?;
    for outcome in outcomes {
        let Some(analysis) = &outcome.analysis else {
            continue;
        };
        let time = outcome
            .record
            .time
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default();
        for slice in &analysis.distribution.slices {
            wtr.write_record(&[
                outcome.index.to_string(),
                time.clone(),
                analysis.stage.to_string(),
                analysis.total_discharge.to_string(),
                slice.zone.to_string(),
                slice.index.to_string(),
                slice.left.to_string(),
                slice.right.to_string(),
                slice.area.to_string(),
                slice.velocity.to_string(),
                slice.discharge.to_string(),
                slice.percent_of_conveyance.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
