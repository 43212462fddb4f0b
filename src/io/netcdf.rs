use crate::error::Result;
use crate::io::csv::TIME_FORMAT;
use crate::io::results::{FILL_VALUE, SeriesResults};
use netcdf::{self};
use std::path::Path;

// Function to write series results to NetCDF
pub fn write_netcdf_output(path: &Path, results: &SeriesResults, title: &str) -> Result<()> {
    let mut file = netcdf::create(path)?;

    file.add_dimension("record", results.record_ids.len())?;

    // Time variable
    let mut time_var = file.add_variable::<f64>("time", &["record"])?;
    time_var.put_attribute("_FillValue", FILL_VALUE)?;
    time_var.put_attribute("long_name", "record time")?;
    if let Some(reference_time) = &results.reference_time {
        time_var.put_attribute("standard_name", "time")?;
        time_var.put_attribute(
            "units",
            format!("seconds since {}", reference_time.format(TIME_FORMAT)),
        )?;
    }
    time_var.put_values(&results.times, ..)?;

    let mut record_var = file.add_variable::<i64>("record", &["record"])?;
    record_var.put_attribute("long_name", "Record index")?;
    record_var.put_values(&results.record_ids, ..)?;

    let mut stage_var = file.add_variable::<f64>("stage", &["record"])?;
    stage_var.put_attribute("_FillValue", FILL_VALUE)?;
    stage_var.put_attribute("long_name", "Water-surface elevation")?;
    stage_var.put_values(&results.stages, ..)?;

    let mut discharge_var = file.add_variable::<f64>("discharge", &["record"])?;
    discharge_var.put_attribute("_FillValue", FILL_VALUE)?;
    discharge_var.put_attribute("long_name", "Total discharge")?;
    discharge_var.put_values(&results.discharges, ..)?;

    // a zero-length dimension would be unlimited
    if results.slice_count > 0 {
        file.add_dimension("slice", results.slice_count)?;
        let grids = [
            ("slice_discharge", "Slice discharge", &results.slice_discharge),
            ("slice_velocity", "Slice mean velocity", &results.slice_velocity),
            ("slice_percent_conveyance", "Slice share of total conveyance", &results.slice_percent),
        ];
        for (name, long_name, rows) in grids {
            let mut var = file.add_variable::<f64>(name, &["record", "slice"])?;
            var.put_attribute("_FillValue", FILL_VALUE)?;
            var.put_attribute("long_name", long_name)?;
            var.put_attribute("missing_value", FILL_VALUE)?;
            for (i, row) in rows.iter().enumerate() {
                var.put_values(row, (&i, ..))?;
            }
        }
    }

    // Global attributes
    file.add_attribute("TITLE", title)?;
    if let Some(reference_time) = &results.reference_time {
        file.add_attribute(
            "file_reference_time",
            reference_time.format("%Y-%m-%d_%H:%M:%S").to_string(),
        )?;
    }
    file.add_attribute("code_version", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
