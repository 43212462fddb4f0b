use crate::distribution::Slice;
use crate::series::SeriesOutcome;
use chrono::NaiveDateTime;

/// Marks missing values in gridded output.
pub const FILL_VALUE: f64 = -9999.0;

// Structure to store series results as record x slice grids
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResults {
    pub reference_time: Option<NaiveDateTime>,
    pub record_ids: Vec<i64>,
    /// seconds since `reference_time`
    pub times: Vec<f64>,
    pub stages: Vec<f64>,
    pub discharges: Vec<f64>,
    pub slice_count: usize,
    pub slice_discharge: Vec<Vec<f64>>,
    pub slice_velocity: Vec<Vec<f64>>,
    pub slice_percent: Vec<Vec<f64>>,
}

fn or_fill(value: f64) -> f64 {
    if value.is_finite() { value } else { FILL_VALUE }
}

fn padded(slices: &[Slice], width: usize, field: fn(&Slice) -> f64) -> Vec<f64> {
    let mut row: Vec<f64> = slices.iter().map(|s| or_fill(field(s))).collect();
    row.resize(width, FILL_VALUE);
    row
}

impl SeriesResults {
    pub fn from_outcomes(outcomes: &[SeriesOutcome]) -> Self {
        let reference_time = outcomes.iter().find_map(|o| o.record.time);
        let slice_count = outcomes
            .iter()
            .filter_map(|o| o.analysis.as_ref())
            .map(|a| a.distribution.slices.len())
            .max()
            .unwrap_or(0);

        let mut results = SeriesResults {
            reference_time,
            record_ids: Vec::with_capacity(outcomes.len()),
            times: Vec::with_capacity(outcomes.len()),
            stages: Vec::with_capacity(outcomes.len()),
            discharges: Vec::with_capacity(outcomes.len()),
            slice_count,
            slice_discharge: Vec::with_capacity(outcomes.len()),
            slice_velocity: Vec::with_capacity(outcomes.len()),
            slice_percent: Vec::with_capacity(outcomes.len()),
        };

        for outcome in outcomes {
            let time = match (outcome.record.time, reference_time) {
                (Some(t), Some(reference)) => (t - reference).num_seconds() as f64,
                _ => FILL_VALUE,
            };
            let slices = outcome
                .analysis
                .as_ref()
                .map(|a| a.distribution.slices.as_slice())
                .unwrap_or_default();

            results.record_ids.push(outcome.index as i64);
            results.times.push(time);
            results.stages.push(or_fill(outcome.record.stage));
            results.discharges.push(or_fill(outcome.record.discharge));
            results.slice_discharge.push(padded(slices, slice_count, |s| s.discharge));
            results.slice_velocity.push(padded(slices, slice_count, |s| s.velocity));
            results.slice_percent.push(padded(slices, slice_count, |s| s.percent_of_conveyance));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HydraulicContext;
    use crate::config::{ChannelSetup, SliceCounts, UnitSystem, ZoneRoughness};
    use crate::section::{CrossSection, SectionRow};
    use crate::series::{SeriesRecord, run_series};
    use indicatif::ProgressBar;

    #[test]
    fn grids_are_padded_with_fill() {
        let section = CrossSection::from_rows(&[
            SectionRow::new(0.0, 4.0),
            SectionRow::new(10.0, 0.0),
            SectionRow::new(20.0, 4.0),
        ]);
        let setup = ChannelSetup {
            units: UnitSystem::Us,
            slope: 0.001,
            roughness: ZoneRoughness::default(),
            slices: SliceCounts {
                left_overbank: 0,
                channel: 3,
                right_overbank: 0,
            },
        };
        let t0 = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let records = [
            SeriesRecord {
                time: Some(t0),
                stage: 2.0,
                discharge: 50.0,
            },
            SeriesRecord {
                time: Some(t0 + chrono::Duration::hours(1)),
                stage: f64::NAN,
                discharge: 60.0,
            },
        ];
        let outcomes = run_series(
            &section,
            &HydraulicContext::default(),
            &setup,
            &records,
            &ProgressBar::hidden(),
        );
        let results = SeriesResults::from_outcomes(&outcomes);

        assert_eq!(results.slice_count, 3);
        assert_eq!(results.times, vec![0.0, 3600.0]);
        assert_eq!(results.stages, vec![2.0, FILL_VALUE]);
        assert_eq!(results.slice_discharge[1], vec![FILL_VALUE; 3]);
        let total: f64 = results.slice_discharge[0].iter().sum();
        assert!((total - 50.0).abs() < 1e-9);
    }
}
