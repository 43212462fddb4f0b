use chrono::NaiveDateTime;
use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::analysis::{Analysis, Discharge, HydraulicContext, analyze};
use crate::config::ChannelSetup;
use crate::section::CrossSection;

// One stage/discharge pair to evaluate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRecord {
    pub time: Option<NaiveDateTime>,
    pub stage: f64,
    pub discharge: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    pub index: usize,
    pub record: SeriesRecord,
    /// `None` when the record could not be evaluated
    pub analysis: Option<Analysis>,
}

// Process a single record
fn process_record(
    index: usize,
    record: SeriesRecord,
    section: &CrossSection,
    context: &HydraulicContext,
    setup: &ChannelSetup,
) -> SeriesOutcome {
    if !(record.stage.is_finite() && record.discharge.is_finite()) {
        warn!(index, stage = record.stage, discharge = record.discharge, "skipping non-finite record");
        return SeriesOutcome {
            index,
            record,
            analysis: None,
        };
    }

    let analysis = analyze(
        section,
        context,
        setup,
        record.stage,
        Discharge::Specified(record.discharge),
    );
    SeriesOutcome {
        index,
        record,
        analysis: Some(analysis),
    }
}

/// Evaluate every record independently across the current rayon pool.
///
/// Outcomes come back in record order.
pub fn run_series(
    section: &CrossSection,
    context: &HydraulicContext,
    setup: &ChannelSetup,
    records: &[SeriesRecord],
    progress: &ProgressBar,
) -> Vec<SeriesOutcome> {
    info!(records = records.len(), threads = rayon::current_num_threads(), "evaluating series");

    let outcomes: Vec<SeriesOutcome> = records
        .par_iter()
        .enumerate()
        .map(|(index, &record)| {
            let outcome = process_record(index, record, section, context, setup);
            progress.inc(1);
            outcome
        })
        .collect();

    let skipped = outcomes.iter().filter(|o| o.analysis.is_none()).count();
    if skipped > 0 {
        warn!(skipped, "records skipped");
    }
    outcomes
}
