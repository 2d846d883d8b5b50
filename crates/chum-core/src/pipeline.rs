//! End-to-end batch runs: fetch, merge, resolve, classify, sort.
//!
//! Each stage fully materializes before the next starts. A collaborator
//! failure aborts the run; per-item problems only add diagnostics.

use tracing::info;

use crate::classify::{DisplayLine, JitterSource, classify};
use crate::diagnostics::Diagnostics;
use crate::error::SourceError;
use crate::identity::{PlayerDirectory, apply_names, collect_actor_ids, resolve};
use crate::merge::merge;
use crate::outcome::{OutcomeTally, count};
use crate::source::{EventLog, EventQuery};
use crate::sort::sort_lines;

/// Result of one credits run.
#[derive(Debug, Clone)]
pub struct CreditsReport {
    pub lines: Vec<DisplayLine>,
    pub fragments: usize,
    pub records: usize,
    pub diagnostics: Diagnostics,
}

/// Build the ordered credit lines.
///
/// # Errors
///
/// Returns the first [`SourceError`] from either collaborator.
pub fn run_credits(
    log: &dyn EventLog,
    directory: &dyn PlayerDirectory,
    jitter: &mut dyn JitterSource,
    query: &EventQuery,
) -> Result<CreditsReport, SourceError> {
    let events = log.fetch_events(query)?;
    let fragments = events.len();

    let mut diagnostics = Diagnostics::new();
    let mut records = merge(events, &mut diagnostics);
    info!(fragments, records = records.len(), "merged event fragments");

    let ids = collect_actor_ids(records.values());
    let names = resolve(&ids, directory)?;
    info!(players = ids.len(), resolved = names.len(), "resolved player names");
    apply_names(records.values_mut(), &names);

    let record_count = records.len();
    let classified = records
        .into_values()
        .map(|record| {
            let line = classify(&record, jitter, &mut diagnostics);
            (record, line)
        })
        .collect();
    let lines = sort_lines(classified);

    Ok(CreditsReport {
        lines,
        fragments,
        records: record_count,
        diagnostics,
    })
}

/// Tally attack outcomes by season.
///
/// # Errors
///
/// Returns the [`SourceError`] from the event log.
pub fn run_outcomes(log: &dyn EventLog, query: &EventQuery) -> Result<OutcomeTally, SourceError> {
    let events = log.fetch_events(query)?;
    let tally = count(&events);
    info!(events = events.len(), seasons = tally.seasons().len(), "tallied attack outcomes");
    Ok(tally)
}

/// Render the lines as a script assigning them to `variable`.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn render_data_module(lines: &[DisplayLine], variable: &str) -> serde_json::Result<String> {
    let json = serde_json::to_string(lines)?;
    Ok(format!("const {variable} = {json}\n"))
}
