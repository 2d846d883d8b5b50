//! `chum outcomes`: tally attack outcomes per season.

use std::io::{self, Write};
use std::path::PathBuf;

use chum_core::config::ChumConfig;
use chum_core::outcome::{Outcome, OutcomeTally};
use chum_core::pipeline;
use chum_core::source::EventLog;
use clap::Args;
use tracing::info;

use crate::output::{OutputMode, pretty_rule, pretty_section, render_mode};
use crate::sources::{BlaseballClient, ReplayLog};

/// Arguments for `chum outcomes`.
#[derive(Args, Debug, Default)]
pub struct OutcomesArgs {
    /// Maximum number of attack events to request.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Replay events from a saved JSON response instead of the network.
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,
}

/// Execute `chum outcomes`.
pub fn run_outcomes(
    args: &OutcomesArgs,
    config: &ChumConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut query = config.outcomes.query();
    if let Some(limit) = args.limit {
        query.limit = Some(limit);
    }

    let client = BlaseballClient::new(&config.source);
    let replay_log = args.events_file.as_ref().map(ReplayLog::new);
    let log: &dyn EventLog = match &replay_log {
        Some(replay) => replay,
        None => &client,
    };

    let tally = pipeline::run_outcomes(log, &query)?;
    info!(requests = client.request_count(), "outcome tally complete");

    render_mode(
        output,
        &tally,
        |tally, w| render_tally_text(tally, w),
        |tally, w| render_tally_pretty(tally, w),
    )
}

fn render_tally_text(tally: &OutcomeTally, w: &mut dyn Write) -> io::Result<()> {
    for outcome in Outcome::ALL {
        for season in tally.seasons() {
            let count = tally.get(outcome, season);
            if count > 0 {
                writeln!(w, "{outcome}\t{season}\t{count}")?;
            }
        }
    }
    Ok(())
}

fn render_tally_pretty(tally: &OutcomeTally, w: &mut dyn Write) -> io::Result<()> {
    let seasons = tally.seasons();
    pretty_section(w, "Attack outcomes")?;
    if seasons.is_empty() {
        return writeln!(w, "no attacks found");
    }

    write!(w, "{:<10}", "OUTCOME")?;
    for season in &seasons {
        write!(w, " {:>6}", format!("S{season}"))?;
    }
    writeln!(w, " {:>7}", "TOTAL")?;
    pretty_rule(w)?;

    for outcome in Outcome::ALL {
        write!(w, "{:<10}", outcome.as_str())?;
        for &season in &seasons {
            write!(w, " {:>6}", tally.get(outcome, season))?;
        }
        writeln!(w, " {:>7}", tally.total(outcome))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tally() -> OutcomeTally {
        let mut tally = OutcomeTally::new();
        tally.record(Outcome::Success, 14);
        tally.record(Outcome::Success, 14);
        tally.record(Outcome::Defended, 15);
        tally
    }

    #[test]
    fn text_rows_skip_empty_cells() {
        let mut buf = Vec::new();
        render_tally_text(&sample_tally(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "success\t14\t2\ndefended\t15\t1\n");
    }

    #[test]
    fn pretty_table_has_one_row_per_outcome() {
        let mut buf = Vec::new();
        render_tally_pretty(&sample_tally(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("S14"));
        assert!(text.contains("S15"));
        for outcome in Outcome::ALL {
            assert!(text.contains(outcome.as_str()));
        }
    }

    #[test]
    fn pretty_table_reports_empty_tally() {
        let mut buf = Vec::new();
        render_tally_pretty(&OutcomeTally::new(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("no attacks found"));
    }
}
