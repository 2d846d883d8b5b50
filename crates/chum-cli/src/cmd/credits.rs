//! `chum credits`: rebuild attacks, rate them and write the data module.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chum_core::classify::{DisplayLine, RandomJitter};
use chum_core::config::ChumConfig;
use chum_core::diagnostics::DiagnosticEntry;
use chum_core::identity::PlayerDirectory;
use chum_core::pipeline::{self, render_data_module};
use chum_core::source::EventLog;
use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use crate::sources::{BlaseballClient, ReplayDirectory, ReplayLog};

/// Arguments for `chum credits`.
#[derive(Args, Debug, Default)]
pub struct CreditsArgs {
    /// Where to write the data module [default: `credits.output` from config].
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Maximum number of event fragments to request.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Seed the rating jitter so repeated runs produce identical lines.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Replay events from a saved JSON response instead of the network.
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,

    /// Replay player records from a saved JSON response instead of the network.
    #[arg(long, value_name = "PATH")]
    pub players_file: Option<PathBuf>,

    /// Print the lines instead of writing the data module.
    #[arg(long)]
    pub stdout: bool,
}

/// Report payload for a written data module.
#[derive(Debug, Serialize)]
pub struct CreditsSummary {
    pub output: String,
    pub lines: usize,
    pub records: usize,
    pub fragments: usize,
    pub diagnostics: Vec<DiagnosticEntry>,
}

/// Execute `chum credits`.
pub fn run_credits(
    args: &CreditsArgs,
    config: &ChumConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let mut query = config.credits.query();
    if let Some(limit) = args.limit {
        query.limit = Some(limit);
    }

    let client = BlaseballClient::new(&config.source);
    let replay_log = args.events_file.as_ref().map(ReplayLog::new);
    let log: &dyn EventLog = match &replay_log {
        Some(replay) => replay,
        None => &client,
    };
    let replay_directory = args
        .players_file
        .as_deref()
        .map(ReplayDirectory::load)
        .transpose()?;
    let directory: &dyn PlayerDirectory = match &replay_directory {
        Some(replay) => replay,
        None => &client,
    };

    let mut jitter = match args.seed.or(config.credits.seed) {
        Some(seed) => RandomJitter::seeded(seed),
        None => RandomJitter::from_entropy(),
    };

    let report = pipeline::run_credits(log, directory, &mut jitter, &query)?;
    info!(
        requests = client.request_count(),
        diagnostics = report.diagnostics.len(),
        "credits run complete"
    );

    if args.stdout {
        return render_mode(
            output,
            &report.lines,
            |lines, w| render_lines_text(lines, w),
            |lines, w| render_lines_pretty(lines, w),
        );
    }

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.credits.output.clone());
    let module = render_data_module(&report.lines, &config.credits.variable)?;
    write_atomic(&path, &module)?;
    info!(path = %path.display(), lines = report.lines.len(), "wrote data module");

    let summary = CreditsSummary {
        output: path.display().to_string(),
        lines: report.lines.len(),
        records: report.records,
        fragments: report.fragments,
        diagnostics: report.diagnostics.to_entries(),
    };
    render_mode(
        output,
        &summary,
        |summary, w| render_summary_text(summary, w),
        |summary, w| render_summary_pretty(summary, w),
    )
}

/// Write `content` next to `path` and rename it into place.
///
/// A failed run never leaves a truncated module behind.
fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        format!("failed to move {} into {}", tmp.display(), path.display())
    })?;
    Ok(())
}

fn render_lines_text(lines: &[DisplayLine], w: &mut dyn Write) -> io::Result<()> {
    for line in lines {
        writeln!(w, "{}\t{}\t{}", line.target, line.rating, line.comment)?;
    }
    Ok(())
}

fn render_lines_pretty(lines: &[DisplayLine], w: &mut dyn Write) -> io::Result<()> {
    let width = lines
        .iter()
        .map(|line| line.target.chars().count())
        .max()
        .unwrap_or(0)
        .max("TARGET".len());

    writeln!(w, "{:<width$}  {:>8}  COMMENT", "TARGET", "RATING")?;
    pretty_rule(w)?;
    for line in lines {
        writeln!(
            w,
            "{:<width$}  {:>8}  {}",
            line.target,
            line.rating.to_string(),
            line.comment
        )?;
    }
    Ok(())
}

fn render_summary_text(summary: &CreditsSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "wrote {} lines to {} ({} records from {} fragments)",
        summary.lines, summary.output, summary.records, summary.fragments
    )?;
    for entry in &summary.diagnostics {
        writeln!(w, "{}\t{}", entry.code, entry.message)?;
    }
    Ok(())
}

fn render_summary_pretty(summary: &CreditsSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Credits")?;
    pretty_kv(w, "output", &summary.output)?;
    pretty_kv(w, "lines", summary.lines.to_string())?;
    pretty_kv(w, "records", summary.records.to_string())?;
    pretty_kv(w, "fragments", summary.fragments.to_string())?;

    if summary.diagnostics.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    pretty_section(w, &format!("Diagnostics ({})", summary.diagnostics.len()))?;
    for entry in &summary.diagnostics {
        writeln!(w, "  [{}] {}", entry.code, entry.message)?;
    }
    Ok(())
}
