#![forbid(unsafe_code)]

mod cmd;
mod output;
mod sources;

use chum_core::config::resolve_config;
use chum_core::error::{ErrorCode, SourceError};
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chum: end credits for consumer attacks",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, text, json).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Read configuration from this file instead of the usual locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Rebuild, rate and order consumer attacks",
        long_about = "Fetch consumer attack fragments, merge them into attacks, name the \
                      players involved, rate each attack and write the ordered lines as a \
                      data module.",
        after_help = "EXAMPLES:\n    # Write data.js from the live event log\n    chum credits\n\n    # Replay saved responses with a fixed seed\n    chum credits --events-file events.json --players-file players.json --seed 7\n\n    # Print the lines as JSON\n    chum credits --stdout --json"
    )]
    Credits(cmd::credits::CreditsArgs),

    #[command(
        about = "Count attack outcomes per season",
        after_help = "EXAMPLES:\n    # Show the per-season table\n    chum outcomes\n\n    # Emit the raw tally\n    chum outcomes --json"
    )]
    Outcomes(cmd::outcomes::OutcomesArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CHUM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "chum=debug,info"
        } else {
            "chum=info,warn"
        })
    });

    let format = env::var("CHUM_LOG_FORMAT").unwrap_or_default();
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Pick the stable code for a command failure.
fn error_code_for(err: &anyhow::Error) -> ErrorCode {
    if let Some(source) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<SourceError>())
    {
        return source.error_code();
    }
    if err
        .chain()
        .any(|cause| cause.downcast_ref::<std::io::Error>().is_some())
    {
        return ErrorCode::OutputWriteFailed;
    }
    ErrorCode::InternalUnexpected
}

fn report(output: OutputMode, message: String, code: ErrorCode) -> ExitCode {
    let error = CliError::from_code(message, code);
    if let Err(render_err) = render_error(output, &error) {
        eprintln!("error: {}", error.message);
        debug!("failed to render error: {render_err}");
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let project_root = match env::current_dir() {
        Ok(dir) => dir,
        Err(err) => {
            return report(
                output,
                format!("cannot read working directory: {err}"),
                ErrorCode::InternalUnexpected,
            );
        }
    };

    let config = match resolve_config(&project_root, cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return report(output, format!("{err:#}"), ErrorCode::ConfigParseError),
    };
    debug!(?config, "resolved configuration");

    let command_result = match &cli.command {
        Commands::Credits(args) => cmd::credits::run_credits(args, &config, output),
        Commands::Outcomes(args) => cmd::outcomes::run_outcomes(args, &config, output),
    };

    match command_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(output, format!("{err:#}"), error_code_for(&err)),
    }
}
