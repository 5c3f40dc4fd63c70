//! canonmatch - find which files already exist in a canonical directory
//!
//! Query files are compared against the files of one canonical directory.
//! Candidates share a composite key (size plus any selected attributes) and
//! are confirmed by BLAKE3 checksum. Each query file ends up a duplicate,
//! unique, or a source error.

pub mod cache;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod signal;

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, CompareArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ExitCode, Interrupted};
use crate::output::{CompareReport, CsvOutput, JsonOutput, TextOutput};
use crate::progress::{drive, Phase, Progress, ProgressCallback};
use crate::session::{CompareSession, SessionOptions};
use crate::signal::ShutdownHandler;

/// Run the command line application.
///
/// # Errors
///
/// Returns an error for invalid options, unwritable output, or
/// [`Interrupted`] when Ctrl+C stops a scan. A comparison cut short by
/// Ctrl+C is still reported and yields [`ExitCode::Interrupted`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let config = Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Config => {
            let rendered = config
                .to_toml()
                .context("Failed to render configuration")?;
            print!("{rendered}");
            Ok(ExitCode::Success)
        }
        Commands::Compare(args) => {
            if cli.no_color || args.output_file.is_some() || !io::stdout().is_terminal() {
                yansi::disable();
            }
            let shutdown = signal::install_handler().context("Failed to install Ctrl+C handler")?;
            let progress = Progress::new(cli.quiet);
            run_compare(&args, &config, &progress, &shutdown, cli.verbose > 0)
        }
    }
}

/// Scan, compare and report, stopping between steps once `shutdown` is
/// raised.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_compare(
    args: &CompareArgs,
    config: &Config,
    progress: &dyn ProgressCallback,
    shutdown: &ShutdownHandler,
    list_unique: bool,
) -> Result<ExitCode> {
    let started = Instant::now();
    let options = SessionOptions::new(args.queries.clone(), args.canonical.clone())
        .with_filter(args.scan_filter(config))
        .with_report_frequency(args.report_frequency.unwrap_or(config.report_frequency))
        .with_io_threads(args.io_threads.unwrap_or(config.io_threads));
    let comparison = args.comparison(config);
    log::debug!("Comparison settings: {:?}", comparison);

    let mut session = CompareSession::new(options).context("Invalid options")?;
    let stop = || shutdown.is_shutdown_requested();

    if !drive(session.run_query_scan(), Phase::QueryScan, None, progress, stop) {
        return Err(Interrupted.into());
    }
    if !drive(session.run_canonical_scan(), Phase::CanonicalScan, None, progress, stop) {
        return Err(Interrupted.into());
    }

    let total = session.query_files().len();
    let steps = session.run_compare(comparison)?;
    let completed = drive(steps, Phase::Compare, Some(total), progress, stop);
    if !completed {
        log::warn!("Interrupted, reporting the files compared so far");
    }

    let report = CompareReport::from_session(&session, started.elapsed(), !completed);
    match &args.output_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_report(&report, args.output, list_unique, &mut writer)?;
            writer
                .flush()
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_report(&report, args.output, list_unique, &mut stdout)?;
            stdout.flush().context("Failed to write report")?;
        }
    }

    Ok(report.exit_code())
}

fn write_report<W: Write>(
    report: &CompareReport<'_>,
    format: OutputFormat,
    list_unique: bool,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => TextOutput::new(report, list_unique)
            .write_to(writer)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(report)
            .write_to(writer, true)
            .context("Failed to write JSON report")?,
        OutputFormat::Csv => CsvOutput::new(report)
            .write_to(writer)
            .context("Failed to write CSV report")?,
    }
    Ok(())
}
