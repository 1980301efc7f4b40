//! Implementation of `treeaudit check --catalog <file> --snapshot <file>`.
//!
//! Builds the engine from the catalogue, loads every dataset the catalogue
//! selects from the snapshot document, evaluates, and writes one result per
//! rule plus a summary to stdout.
//!
//! Exit codes:
//! - 0 = every rule passed
//! - 1 = at least one rule failed or errored
//! - 2 = the catalogue or snapshot could not be read, parsed, or loaded
use std::io::Write;
use std::time::Instant;

use tracing::debug;
use treeaudit_core::Snapshot;

use super::{parse_catalog, write_failed};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{FormatterConfig, write_result, write_summary, write_timing_human};
use crate::source::JsonSnapshotSource;

/// Options for one `check` run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Evaluate on worker threads.
    pub parallel: bool,
    /// Output format for results and summary.
    pub format: OutputFormat,
    /// Quiet/verbose/color settings.
    pub config: FormatterConfig,
}

/// Runs the `check` command, writing the report to `out`.
///
/// # Errors
///
/// - [`CliError::Catalog`]: the catalogue is malformed or names a rule twice.
/// - [`CliError::Load`]: a selected dataset is missing or unreadable.
/// - [`CliError::ChecksFailed`]: the report was written and some rule did not
///   pass.
pub fn run<W: Write>(
    catalog: &str,
    snapshot: &JsonSnapshotSource,
    options: &CheckOptions,
    out: &mut W,
) -> Result<(), CliError> {
    let engine = parse_catalog(catalog)?
        .build_engine()
        .map_err(CliError::Catalog)?;
    let selectors = engine.selectors();
    debug!(rules = engine.rules().len(), datasets = selectors.len(), "engine built");

    let snapshot = Snapshot::load(snapshot, &selectors).map_err(CliError::Load)?;

    let started = Instant::now();
    let report = if options.parallel {
        engine.evaluate_parallel(&snapshot)
    } else {
        engine.evaluate(&snapshot)
    };
    let elapsed = started.elapsed();

    for result in &report.results {
        write_result(out, result, options.format, &options.config)
            .map_err(|e| write_failed("stdout", &e))?;
    }
    let summary = report.summary();
    write_summary(out, &summary, options.format, &options.config)
        .map_err(|e| write_failed("stdout", &e))?;

    let stderr = std::io::stderr();
    write_timing_human(
        &mut stderr.lock(),
        &format!("evaluated {} rule(s)", report.len()),
        elapsed,
        &options.config,
    )
    .map_err(|e| write_failed("stderr", &e))?;

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::ChecksFailed {
            failed: summary.failed,
            errored: summary.errored,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
