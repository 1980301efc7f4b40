//! Report formatting: human-readable and JSON (NDJSON) modes.
//!
//! Two output strategies for [`RuleResult`] values and catalogue listings:
//!
//! - **Human mode** (default): one line per rule, color-coded by status, with
//!   the offenders of failing rules indented below. Colors are disabled when
//!   `--no-color` is set, the `NO_COLOR` environment variable is present (per
//!   <https://no-color.org>), or stdout is not a TTY.
//! - **JSON mode**: each result is serialized as a single-line JSON object
//!   (NDJSON), followed by a summary object.
//!
//! Both modes support a **quiet** flag (only failing and errored rules, no
//! summary) and a **verbose** flag (every offender, per-rule timing).
use std::io::{IsTerminal as _, Write};
use std::time::Duration;

use treeaudit_core::{RuleDefinition, RuleResult, Status, Summary};

use crate::cli::OutputFormat;

/// Offenders printed per failing rule in human mode unless `--verbose`.
pub const MAX_OFFENDERS_SHOWN: usize = 10;

// ---------------------------------------------------------------------------
// Color support detection
// ---------------------------------------------------------------------------

/// Returns `true` if ANSI color codes should be emitted to stdout.
///
/// Colors are disabled when any of the following conditions hold:
/// - `no_color_flag` is `true` (the `--no-color` CLI flag was passed).
/// - The `NO_COLOR` environment variable is present (any value).
/// - stdout is not a TTY (e.g. the output is piped to a file).
pub fn colors_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stdout().is_terminal()
}

// ---------------------------------------------------------------------------
// ANSI escape sequences
// ---------------------------------------------------------------------------

const ANSI_RED: &str = "\x1b[31m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_RESET: &str = "\x1b[0m";

// ---------------------------------------------------------------------------
// FormatterConfig
// ---------------------------------------------------------------------------

/// Configuration for the report formatter, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Whether ANSI colors are enabled.
    pub colors: bool,
    /// Only report rules that did not pass; no summary.
    pub quiet: bool,
    /// Print every offender and per-rule timing.
    pub verbose: bool,
}

impl FormatterConfig {
    /// Constructs a [`FormatterConfig`] from the raw CLI flags.
    ///
    /// `no_color_flag` is the `--no-color` boolean. Color detection also
    /// checks the `NO_COLOR` env var and the stdout TTY state.
    pub fn from_flags(no_color_flag: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            colors: colors_enabled(no_color_flag),
            quiet,
            verbose,
        }
    }
}

// ---------------------------------------------------------------------------
// Human-mode formatting
// ---------------------------------------------------------------------------

/// Writes a single [`RuleResult`] to `writer` in human-readable format.
///
/// Format: `[FAIL] address_duplicates  expected 0, actual 3`, followed by one
/// indented line per offender. Errored rules print the fault instead of the
/// values. In quiet mode passing rules are suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_result_human<W: Write>(
    writer: &mut W,
    result: &RuleResult,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && result.passed() {
        return Ok(());
    }

    let (tag, color) = match result.status {
        Status::Passed => ("[PASS]", ANSI_GREEN),
        Status::Failed => ("[FAIL]", ANSI_RED),
        Status::Errored => ("[ERR]", ANSI_YELLOW),
    };
    if config.colors {
        write!(writer, "{color}{tag}{ANSI_RESET} {}", result.rule)?;
    } else {
        write!(writer, "{tag} {}", result.rule)?;
    }

    match (&result.error, result.actual) {
        (Some(err), _) => write!(writer, "  {err}")?,
        (None, Some(actual)) => write!(
            writer,
            "  expected {}, actual {actual}",
            result.expected
        )?,
        (None, None) => write!(writer, "  expected {}", result.expected)?,
    }
    if config.verbose {
        write!(writer, " ({}ms)", result.elapsed.as_millis())?;
    }
    writeln!(writer)?;

    if result.status != Status::Failed {
        return Ok(());
    }
    let shown = if config.verbose {
        result.offenders.len()
    } else {
        MAX_OFFENDERS_SHOWN.min(result.offenders.len())
    };
    for offender in result.offenders.iter().take(shown) {
        writeln!(writer, "    - {offender}")?;
    }
    let hidden = result.offenders.len() - shown;
    if hidden > 0 {
        writeln!(
            writer,
            "    ... and {hidden} more {}",
            pluralize(hidden, "offender", "offenders")
        )?;
    }
    Ok(())
}

/// Writes a summary line to `writer` for human mode.
///
/// Format: `7 rules: 4 passed, 3 failed, 0 errored`
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary_human<W: Write>(
    writer: &mut W,
    summary: &Summary,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    let total = summary.passed + summary.failed + summary.errored;
    writeln!(
        writer,
        "{total} {}: {} passed, {} failed, {} errored",
        pluralize(total, "rule", "rules"),
        summary.passed,
        summary.failed,
        summary.errored,
    )
}

/// Writes timing information to `writer` in verbose mode.
///
/// This is a no-op when `config.verbose` is `false`.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_timing_human<W: Write>(
    writer: &mut W,
    label: &str,
    duration: Duration,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if !config.verbose {
        return Ok(());
    }
    writeln!(writer, "{label} in {}ms", duration.as_millis())
}

// ---------------------------------------------------------------------------
// JSON-mode formatting (NDJSON)
// ---------------------------------------------------------------------------

/// Writes a single [`RuleResult`] to `writer` as a NDJSON line.
///
/// ```json
/// {"rule":"address_duplicates","description":"...","expected":0,"actual":3,"status":"failed","offenders":[...],"elapsed_ms":0}
/// ```
///
/// In quiet mode passing rules are suppressed.
///
/// # Errors
///
/// Returns an error if serialization or writing to `writer` fails.
pub fn write_result_json<W: Write>(
    writer: &mut W,
    result: &RuleResult,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet && result.passed() {
        return Ok(());
    }
    serde_json::to_writer(&mut *writer, result)?;
    writeln!(writer)
}

/// Writes a JSON summary object as a final NDJSON line.
///
/// Format: `{"summary":{"passed":4,"failed":3,"errored":0}}`
///
/// In quiet mode the summary is suppressed.
///
/// # Errors
///
/// Returns an error if serialization or writing to `writer` fails.
pub fn write_summary_json<W: Write>(
    writer: &mut W,
    summary: &Summary,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    if config.quiet {
        return Ok(());
    }
    serde_json::to_writer(&mut *writer, &serde_json::json!({ "summary": summary }))?;
    writeln!(writer)
}

// ---------------------------------------------------------------------------
// Catalogue listings
// ---------------------------------------------------------------------------

/// Writes one catalogue entry for `treeaudit rules`.
///
/// Human: `address_duplicates  duplicate_rows on address, expected 0`.
/// JSON: `{"name":...,"kind":...,"dataset":...,"expected":...,"description":...}`.
///
/// # Errors
///
/// Returns an error if serialization or writing to `writer` fails.
pub fn write_rule_definition<W: Write>(
    writer: &mut W,
    def: &RuleDefinition,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Human => writeln!(
            writer,
            "{}  {} on {}, expected {}",
            def.name,
            def.check.kind(),
            def.check.dataset(),
            def.expected
        ),
        OutputFormat::Json => {
            let entry = serde_json::json!({
                "name": def.name,
                "kind": def.check.kind(),
                "dataset": def.check.dataset(),
                "expected": def.expected,
                "description": def.description,
            });
            serde_json::to_writer(&mut *writer, &entry)?;
            writeln!(writer)
        }
    }
}

// ---------------------------------------------------------------------------
// Helper: dispatch by format
// ---------------------------------------------------------------------------

/// Writes a single [`RuleResult`] to `writer` in the requested format.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_result<W: Write>(
    writer: &mut W,
    result: &RuleResult,
    format: OutputFormat,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Human => write_result_human(writer, result, config),
        OutputFormat::Json => write_result_json(writer, result, config),
    }
}

/// Writes a summary to `writer` in the requested format.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub fn write_summary<W: Write>(
    writer: &mut W,
    summary: &Summary,
    format: OutputFormat,
    config: &FormatterConfig,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Human => write_summary_human(writer, summary, config),
        OutputFormat::Json => write_summary_json(writer, summary, config),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns the singular or plural form of `word` depending on `count`.
fn pluralize<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 { singular } else { plural }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
