//! Implementation of `treeaudit rules --catalog <file>`.
//!
//! Lists the rules a catalogue defines, in registration order, after checking
//! that every definition builds. Nothing is evaluated.
use std::io::Write;

use super::{parse_catalog, write_failed};
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::write_rule_definition;

/// Runs the `rules` command, writing one entry per rule to `out`.
///
/// # Errors
///
/// [`CliError::Catalog`] when the catalogue does not parse or does not build.
pub fn run<W: Write>(catalog: &str, format: OutputFormat, out: &mut W) -> Result<(), CliError> {
    let catalog = parse_catalog(catalog)?;
    catalog.build_engine().map_err(CliError::Catalog)?;

    for def in &catalog.rules {
        write_rule_definition(out, def, format).map_err(|e| write_failed("stdout", &e))?;
    }
    Ok(())
}
