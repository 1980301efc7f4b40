//! Command module for the `treeaudit` CLI.
//!
//! Each submodule implements one subcommand. The `run` function in each
//! module takes already-read input text and returns `Ok(())` on success or
//! a [`crate::error::CliError`] on failure.
use treeaudit_core::Catalog;

use crate::error::CliError;

pub mod check;
pub mod rules;

/// Parses catalogue text, mapping every fault to [`CliError::Catalog`].
fn parse_catalog(content: &str) -> Result<Catalog, CliError> {
    Catalog::from_json(content).map_err(CliError::Catalog)
}

/// Maps a write failure on `stream` to [`CliError::IoError`].
fn write_failed(stream: &str, e: &std::io::Error) -> CliError {
    CliError::IoError {
        source: stream.to_owned(),
        detail: e.to_string(),
    }
}
