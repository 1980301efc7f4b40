//! Tracing subscriber initialization for the `treeaudit` binary.
//!
//! Wires the CLI flags (`--verbose`, `--quiet`, `--no-color`) and the
//! environment (`TREEAUDIT_LOG`, `RUST_LOG`) into one `tracing-subscriber`
//! stack that writes structured logs to stderr, keeping stdout for the report.
//!
//! # Priority (highest to lowest)
//!
//! 1. `TREEAUDIT_LOG` env var (per-target directives, e.g. `treeaudit_core=debug`)
//! 2. `RUST_LOG` env var
//! 3. CLI flags (`-v` → debug, `-q` → error)
//! 4. Default level: `warn`
use std::io::IsTerminal as _;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Project-specific filter variable.
pub const LOG_ENV: &str = "TREEAUDIT_LOG";

/// Log target of the library crate.
const CORE_TARGET: &str = "treeaudit_core";

/// Verbosity level derived from CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// `--quiet` / `-q`: only errors.
    Quiet,
    /// Default: warnings and above.
    Normal,
    /// `--verbose` / `-v`: debug-level output from the engine.
    Verbose,
}

impl Verbosity {
    /// Determine verbosity from the parsed CLI flags.
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    /// Map to a default `tracing::Level`.
    #[must_use]
    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Call once, early in `main`. A second call leaves the first subscriber in
/// place.
pub fn init_subscriber(verbosity: Verbosity, no_color: bool) {
    let filter = build_env_filter(verbosity, std::env::var(LOG_ENV).ok().as_deref());
    let use_ansi = !no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stderr().is_terminal();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true);

    let installed = if verbosity == Verbosity::Verbose {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.with_timer(fmt::time::uptime()))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.without_time().compact())
            .try_init()
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

/// Build an `EnvFilter` respecting the priority chain:
/// `TREEAUDIT_LOG` > `RUST_LOG` > CLI verbosity.
///
/// Unparseable directives fall through to the next source.
fn build_env_filter(verbosity: Verbosity, project_directives: Option<&str>) -> EnvFilter {
    if let Some(filter) = project_directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = verbosity.default_level();
    let directive = if verbosity == Verbosity::Verbose {
        format!("{level},{CORE_TARGET}=debug")
    } else {
        level.to_string()
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
