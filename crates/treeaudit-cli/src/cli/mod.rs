//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

impl std::fmt::Display for PathOrStdin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("-"),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits one line per rule plus a summary. `Json` emits one NDJSON
/// object per rule followed by a summary object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, optionally colored output (default).
    Human,
    /// Structured NDJSON output.
    Json,
}

/// All top-level subcommands exposed by the `treeaudit` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Run every rule of a catalogue against a snapshot.
    Check {
        /// Rule catalogue (JSON), or `-` for stdin.
        #[arg(long, short = 'c', value_name = "FILE")]
        catalog: PathOrStdin,
        /// Dataset snapshot (JSON object of dataset name to rows), or `-` for
        /// stdin. At most one of `--catalog` and `--snapshot` may be `-`.
        #[arg(long, short = 's', value_name = "FILE")]
        snapshot: PathOrStdin,
        /// Evaluate rules on parallel worker threads.
        #[arg(long)]
        parallel: bool,
    },

    /// List the rules a catalogue defines without evaluating them.
    Rules {
        /// Rule catalogue (JSON), or `-` for stdin.
        #[arg(long, short = 'c', value_name = "FILE")]
        catalog: PathOrStdin,
    },

    /// Print the treeaudit-core library version.
    Version,
}

/// Root CLI struct for the `treeaudit` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "treeaudit",
    version,
    about = "Hierarchy and table integrity checks",
    long_about = "Runs a catalogue of data-integrity rules against a dataset snapshot.\n\
                  Checks materialized-path hierarchies for missing levels and owner\n\
                  consistency, and flat tables for duplicates, nulls and format faults."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Suppress everything but errors and failing rules (incompatible with
    /// `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show passing rules, timing, and debug logs (incompatible with
    /// `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `TREEAUDIT_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "TREEAUDIT_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Disable ANSI color codes in human output and logs.
    ///
    /// Also respects the `NO_COLOR` environment variable per
    /// <https://no-color.org>.
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}
