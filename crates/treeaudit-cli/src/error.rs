//! CLI error types with associated exit codes.
//!
//! [`CliError`] is the top-level error type for the `treeaudit` binary. Every
//! variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
//!
//! - Exit code **2**: input failure. The tool could not read the inputs, the
//!   catalogue is malformed, or the snapshot could not be loaded. No rule has
//!   been evaluated.
//! - Exit code **1**: logical failure. Every rule ran and the report has been
//!   written, but at least one rule failed or errored.
use std::fmt;
use std::path::PathBuf;

use treeaudit_core::AuditError;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `treeaudit` CLI can produce.
///
/// Use [`CliError::exit_code`] to obtain the exit code associated with each
/// variant. [`CliError::message`] returns the human-readable error string
/// that should be printed to stderr before exiting.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// A human-readable label for the source (`"-"` for stdin, or the
        /// filesystem path).
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes, if known (disk files only).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// A human-readable label for the source.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// More than one input was requested from stdin.
    MultipleStdin,

    /// An input is not valid JSON of the expected shape.
    ParseFailed {
        /// A human-readable label for the source.
        source: String,
        /// Parser message including line and column.
        detail: String,
    },

    /// The catalogue could not be turned into an engine.
    Catalog(AuditError),

    /// The snapshot could not be loaded from its source.
    Load(AuditError),

    // --- Exit code 1: logical failures ---
    /// At least one rule failed or errored.
    ///
    /// The report has already been printed; this variant exists so `main`
    /// can exit with status 1 cleanly.
    ChecksFailed {
        /// Rules whose metric differed from the expectation.
        failed: usize,
        /// Rules that could not compute their metric.
        errored: usize,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2`: input failure (file not found, parse error, bad catalogue).
    /// - `1`: logical failure (a rule failed or errored).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::MultipleStdin
            | Self::ParseFailed { .. }
            | Self::Catalog(_)
            | Self::Load(_) => 2,

            Self::ChecksFailed { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::MultipleStdin => {
                "error: at most one input may be read from stdin (`-`)".to_owned()
            }
            Self::ParseFailed { source, detail } => {
                format!("error: failed to parse {source}: {detail}")
            }
            Self::Catalog(e) => format!("error: {e}"),
            Self::Load(e) => format!("error: snapshot load failed: {e}"),
            Self::ChecksFailed { failed, errored } => {
                format!("error: {failed} rule(s) failed, {errored} rule(s) errored")
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::path::PathBuf;

    use super::*;

    // ── exit_code ────────────────────────────────────────────────────────────

    #[test]
    fn file_not_found_is_exit_2() {
        let e = CliError::FileNotFound {
            path: PathBuf::from("rules.json"),
        };
        assert_eq!(e.exit_code(), 2);
    }

    #[test]
    fn file_too_large_is_exit_2() {
        let e = CliError::FileTooLarge {
            source: "big.json".to_owned(),
            limit: 1024,
            actual: Some(2048),
        };
        assert_eq!(e.exit_code(), 2);
    }

    #[test]
    fn catalogue_and_load_errors_are_exit_2() {
        let catalog = CliError::Catalog(AuditError::DuplicateRuleName {
            name: "r".to_owned(),
        });
        let load = CliError::Load(AuditError::AdapterUnavailable {
            detail: "gone".to_owned(),
        });
        assert_eq!(catalog.exit_code(), 2);
        assert_eq!(load.exit_code(), 2);
        assert_eq!(CliError::MultipleStdin.exit_code(), 2);
    }

    #[test]
    fn checks_failed_is_exit_1() {
        let e = CliError::ChecksFailed {
            failed: 2,
            errored: 1,
        };
        assert_eq!(e.exit_code(), 1);
    }

    // ── message content ──────────────────────────────────────────────────────

    #[test]
    fn file_not_found_message_contains_path() {
        let e = CliError::FileNotFound {
            path: PathBuf::from("snapshot.json"),
        };
        let msg = e.message();
        assert!(msg.contains("snapshot.json"), "message: {msg}");
        assert!(msg.contains("not found"), "message: {msg}");
    }

    #[test]
    fn file_too_large_without_actual_mentions_limit() {
        let e = CliError::FileTooLarge {
            source: "-".to_owned(),
            limit: 512,
            actual: None,
        };
        let msg = e.message();
        assert!(msg.contains("512"), "message: {msg}");
    }

    #[test]
    fn load_message_names_the_missing_dataset() {
        let e = CliError::Load(AuditError::MissingDataset {
            name: "document".to_owned(),
        });
        let msg = e.message();
        assert!(msg.contains("document"), "message: {msg}");
        assert!(msg.starts_with("error:"), "message: {msg}");
    }

    #[test]
    fn checks_failed_message_has_counts() {
        let msg = CliError::ChecksFailed {
            failed: 3,
            errored: 0,
        }
        .message();
        assert!(msg.contains("3 rule(s) failed"), "message: {msg}");
    }

    #[test]
    fn display_matches_message() {
        let e = CliError::MultipleStdin;
        assert_eq!(format!("{e}"), e.message());
    }
}
