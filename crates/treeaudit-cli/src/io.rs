//! Bounded reads of catalogue and snapshot inputs.
//!
//! Files and stdin go through the same capped reader: at most
//! `max_size + 1` bytes are pulled, so an oversized input is detected
//! without buffering it. Disk files are also rejected up front when their
//! metadata already reports a size over the limit.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::cli::PathOrStdin;
use crate::error::CliError;

/// Reads `source` as UTF-8 text of at most `max_size` bytes.
///
/// # Errors
///
/// Returns a [`CliError`] with exit code 2 when the input cannot be opened,
/// exceeds `max_size`, fails mid-read, or is not valid UTF-8.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    let label = source.to_string();
    let bytes = match source {
        PathOrStdin::Path(path) => {
            let file = File::open(path).map_err(|e| open_failed(path, &e))?;
            let declared = file.metadata().ok().map(|m| m.len());
            if let Some(actual) = declared.filter(|&len| len > max_size) {
                return Err(CliError::FileTooLarge {
                    source: label,
                    limit: max_size,
                    actual: Some(actual),
                });
            }
            read_capped(file, max_size, &label)?
        }
        PathOrStdin::Stdin => read_capped(std::io::stdin().lock(), max_size, &label)?,
    };
    String::from_utf8(bytes).map_err(|e| CliError::InvalidUtf8 {
        source: label,
        byte_offset: e.utf8_error().valid_up_to(),
    })
}

/// Drains `reader`, failing once it yields more than `max_size` bytes.
fn read_capped(reader: impl Read, max_size: u64, label: &str) -> Result<Vec<u8>, CliError> {
    let mut buf = Vec::new();
    reader
        .take(max_size.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|e| {
            if label == "-" {
                CliError::StdinReadError {
                    detail: e.to_string(),
                }
            } else {
                CliError::IoError {
                    source: label.to_owned(),
                    detail: e.to_string(),
                }
            }
        })?;
    if buf.len() as u64 > max_size {
        return Err(CliError::FileTooLarge {
            source: label.to_owned(),
            limit: max_size,
            actual: None,
        });
    }
    Ok(buf)
}

fn open_failed(path: &Path, e: &std::io::Error) -> CliError {
    let kind = e.kind();
    if kind == std::io::ErrorKind::NotFound {
        CliError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else if kind == std::io::ErrorKind::PermissionDenied {
        CliError::PermissionDenied {
            path: path.to_path_buf(),
        }
    } else {
        CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        }
    }
}
