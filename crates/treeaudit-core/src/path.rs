//! Materialized-path codec.
//!
//! A materialized path encodes a node's full ancestor chain as
//! delimiter-separated positive integers: `/` is the root (depth 0), `/1/` a
//! depth-1 node, `/1/4/` its child at depth 2, and so on. Every path starts
//! and ends with `/`, segments carry no leading zeros, and each segment is at
//! most [`PathGrammar::max_segment_digits`] digits wide.
//!
//! Parsing happens once, at construction of a [`MaterializedPath`]; every
//! accessor afterwards is infallible except [`MaterializedPath::prefix`], which
//! rejects depths beyond the path itself.
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::AuditError;

/// Separator between path segments.
pub const DELIMITER: char = '/';

/// Default per-segment digit width. Nine digits always fit a `u64`.
pub const DEFAULT_MAX_SEGMENT_DIGITS: usize = 9;

/// Widest segment a `u64` can hold without overflow checks failing.
const MAX_REPRESENTABLE_DIGITS: usize = 19;

// The pattern is a literal and always compiles; the fallback chain exists only
// because the workspace bans `expect`/`unwrap`.
static SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:[1-9][0-9]*/)*$").unwrap_or_else(|_| {
        Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
    })
});

// ---------------------------------------------------------------------------
// PathGrammar
// ---------------------------------------------------------------------------

/// The segment grammar a path must satisfy.
///
/// The shape (leading/trailing delimiter, positive integers without leading
/// zeros) is fixed; only the per-segment digit width is configurable. A width
/// of `1` reproduces single-digit trees such as `/1/`..`/9/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathGrammar {
    max_segment_digits: usize,
}

impl Default for PathGrammar {
    fn default() -> Self {
        Self {
            max_segment_digits: DEFAULT_MAX_SEGMENT_DIGITS,
        }
    }
}

impl PathGrammar {
    /// Creates a grammar accepting segments of up to `max_segment_digits`
    /// digits.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidCatalog`] when the width is zero or too
    /// wide to be represented as a `u64`.
    pub fn new(max_segment_digits: usize) -> Result<Self, AuditError> {
        if max_segment_digits == 0 || max_segment_digits > MAX_REPRESENTABLE_DIGITS {
            return Err(AuditError::InvalidCatalog {
                detail: format!(
                    "max_segment_digits must be between 1 and {MAX_REPRESENTABLE_DIGITS}, got {max_segment_digits}"
                ),
            });
        }
        Ok(Self { max_segment_digits })
    }

    /// Returns the maximum number of digits accepted per segment.
    pub fn max_segment_digits(&self) -> usize {
        self.max_segment_digits
    }

    /// Parses `s` into a [`MaterializedPath`].
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidPath`] when `s` does not match the
    /// grammar.
    pub fn parse(&self, s: &str) -> Result<MaterializedPath, AuditError> {
        if !SHAPE_RE.is_match(s) {
            return Err(AuditError::invalid_path(
                s,
                "expected `/` or `/N/.../N/` with positive integer segments",
            ));
        }

        let mut segments = Vec::new();
        for token in s.split(DELIMITER).filter(|t| !t.is_empty()) {
            if token.len() > self.max_segment_digits {
                return Err(AuditError::invalid_path(
                    s,
                    format!(
                        "segment {token:?} exceeds {} digit(s)",
                        self.max_segment_digits
                    ),
                ));
            }
            let value = token
                .parse::<u64>()
                .map_err(|e| AuditError::invalid_path(s, format!("segment {token:?}: {e}")))?;
            segments.push(value);
        }

        Ok(MaterializedPath {
            text: s.to_owned(),
            segments,
        })
    }
}

// ---------------------------------------------------------------------------
// MaterializedPath
// ---------------------------------------------------------------------------

/// A validated materialized path.
///
/// Equality, ordering, and hashing follow the path text, which is canonical
/// for a given grammar (no leading zeros, mandatory delimiters).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterializedPath {
    text: String,
    segments: Vec<u64>,
}

impl MaterializedPath {
    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            text: DELIMITER.to_string(),
            segments: Vec::new(),
        }
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The ordered segment tokens.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The canonical path text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The ancestor prefix at depth `d` as a string slice of this path.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidPath`] when `d > self.depth()`.
    pub fn prefix_str(&self, d: usize) -> Result<&str, AuditError> {
        if d > self.depth() {
            return Err(AuditError::invalid_path(
                &self.text,
                format!("prefix depth {d} exceeds path depth {}", self.depth()),
            ));
        }
        let end = self
            .text
            .match_indices(DELIMITER)
            .nth(d)
            .map_or(self.text.len(), |(i, _)| i + 1);
        Ok(&self.text[..end])
    }

    /// The ancestor at depth `d`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidPath`] when `d > self.depth()`.
    pub fn prefix(&self, d: usize) -> Result<Self, AuditError> {
        let text = self.prefix_str(d)?.to_owned();
        Ok(Self {
            text,
            segments: self.segments[..d].to_vec(),
        })
    }

    /// The immediate parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        match self.depth() {
            0 => None,
            d => self.prefix(d - 1).ok(),
        }
    }
}

impl TryFrom<&str> for MaterializedPath {
    type Error = AuditError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PathGrammar::default().parse(s)
    }
}

impl AsRef<str> for MaterializedPath {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for MaterializedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for MaterializedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

// ---------------------------------------------------------------------------
// Free functions over the default grammar
// ---------------------------------------------------------------------------

/// Number of hierarchy segments in `path`.
///
/// # Errors
///
/// Returns [`AuditError::InvalidPath`] if `path` is malformed.
pub fn depth(path: &str) -> Result<usize, AuditError> {
    Ok(MaterializedPath::try_from(path)?.depth())
}

/// The ancestor of `path` truncated to depth `d`.
///
/// # Errors
///
/// Returns [`AuditError::InvalidPath`] if `path` is malformed or `d` exceeds
/// its depth.
pub fn prefix(path: &str, d: usize) -> Result<String, AuditError> {
    Ok(MaterializedPath::try_from(path)?.prefix_str(d)?.to_owned())
}

/// The ordered segment tokens of `path`.
///
/// # Errors
///
/// Returns [`AuditError::InvalidPath`] if `path` is malformed.
pub fn segments(path: &str) -> Result<Vec<u64>, AuditError> {
    Ok(MaterializedPath::try_from(path)?.segments)
}
