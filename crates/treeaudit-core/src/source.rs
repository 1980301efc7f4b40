//! Data-source adapter interface.
//!
//! The engine never talks to a database, a file, or the network. Callers
//! inject a [`DataSource`] that knows how to acquire a [`Connection`] and
//! fetch rows for a [`Selector`]. `treeaudit-core` ships [`MemorySource`];
//! the CLI wires in a JSON-file-backed implementation.
//!
//! Connection lifetime is scoped: [`crate::Snapshot::load`] opens exactly one
//! connection per evaluation run and drops it on every exit path, including a
//! failed fetch. Implementations release their resources in `Drop`.
use std::collections::BTreeMap;
use std::fmt;

use crate::error::AuditError;
use crate::snapshot::Row;

/// Names the dataset an adapter should fetch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector {
    dataset: String,
}

impl Selector {
    /// Creates a selector for the named dataset.
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
        }
    }

    /// The dataset name this selector targets.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dataset)
    }
}

/// An open, read-only session against a data source.
///
/// Dropping the connection releases it.
pub trait Connection {
    /// Fetch every row of the selected dataset.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::AdapterUnavailable`] on connectivity loss and
    /// [`AuditError::MissingDataset`] when the selector names nothing the
    /// source knows about.
    fn fetch(&mut self, selector: &Selector) -> Result<Vec<Row>, AuditError>;
}

/// A provider of read-only connections.
///
/// The trait is object-safe; the engine accepts `&dyn DataSource`.
pub trait DataSource {
    /// Human-readable label used in log events.
    fn describe(&self) -> String;

    /// Acquire a connection.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::AdapterUnavailable`] when no connection can be
    /// established.
    fn open(&self) -> Result<Box<dyn Connection + '_>, AuditError>;
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// A [`DataSource`] serving datasets held in memory.
///
/// Used by tests and by embedders that already hold their rows.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    datasets: BTreeMap<String, Vec<Row>>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a dataset.
    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.datasets.insert(name.into(), rows);
        self
    }
}

impl DataSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} dataset(s))", self.datasets.len())
    }

    fn open(&self) -> Result<Box<dyn Connection + '_>, AuditError> {
        Ok(Box::new(MemoryConnection { source: self }))
    }
}

struct MemoryConnection<'a> {
    source: &'a MemorySource,
}

impl Connection for MemoryConnection<'_> {
    fn fetch(&mut self, selector: &Selector) -> Result<Vec<Row>, AuditError> {
        self.source
            .datasets
            .get(selector.dataset())
            .cloned()
            .ok_or_else(|| AuditError::MissingDataset {
                name: selector.dataset().to_owned(),
            })
    }
}
