//! Immutable dataset snapshots.
//!
//! A [`Snapshot`] is loaded once per evaluation run through a
//! [`DataSource`] and then only ever borrowed. It holds one or more named
//! [`Dataset`]s, each an ordered list of [`Row`]s.
use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::AuditError;
use crate::source::{DataSource, Selector};
use crate::value::Value;

/// One record: field name → scalar value. Absent fields read as null.
pub type Row = BTreeMap<String, Value>;

/// A named, ordered collection of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    rows: Vec<Row>,
}

impl Dataset {
    /// Creates a dataset from its rows.
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// The dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All rows in load order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reads a required string field from row `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidRow`] when the field is absent, null, or
    /// not a string.
    pub fn require_str<'r>(
        &self,
        index: usize,
        row: &'r Row,
        field: &str,
    ) -> Result<&'r str, AuditError> {
        match row.get(field) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(Value::Null) | None => {
                Err(self.invalid_row(index, format!("field {field:?} is null or absent")))
            }
            Some(other @ (Value::Bool(_) | Value::Integer(_) | Value::Float(_))) => Err(
                self.invalid_row(index, format!("field {field:?} must be a string, found {other}")),
            ),
        }
    }

    /// Builds an [`AuditError::InvalidRow`] for row `index` of this dataset.
    pub fn invalid_row(&self, index: usize, detail: impl Into<String>) -> AuditError {
        AuditError::InvalidRow {
            dataset: self.name.clone(),
            row: index,
            detail: detail.into(),
        }
    }
}

/// An immutable view of every dataset loaded for one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    datasets: BTreeMap<String, Dataset>,
}

impl Snapshot {
    /// Builds a snapshot from already materialised datasets.
    pub fn from_datasets(datasets: impl IntoIterator<Item = Dataset>) -> Self {
        Self {
            datasets: datasets
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }

    /// Loads every selected dataset through one scoped connection.
    ///
    /// The connection is dropped before this function returns, whether the
    /// load succeeded or not. A failed fetch aborts the whole load; no partial
    /// snapshot is returned.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's error unchanged, typically
    /// [`AuditError::AdapterUnavailable`] or [`AuditError::MissingDataset`].
    pub fn load(source: &dyn DataSource, selectors: &[Selector]) -> Result<Self, AuditError> {
        let label = source.describe();
        debug!(source = %label, selectors = selectors.len(), "opening connection");
        let mut conn = source.open()?;

        let mut datasets = BTreeMap::new();
        for selector in selectors {
            if datasets.contains_key(selector.dataset()) {
                continue;
            }
            let rows = conn.fetch(selector)?;
            debug!(dataset = %selector, rows = rows.len(), "fetched dataset");
            datasets.insert(
                selector.dataset().to_owned(),
                Dataset::new(selector.dataset(), rows),
            );
        }
        drop(conn);

        info!(source = %label, datasets = datasets.len(), "snapshot loaded");
        Ok(Self { datasets })
    }

    /// Looks up a dataset by name.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::MissingDataset`] when the snapshot does not hold
    /// a dataset called `name`.
    pub fn dataset(&self, name: &str) -> Result<&Dataset, AuditError> {
        self.datasets
            .get(name)
            .ok_or_else(|| AuditError::MissingDataset {
                name: name.to_owned(),
            })
    }

    /// Iterates datasets in name order.
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.values()
    }

    /// Total number of rows across all datasets.
    pub fn row_count(&self) -> usize {
        self.datasets.values().map(Dataset::len).sum()
    }
}
