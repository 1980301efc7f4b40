//! JSON snapshot documents as a [`DataSource`].
//!
//! A snapshot document is one JSON object mapping dataset names to arrays of
//! flat row objects:
//!
//! ```json
//! { "address": [ { "AddressID": 1, "City": "Bothell" } ], "document": [] }
//! ```
//!
//! The document is checked for that outer shape when it is parsed. Rows are
//! decoded lazily, per fetched dataset, so a malformed dataset that no rule
//! selects never stops a run.
use std::collections::BTreeMap;

use serde::Deserialize as _;
use treeaudit_core::{AuditError, Connection, DataSource, Row, Selector};

use crate::error::CliError;

/// A parsed snapshot document.
#[derive(Debug)]
pub struct JsonSnapshotSource {
    label: String,
    datasets: BTreeMap<String, serde_json::Value>,
}

impl JsonSnapshotSource {
    /// Parses `content` read from `label` (a path or `-`).
    ///
    /// # Errors
    ///
    /// Returns [`CliError::ParseFailed`] when the content is not JSON or its
    /// top level is not an object.
    pub fn parse(label: impl Into<String>, content: &str) -> Result<Self, CliError> {
        let label = label.into();
        let datasets: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| CliError::ParseFailed {
                source: label.clone(),
                detail: format!("line {}, column {}: {e}", e.line(), e.column()),
            })?;
        Ok(Self { label, datasets })
    }
}

impl DataSource for JsonSnapshotSource {
    fn describe(&self) -> String {
        format!("json snapshot {}", self.label)
    }

    fn open(&self) -> Result<Box<dyn Connection + '_>, AuditError> {
        Ok(Box::new(JsonConnection { source: self }))
    }
}

struct JsonConnection<'a> {
    source: &'a JsonSnapshotSource,
}

impl Connection for JsonConnection<'_> {
    fn fetch(&mut self, selector: &Selector) -> Result<Vec<Row>, AuditError> {
        let name = selector.dataset();
        let value = self
            .source
            .datasets
            .get(name)
            .ok_or_else(|| AuditError::MissingDataset {
                name: name.to_owned(),
            })?;
        let Some(items) = value.as_array() else {
            return Err(AuditError::AdapterUnavailable {
                detail: format!("dataset {name:?} in {} is not an array", self.source.label),
            });
        };
        items
            .iter()
            .enumerate()
            .map(|(row, item)| {
                Row::deserialize(item).map_err(|e| AuditError::InvalidRow {
                    dataset: name.to_owned(),
                    row,
                    detail: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use treeaudit_core::{Snapshot, Value};

    use super::*;

    const DOC: &str = r#"{
        "document": [
            {"DocumentNode": "/", "Owner": 217},
            {"DocumentNode": "/1/", "Owner": null}
        ],
        "broken": {"not": "rows"},
        "bad_rows": [{"ok": 1}, [1, 2]]
    }"#;

    fn source() -> JsonSnapshotSource {
        JsonSnapshotSource::parse("snapshot.json", DOC).expect("document parses")
    }

    #[test]
    fn fetch_decodes_rows() {
        let src = source();
        let mut conn = src.open().expect("open");
        let rows = conn.fetch(&Selector::new("document")).expect("fetch");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Owner"), Some(&Value::Integer(217)));
        assert_eq!(rows[1].get("Owner"), Some(&Value::Null));
    }

    #[test]
    fn unknown_dataset_is_missing() {
        let src = source();
        let mut conn = src.open().expect("open");
        let err = conn
            .fetch(&Selector::new("address"))
            .expect_err("not in document");
        assert_eq!(
            err,
            AuditError::MissingDataset {
                name: "address".to_owned()
            }
        );
    }

    #[test]
    fn non_array_dataset_is_an_adapter_fault() {
        let src = source();
        let mut conn = src.open().expect("open");
        let err = conn.fetch(&Selector::new("broken")).expect_err("object");
        assert!(matches!(err, AuditError::AdapterUnavailable { .. }), "{err:?}");
    }

    #[test]
    fn malformed_row_reports_its_index() {
        let src = source();
        let mut conn = src.open().expect("open");
        let err = conn.fetch(&Selector::new("bad_rows")).expect_err("array row");
        match err {
            AuditError::InvalidRow { dataset, row, .. } => {
                assert_eq!(dataset, "bad_rows");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidRow, got {other:?}"),
        }
    }

    #[test]
    fn unselected_bad_datasets_do_not_block_a_load() {
        let snapshot =
            Snapshot::load(&source(), &[Selector::new("document")]).expect("load document only");
        assert_eq!(snapshot.row_count(), 2);
    }

    #[test]
    fn non_object_document_fails_to_parse() {
        let err = JsonSnapshotSource::parse("-", "[1, 2, 3]").expect_err("array document");
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("line 1"), "{}", err.message());
    }
}
