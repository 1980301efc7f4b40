//! Shared test helper functions for constructing fixtures.
//!
//! Compiled only in test builds. Integration tests under
//! `crates/treeaudit-core/tests/` define their own local helpers because they
//! link against the non-test library build where this module is absent.
#![allow(clippy::expect_used)]

use crate::path::MaterializedPath;
use crate::snapshot::{Dataset, Row, Snapshot};
use crate::tree::{Node, TreeIndex};
use crate::value::Value;

/// Builds a row from `(field, value)` pairs.
pub fn row(fields: &[(&str, Value)]) -> Row {
    fields
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

/// Parses a path under the default grammar, panicking on invalid input.
pub fn path(s: &str) -> MaterializedPath {
    MaterializedPath::try_from(s).expect("valid path")
}

/// Builds a node with a string owner.
pub fn node(p: &str, owner: &str) -> Node {
    Node::new(path(p), owner)
}

/// Builds an index from `(path, owner)` pairs. An empty owner string means
/// no owner.
pub fn index(entries: &[(&str, &str)]) -> TreeIndex {
    let nodes = entries
        .iter()
        .map(|(p, o)| {
            if o.is_empty() {
                Node::new(path(p), Value::Null)
            } else {
                node(p, o)
            }
        })
        .collect();
    TreeIndex::build(nodes).expect("valid index")
}

/// Builds a hierarchy dataset with `path` and `owner` fields.
pub fn hierarchy_dataset(name: &str, entries: &[(&str, &str)]) -> Dataset {
    let rows = entries
        .iter()
        .map(|(p, o)| row(&[("path", Value::from(*p)), ("owner", Value::from(*o))]))
        .collect();
    Dataset::new(name, rows)
}

/// Wraps datasets into a snapshot.
pub fn snapshot(datasets: Vec<Dataset>) -> Snapshot {
    Snapshot::from_datasets(datasets)
}
