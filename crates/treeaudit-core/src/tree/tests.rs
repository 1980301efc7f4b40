#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use crate::test_helpers::{hierarchy_dataset, index, node, row};

#[test]
fn empty_node_list_is_empty_snapshot() {
    let err = TreeIndex::build(Vec::new()).expect_err("empty");
    assert!(matches!(err, AuditError::EmptySnapshot { .. }), "{err:?}");
}

#[test]
fn empty_dataset_error_names_the_dataset() {
    let ds = Dataset::new("documents", Vec::new());
    let err = TreeIndex::from_dataset(&ds, &NodeSchema::default()).expect_err("empty");
    assert_eq!(
        err,
        AuditError::EmptySnapshot {
            dataset: "documents".to_owned()
        }
    );
}

#[test]
fn duplicate_paths_are_rejected() {
    let err = TreeIndex::build(vec![node("/1/", "a"), node("/1/", "b")]).expect_err("dup");
    assert!(err.to_string().contains("more than once"), "{err}");
}

#[test]
fn groups_at_depth_include_prefixes_of_deeper_nodes() {
    let idx = index(&[("/", ""), ("/1/", "a"), ("/2/7/", "b")]);
    let depth1: Vec<&str> = idx.groups_at_depth(1).iter().map(String::as_str).collect();
    assert_eq!(depth1, vec!["/1/", "/2/"]);
    assert_eq!(idx.groups_at_depth(0).len(), 1);
    assert!(idx.groups_at_depth(5).is_empty());
}

#[test]
fn contains_only_reports_present_nodes() {
    let idx = index(&[("/", ""), ("/2/7/", "b")]);
    assert!(idx.contains("/2/7/"));
    assert!(!idx.contains("/2/"), "derived prefixes are not present nodes");
}

#[test]
fn owners_of_group_collects_direct_children_only() {
    let idx = index(&[
        ("/1/", "root-owner"),
        ("/1/1/", "a"),
        ("/1/2/", "b"),
        ("/1/2/1/", "deep"),
        ("/1/3/", ""),
    ]);
    let owners: Vec<String> = idx
        .owners_of_group("/1/")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(owners, vec!["a", "b"], "null owners are skipped");
    assert!(idx.owners_of_group("/9/").is_empty());
}

#[test]
fn nodes_at_depth_and_max_depth() {
    let idx = index(&[("/", ""), ("/1/", "a"), ("/1/1/", "a"), ("/1/2/", "a")]);
    assert_eq!(idx.len(), 4);
    assert_eq!(idx.max_depth(), 2);
    assert_eq!(idx.nodes_at_depth(2).count(), 2);
    assert_eq!(idx.nodes_at_depth(9).count(), 0);
}

#[test]
fn schema_extracts_owner_and_defaults_to_null() {
    let ds = Dataset::new(
        "docs",
        vec![
            row(&[("path", Value::from("/")), ("owner", Value::from(7_i64))]),
            row(&[("path", Value::from("/1/"))]),
        ],
    );
    let nodes = NodeSchema::default().extract(&ds).expect("extract");
    assert_eq!(nodes[0].owner, Value::Integer(7));
    assert!(nodes[1].owner.is_null());
}

#[test]
fn schema_rejects_inconsistent_level() {
    let ds = Dataset::new(
        "docs",
        vec![
            row(&[("node", Value::from("/1/1/")), ("lvl", Value::from(2_i64))]),
            row(&[("node", Value::from("/1/")), ("lvl", Value::from(2_i64))]),
        ],
    );
    let schema = NodeSchema {
        path_field: "node".to_owned(),
        level_field: Some("lvl".to_owned()),
        ..NodeSchema::default()
    };
    let err = schema.extract(&ds).expect_err("level mismatch");
    match err {
        AuditError::InvalidRow { row, detail, .. } => {
            assert_eq!(row, 1);
            assert!(detail.contains("depth 1"), "{detail}");
        }
        other => panic!("expected InvalidRow, got {other:?}"),
    }
}

#[test]
fn schema_surfaces_malformed_paths() {
    let ds = hierarchy_dataset("docs", &[("/1/", "a"), ("/x/", "b")]);
    let err = TreeIndex::from_dataset(&ds, &NodeSchema::default()).expect_err("bad path");
    assert!(matches!(err, AuditError::InvalidPath { .. }), "{err:?}");
}
