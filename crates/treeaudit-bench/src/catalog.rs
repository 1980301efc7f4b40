//! The catalogue every benchmark and generator test evaluates.

use treeaudit_core::{AuditError, Catalog};

use crate::generator::hierarchy::{LEVEL_FIELD, OWNER_FIELD, PATH_FIELD};
use crate::generator::table::{KEY_FIELDS, NULLABLE_FIELD};
use crate::generator::{HIERARCHY_DATASET, TABLE_DATASET};

/// Builds a catalogue with one rule of every kind over the generated
/// datasets, all expecting zero.
///
/// # Errors
///
/// Only if the catalogue document itself is rejected, which would mean the
/// catalogue schema changed underneath this crate.
pub fn bench_catalog() -> Result<Catalog, AuditError> {
    let hierarchy = |name: &str, kind: &str| {
        serde_json::json!({
            "name": name,
            "kind": kind,
            "dataset": HIERARCHY_DATASET,
            "path_field": PATH_FIELD,
            "owner_field": OWNER_FIELD,
            "level_field": LEVEL_FIELD,
        })
    };
    let doc = serde_json::json!({
        "rules": [
            hierarchy("missing_levels", "missing_levels"),
            hierarchy("mixed_owners", "mixed_owners"),
            hierarchy("owner_collisions", "owner_collisions"),
            {
                "name": "duplicates",
                "kind": "duplicate_rows",
                "dataset": TABLE_DATASET,
                "keys": KEY_FIELDS,
            },
            {
                "name": "nulls",
                "kind": "forbidden_nulls",
                "dataset": TABLE_DATASET,
                "fields": [NULLABLE_FIELD],
            },
            {
                "name": "postal_format",
                "kind": "format",
                "dataset": TABLE_DATASET,
                "field": "PostalCode",
                "predicate": "pattern",
                "pattern": "[0-9]{5}",
            },
        ]
    });
    Catalog::from_json(&doc.to_string())
}
