#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod flat;
pub mod hierarchy;
pub mod path;
pub mod snapshot;
pub mod source;
pub mod tree;
pub mod value;

#[cfg(test)]
mod test_helpers;

pub use catalog::{
    Catalog, CheckDefinition, DuplicateRowsParams, ForbiddenNullsParams, FormatParams,
    HierarchyParams, PredicateKind, RuleDefinition,
};
pub use engine::{
    Measurement, Metric, Offender, Rule, RuleEngine, RuleResult, Status, Summary,
    ValidationReport,
};
pub use error::AuditError;
pub use flat::{
    DuplicateRows, ForbiddenNulls, FormatPredicate, FormatViolation, duplicate_rows,
    forbidden_nulls, format_violations,
};
pub use hierarchy::{
    DEFAULT_GROUP_DEPTH, HierarchyCheck, HierarchyCheckKind, missing_intermediate_levels,
    mixed_owner_groups, owner_collision_count,
};
pub use path::{MaterializedPath, PathGrammar};
pub use snapshot::{Dataset, Row, Snapshot};
pub use source::{Connection, DataSource, MemorySource, Selector};
pub use tree::{Node, NodeSchema, TreeIndex};
pub use value::{Value, ValueKey};

/// Returns the current version of the treeaudit-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
