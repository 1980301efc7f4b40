//! Tree index over a snapshot of materialized-path nodes.
//!
//! [`TreeIndex::build`] makes one pass over the nodes and records, per depth,
//! which nodes are present and which ancestor prefixes are observed, plus the
//! owners of each group's direct children. Hierarchy checks then answer every
//! membership question from these sets without rescanning the nodes.
use std::collections::{BTreeSet, HashMap};

use crate::error::AuditError;
use crate::path::{MaterializedPath, PathGrammar};
use crate::snapshot::Dataset;
use crate::value::Value;

static NO_PREFIXES: BTreeSet<String> = BTreeSet::new();
static NO_OWNERS: BTreeSet<Value> = BTreeSet::new();

/// One row of a hierarchical dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Position in the tree.
    pub path: MaterializedPath,
    /// Opaque attribute compared for equality. `Value::Null` means "no owner"
    /// and is left out of every owner set.
    pub owner: Value,
}

impl Node {
    /// Creates a node.
    pub fn new(path: MaterializedPath, owner: impl Into<Value>) -> Self {
        Self {
            path,
            owner: owner.into(),
        }
    }

    /// Depth of the node's path.
    pub fn depth(&self) -> usize {
        self.path.depth()
    }
}

// ---------------------------------------------------------------------------
// NodeSchema
// ---------------------------------------------------------------------------

/// Which dataset fields hold a node's path, owner, and optional level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSchema {
    /// Field holding the materialized path string.
    pub path_field: String,
    /// Field holding the owner value.
    pub owner_field: String,
    /// Field holding an explicit level, cross-checked against the path depth.
    pub level_field: Option<String>,
    /// Segment grammar paths must satisfy.
    pub grammar: PathGrammar,
}

impl Default for NodeSchema {
    fn default() -> Self {
        Self {
            path_field: "path".to_owned(),
            owner_field: "owner".to_owned(),
            level_field: None,
            grammar: PathGrammar::default(),
        }
    }
}

impl NodeSchema {
    /// Decodes every row of `dataset` into a [`Node`].
    ///
    /// # Errors
    ///
    /// - [`AuditError::InvalidRow`] when the path field is missing or not a
    ///   string, or the level field disagrees with the path depth.
    /// - [`AuditError::InvalidPath`] when a path violates the grammar.
    pub fn extract(&self, dataset: &Dataset) -> Result<Vec<Node>, AuditError> {
        let mut nodes = Vec::with_capacity(dataset.len());
        for (index, row) in dataset.rows().iter().enumerate() {
            let raw = dataset.require_str(index, row, &self.path_field)?;
            let path = self.grammar.parse(raw)?;

            if let Some(level_field) = &self.level_field {
                let level = row.get(level_field).and_then(Value::as_i64);
                let consistent = level
                    .and_then(|l| usize::try_from(l).ok())
                    .is_some_and(|l| l == path.depth());
                if !consistent {
                    return Err(dataset.invalid_row(
                        index,
                        format!(
                            "level field {level_field:?} is {} but path {path} has depth {}",
                            row.get(level_field).map_or_else(|| "absent".to_owned(), ToString::to_string),
                            path.depth()
                        ),
                    ));
                }
            }

            let owner = row.get(&self.owner_field).cloned().unwrap_or(Value::Null);
            nodes.push(Node { path, owner });
        }
        Ok(nodes)
    }
}

// ---------------------------------------------------------------------------
// TreeIndex
// ---------------------------------------------------------------------------

/// Lookup structures over one immutable set of nodes.
#[derive(Debug, Clone)]
pub struct TreeIndex {
    nodes: Vec<Node>,
    /// Path text → index into `nodes`.
    by_path: HashMap<String, usize>,
    /// Node indices per depth.
    by_depth: Vec<Vec<usize>>,
    /// Per depth `d`, the depth-`d` prefixes of every node with depth ≥ `d`.
    groups: Vec<BTreeSet<String>>,
    /// Group prefix → non-null owners of its direct children.
    child_owners: HashMap<String, BTreeSet<Value>>,
}

impl TreeIndex {
    /// Builds the index.
    ///
    /// # Errors
    ///
    /// - [`AuditError::EmptySnapshot`] when `nodes` is empty.
    /// - [`AuditError::InvalidPath`] when two nodes share a path.
    pub fn build(nodes: Vec<Node>) -> Result<Self, AuditError> {
        if nodes.is_empty() {
            return Err(AuditError::EmptySnapshot {
                dataset: "<nodes>".to_owned(),
            });
        }

        let max_depth = nodes.iter().map(Node::depth).max().unwrap_or(0);
        let mut by_path = HashMap::with_capacity(nodes.len());
        let mut by_depth = vec![Vec::new(); max_depth + 1];
        let mut groups = vec![BTreeSet::new(); max_depth + 1];
        let mut child_owners: HashMap<String, BTreeSet<Value>> = HashMap::new();

        for (i, node) in nodes.iter().enumerate() {
            let key = node.path.as_str().to_owned();
            if by_path.insert(key, i).is_some() {
                return Err(AuditError::InvalidPath {
                    path: node.path.to_string(),
                    reason: "path appears more than once".to_owned(),
                });
            }

            let depth = node.depth();
            by_depth[depth].push(i);
            for (d, group) in groups.iter_mut().enumerate().take(depth + 1) {
                group.insert(node.path.prefix_str(d)?.to_owned());
            }

            if depth > 0 {
                let parent = node.path.prefix_str(depth - 1)?.to_owned();
                let owners = child_owners.entry(parent).or_default();
                if !node.owner.is_null() {
                    owners.insert(node.owner.clone());
                }
            }
        }

        Ok(Self {
            nodes,
            by_path,
            by_depth,
            groups,
            child_owners,
        })
    }

    /// Decodes `dataset` with `schema` and builds the index, naming the
    /// dataset in any [`AuditError::EmptySnapshot`].
    ///
    /// # Errors
    ///
    /// As [`NodeSchema::extract`] and [`TreeIndex::build`].
    pub fn from_dataset(dataset: &Dataset, schema: &NodeSchema) -> Result<Self, AuditError> {
        if dataset.is_empty() {
            return Err(AuditError::EmptySnapshot {
                dataset: dataset.name().to_owned(),
            });
        }
        Self::build(schema.extract(dataset)?)
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: an index is never built from zero nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Deepest node depth.
    pub fn max_depth(&self) -> usize {
        self.by_depth.len().saturating_sub(1)
    }

    /// All nodes in input order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Nodes whose depth is exactly `d`, in input order.
    pub fn nodes_at_depth(&self, d: usize) -> impl Iterator<Item = &Node> {
        self.by_depth
            .get(d)
            .into_iter()
            .flatten()
            .map(|&i| &self.nodes[i])
    }

    /// Returns `true` when a node with exactly this path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Depth-`d` prefixes observed among nodes with depth ≥ `d`.
    pub fn groups_at_depth(&self, d: usize) -> &BTreeSet<String> {
        self.groups.get(d).unwrap_or(&NO_PREFIXES)
    }

    /// Non-null owners among the direct children of `prefix`.
    pub fn owners_of_group(&self, prefix: &str) -> &BTreeSet<Value> {
        self.child_owners.get(prefix).unwrap_or(&NO_OWNERS)
    }
}

#[cfg(test)]
mod tests;
