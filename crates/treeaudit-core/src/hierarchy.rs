//! Structural checks over a materialized-path hierarchy.
//!
//! Three independent checks, each a pure function of a [`TreeIndex`]:
//!
//! - [`missing_intermediate_levels`]: nodes whose parent node is absent.
//! - [`mixed_owner_groups`]: groups whose members disagree on the owner.
//! - [`owner_collision_count`]: how far the group to owner mapping is from
//!   one to one.
//!
//! A *group* is a path prefix at the grouping depth `g`; its *members* are
//! the nodes at depth `g + 1` under it. Null owners never count as an owner.
//!
//! [`HierarchyCheck`] wraps any of the three as an engine [`Metric`] that
//! reads one dataset from the snapshot.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::engine::{Measurement, Metric, Offender};
use crate::error::AuditError;
use crate::snapshot::Snapshot;
use crate::tree::{NodeSchema, TreeIndex};
use crate::value::Value;

/// Grouping depth used when none is configured.
pub const DEFAULT_GROUP_DEPTH: usize = 1;

/// Counts nodes of depth ≥ 2 whose immediate parent node is not present.
///
/// Root and depth-1 nodes are exempt; the root itself may be absent. Each
/// orphan is reported once, with the missing parent path, in path order.
///
/// # Errors
///
/// Only if a stored path is inconsistent with its own depth, which a built
/// index rules out.
pub fn missing_intermediate_levels(index: &TreeIndex) -> Result<Measurement, AuditError> {
    let mut orphans = BTreeMap::new();
    for depth in 2..=index.max_depth() {
        for node in index.nodes_at_depth(depth) {
            let parent = node.path.prefix_str(depth - 1)?;
            if !index.contains(parent) {
                orphans.insert(node.path.as_str(), parent);
            }
        }
    }

    Ok(Measurement::from_offenders(
        orphans
            .into_iter()
            .map(|(path, parent)| Offender::OrphanNode {
                path: path.to_owned(),
                missing_parent: parent.to_owned(),
            })
            .collect(),
    ))
}

/// Counts groups at `group_depth` whose members carry more than one
/// distinct non-null owner.
pub fn mixed_owner_groups(index: &TreeIndex, group_depth: usize) -> Measurement {
    let offenders = index
        .groups_at_depth(group_depth)
        .iter()
        .filter_map(|group| {
            let owners = index.owners_of_group(group);
            (owners.len() > 1).then(|| Offender::MixedGroup {
                group: group.clone(),
                owners: owners.iter().map(ToString::to_string).collect(),
            })
        })
        .collect();
    Measurement::from_offenders(offenders)
}

/// `|groups − owners|` over the members at depth `group_depth + 1`, raised
/// to 1 when the counts agree but the mapping is still not one to one.
///
/// `groups` counts distinct member parents; `owners` counts distinct
/// non-null owners across all members combined. Two faults can cancel in
/// the difference (a group holding A and B next to a group holding B), so
/// the value is zero exactly when no offender is found.
///
/// The offenders list every owner held by more than one group, then every
/// group whose members hold more than one owner, then every group whose
/// members hold none.
///
/// # Errors
///
/// Only if a stored path is inconsistent with its own depth, which a built
/// index rules out.
pub fn owner_collision_count(
    index: &TreeIndex,
    group_depth: usize,
) -> Result<Measurement, AuditError> {
    let mut groups: BTreeSet<&str> = BTreeSet::new();
    let mut owned: BTreeSet<&str> = BTreeSet::new();
    let mut holders: BTreeMap<&Value, BTreeSet<&str>> = BTreeMap::new();

    for member in index.nodes_at_depth(group_depth + 1) {
        let group = member.path.prefix_str(group_depth)?;
        groups.insert(group);
        if !member.owner.is_null() {
            owned.insert(group);
            holders.entry(&member.owner).or_default().insert(group);
        }
    }

    let mut offenders: Vec<Offender> = holders
        .iter()
        .filter(|(_, held_by)| held_by.len() > 1)
        .map(|(owner, held_by)| Offender::SharedOwner {
            owner: owner.to_string(),
            groups: held_by.iter().map(|g| (*g).to_owned()).collect(),
        })
        .collect();
    offenders.extend(mixed_owner_groups(index, group_depth).offenders);
    offenders.extend(
        groups
            .difference(&owned)
            .map(|g| Offender::UnownedGroup {
                group: (*g).to_owned(),
            }),
    );

    let gap = groups.len().abs_diff(holders.len()) as u64;
    let actual = if offenders.is_empty() { 0 } else { gap.max(1) };
    debug!(
        group_depth,
        groups = groups.len(),
        owners = holders.len(),
        actual,
        "owner collision count"
    );

    Ok(Measurement { actual, offenders })
}

// ---------------------------------------------------------------------------
// Metric adapter
// ---------------------------------------------------------------------------

/// Which hierarchy check a [`HierarchyCheck`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyCheckKind {
    /// [`missing_intermediate_levels`].
    MissingLevels,
    /// [`mixed_owner_groups`].
    MixedOwners,
    /// [`owner_collision_count`].
    OwnerCollisions,
}

impl fmt::Display for HierarchyCheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLevels => f.write_str("missing_levels"),
            Self::MixedOwners => f.write_str("mixed_owners"),
            Self::OwnerCollisions => f.write_str("owner_collisions"),
        }
    }
}

/// A hierarchy check bound to one dataset of the snapshot.
///
/// The index is rebuilt on every call from the borrowed snapshot; nothing is
/// cached between runs.
#[derive(Debug, Clone)]
pub struct HierarchyCheck {
    dataset: String,
    kind: HierarchyCheckKind,
    schema: NodeSchema,
    group_depth: usize,
}

impl HierarchyCheck {
    /// Creates a check over `dataset` with the default schema and grouping
    /// depth.
    pub fn new(dataset: impl Into<String>, kind: HierarchyCheckKind) -> Self {
        Self {
            dataset: dataset.into(),
            kind,
            schema: NodeSchema::default(),
            group_depth: DEFAULT_GROUP_DEPTH,
        }
    }

    /// Replaces the field mapping and path grammar.
    #[must_use]
    pub fn with_schema(mut self, schema: NodeSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the grouping depth used by the owner checks.
    #[must_use]
    pub fn with_group_depth(mut self, group_depth: usize) -> Self {
        self.group_depth = group_depth;
        self
    }

    /// The check this metric runs.
    pub fn kind(&self) -> HierarchyCheckKind {
        self.kind
    }
}

impl Metric for HierarchyCheck {
    fn measure(&self, snapshot: &Snapshot) -> Result<Measurement, AuditError> {
        let dataset = snapshot.dataset(&self.dataset)?;
        let index = TreeIndex::from_dataset(dataset, &self.schema)?;
        debug!(
            dataset = %self.dataset,
            check = %self.kind,
            nodes = index.len(),
            max_depth = index.max_depth(),
            "tree index built"
        );
        match self.kind {
            HierarchyCheckKind::MissingLevels => missing_intermediate_levels(&index),
            HierarchyCheckKind::MixedOwners => Ok(mixed_owner_groups(&index, self.group_depth)),
            HierarchyCheckKind::OwnerCollisions => owner_collision_count(&index, self.group_depth),
        }
    }

    fn datasets(&self) -> Vec<String> {
        vec![self.dataset.clone()]
    }
}
