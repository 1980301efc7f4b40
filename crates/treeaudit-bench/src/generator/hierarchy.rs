//! Materialized-path hierarchy rows.
//!
//! The tree is complete: every internal node has `branching_factor`
//! children down to `depth`. Each depth-1 subtree is owned by one owner.
//! Faults are injected afterwards: contaminated groups get one depth-2
//! member with a foreign owner, and dropped internal nodes leave their
//! children orphaned.

use rand::Rng;
use rand::rngs::StdRng;
use treeaudit_core::{Row, Value};

use super::GeneratorConfig;

/// Field holding the materialized path.
pub const PATH_FIELD: &str = "path";
/// Field holding the owner.
pub const OWNER_FIELD: &str = "owner";
/// Field holding the stored depth.
pub const LEVEL_FIELD: &str = "level";

/// Builds the hierarchy rows in breadth-first order.
pub fn build_hierarchy(config: &GeneratorConfig, rng: &mut StdRng) -> Vec<Row> {
    let mut rows = vec![node_row("/", 0, "root")];
    let mut frontier: Vec<(String, String)> = vec![("/".to_owned(), "root".to_owned())];
    let mut foreign = 0usize;

    for depth in 1..=config.depth {
        let mut next = Vec::with_capacity(frontier.len() * config.branching_factor);
        for (parent, parent_owner) in &frontier {
            let contaminated = (depth == 2
                && config.branching_factor > 0
                && chance(rng, config.contamination_rate))
                .then(|| rng.gen_range(1..=config.branching_factor));
            for i in 1..=config.branching_factor {
                let owner = if depth == 1 {
                    format!("owner-{i}")
                } else if contaminated == Some(i) {
                    foreign += 1;
                    format!("foreign-{foreign}")
                } else {
                    parent_owner.clone()
                };
                next.push((format!("{parent}{i}/"), owner));
            }
        }

        let internal = depth < config.depth;
        for (path, owner) in &next {
            if internal && chance(rng, config.orphan_rate) {
                continue;
            }
            rows.push(node_row(path, depth, owner));
        }
        frontier = next;
    }
    rows
}

fn node_row(path: &str, depth: usize, owner: &str) -> Row {
    let level = i64::try_from(depth).unwrap_or(i64::MAX);
    Row::from([
        (PATH_FIELD.to_owned(), Value::from(path)),
        (OWNER_FIELD.to_owned(), Value::from(owner)),
        (LEVEL_FIELD.to_owned(), Value::from(level)),
    ])
}

/// Draws `true` with probability `p`, clamped to `0.0..=1.0`.
pub(crate) fn chance(rng: &mut StdRng, p: f64) -> bool {
    rng.gen_bool(p.clamp(0.0, 1.0))
}
