//! Synthetic snapshot generator.
//!
//! Produces a `document` hierarchy and an `address` table with tunable
//! fault rates, deterministically from a seed.

pub mod hierarchy;
pub mod table;

use rand::SeedableRng;
use rand::rngs::StdRng;
use treeaudit_core::{Dataset, Snapshot};

/// Name of the generated hierarchy dataset.
pub const HIERARCHY_DATASET: &str = "document";

/// Name of the generated flat table.
pub const TABLE_DATASET: &str = "address";

/// Configuration for the snapshot generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Depth of the deepest node below the root.
    pub depth: usize,
    /// Children per internal node.
    pub branching_factor: usize,
    /// Probability that an internal node below the root is dropped,
    /// orphaning its children (0.0-1.0).
    pub orphan_rate: f64,
    /// Probability that a depth-1 group gets one member with a foreign
    /// owner (0.0-1.0).
    pub contamination_rate: f64,
    /// Rows in the flat table before duplicates are added.
    pub table_rows: usize,
    /// Probability that a table row is followed by a copy of an earlier row
    /// (0.0-1.0).
    pub duplicate_rate: f64,
    /// Probability that a nullable table column is null (0.0-1.0).
    pub null_rate: f64,
}

impl GeneratorConfig {
    /// Returns this configuration with every fault rate set to `rate`.
    #[must_use]
    pub fn with_faults(mut self, rate: f64) -> Self {
        self.orphan_rate = rate;
        self.contamination_rate = rate;
        self.duplicate_rate = rate;
        self.null_rate = rate;
        self
    }
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// ~85 tree nodes, 200 table rows
    Small,
    /// ~1.5K tree nodes, 2K table rows
    Medium,
    /// ~20K tree nodes, 20K table rows
    Large,
    /// ~111K tree nodes, 100K table rows
    XLarge,
}

impl SizeTier {
    /// Returns the fault-free `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        let (depth, branching_factor, table_rows) = match self {
            SizeTier::Small => (3, 4, 200),
            SizeTier::Medium => (4, 6, 2_000),
            SizeTier::Large => (5, 7, 20_000),
            SizeTier::XLarge => (5, 10, 100_000),
        };
        GeneratorConfig {
            seed,
            depth,
            branching_factor,
            orphan_rate: 0.0,
            contamination_rate: 0.0,
            table_rows,
            duplicate_rate: 0.0,
            null_rate: 0.0,
        }
    }
}

/// Generates both datasets and wraps them in a [`Snapshot`].
///
/// All randomness is deterministic, seeded from `config.seed`.
pub fn generate_snapshot(config: &GeneratorConfig) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let tree = hierarchy::build_hierarchy(config, &mut rng);
    let table = table::build_table(config, &mut rng);
    Snapshot::from_datasets([
        Dataset::new(HIERARCHY_DATASET, tree),
        Dataset::new(TABLE_DATASET, table),
    ])
}
