//! Synthetic snapshot generator and benchmark utilities for treeaudit.
//!
//! This crate provides deterministic generation of hierarchy and table
//! datasets for benchmarking and property-style testing of `treeaudit-core`.

pub mod catalog;
pub mod generator;

pub use catalog::bench_catalog;
pub use generator::{GeneratorConfig, SizeTier, generate_snapshot};
