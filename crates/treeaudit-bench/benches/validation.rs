//! Validation benchmarks: index build, each hierarchy check, flat-table
//! checks, and the full engine sequential vs parallel.
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use treeaudit_bench::{SizeTier, bench_catalog, generate_snapshot};
use treeaudit_core::{
    NodeSchema, TreeIndex, duplicate_rows, missing_intermediate_levels, mixed_owner_groups,
    owner_collision_count,
};

const TIERS: [(&str, SizeTier); 4] = [
    ("S", SizeTier::Small),
    ("M", SizeTier::Medium),
    ("L", SizeTier::Large),
    ("XL", SizeTier::XLarge),
];

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy");
    let schema = NodeSchema::default();

    for (name, tier) in TIERS {
        let snapshot = generate_snapshot(&tier.config(42).with_faults(0.01));
        let tree = snapshot.dataset("document").expect("tree dataset");
        group.throughput(Throughput::Elements(tree.len() as u64));

        group.bench_with_input(BenchmarkId::new("index_build", name), tree, |b, tree| {
            b.iter(|| TreeIndex::from_dataset(black_box(tree), &schema).expect("index"));
        });

        let index = TreeIndex::from_dataset(tree, &schema).expect("index");
        group.bench_with_input(BenchmarkId::new("missing_levels", name), &index, |b, index| {
            b.iter(|| missing_intermediate_levels(black_box(index)).expect("measure"));
        });
        group.bench_with_input(BenchmarkId::new("mixed_owners", name), &index, |b, index| {
            b.iter(|| mixed_owner_groups(black_box(index), 1));
        });
        group.bench_with_input(BenchmarkId::new("owner_collisions", name), &index, |b, index| {
            b.iter(|| owner_collision_count(black_box(index), 1).expect("measure"));
        });
    }
    group.finish();
}

fn bench_flat(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat");
    let keys: Vec<String> = treeaudit_bench::generator::table::KEY_FIELDS
        .iter()
        .map(|k| (*k).to_owned())
        .collect();

    for (name, tier) in TIERS {
        let snapshot = generate_snapshot(&tier.config(42).with_faults(0.01));
        let table = snapshot.dataset("address").expect("table dataset");
        group.throughput(Throughput::Elements(table.len() as u64));

        group.bench_with_input(BenchmarkId::new("duplicate_rows", name), table, |b, table| {
            b.iter(|| duplicate_rows(black_box(table), &keys));
        });
    }
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    let engine = bench_catalog()
        .expect("catalogue")
        .build_engine()
        .expect("engine");

    for (name, tier) in TIERS {
        let snapshot = generate_snapshot(&tier.config(42).with_faults(0.01));
        group.throughput(Throughput::Elements(snapshot.row_count() as u64));

        group.bench_with_input(BenchmarkId::new("sequential", name), &snapshot, |b, s| {
            b.iter(|| engine.evaluate(black_box(s)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", name), &snapshot, |b, s| {
            b.iter(|| engine.evaluate_parallel(black_box(s)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hierarchy, bench_flat, bench_engine);
criterion_main!(benches);
