//! FIB performance benchmarks
//!
//! Benchmarks for the forwarding-table hot paths:
//! - Next hop insertion and cost updates
//! - Longest-prefix match
//! - Pending-Interest redistribution over a populated subtree
//!
//! Run with: cargo bench -p nfwd-table

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;

use nfwd_core::{Face, Interest, MockFace, Name};
use nfwd_table::NameTree;

// ============================================================================
// Helper Functions
// ============================================================================

fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap()
}

fn make_face(id: u64) -> Arc<dyn Face> {
    Arc::new(MockFace::new(id))
}

fn populated_tree(prefixes: usize, pending_per_prefix: usize) -> NameTree {
    let mut tree = NameTree::new();
    let face = make_face(1);
    for p in 0..prefixes {
        let prefix = name(&format!("/bench/p{}", p));
        tree.add_or_update_next_hop(&prefix, &face, 0, p as u64);
        for i in 0..pending_per_prefix {
            tree.pit_insert(Interest::new(prefix.clone().append(format!("i{}", i).as_str())));
        }
    }
    tree
}

// ============================================================================
// Next Hop Benchmarks
// ============================================================================

fn bench_next_hops(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_hops");
    let faces: Vec<Arc<dyn Face>> = (0..16).map(make_face).collect();
    let prefix = name("/bench/hops");

    group.bench_function("add_16_next_hops", |b| {
        b.iter(|| {
            let mut tree = NameTree::new();
            for (i, face) in faces.iter().enumerate() {
                tree.add_or_update_next_hop(&prefix, face, 0, (16 - i) as u64);
            }
            black_box(tree.fib_len())
        })
    });

    let mut tree = NameTree::new();
    for face in &faces {
        tree.add_or_update_next_hop(&prefix, face, 0, 10);
    }
    let mut cost = 0u64;
    group.bench_function("update_cost_16_next_hops", |b| {
        b.iter(|| {
            cost = (cost + 1) % 32;
            black_box(tree.add_or_update_next_hop(&prefix, &faces[7], 0, cost))
        })
    });

    group.finish();
}

// ============================================================================
// Lookup Benchmarks
// ============================================================================

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let tree = populated_tree(1000, 0);
    let target = name("/bench/p500/a/b/c/d");

    group.bench_function("longest_prefix_match_1000_prefixes", |b| {
        b.iter(|| black_box(tree.fib_find_longest_prefix_match(&target)))
    });

    group.finish();
}

// ============================================================================
// Redistribution Benchmarks
// ============================================================================

fn bench_redistribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("redistribution");
    let mut tree = populated_tree(100, 10);
    let face = make_face(2);
    let mut cost = 0u64;

    group.bench_function("redistribute_1000_pending", |b| {
        b.iter(|| {
            // Cost change forces a full pass
            cost += 1;
            let update = tree.add_or_update_next_hop(&name("/bench"), &face, 0, cost);
            black_box(update.redistributed)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_next_hops,
    bench_lookup,
    bench_redistribution,
);

criterion_main!(benches);
