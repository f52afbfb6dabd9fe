//! Reconciliation and accumulation throughput

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use variantqc::*;

/// 100bp reads cycling through a few typical alignment shapes.
fn fixture() -> Vec<(&'static str, &'static str, Vec<u8>)> {
    let read = b"ACGT".repeat(25);
    let mut mismatched = read.clone();
    mismatched[40] = b'T';
    vec![
        ("100M", "100", read.clone()),
        ("100M", "40A59", mismatched),
        ("50M2I48M", "98", read.clone()),
        ("30M3D70M", "30^ACG70", read),
    ]
}

fn benchmark_reconcile(c: &mut Criterion) {
    let reconciler = StreamReconciler::new();
    let records = fixture();

    c.bench_function("reconcile_100bp", |b| {
        b.iter(|| {
            for (cigar, md, read) in &records {
                black_box(reconciler.reconcile(cigar, Some(md), read));
            }
        });
    });
}

fn benchmark_update(c: &mut Criterion) {
    let reconciler = StreamReconciler::new();
    let streams: Vec<EditStream> = fixture()
        .iter()
        .map(|(cigar, md, read)| reconciler.reconcile(cigar, Some(md), read))
        .collect();

    c.bench_function("update_10k_reads", |b| {
        b.iter(|| {
            let mut accumulator = VariantAccumulator::new(100);
            for i in 0..10_000 {
                accumulator.update(&streams[i % streams.len()], i % 2 == 0, 100);
            }
            black_box(accumulator.compute_totals())
        });
    });
}

criterion_group!(benches, benchmark_reconcile, benchmark_update);
criterion_main!(benches);
