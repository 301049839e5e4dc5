//! Criterion micro-benchmarks for the per-tick building blocks.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use doppler_core::{round_to_resolution, CrossingDirection, Position, WavefrontRing};
use doppler_engine::{EmissionScheduler, FrequencyDetector};
use doppler_test_utils::{ring_with, OBSERVER_X};

/// Benchmark: grow every slot of a 28-slot ring by one tick.
fn bench_ring_advance_28(c: &mut Criterion) {
    let mut ring = WavefrontRing::new(28, Position::new(1000.0, 1000.0), 4000.0);

    c.bench_function("ring_advance_28", |b| {
        b.iter(|| {
            ring.advance_all(black_box(343.0), black_box(0.05));
        });
    });
}

/// Benchmark: recycle slots round a 28-slot ring.
fn bench_ring_recycle(c: &mut Criterion) {
    let mut ring = WavefrontRing::new(28, Position::new(1000.0, 1000.0), 4000.0);

    c.bench_function("ring_recycle", |b| {
        b.iter(|| black_box(ring.recycle(black_box(Position::new(975.0, 1000.0)))));
    });
}

/// Benchmark: detector scan over a ring where no pair qualifies, the
/// common per-tick case.
fn bench_detector_scan_miss(c: &mut Criterion) {
    let dir = CrossingDirection::TowardDecreasingX;
    let edges: Vec<f64> = (0..28).map(|i| OBSERVER_X + 10.0 + i as f64).collect();
    let mut ring = ring_with(28, &edges, dir);
    let mut detector = FrequencyDetector::new(dir, 0.5);

    c.bench_function("detector_scan_miss_28", |b| {
        b.iter(|| black_box(detector.scan(&mut ring, OBSERVER_X, 0.05, 343.0)));
    });
}

/// Benchmark: detector scan that finds the last pair in storage order.
fn bench_detector_scan_hit_last(c: &mut Criterion) {
    let dir = CrossingDirection::TowardDecreasingX;
    let mut edges: Vec<f64> = (0..28).map(|_| OBSERVER_X + 50.0).collect();
    edges[26] = OBSERVER_X - 20.0;
    edges[27] = OBSERVER_X - 5.0;
    let template = ring_with(28, &edges, dir);

    c.bench_function("detector_scan_hit_last_28", |b| {
        b.iter_batched(
            || (template.clone(), FrequencyDetector::new(dir, 0.5)),
            |(mut ring, mut detector)| detector.scan(&mut ring, OBSERVER_X, 0.05, 343.0),
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark: emission scheduler over one full 0.5 s period.
fn bench_scheduler_period(c: &mut Criterion) {
    let mut scheduler = EmissionScheduler::new();

    c.bench_function("scheduler_10_ticks", |b| {
        b.iter(|| {
            for _ in 0..10 {
                black_box(scheduler.tick(black_box(0.5), 0.05));
            }
        });
    });
}

/// Benchmark: quantize 1000 speed values.
fn bench_quantize_1k(c: &mut Criterion) {
    let values: Vec<f64> = (0..1000).map(|i| (i as f64 - 500.0) * 0.731).collect();

    c.bench_function("quantize_1k", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(round_to_resolution(black_box(v)));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_ring_advance_28,
    bench_ring_recycle,
    bench_detector_scan_miss,
    bench_detector_scan_hit_last,
    bench_scheduler_period,
    bench_quantize_1k,
);
criterion_main!(benches);
