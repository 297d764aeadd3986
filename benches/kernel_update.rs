//! Benchmarks for the CPU motion kernel.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use figure8::curve::Figure8;
use figure8::kernel::ParticleSet;

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let curve = Figure8::default();

    for count in [10_000u32, 100_000, 1_000_000] {
        let mut set = ParticleSet::initialize_with_rng(count, 0.2, &mut SmallRng::seed_from_u64(1));

        group.bench_with_input(BenchmarkId::new("auto", count), &count, |b, _| {
            let mut elapsed = 0.0f64;
            b.iter(|| {
                elapsed += 1.0 / 60.0;
                set.update(&curve, black_box(elapsed), 0.15);
            })
        });

        group.bench_with_input(BenchmarkId::new("sequential", count), &count, |b, _| {
            let mut elapsed = 0.0f64;
            b.iter(|| {
                elapsed += 1.0 / 60.0;
                set.update_sequential(&curve, black_box(elapsed), 0.15);
            })
        });
    }

    group.finish();
}

fn bench_initialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialize");

    for count in [10_000u32, 100_000, 1_000_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(2);
            b.iter(|| black_box(ParticleSet::initialize_with_rng(count, 0.2, &mut rng)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_update, bench_initialize);
criterion_main!(benches);
