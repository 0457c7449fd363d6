//! Benchmarks for quickselect.
//!
//! Compares selection against a full sort, which is what callers would do
//! without it, across sizes that straddle the insertion-sort cutoff.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use vicinity_ids::select::{median_distances, median_f64, median_ids};
use vicinity_ids::{DistanceIdArray, Id, IdArray};

// === Generators ===

fn random_values(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.random::<f64>()).collect()
}

fn random_distance_list(n: usize) -> DistanceIdArray {
    let mut list = DistanceIdArray::with_capacity(n);
    for (i, d) in random_values(n).into_iter().enumerate() {
        list.add(d, &Id::from(i as u32));
    }
    list
}

// === Benchmarks ===

fn bench_median_vs_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_f64");

    for n in [32, 256, 4096, 65536].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let values = random_values(*n);

        group.bench_with_input(BenchmarkId::new("quickselect", n), n, |bench, _| {
            bench.iter_batched(
                || values.clone(),
                |mut v| median_f64(black_box(&mut v)),
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("sort", n), n, |bench, _| {
            bench.iter_batched(
                || values.clone(),
                |mut v| {
                    v.sort_by(f64::total_cmp);
                    black_box(v[(v.len() - 1) / 2])
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_median_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_distances");

    for n in [256, 4096, 65536].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let list = random_distance_list(*n);

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter_batched(
                || list.clone(),
                |mut l| median_distances(black_box(&mut l)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_median_ids_by_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("median_ids_by_key");

    for n in [256, 4096, 65536].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let keys = random_values(*n);
        let ids: IdArray = (0..*n as u32).map(Id::from).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter_batched(
                || ids.clone(),
                |mut a| {
                    median_ids(black_box(&mut a), |x, y| {
                        keys[x.index() as usize].total_cmp(&keys[y.index() as usize])
                    })
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_median_vs_sort,
    bench_median_distances,
    bench_median_ids_by_key,
);
criterion_main!(benches);
