//! Benchmarks for the bounded k-NN heap and set algebra.
//!
//! The heap insert loop is the innermost loop of every linear-scan query,
//! so it is measured per candidate.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use vicinity_ids::util::{intersection, random_sample};
use vicinity_ids::{Id, IdArray, IdHashSet, IdRange, KnnHeap};

fn random_distances(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n).map(|_| rng.random::<f64>()).collect()
}

fn bench_heap_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_heap_scan");
    let n = 10_000;
    let distances = random_distances(n);
    group.throughput(Throughput::Elements(n as u64));

    for k in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |bench, &k| {
            bench.iter(|| {
                let mut heap = KnnHeap::new(k).unwrap();
                for (i, &d) in distances.iter().enumerate() {
                    if d <= heap.k_distance() {
                        heap.insert(d, &Id::from(i as u32));
                    }
                }
                black_box(heap.into_knn_list())
            });
        });
    }

    group.finish();
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersection");

    for n in [16, 256, 4096].iter() {
        let a: IdArray = (0..*n as u32).map(Id::from).collect();
        let b: IdArray = (*n as u32 / 2..*n as u32 * 3 / 2).map(Id::from).collect();
        let b_set: IdHashSet = b.as_slice().iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("array_array", n), n, |bench, _| {
            bench.iter(|| intersection(black_box(&a), black_box(&b)));
        });
        group.bench_with_input(BenchmarkId::new("array_set", n), n, |bench, _| {
            bench.iter(|| intersection(black_box(&a), black_box(&b_set)));
        });
    }

    group.finish();
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_sample");
    let population = IdRange::new(0, 100_000).unwrap();

    // Below and above the constructive/destructive switch at n/4.
    for k in [100, 10_000, 50_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |bench, &k| {
            let mut rng = StdRng::seed_from_u64(1);
            bench.iter(|| random_sample(black_box(&population), k, &mut rng).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_heap_scan, bench_intersection, bench_sampling);
criterion_main!(benches);
