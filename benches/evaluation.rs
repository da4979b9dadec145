//! Benchmark octree construction, matching, and metric computation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::rngs::StdRng;

use tulana::{Correspondences, Cylinder, MatchingConfig, Octree, Point3, PointCloud, RegionMetrics};

fn random_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    PointCloud::from_points(
        (0..n)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                )
            })
            .collect(),
    )
}

/// Cylinders claiming contiguous index bands of the cloud.
fn banded_cylinders(n_points: usize, n_cylinders: usize) -> Vec<Cylinder> {
    let band = n_points / n_cylinders.max(1);
    (0..n_cylinders)
        .map(|i| {
            Cylinder::with_inliers(
                Point3::new(i as f32, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                0.5,
                (i * band)..((i + 1) * band),
            )
        })
        .collect()
}

fn bench_octree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("octree_build");

    for n in [1_000usize, 10_000, 100_000] {
        let cloud = random_cloud(n, 42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(Octree::new(black_box(&cloud))))
        });
    }

    group.finish();
}

fn bench_leaf_lookup(c: &mut Criterion) {
    let cloud = random_cloud(100_000, 42);
    let octree = Octree::new(&cloud);

    c.bench_function("find_leaf_100k", |b| {
        b.iter(|| {
            for i in 0..cloud.len() {
                black_box(octree.find_leaf(black_box(i)));
            }
        })
    });
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("correspondence_matching");
    let config = MatchingConfig::default();

    for n_cyl in [4usize, 16, 64] {
        let groundtruth = banded_cylinders(10_000, n_cyl);
        let detections = banded_cylinders(10_000, n_cyl);

        group.bench_with_input(BenchmarkId::from_parameter(n_cyl), &n_cyl, |b, _| {
            b.iter(|| {
                black_box(Correspondences::compute(
                    black_box(&groundtruth),
                    black_box(&detections),
                    &config,
                ))
            })
        });
    }

    group.finish();
}

fn bench_metrics(c: &mut Criterion) {
    let cloud = random_cloud(10_000, 42);
    let octree = Octree::new(&cloud);
    let groundtruth = banded_cylinders(10_000, 16);
    let detections = banded_cylinders(10_000, 16);
    let correspondences =
        Correspondences::compute(&groundtruth, &detections, &MatchingConfig::default());

    c.bench_function("region_metrics_10k", |b| {
        b.iter(|| {
            black_box(RegionMetrics::compute(
                black_box(&octree),
                &groundtruth,
                &detections,
                &correspondences,
            ))
        })
    });
}

criterion_group!(
    benches,
    bench_octree_build,
    bench_leaf_lookup,
    bench_matching,
    bench_metrics
);
criterion_main!(benches);
