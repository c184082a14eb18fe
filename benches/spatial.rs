//! Benchmarks for the BVH and viewport queries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fogmap::bounds::Aabb2;
use fogmap::spatial::Bvh;
use fogmap::{Feature, LevelOfDetail, SpatialIndex, Viewport};

/// Deterministic pseudo-random numbers in [0, 1).
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0 as f64 / u64::MAX as f64
    }
}

/// Small square areas scattered over a 10x10 degree region.
fn generate_areas(count: usize, seed: u64) -> Vec<Feature> {
    let mut rng = XorShift(seed);
    (0..count)
        .map(|_| {
            let x = rng.next() * 10.0;
            let y = rng.next() * 10.0;
            let s = rng.next() * 0.01 + 0.001;
            Feature::polygon(vec![vec![
                [x, y],
                [x + s, y],
                [x + s, y + s],
                [x, y + s],
                [x, y],
            ]])
        })
        .collect()
}

fn bench_bvh_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("bvh_construction");

    for count in [1000, 10000, 50000] {
        let mut rng = XorShift(12345);
        let boxes: Vec<Aabb2<f64>> = (0..count)
            .map(|_| {
                let (x, y) = (rng.next() * 100.0, rng.next() * 100.0);
                Aabb2::from_bounds([x, y, x + 0.5, y + 0.5])
            })
            .collect();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("boxes", count), &boxes, |b, boxes| {
            b.iter(|| Bvh::build(black_box(boxes), 4))
        });
    }

    group.finish();
}

fn bench_viewport_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport_query");
    let viewport = Viewport::new(4.0, 4.0, 5.0, 5.0).unwrap();

    for count in [1000, 10000] {
        let mut index = SpatialIndex::default();
        index.rebuild(&generate_areas(count, 99));

        group.bench_function(BenchmarkId::new("exact", count), |b| {
            b.iter(|| index.query_viewport(black_box(&viewport), None))
        });
        group.bench_function(BenchmarkId::new("lod_zoom_8", count), |b| {
            b.iter(|| index.query_viewport(black_box(&viewport), Some(LevelOfDetail::new(8.0, 5_000))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bvh_construction, bench_viewport_query);
criterion_main!(benches);
