//! Benchmarks for geometry operations and full fog calculations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fogmap::ops::Units;
use fogmap::{get_default_options, Feature, FogCalculator, GeometryEngine, PerformanceMode};

/// Buffered points along a diagonal walk, like a day of GPS fixes.
fn generate_walk(count: usize) -> Vec<Feature> {
    let engine = GeometryEngine::default();
    (0..count)
        .filter_map(|i| {
            let t = i as f64 * 0.001;
            engine
                .buffer([t, t * 0.5], 100.0, Units::Meters)
                .result
        })
        .collect()
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("union");
    let engine = GeometryEngine::default();

    for count in [10, 100, 500] {
        let areas = generate_walk(count);
        group.bench_with_input(BenchmarkId::new("walk", count), &areas, |b, areas| {
            b.iter(|| engine.union(black_box(areas)))
        });
    }

    group.finish();
}

fn bench_calculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate");
    let areas = generate_walk(200);
    let bounds = Some([-0.05, -0.05, 0.25, 0.15]);

    for mode in [PerformanceMode::Accurate, PerformanceMode::Fast] {
        let options = get_default_options(bounds).with_performance_mode(mode);

        // A fresh calculator per iteration so the cache never answers.
        group.bench_function(BenchmarkId::new("cold", format!("{mode:?}")), |b| {
            b.iter(|| FogCalculator::default().calculate(Some(black_box(&areas[..])), &options))
        });
    }

    let calculator = FogCalculator::default();
    let options = get_default_options(bounds);
    calculator.calculate(Some(&areas[..]), &options);
    group.bench_function("cached", |b| {
        b.iter(|| calculator.calculate(Some(black_box(&areas[..])), &options))
    });

    group.finish();
}

criterion_group!(benches, bench_union, bench_calculate);
criterion_main!(benches);
