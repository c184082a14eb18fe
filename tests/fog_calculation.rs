//! End-to-end fog calculations through the public API.

use approx::assert_relative_eq;
use fogmap::config::{BreakerConfig, CacheConfig};
use fogmap::geojson::Ring;
use fogmap::polygon::{geometry_area, validate};
use fogmap::{
    get_default_options, FallbackStrategy, Feature, FogCalculator, FogConfig, FogError, FogTier,
    PerformanceMode, Viewport,
};
use serde_json::json;

fn square(x: f64, y: f64, size: f64) -> Feature {
    let ring: Ring = vec![
        [x, y],
        [x, y + size],
        [x + size, y + size],
        [x + size, y],
        [x, y],
    ];
    Feature::polygon(vec![ring])
}

fn fog_area(result: &fogmap::FogResult) -> f64 {
    result
        .collection
        .features
        .iter()
        .map(|f| geometry_area(&f.geometry))
        .sum()
}

const BOUNDS: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

#[test]
fn empty_map_is_exactly_the_viewport() {
    let calculator = FogCalculator::default();
    let result = calculator.calculate(None, &get_default_options(Some(BOUNDS)));

    assert!(!result.metrics.fallback_used);
    assert_eq!(result.collection.len(), 1);
    assert_eq!(
        result.collection.features[0],
        Viewport::from_bounds(BOUNDS).unwrap().to_feature()
    );
}

#[test]
fn no_viewport_is_world_fog() {
    let calculator = FogCalculator::default();
    let options = get_default_options(None).with_fallback_strategy(FallbackStrategy::World);
    let result = calculator.calculate(None, &options);

    assert_eq!(result.metrics.tier, FogTier::WorldFog);
    assert_eq!(result.collection.features[0], Viewport::WORLD.to_feature());
}

#[test]
fn revealed_square_reduces_fog() {
    let calculator = FogCalculator::default();
    let revealed = vec![square(0.0, 0.0, 0.5)];
    let result = calculator.calculate(Some(&revealed[..]), &get_default_options(Some(BOUNDS)));

    assert_eq!(result.metrics.tier, FogTier::Primary);
    assert!(result.collection.features.iter().all(|f| validate(f).is_valid));
    assert!(fog_area(&result) < 4.0);
    assert_relative_eq!(fog_area(&result), 3.75, epsilon = 1e-9);
    assert_eq!(result.metrics.input_vertex_count, 5);
}

#[test]
fn overlapping_and_distant_areas() {
    let calculator = FogCalculator::default();
    let revealed = vec![
        square(-0.5, -0.5, 0.5),
        square(-0.25, -0.25, 0.5),
        square(40.0, 40.0, 1.0),
    ];
    let result = calculator.calculate(Some(&revealed[..]), &get_default_options(Some(BOUNDS)));

    // 0.25 + 0.25 - 0.0625 overlap
    assert_relative_eq!(fog_area(&result), 4.0 - 0.4375, epsilon = 1e-9);
}

#[test]
fn raw_json_area_round_trip() {
    let value = json!({
        "type": "Feature",
        "properties": {"visited": "2024-05-01"},
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.1, 0.1], [0.1, 0.2], [0.2, 0.2], [0.2, 0.1], [0.1, 0.1]]]
        }
    });
    let area = Feature::from_value(&value).unwrap();

    let calculator = FogCalculator::default();
    let result = calculator.calculate(Some(&[area][..]), &get_default_options(Some(BOUNDS)));
    let text = serde_json::to_string(&result.collection).unwrap();
    assert!(text.contains("\"FeatureCollection\""));
    assert_relative_eq!(fog_area(&result), 4.0 - 0.01, epsilon = 1e-9);
}

#[test]
fn fast_mode_keeps_the_shape() {
    let calculator = FogCalculator::default();
    let revealed: Vec<Feature> = (0..20)
        .map(|i| square(-1.0 + i as f64 * 0.1, -0.05, 0.05))
        .collect();
    let options = get_default_options(Some(BOUNDS))
        .with_performance_mode(PerformanceMode::Fast)
        .with_zoom(6.0);
    let result = calculator.calculate(Some(&revealed[..]), &options);

    assert_eq!(result.metrics.tier, FogTier::Primary);
    // A pixel is ~0.02 degrees at zoom 6, so every square stays a square.
    assert_relative_eq!(fog_area(&result), 4.0 - 20.0 * 0.0025, epsilon = 1e-9);
}

#[test]
fn breaker_fast_fails_after_repeated_failures() {
    let config = FogConfig::default().with_breaker(BreakerConfig {
        failure_threshold: 3,
        ..BreakerConfig::default()
    });
    let calculator = FogCalculator::new(config);
    let broken = vec![Feature::polygon(vec![vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]])];
    let options = get_default_options(Some(BOUNDS));

    for _ in 0..3 {
        let result = calculator.calculate(Some(&broken[..]), &options);
        assert_eq!(result.metrics.tier, FogTier::SimplifiedViewport);
        assert!(matches!(result.metrics.errors[0], FogError::Validation(_)));
    }

    let result = calculator.calculate(Some(&broken[..]), &options);
    assert_eq!(result.metrics.tier, FogTier::SimplifiedViewport);
    assert!(matches!(
        result.metrics.errors[0],
        FogError::CircuitOpen { .. }
    ));
    assert!(!result.metrics.warnings.is_empty());
}

#[test]
fn cache_serves_nearby_viewports() {
    let calculator = FogCalculator::new(FogConfig::default().with_cache(CacheConfig {
        grid_size: 1e-3,
        ..CacheConfig::default()
    }));
    let revealed = vec![square(0.0, 0.0, 0.5)];

    let first = calculator.calculate(Some(&revealed[..]), &get_default_options(Some(BOUNDS)));
    let jittered = get_default_options(Some([-1.0001, -1.0, 1.0, 1.0002]));
    let second = calculator.calculate(Some(&revealed[..]), &jittered);

    assert!(!first.metrics.cache_hit);
    assert!(second.metrics.cache_hit);
    assert_eq!(first.collection, second.collection);
    assert_eq!(calculator.cache_stats().hits, 1);

    calculator.reset();
    let third = calculator.calculate(Some(&revealed[..]), &get_default_options(Some(BOUNDS)));
    assert!(!third.metrics.cache_hit);
}

#[test]
fn calculator_is_shareable_across_threads() {
    let calculator = std::sync::Arc::new(FogCalculator::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let calculator = calculator.clone();
            std::thread::spawn(move || {
                let revealed = vec![square(0.0, 0.0, 0.1 * (i + 1) as f64)];
                calculator
                    .calculate(Some(&revealed[..]), &get_default_options(Some(BOUNDS)))
                    .metrics
                    .tier
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), FogTier::Primary);
    }
}
