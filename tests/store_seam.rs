//! Calculations fed from a revealed-area store.

use async_trait::async_trait;
use fogmap::store::MemoryStore;
use fogmap::{
    get_default_options, FallbackStrategy, Feature, FogCalculator, FogError, FogTier,
    RevealedAreaStore,
};

struct FailingStore;

#[async_trait]
impl RevealedAreaStore for FailingStore {
    async fn list(&self) -> fogmap::Result<Vec<Feature>> {
        Err(FogError::Store("database locked".into()))
    }
}

fn square(x: f64, y: f64, size: f64) -> Feature {
    Feature::polygon(vec![vec![
        [x, y],
        [x + size, y],
        [x + size, y + size],
        [x, y + size],
        [x, y],
    ]])
}

#[tokio::test]
async fn store_areas_are_subtracted() {
    let store = MemoryStore::new(vec![square(0.0, 0.0, 0.5)]);
    let calculator = FogCalculator::default();
    let options = get_default_options(Some([-1.0, -1.0, 1.0, 1.0]));

    let result = calculator.calculate_from_store(&store, &options).await;
    assert_eq!(result.metrics.tier, FogTier::Primary);
    assert_eq!(result.metrics.input_vertex_count, 5);

    store.push(square(-1.0, -1.0, 2.0));
    let result = calculator.calculate_from_store(&store, &options).await;
    assert!(result.is_fully_revealed());
}

#[tokio::test]
async fn failing_store_degrades_to_viewport_fog() {
    let calculator = FogCalculator::default();
    let options = get_default_options(Some([-1.0, -1.0, 1.0, 1.0]));

    let result = calculator.calculate_from_store(&FailingStore, &options).await;
    assert_eq!(result.metrics.tier, FogTier::SimplifiedViewport);
    assert!(result.metrics.fallback_used);
    assert_eq!(result.metrics.errors, vec![FogError::Store("database locked".into())]);
    assert!(!result.metrics.warnings.is_empty());
}

#[tokio::test]
async fn failing_store_with_world_strategy() {
    let calculator = FogCalculator::default();
    let options = get_default_options(Some([-1.0, -1.0, 1.0, 1.0]))
        .with_fallback_strategy(FallbackStrategy::World);

    let result = calculator.calculate_from_store(&FailingStore, &options).await;
    assert_eq!(result.metrics.tier, FogTier::WorldFog);
}

#[tokio::test]
async fn failing_store_without_fallback_matches_failed_calculation() {
    let calculator = FogCalculator::default();
    let options = get_default_options(Some([-1.0, -1.0, 1.0, 1.0]))
        .with_fallback_strategy(FallbackStrategy::None);

    let from_store = calculator.calculate_from_store(&FailingStore, &options).await;
    assert!(from_store.collection.is_empty());
    assert!(!from_store.metrics.fallback_used);
    assert_eq!(from_store.metrics.errors, vec![FogError::Store("database locked".into())]);

    let broken = [Feature::polygon(vec![vec![[0.0, 0.0], [0.5, 0.5]]])];
    let computed = calculator.calculate(Some(&broken[..]), &options);
    assert!(computed.collection.is_empty());
    assert_eq!(computed.metrics.fallback_used, from_store.metrics.fallback_used);
}
