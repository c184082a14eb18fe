//! The outcome of a fog calculation.

use crate::error::FogError;
use crate::geojson::{FeatureCollection, Viewport};
use crate::polygon::ComplexityLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which step of the fallback chain produced a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FogTier {
    /// Viewport minus the union of revealed areas.
    #[default]
    Primary,
    /// The bare viewport rectangle.
    SimplifiedViewport,
    /// The world rectangle.
    WorldFog,
    /// The world rectangle after the calculation itself panicked.
    Emergency,
}

impl FogTier {
    /// Whether the tier is a fallback.
    pub fn is_fallback(self) -> bool {
        self != FogTier::Primary
    }
}

/// Statistics of a fog calculation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FogMetrics {
    pub execution_time: Duration,
    /// Positions over all revealed areas passed in.
    pub input_vertex_count: usize,
    /// Positions over all returned fog features.
    pub output_vertex_count: usize,
    pub complexity: ComplexityLevel,
    pub fallback_used: bool,
    pub tier: FogTier,
    pub cache_hit: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<FogError>,
}

/// Fog polygons plus how they were obtained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FogResult {
    pub collection: FeatureCollection,
    pub metrics: FogMetrics,
}

impl FogResult {
    /// A primary-tier result.
    pub fn new(collection: FeatureCollection) -> Self {
        Self {
            collection,
            metrics: FogMetrics::default(),
        }
    }

    /// A fallback result covering `viewport` entirely.
    pub fn covering(viewport: &Viewport, tier: FogTier) -> Self {
        Self {
            collection: FeatureCollection::new(vec![viewport.to_feature()]),
            metrics: FogMetrics {
                tier,
                fallback_used: tier.is_fallback(),
                ..FogMetrics::default()
            },
        }
    }

    /// Fog over the whole world.
    pub fn world(tier: FogTier) -> Self {
        Self::covering(&Viewport::WORLD, tier)
    }

    /// Primary result with nothing left to fog.
    pub fn is_fully_revealed(&self) -> bool {
        self.metrics.tier == FogTier::Primary && self.collection.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::geometry_area;
    use approx::assert_relative_eq;

    #[test]
    fn test_world_fog() {
        let result = FogResult::world(FogTier::WorldFog);
        assert!(result.metrics.fallback_used);
        assert_eq!(result.collection.len(), 1);
        assert_relative_eq!(
            geometry_area(&result.collection.features[0].geometry),
            360.0 * 180.0
        );
    }

    #[test]
    fn test_fully_revealed() {
        assert!(FogResult::new(FeatureCollection::empty()).is_fully_revealed());
        let viewport = Viewport::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(!FogResult::covering(&viewport, FogTier::Primary).is_fully_revealed());
    }
}
