//! fogmap - Fog-of-war geometry for exploration maps
//!
//! The fog over a map is the viewport minus every area the user has visited.
//! This library computes it robustly: polygons are validated and repaired
//! before they reach the boolean operations, revealed areas are indexed for
//! fast viewport queries, and a circuit breaker, a result cache and a chain
//! of fallback tiers keep the map responsive when geometry misbehaves.
//!
//! # Example
//!
//! ```
//! use fogmap::{get_default_options, Feature, FogCalculator};
//!
//! let calculator = FogCalculator::default();
//! let visited = vec![Feature::polygon(vec![vec![
//!     [0.0, 0.0], [0.0, 0.5], [0.5, 0.5], [0.5, 0.0], [0.0, 0.0],
//! ]])];
//!
//! let fog = calculator.calculate(Some(&visited[..]), &get_default_options(Some([-1.0, -1.0, 1.0, 1.0])));
//! assert_eq!(fog.collection.len(), 1);
//! assert!(!fog.metrics.fallback_used);
//! ```

pub mod bounds;
pub mod breaker;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fog;
pub mod geojson;
pub mod ops;
pub mod polygon;
pub mod primitives;
pub mod simplify;
pub mod spatial;
pub mod store;

pub use bounds::Aabb2;
pub use breaker::{CircuitBreaker, CircuitState};
pub use cache::{CacheSignature, FogCache};
pub use config::FogConfig;
pub use error::{FogError, Result};
pub use fog::{
    get_default_options, FallbackStrategy, FogCalculator, FogMetrics, FogOptions, FogResult,
    FogTier, PerformanceMode,
};
pub use geojson::{Feature, FeatureCollection, Geometry, Viewport};
pub use ops::{GeometryEngine, OperationOutcome, Units};
pub use polygon::{sanitize, validate, ComplexityLevel};
pub use primitives::{Point2, Segment2, Vec2};
pub use spatial::{LevelOfDetail, SpatialIndex};
pub use store::RevealedAreaStore;
