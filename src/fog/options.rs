//! Per-call options of a fog calculation.

use crate::error::Result;
use crate::geojson::Viewport;
use serde::{Deserialize, Serialize};

/// Trade-off between speed and fidelity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformanceMode {
    /// Level of detail and complexity bounding are applied.
    Fast,
    #[default]
    Accurate,
}

/// What to show when the primary calculation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallbackStrategy {
    /// Fog the whole viewport, or the world without a usable viewport.
    #[default]
    Viewport,
    /// Fog the whole world.
    World,
    /// Return no fog at all, only the errors.
    None,
}

/// Options of [`crate::fog::FogCalculator::calculate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogOptions {
    /// `[min_lon, min_lat, max_lon, max_lat]` of the visible map.
    pub viewport_bounds: Option<[f64; 4]>,
    /// Map zoom, used for level of detail in fast mode.
    pub zoom: Option<f64>,
    /// Only consider areas near the viewport, found through the spatial index.
    pub use_viewport_optimization: bool,
    pub performance_mode: PerformanceMode,
    pub fallback_strategy: FallbackStrategy,
}

impl Default for FogOptions {
    fn default() -> Self {
        get_default_options(None)
    }
}

impl FogOptions {
    /// The validated viewport: `None` without bounds, an error for bad ones.
    pub fn viewport(&self) -> Option<Result<Viewport>> {
        self.viewport_bounds.map(Viewport::from_bounds)
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_performance_mode(mut self, mode: PerformanceMode) -> Self {
        self.performance_mode = mode;
        self
    }

    pub fn with_fallback_strategy(mut self, strategy: FallbackStrategy) -> Self {
        self.fallback_strategy = strategy;
        self
    }

    pub fn with_viewport_optimization(mut self, enabled: bool) -> Self {
        self.use_viewport_optimization = enabled;
        self
    }
}

/// Options for a calculation over the given viewport.
///
/// Viewport optimization is on exactly when bounds are given; the mode is
/// Accurate and failures fall back to viewport fog.
///
/// # Example
///
/// ```
/// use fogmap::fog::{get_default_options, FallbackStrategy, PerformanceMode};
///
/// let options = get_default_options(Some([-1.0, -1.0, 1.0, 1.0]));
/// assert!(options.use_viewport_optimization);
/// assert_eq!(options.performance_mode, PerformanceMode::Accurate);
/// assert_eq!(options.fallback_strategy, FallbackStrategy::Viewport);
/// assert!(!get_default_options(None).use_viewport_optimization);
/// ```
pub fn get_default_options(viewport_bounds: Option<[f64; 4]>) -> FogOptions {
    FogOptions {
        viewport_bounds,
        zoom: None,
        use_viewport_optimization: viewport_bounds.is_some(),
        performance_mode: PerformanceMode::Accurate,
        fallback_strategy: FallbackStrategy::Viewport,
    }
}
