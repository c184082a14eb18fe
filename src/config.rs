//! Engine configuration.
//!
//! Every tunable of the engine lives here with its default. All types are
//! serde-serializable so an application can ship overrides as JSON; missing
//! fields fall back to the defaults.
//!
//! # Example
//!
//! ```
//! use fogmap::config::FogConfig;
//!
//! let config = FogConfig::from_json_str(r#"{"breaker": {"failure_threshold": 5}}"#).unwrap();
//! assert_eq!(config.breaker.failure_threshold, 5);
//! assert_eq!(config.cache.capacity, 50);
//! ```

use crate::error::{FogError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Validation, sanitization and complexity classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Decimal places coordinates are rounded to by the sanitizer.
    pub precision: u32,

    /// Consecutive points closer than this (degrees) are merged.
    pub dedup_tolerance: f64,

    /// Vertex count at which a feature is classified Medium.
    pub medium_complexity_vertices: usize,

    /// Vertex count at which a feature is classified High.
    pub high_complexity_vertices: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            dedup_tolerance: 1e-6,
            medium_complexity_vertices: 1_000,
            high_complexity_vertices: 10_000,
        }
    }
}

/// Geometry operation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationConfig {
    /// Number of segments used to approximate a buffered point.
    pub buffer_steps: usize,

    /// Results smaller than this (square degrees) count as empty.
    pub min_result_area: f64,

    /// RDP tolerance (degrees) applied to High-complexity unions in fast mode.
    pub simplify_tolerance: f64,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            buffer_steps: 64,
            min_result_area: 1e-12,
            simplify_tolerance: 1e-5,
        }
    }
}

/// Spatial index settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum number of areas per BVH leaf.
    pub max_leaf_size: usize,

    /// Vertex count above which cold entries are simplified, then evicted.
    pub max_hot_vertices: usize,

    /// Areas smaller than this many pixels are replaced by their bbox.
    pub lod_min_pixels: f64,

    /// Vertex budget used when the caller does not supply one.
    pub default_vertex_budget: usize,

    /// Tile size in pixels of the web-mercator zoom pyramid.
    pub tile_size: f64,

    /// Maximum tolerance-doubling rounds when fitting the vertex budget.
    pub max_lod_rounds: u32,

    /// RDP tolerance (degrees) applied to cold entries before eviction.
    pub cold_simplify_tolerance: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_leaf_size: 4,
            max_hot_vertices: 250_000,
            lod_min_pixels: 2.0,
            default_vertex_budget: 20_000,
            tile_size: 256.0,
            max_lod_rounds: 8,
            cold_simplify_tolerance: 1e-4,
        }
    }
}

/// Fog cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached results.
    pub capacity: usize,

    /// Grid (degrees) viewport bounds are snapped to when forming a signature.
    pub grid_size: f64,

    /// Entries older than this miss. `None` disables expiry.
    pub max_age: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            grid_size: 1e-4,
            max_age: Some(Duration::from_secs(300)),
        }
    }
}

/// Circuit breaker policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Failures within `failure_window` that open the breaker.
    pub failure_threshold: usize,

    /// Sliding window failures are counted in.
    pub failure_window: Duration,

    /// Time the breaker stays open before admitting a trial call.
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            failure_window: Duration::from_secs(60),
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub validation: ValidationConfig,
    pub operations: OperationConfig,
    pub index: IndexConfig,
    pub cache: CacheConfig,
    pub breaker: BreakerConfig,
}

impl FogConfig {
    /// Parses a JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FogError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values are usable.
    pub fn validate(&self) -> Result<()> {
        let v = &self.validation;
        if v.precision > 15 {
            return Err(invalid("validation.precision must be at most 15"));
        }
        if !(v.dedup_tolerance.is_finite() && v.dedup_tolerance >= 0.0) {
            return Err(invalid("validation.dedup_tolerance must be non-negative"));
        }
        if v.medium_complexity_vertices >= v.high_complexity_vertices {
            return Err(invalid(
                "validation.medium_complexity_vertices must be below high_complexity_vertices",
            ));
        }

        let o = &self.operations;
        if o.buffer_steps < 3 {
            return Err(invalid("operations.buffer_steps must be at least 3"));
        }
        if !(o.min_result_area.is_finite() && o.min_result_area >= 0.0) {
            return Err(invalid("operations.min_result_area must be non-negative"));
        }
        if !(o.simplify_tolerance.is_finite() && o.simplify_tolerance > 0.0) {
            return Err(invalid("operations.simplify_tolerance must be positive"));
        }

        let i = &self.index;
        if i.max_leaf_size == 0 {
            return Err(invalid("index.max_leaf_size must be positive"));
        }
        if i.default_vertex_budget == 0 || i.max_hot_vertices == 0 {
            return Err(invalid("index vertex limits must be positive"));
        }
        if !(i.tile_size.is_finite() && i.tile_size > 0.0) {
            return Err(invalid("index.tile_size must be positive"));
        }
        if !(i.cold_simplify_tolerance.is_finite() && i.cold_simplify_tolerance > 0.0) {
            return Err(invalid("index.cold_simplify_tolerance must be positive"));
        }

        let c = &self.cache;
        if c.capacity == 0 {
            return Err(invalid("cache.capacity must be positive"));
        }
        if !(c.grid_size.is_finite() && c.grid_size > 0.0) {
            return Err(invalid("cache.grid_size must be positive"));
        }

        let b = &self.breaker;
        if b.failure_threshold == 0 {
            return Err(invalid("breaker.failure_threshold must be positive"));
        }
        if b.failure_window.is_zero() {
            return Err(invalid("breaker.failure_window must be positive"));
        }

        Ok(())
    }

    pub fn with_breaker(mut self, breaker: BreakerConfig) -> Self {
        self.breaker = breaker;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_operations(mut self, operations: OperationConfig) -> Self {
        self.operations = operations;
        self
    }
}

fn invalid(message: &str) -> FogError {
    FogError::Configuration(message.to_string())
}
