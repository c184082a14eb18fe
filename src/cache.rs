//! LRU cache of fog results keyed by quantized viewport.
//!
//! Signatures snap viewport bounds onto a grid so that viewports differing
//! only by sub-grid jitter share an entry. The cache carries a version that
//! is part of every signature: bumping it invalidates everything in O(1),
//! stale entries simply age out of the LRU.
//!
//! Everything else that shapes a result belongs in the signature too: the
//! level of detail it was reduced to and whether the spatial index chose
//! its candidates.

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::fog::{FogResult, PerformanceMode};
use crate::geojson::Viewport;
use crate::spatial::LevelOfDetail;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Instant;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(n) => n,
    None => unreachable!(),
};

const DEFAULT_GRID_SIZE: f64 = 1e-4;

/// Zoom levels are keyed in hundredths.
const ZOOM_STEPS: f64 = 100.0;

/// Key of a cached fog result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheSignature {
    /// Viewport bounds as multiples of the grid size.
    pub cells: [i64; 4],
    pub mode: PerformanceMode,
    /// Zoom of the level of detail applied, in hundredths of a level.
    pub lod_zoom: Option<i64>,
    /// Candidates came from the spatial index rather than the full set.
    pub optimized: bool,
    pub version: u64,
}

impl CacheSignature {
    /// Keys the signature on the level of detail the result is reduced to.
    pub fn with_level_of_detail(mut self, lod: Option<LevelOfDetail>) -> Self {
        self.lod_zoom = lod.map(|lod| (lod.zoom.clamp(0.0, 30.0) * ZOOM_STEPS).round() as i64);
        self
    }

    pub fn with_optimization(mut self, optimized: bool) -> Self {
        self.optimized = optimized;
        self
    }
}

/// Hit and miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub version: u64,
    pub len: usize,
}

#[derive(Debug)]
struct CacheEntry {
    result: FogResult,
    inserted_at: Instant,
}

/// Bounded LRU of fog results with optional expiry.
pub struct FogCache<C: Clock = SystemClock> {
    inner: LruCache<CacheSignature, CacheEntry>,
    config: CacheConfig,
    clock: C,
    version: u64,
    hits: u64,
    misses: u64,
}

impl FogCache<SystemClock> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for FogCache<SystemClock> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<C: Clock> FogCache<C> {
    /// A zero capacity falls back to the default of 50 entries, a grid size
    /// that is not a positive number to the default of 1e-4 degrees.
    pub fn with_clock(mut config: CacheConfig, clock: C) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(DEFAULT_CAPACITY);
        if !(config.grid_size.is_finite() && config.grid_size > 0.0) {
            tracing::warn!(grid_size = config.grid_size, "unusable cache grid size, using default");
            config.grid_size = DEFAULT_GRID_SIZE;
        }
        Self {
            inner: LruCache::new(capacity),
            config,
            clock,
            version: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Builds the signature of a viewport at the current version.
    ///
    /// The signature assumes no level of detail and index-selected
    /// candidates; see [`CacheSignature::with_level_of_detail`] and
    /// [`CacheSignature::with_optimization`].
    ///
    /// # Example
    ///
    /// ```
    /// use fogmap::cache::FogCache;
    /// use fogmap::fog::PerformanceMode;
    /// use fogmap::geojson::Viewport;
    ///
    /// let cache = FogCache::default();
    /// let a = Viewport::new(10.0, 20.0, 11.0, 21.0).unwrap();
    /// let b = Viewport::new(10.000_01, 20.0, 11.0, 21.000_02).unwrap();
    /// assert_eq!(
    ///     cache.signature(&a, PerformanceMode::Accurate),
    ///     cache.signature(&b, PerformanceMode::Accurate),
    /// );
    /// ```
    pub fn signature(&self, viewport: &Viewport, mode: PerformanceMode) -> CacheSignature {
        let grid = self.config.grid_size;
        let cells = viewport.bounds().map(|v| (v / grid).round() as i64);
        CacheSignature {
            cells,
            mode,
            lod_zoom: None,
            optimized: true,
            version: self.version,
        }
    }

    /// Looks up a result, promoting it to most recently used.
    ///
    /// Entries older than `max_age` miss and are removed.
    pub fn get(&mut self, signature: &CacheSignature) -> Option<FogResult> {
        let now = self.clock.now();
        let max_age = self.config.max_age;

        let fresh = match self.inner.get(signature) {
            Some(entry) => max_age
                .map_or(true, |age| now.saturating_duration_since(entry.inserted_at) < age)
                .then(|| entry.result.clone()),
            None => {
                self.misses += 1;
                return None;
            }
        };

        match fresh {
            Some(result) => {
                self.hits += 1;
                Some(result)
            }
            None => {
                self.inner.pop(signature);
                self.misses += 1;
                None
            }
        }
    }

    /// Stores a result, evicting the least recently used entry when full.
    pub fn put(&mut self, signature: CacheSignature, result: FogResult) {
        let entry = CacheEntry {
            result,
            inserted_at: self.clock.now(),
        };
        if let Some((evicted, _)) = self.inner.push(signature, entry) {
            if evicted != signature {
                tracing::debug!(?evicted, "fog cache evicted least recently used entry");
            }
        }
    }

    /// Invalidates every entry by bumping the version.
    pub fn invalidate(&mut self) {
        self.version += 1;
        tracing::debug!(version = self.version, "fog cache invalidated");
    }

    /// Removes the entries matching `predicate` and returns how many.
    pub fn invalidate_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&CacheSignature, &FogResult) -> bool,
    {
        let doomed: Vec<CacheSignature> = self
            .inner
            .iter()
            .filter(|(signature, entry)| predicate(signature, &entry.result))
            .map(|(signature, _)| *signature)
            .collect();
        for signature in &doomed {
            self.inner.pop(signature);
        }
        doomed.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drops every entry and resets the counters. The version is kept so
    /// signatures built before the call still miss.
    pub fn clear(&mut self) {
        self.inner.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            version: self.version,
            len: self.inner.len(),
        }
    }
}

impl<C: Clock> std::fmt::Debug for FogCache<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FogCache")
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.cap())
            .field("version", &self.version)
            .finish()
    }
}
