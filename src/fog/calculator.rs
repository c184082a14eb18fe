//! Tiered fog calculation.

use super::options::{FallbackStrategy, FogOptions, PerformanceMode};
use super::result::{FogMetrics, FogResult, FogTier};
use crate::breaker::{CircuitBreaker, CircuitState};
use crate::cache::{CacheStats, FogCache};
use crate::clock::{Clock, SystemClock};
use crate::config::FogConfig;
use crate::error::{FogError, Result};
use crate::geojson::{Feature, FeatureCollection, Viewport};
use crate::ops::GeometryEngine;
use crate::polygon::ComplexityLevel;
use crate::spatial::{apply_level_of_detail, LevelOfDetail, SpatialIndex};
use crate::store::RevealedAreaStore;
use rustc_hash::FxHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Hash of every coordinate of the revealed set.
fn fingerprint(revealed: &[Feature]) -> u64 {
    let mut hasher = FxHasher::default();
    revealed.len().hash(&mut hasher);
    for feature in revealed {
        for ring in feature.geometry.rings() {
            ring.len().hash(&mut hasher);
            for [lon, lat] in ring {
                lon.to_bits().hash(&mut hasher);
                lat.to_bits().hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

/// Zoom at which the viewport spans one tile, for fast mode without a zoom.
fn zoom_for(viewport: &Viewport) -> f64 {
    (360.0 / viewport.width()).log2().max(0.0)
}

/// Log class of a panic caught around the whole tier chain.
const PANIC_CLASS: &str = "panic";

/// A primary result and the problems it was computed despite.
type Primary = (FogResult, Vec<FogError>);

struct State<C: Clock> {
    cache: FogCache<C>,
    index: SpatialIndex,
    breaker: CircuitBreaker<C>,
    fingerprint: Option<u64>,
    /// Failure classes already logged at warn level this session.
    logged_classes: HashSet<&'static str>,
}

/// Computes fog for a viewport: the viewport minus everything revealed.
///
/// Results are cached per viewport. The expensive primary computation runs
/// behind a circuit breaker; when it fails or is skipped the calculator
/// falls back to the viewport rectangle, then to the world rectangle. No
/// call panics or returns an error: problems are reported in
/// [`FogMetrics`].
///
/// # Example
///
/// ```
/// use fogmap::fog::{get_default_options, FogCalculator, FogTier};
///
/// let calculator = FogCalculator::default();
/// let result = calculator.calculate(None, &get_default_options(Some([-1.0, -1.0, 1.0, 1.0])));
///
/// assert_eq!(result.metrics.tier, FogTier::Primary);
/// assert!(!result.metrics.fallback_used);
/// assert_eq!(result.collection.len(), 1);
/// ```
pub struct FogCalculator<C: Clock + Clone = SystemClock> {
    config: FogConfig,
    engine: GeometryEngine,
    state: Mutex<State<C>>,
}

impl FogCalculator<SystemClock> {
    pub fn new(config: FogConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for FogCalculator<SystemClock> {
    fn default() -> Self {
        Self::new(FogConfig::default())
    }
}

impl<C: Clock + Clone> FogCalculator<C> {
    /// Creates a calculator whose breaker and cache read time from `clock`.
    ///
    /// An invalid configuration is logged; unusable cache settings fall back
    /// to their defaults.
    pub fn with_clock(config: FogConfig, clock: C) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "invalid fog configuration");
        }
        let state = State {
            cache: FogCache::with_clock(config.cache.clone(), clock.clone()),
            index: SpatialIndex::new(config.index.clone()),
            breaker: CircuitBreaker::with_clock(config.breaker.clone(), clock),
            fingerprint: None,
            logged_classes: HashSet::new(),
        };
        Self {
            engine: GeometryEngine::from_config(&config),
            config,
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &FogConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Computes the fog for `options.viewport_bounds`.
    ///
    /// `revealed` are the visited areas; `None` means nothing was visited.
    pub fn calculate(&self, revealed: Option<&[Feature]>, options: &FogOptions) -> FogResult {
        let started = Instant::now();
        let revealed = revealed.unwrap_or(&[]);

        let mut result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.calculate_tiers(revealed, options)
        }))
        .unwrap_or_else(|_| {
            if self.lock().logged_classes.insert(PANIC_CLASS) {
                tracing::error!("fog calculation panicked, returning emergency world fog");
            } else {
                tracing::debug!("fog calculation panicked again");
            }
            let mut result = FogResult::world(FogTier::Emergency);
            result
                .metrics
                .errors
                .push(FogError::Operation("fog calculation panicked".into()));
            result
        });

        let input_vertex_count = revealed.iter().map(|f| f.geometry.vertex_count()).sum();
        let metrics = &mut result.metrics;
        metrics.execution_time = started.elapsed();
        metrics.input_vertex_count = input_vertex_count;
        metrics.output_vertex_count = result.collection.vertex_count();
        metrics.complexity = ComplexityLevel::classify(input_vertex_count, &self.config.validation);

        tracing::debug!(
            tier = ?result.metrics.tier,
            cache_hit = result.metrics.cache_hit,
            elapsed_us = result.metrics.execution_time.as_micros() as u64,
            input_vertices = input_vertex_count,
            output_vertices = result.metrics.output_vertex_count,
            "fog calculated"
        );
        result
    }

    /// Reads the revealed areas from `store`, then calculates.
    ///
    /// A store failure degrades to the fallback chain with a warning.
    pub async fn calculate_from_store(
        &self,
        store: &dyn RevealedAreaStore,
        options: &FogOptions,
    ) -> FogResult {
        match store.list().await {
            Ok(areas) => self.calculate(Some(&areas[..]), options),
            Err(e) => {
                let started = Instant::now();
                let mut state = self.lock();
                self.log_once(&mut state, &e);
                drop(state);

                let viewport = options.viewport().and_then(|v| v.ok());
                let mut result = self.fallback(viewport, options.fallback_strategy, vec![e]);
                result
                    .metrics
                    .warnings
                    .push("revealed areas unavailable, showing fallback fog".into());
                result.metrics.output_vertex_count = result.collection.vertex_count();
                result.metrics.execution_time = started.elapsed();
                result
            }
        }
    }

    /// Forgets cached results, indexed areas, breaker state and logged
    /// failure classes.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.cache.clear();
        state.cache.invalidate();
        state.index.clear();
        state.breaker.reset();
        state.fingerprint = None;
        state.logged_classes.clear();
        tracing::info!("fog calculator reset");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock().cache.stats()
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.lock().breaker.state()
    }

    fn log_once(&self, state: &mut State<C>, error: &FogError) {
        if state.logged_classes.insert(error.class()) {
            tracing::warn!(class = error.class(), %error, "fog calculation degraded");
        } else {
            tracing::debug!(class = error.class(), %error, "fog calculation degraded again");
        }
    }

    /// Rebuilds the index and invalidates the cache when the revealed set changed.
    fn sync_revealed(&self, state: &mut State<C>, revealed: &[Feature]) {
        let current = fingerprint(revealed);
        if state.fingerprint == Some(current) {
            return;
        }
        state.index.rebuild(revealed);
        state.cache.invalidate();
        state.fingerprint = Some(current);
    }

    fn calculate_tiers(&self, revealed: &[Feature], options: &FogOptions) -> FogResult {
        let mut guard = self.lock();
        let state = &mut *guard;
        self.sync_revealed(state, revealed);

        let mut errors = Vec::new();
        let viewport = match options.viewport() {
            Some(Ok(viewport)) => viewport,
            Some(Err(e)) => {
                self.log_once(state, &e);
                errors.push(e);
                return self.world_fog(errors);
            }
            None => return self.world_fog(errors),
        };

        let lod = self.level_of_detail(&viewport, options);
        let signature = state
            .cache
            .signature(&viewport, options.performance_mode)
            .with_optimization(options.use_viewport_optimization)
            .with_level_of_detail(lod);
        if let Some(mut hit) = state.cache.get(&signature) {
            hit.metrics.cache_hit = true;
            return hit;
        }

        let State { breaker, index, .. } = &mut *state;
        let primary =
            breaker.execute(|| self.primary_tier(index, revealed, &viewport, lod, options));

        match primary {
            Ok((result, skipped)) => {
                for e in &skipped {
                    self.log_once(state, e);
                }
                state.cache.put(signature, result.clone());
                result
            }
            Err(e) => {
                self.log_once(state, &e);
                errors.push(e);
                self.fallback(Some(viewport), options.fallback_strategy, errors)
            }
        }
    }

    /// Detail the index reduces candidates to: fast mode with optimization only.
    fn level_of_detail(&self, viewport: &Viewport, options: &FogOptions) -> Option<LevelOfDetail> {
        let reduce = options.performance_mode == PerformanceMode::Fast
            && options.use_viewport_optimization;
        reduce.then(|| {
            LevelOfDetail::new(
                options.zoom.unwrap_or_else(|| zoom_for(viewport)),
                self.config.index.default_vertex_budget,
            )
        })
    }

    fn world_fog(&self, errors: Vec<FogError>) -> FogResult {
        let mut result = FogResult::world(FogTier::WorldFog);
        result.metrics.errors = errors;
        result
    }

    /// Everything after a failed or skipped primary tier.
    fn fallback(
        &self,
        viewport: Option<Viewport>,
        strategy: FallbackStrategy,
        errors: Vec<FogError>,
    ) -> FogResult {
        match (strategy, viewport) {
            (FallbackStrategy::Viewport, Some(viewport)) => {
                let mut result = FogResult::covering(&viewport, FogTier::SimplifiedViewport);
                result
                    .metrics
                    .warnings
                    .push("fog calculation failed, showing viewport fog".into());
                result.metrics.errors = errors;
                result
            }
            (FallbackStrategy::None, Some(_)) => FogResult {
                collection: FeatureCollection::empty(),
                metrics: FogMetrics {
                    errors,
                    ..FogMetrics::default()
                },
            },
            _ => self.world_fog(errors),
        }
    }

    /// Viewport minus the union of the revealed areas near it, plus the
    /// inputs the union skipped.
    fn primary_tier(
        &self,
        index: &mut SpatialIndex,
        revealed: &[Feature],
        viewport: &Viewport,
        lod: Option<LevelOfDetail>,
        options: &FogOptions,
    ) -> Result<Primary> {
        let fast = options.performance_mode == PerformanceMode::Fast;
        let candidates = if options.use_viewport_optimization {
            let query = index.query_viewport(viewport, lod);

            let mut rehydrated = Vec::with_capacity(query.evicted.len());
            for id in query.evicted {
                let area = revealed.get(id).cloned().ok_or_else(|| {
                    FogError::Configuration(format!("evicted area {id} missing from revealed set"))
                })?;
                index.rehydrate(id, area.clone())?;
                rehydrated.push(area);
            }
            if let Some(lod) = lod {
                rehydrated = apply_level_of_detail(rehydrated, lod, index.config());
            }

            let mut areas = query.areas;
            areas.extend(rehydrated);
            areas
        } else {
            revealed.to_vec()
        };

        let viewport_feature = viewport.to_feature();
        if candidates.is_empty() {
            let fog = FogResult::new(FeatureCollection::new(vec![viewport_feature]));
            return Ok((fog, Vec::new()));
        }

        let union = self.engine.union(&candidates);
        let Some(mut revealed_union) = union.result else {
            return Err(union
                .errors
                .into_iter()
                .last()
                .unwrap_or_else(|| FogError::Operation("union produced nothing".into())));
        };
        if fast {
            revealed_union = self.engine.bound_complexity(revealed_union);
        }

        let difference = self.engine.difference(&viewport_feature, &revealed_union);
        if let Some(e) = difference.errors.into_iter().next() {
            return Err(e);
        }

        let collection = match difference.result {
            Some(fog) => FeatureCollection::new(vec![fog]),
            None => FeatureCollection::empty(),
        };
        let mut result = FogResult::new(collection);
        result.metrics.warnings = union.warnings;
        Ok((result, union.errors))
    }
}

impl<C: Clock + Clone> std::fmt::Debug for FogCalculator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FogCalculator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
