//! Viewport index over revealed areas with bounded memory.

use super::bvh::{Bounded, Bvh};
use super::lod::{apply_level_of_detail, LevelOfDetail};
use crate::bounds::Aabb2;
use crate::config::IndexConfig;
use crate::error::{FogError, Result};
use crate::geojson::{Feature, Viewport};
use crate::polygon::geometry_bounds;
use crate::simplify::simplify_geometry;

/// Stable identifier of an indexed area.
pub type AreaId = usize;

#[derive(Debug, Clone)]
struct IndexEntry {
    bounds: Option<Aabb2<f64>>,
    /// `None` once evicted; the bounds stay so queries still find it.
    geometry: Option<Feature>,
    simplified: bool,
    last_queried: u64,
    vertex_count: usize,
}

impl IndexEntry {
    fn new(feature: Feature) -> Self {
        Self {
            bounds: geometry_bounds(&feature.geometry),
            vertex_count: feature.geometry.vertex_count(),
            geometry: Some(feature),
            simplified: false,
            last_queried: 0,
        }
    }

    fn hot_vertices(&self) -> usize {
        if self.geometry.is_some() {
            self.vertex_count
        } else {
            0
        }
    }
}

/// A located entry as seen by the BVH.
#[derive(Debug, Clone, Copy)]
struct Located {
    id: AreaId,
    bounds: Aabb2<f64>,
}

impl Bounded<f64> for Located {
    fn bounds(&self) -> Aabb2<f64> {
        self.bounds
    }
}

/// Areas returned by [`SpatialIndex::query_viewport`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportQuery {
    /// Geometry of every resident area intersecting the viewport.
    pub areas: Vec<Feature>,
    /// Ids of intersecting areas whose geometry was evicted. Supply it again
    /// with [`SpatialIndex::rehydrate`].
    pub evicted: Vec<AreaId>,
}

/// Broad-phase index answering "which areas touch this viewport".
///
/// Only bounding boxes are compared; exact intersection is left to the
/// boolean operations. Inserts mark the tree stale and the next query
/// rebuilds it.
///
/// # Example
///
/// ```
/// use fogmap::geojson::{Feature, Viewport};
/// use fogmap::spatial::SpatialIndex;
///
/// let square = |x: f64| Feature::polygon(vec![vec![
///     [x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0], [x, 0.0],
/// ]]);
///
/// let mut index = SpatialIndex::default();
/// index.rebuild(&[square(0.0), square(10.0), square(20.0)]);
///
/// let query = index.query_viewport(&Viewport::new(9.0, -1.0, 12.0, 2.0).unwrap(), None);
/// assert_eq!(query.areas, vec![square(10.0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    config: IndexConfig,
    entries: Vec<IndexEntry>,
    located: Vec<Located>,
    bvh: Bvh<f64>,
    dirty: bool,
    clock: u64,
}

impl SpatialIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Adds an area and returns its id.
    pub fn insert(&mut self, feature: Feature) -> AreaId {
        let id = self.entries.len();
        self.entries.push(IndexEntry::new(feature));
        self.dirty = true;
        id
    }

    /// Replaces the whole content. Ids equal positions in `features`.
    pub fn rebuild(&mut self, features: &[Feature]) {
        self.clear();
        self.entries = features.iter().cloned().map(IndexEntry::new).collect();
        self.dirty = true;
        self.ensure_built();
        tracing::debug!(areas = self.entries.len(), "rebuilt spatial index");
    }

    /// Supplies the geometry of an evicted area again.
    pub fn rehydrate(&mut self, id: AreaId, feature: Feature) -> Result<()> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| FogError::Configuration(format!("unknown area id {id}")))?;

        let bounds = geometry_bounds(&feature.geometry);
        if bounds != entry.bounds {
            self.dirty = true;
        }
        entry.bounds = bounds;
        entry.vertex_count = feature.geometry.vertex_count();
        entry.geometry = Some(feature);
        entry.simplified = false;
        Ok(())
    }

    /// Number of indexed areas, evicted ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vertices currently held in memory.
    pub fn hot_vertex_count(&self) -> usize {
        self.entries.iter().map(IndexEntry::hot_vertices).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.located.clear();
        self.bvh = Bvh::default();
        self.dirty = false;
    }

    fn ensure_built(&mut self) {
        if !self.dirty {
            return;
        }
        self.located = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(id, e)| e.bounds.map(|bounds| Located { id, bounds }))
            .collect();
        self.bvh = Bvh::build(&self.located, self.config.max_leaf_size);
        self.dirty = false;
    }

    /// Returns the areas whose bounding box intersects the viewport.
    ///
    /// With a level of detail the areas are reduced for display (see
    /// [`apply_level_of_detail`]); stored geometry is never modified by it.
    /// Afterwards the memory bound is enforced.
    pub fn query_viewport(&mut self, viewport: &Viewport, lod: Option<LevelOfDetail>) -> ViewportQuery {
        self.ensure_built();
        self.clock += 1;

        let mut ids: Vec<AreaId> = self
            .bvh
            .query_aabb(&self.located, viewport.to_aabb())
            .into_iter()
            .map(|i| self.located[i].id)
            .collect();
        ids.sort_unstable();

        let mut query = ViewportQuery::default();
        for id in ids {
            let entry = &mut self.entries[id];
            entry.last_queried = self.clock;
            match &entry.geometry {
                Some(feature) => query.areas.push(feature.clone()),
                None => query.evicted.push(id),
            }
        }

        if let Some(lod) = lod {
            query.areas = apply_level_of_detail(query.areas, lod, &self.config);
        }

        self.enforce_memory_bound();
        query
    }

    /// Keeps the hot vertex count under `max_hot_vertices`.
    ///
    /// Least recently queried entries are simplified first; if that is not
    /// enough they are evicted in the same order.
    fn enforce_memory_bound(&mut self) {
        let limit = self.config.max_hot_vertices;
        let mut hot = self.hot_vertex_count();
        if hot <= limit {
            return;
        }

        let mut coldest: Vec<AreaId> = (0..self.entries.len())
            .filter(|&id| self.entries[id].geometry.is_some())
            .collect();
        coldest.sort_by_key(|&id| self.entries[id].last_queried);

        for &id in &coldest {
            if hot <= limit {
                return;
            }
            let entry = &mut self.entries[id];
            if entry.simplified {
                continue;
            }
            if let Some(feature) = entry.geometry.as_mut() {
                feature.geometry =
                    simplify_geometry(&feature.geometry, self.config.cold_simplify_tolerance);
                let count = feature.geometry.vertex_count();
                hot -= entry.vertex_count - count;
                entry.vertex_count = count;
                entry.simplified = true;
            }
        }

        let mut evicted = 0usize;
        for &id in &coldest {
            if hot <= limit {
                break;
            }
            let entry = &mut self.entries[id];
            entry.geometry = None;
            hot -= entry.vertex_count;
            evicted += 1;
        }

        if evicted > 0 {
            tracing::info!(evicted, hot_vertices = hot, limit, "evicted cold areas from spatial index");
        }
    }
}
