//! Zoom-dependent level of detail for viewport queries.

use crate::config::IndexConfig;
use crate::geojson::{Feature, Geometry};
use crate::polygon::geometry_bounds;
use crate::simplify::{bbox_ring, simplify_geometry};
use serde::{Deserialize, Serialize};

/// How much detail a viewport query should return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelOfDetail {
    /// Web-mercator zoom level; fractional zooms are allowed.
    pub zoom: f64,
    /// Upper bound on the total vertex count of the returned areas.
    pub vertex_budget: usize,
}

impl LevelOfDetail {
    pub fn new(zoom: f64, vertex_budget: usize) -> Self {
        Self {
            zoom,
            vertex_budget,
        }
    }

    /// Width of one screen pixel in degrees at this zoom.
    ///
    /// # Example
    ///
    /// ```
    /// use fogmap::spatial::LevelOfDetail;
    ///
    /// let lod = LevelOfDetail::new(0.0, 1_000);
    /// assert_eq!(lod.pixel_size(256.0), 360.0 / 256.0);
    /// assert_eq!(LevelOfDetail::new(1.0, 1_000).pixel_size(256.0), 180.0 / 256.0);
    /// ```
    pub fn pixel_size(&self, tile_size: f64) -> f64 {
        360.0 / (tile_size * self.zoom.clamp(0.0, 30.0).exp2())
    }
}

fn total_vertices(areas: &[Feature]) -> usize {
    areas.iter().map(|a| a.geometry.vertex_count()).sum()
}

/// Reduces `areas` to what is visible at the requested detail.
///
/// Areas narrower than `lod_min_pixels` pixels become their bounding
/// rectangle. If the result still exceeds the vertex budget every area is
/// simplified, doubling the tolerance from one pixel until the budget holds
/// or `max_lod_rounds` is reached.
pub fn apply_level_of_detail(
    areas: Vec<Feature>,
    lod: LevelOfDetail,
    config: &IndexConfig,
) -> Vec<Feature> {
    let pixel = lod.pixel_size(config.tile_size);
    let min_extent = pixel * config.lod_min_pixels;

    let coarse: Vec<Feature> = areas
        .into_iter()
        .map(|area| {
            let tiny = geometry_bounds(&area.geometry).is_some_and(|b| b.max_extent() < min_extent);
            match bbox_ring(&area.geometry) {
                Some(ring) if tiny => Feature {
                    geometry: Geometry::Polygon {
                        coordinates: vec![ring],
                    },
                    ..area
                },
                _ => area,
            }
        })
        .collect();

    let mut total = total_vertices(&coarse);
    if total <= lod.vertex_budget {
        return coarse;
    }

    let mut tolerance = pixel;
    let mut result = coarse.clone();
    for _ in 0..config.max_lod_rounds {
        result = coarse
            .iter()
            .map(|area| Feature {
                geometry: simplify_geometry(&area.geometry, tolerance),
                ..area.clone()
            })
            .collect();
        total = total_vertices(&result);
        if total <= lod.vertex_budget {
            break;
        }
        tolerance *= 2.0;
    }

    tracing::debug!(
        zoom = lod.zoom,
        budget = lod.vertex_budget,
        vertices = total,
        tolerance,
        "applied level of detail"
    );
    result
}
