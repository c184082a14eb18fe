//! Conversion between GeoJSON geometry and `geo` types.

use super::feature::{Geometry, Ring};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};

fn ring_to_line_string(ring: &Ring) -> LineString<f64> {
    LineString::new(ring.iter().map(|&[x, y]| Coord { x, y }).collect())
}

fn line_string_to_ring(line: &LineString<f64>) -> Ring {
    line.coords().map(|c| [c.x, c.y]).collect()
}

fn rings_to_polygon(rings: &[Ring]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    Some(Polygon::new(
        ring_to_line_string(exterior),
        holes.iter().map(ring_to_line_string).collect(),
    ))
}

fn polygon_to_rings(polygon: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_string_to_ring)
        .collect()
}

/// Converts polygonal GeoJSON geometry into a `geo` multipolygon.
///
/// Polygons without an exterior ring are skipped.
pub fn to_multi_polygon(geometry: &Geometry) -> MultiPolygon<f64> {
    MultiPolygon::new(
        geometry
            .polygons()
            .into_iter()
            .filter_map(rings_to_polygon)
            .collect(),
    )
}

/// Converts a `geo` multipolygon back into GeoJSON geometry.
///
/// A single polygon is returned as `Polygon`, several as `MultiPolygon`.
/// Returns `None` when there is nothing left: every polygon empty.
pub fn from_multi_polygon(multi: &MultiPolygon<f64>) -> Option<Geometry> {
    let mut polygons: Vec<Vec<Ring>> = multi
        .0
        .iter()
        .filter(|p| !p.exterior().0.is_empty())
        .map(polygon_to_rings)
        .collect();

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(|coordinates| Geometry::Polygon { coordinates }),
        _ => Some(Geometry::MultiPolygon {
            coordinates: polygons,
        }),
    }
}
