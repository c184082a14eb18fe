//! Simplification of closed rings and polygonal geometry.

use super::rdp::rdp_indices;
use crate::geojson::{Geometry, Position, Ring};
use crate::polygon::MIN_RING_POSITIONS;
use crate::primitives::Point2;

/// Simplifies a closed ring with RDP at `tolerance` degrees.
///
/// The ring stays closed. If simplification would leave fewer than four
/// positions the ring is returned unchanged, so a valid ring stays valid.
pub fn simplify_ring(ring: &[Position], tolerance: f64) -> Ring {
    if ring.len() <= MIN_RING_POSITIONS {
        return ring.to_vec();
    }

    let points: Vec<Point2<f64>> = ring.iter().map(|&p| Point2::from_position(p)).collect();
    let kept: Ring = rdp_indices(&points, tolerance)
        .into_iter()
        .map(|i| ring[i])
        .collect();

    if kept.len() < MIN_RING_POSITIONS {
        ring.to_vec()
    } else {
        kept
    }
}

/// Simplifies every ring of polygonal geometry, preserving its kind.
pub fn simplify_geometry(geometry: &Geometry, tolerance: f64) -> Geometry {
    geometry.map_rings(|ring| simplify_ring(ring, tolerance))
}

/// The bounding rectangle of the geometry's exteriors as a single ring.
///
/// Used as the coarsest level of detail for areas smaller than a pixel.
pub fn bbox_ring(geometry: &Geometry) -> Option<Ring> {
    let bounds = crate::polygon::geometry_bounds(geometry)?;
    let [min_x, min_y, max_x, max_y] = bounds.to_bounds();
    Some(vec![
        [min_x, min_y],
        [max_x, min_y],
        [max_x, max_y],
        [min_x, max_y],
        [min_x, min_y],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::Feature;
    use crate::polygon::{ring_is_closed, validate};

    /// A circle-like ring with `n` distinct vertices.
    fn circle(n: usize, radius: f64) -> Ring {
        let mut ring: Ring = (0..n)
            .map(|i| {
                let a = i as f64 / n as f64 * std::f64::consts::TAU;
                [radius * a.cos(), radius * a.sin()]
            })
            .collect();
        ring.push(ring[0]);
        ring
    }

    #[test]
    fn test_simplify_ring_reduces_and_stays_closed() {
        let ring = circle(200, 1.0);
        let simplified = simplify_ring(&ring, 0.05);
        assert!(simplified.len() < ring.len());
        assert!(simplified.len() >= MIN_RING_POSITIONS);
        assert!(ring_is_closed(&simplified));
    }

    #[test]
    fn test_simplify_ring_never_collapses() {
        let ring = circle(8, 1e-4);
        let simplified = simplify_ring(&ring, 10.0);
        assert_eq!(simplified, ring);
    }

    #[test]
    fn test_simplify_geometry_stays_valid() {
        let feature = Feature::polygon(vec![circle(500, 2.0), circle(100, 0.5)]);
        let simplified = Feature::new(simplify_geometry(&feature.geometry, 0.01));
        assert!(validate(&simplified).is_valid);
        assert!(simplified.geometry.vertex_count() < feature.geometry.vertex_count());
    }

    #[test]
    fn test_bbox_ring() {
        let geometry = Geometry::Polygon {
            coordinates: vec![circle(16, 1.0)],
        };
        let ring = bbox_ring(&geometry).unwrap();
        assert_eq!(ring.len(), 5);
        assert!(ring_is_closed(&ring));
        assert_eq!(ring[0], [-1.0, ring[0][1]]);
        assert!(bbox_ring(&Geometry::Polygon { coordinates: Vec::new() }).is_none());
    }
}
