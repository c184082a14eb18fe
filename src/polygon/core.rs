//! Ring measurements shared by the validator, the index and the engine.

use crate::bounds::Aabb2;
use crate::geojson::{Geometry, Position};
use crate::primitives::Point2;

/// Computes the signed area of a ring using the shoelace formula.
///
/// Positive for CCW winding, negative for CW winding. A closing position
/// equal to the first contributes nothing, so closed and open rings give the
/// same result.
pub fn ring_signed_area(ring: &[Position]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let n = ring.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += ring[i][0] * ring[j][1];
        area -= ring[j][0] * ring[i][1];
    }

    area / 2.0
}

/// Absolute planar area of a ring in square degrees.
pub fn ring_area(ring: &[Position]) -> f64 {
    ring_signed_area(ring).abs()
}

/// Planar area of polygonal geometry: exteriors minus holes.
pub fn geometry_area(geometry: &Geometry) -> f64 {
    geometry
        .polygons()
        .into_iter()
        .map(|rings| match rings.split_first() {
            Some((exterior, holes)) => {
                ring_area(exterior) - holes.iter().map(|h| ring_area(h)).sum::<f64>()
            }
            None => 0.0,
        })
        .sum()
}

/// Bounding box of a ring, `None` when empty.
pub fn ring_bounds(ring: &[Position]) -> Option<Aabb2<f64>> {
    Aabb2::from_points(ring.iter().map(|&p| Point2::from_position(p)))
}

/// Bounding box of every exterior ring of the geometry.
///
/// Holes lie inside their exterior so they never widen the box.
pub fn geometry_bounds(geometry: &Geometry) -> Option<Aabb2<f64>> {
    geometry
        .polygons()
        .into_iter()
        .filter_map(|rings| rings.first())
        .filter_map(|exterior| ring_bounds(exterior))
        .reduce(Aabb2::union)
}

/// Returns `true` if the ring's first and last positions are identical.
pub fn ring_is_closed(ring: &[Position]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() > 1 && first == last,
        _ => false,
    }
}

/// Tests if two segments properly cross (intersect at a single interior point).
fn segments_properly_intersect(a1: Position, a2: Position, b1: Position, b2: Position) -> bool {
    let orient = |p: Position, q: Position, r: Position| {
        (q[0] - p[0]) * (r[1] - p[1]) - (q[1] - p[1]) * (r[0] - p[0])
    };

    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Checks whether any two non-adjacent edges of a closed ring cross.
///
/// Brute force O(n²); callers bound the ring size.
pub fn ring_has_self_intersection(ring: &[Position]) -> bool {
    if ring.len() < 5 {
        return false; // A closed triangle cannot cross itself
    }

    // Edges i -> i+1 over the closed ring; the closing position is not a
    // separate vertex.
    let n = ring.len() - 1;
    for i in 0..n {
        let a1 = ring[i];
        let a2 = ring[i + 1];

        for j in (i + 2)..n {
            // First and last edges share the closing vertex.
            if i == 0 && j == n - 1 {
                continue;
            }

            if segments_properly_intersect(a1, a2, ring[j], ring[j + 1]) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Vec<Position> {
        vec![[0.0, 0.0], [size, 0.0], [size, size], [0.0, size], [0.0, 0.0]]
    }

    #[test]
    fn test_ring_area_winding() {
        let ccw = square(2.0);
        assert_relative_eq!(ring_signed_area(&ccw), 4.0, epsilon = 1e-12);

        let cw: Vec<Position> = ccw.iter().rev().copied().collect();
        assert_relative_eq!(ring_signed_area(&cw), -4.0, epsilon = 1e-12);
        assert_relative_eq!(ring_area(&cw), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ring_area_degenerate() {
        assert_eq!(ring_signed_area(&[[0.0, 0.0], [1.0, 1.0]]), 0.0);
        assert_eq!(ring_area(&[]), 0.0);
    }

    #[test]
    fn test_geometry_area_subtracts_holes() {
        let hole = vec![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 1.0], [1.0, 1.0]];
        let geometry = Geometry::Polygon {
            coordinates: vec![square(4.0), hole],
        };
        assert_relative_eq!(geometry_area(&geometry), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_geometry_bounds_over_polygons() {
        let far: Vec<Position> = square(1.0).iter().map(|p| [p[0] + 10.0, p[1] - 5.0]).collect();
        let geometry = Geometry::MultiPolygon {
            coordinates: vec![vec![square(1.0)], vec![far]],
        };
        let bounds = geometry_bounds(&geometry).unwrap();
        assert_eq!(bounds.to_bounds(), [0.0, -5.0, 11.0, 1.0]);
    }

    #[test]
    fn test_ring_is_closed() {
        assert!(ring_is_closed(&square(1.0)));
        assert!(!ring_is_closed(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]));
        assert!(!ring_is_closed(&[[0.0, 0.0]]));
        assert!(!ring_is_closed(&[]));
    }

    #[test]
    fn test_self_intersection() {
        assert!(!ring_has_self_intersection(&square(1.0)));

        let figure_8 = vec![[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0], [0.0, 0.0]];
        assert!(ring_has_self_intersection(&figure_8));
    }
}
