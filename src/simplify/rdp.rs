//! Ramer-Douglas-Peucker polyline simplification.
//!
//! The RDP algorithm recursively simplifies a polyline by removing points
//! that are within a specified tolerance of the line segment connecting
//! the endpoints.
//!
//! Time complexity: O(n²) worst case, O(n log n) typical.

use crate::primitives::{Point2, Segment2};
use num_traits::Float;

/// Simplifies a polyline using the Ramer-Douglas-Peucker algorithm.
///
/// The first and last points are always preserved.
///
/// # Arguments
///
/// * `points` - The input polyline
/// * `epsilon` - Distance tolerance. Points within this distance of the
///   simplified line are removed.
///
/// # Example
///
/// ```
/// use fogmap::primitives::Point2;
/// use fogmap::simplify::rdp;
///
/// let points = vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.1),  // Close to the line, will be removed
///     Point2::new(2.0, 0.0),
///     Point2::new(3.0, 2.0),  // Far from line, will be kept
///     Point2::new(4.0, 0.0),
/// ];
///
/// let simplified = rdp(&points, 0.5);
/// assert!(simplified.len() < points.len());
/// ```
pub fn rdp<F: Float>(points: &[Point2<F>], epsilon: F) -> Vec<Point2<F>> {
    rdp_indices(points, epsilon)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

/// Simplifies a polyline and returns the indices of retained points, in order.
///
/// Always includes index 0 and the last index if the input has >= 2 points.
pub fn rdp_indices<F: Float>(points: &[Point2<F>], epsilon: F) -> Vec<usize> {
    let n = points.len();
    if n < 2 {
        return (0..n).collect();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    rdp_recursive(points, 0, n - 1, epsilon, &mut keep);

    keep.iter()
        .enumerate()
        .filter_map(|(i, &k)| k.then_some(i))
        .collect()
}

/// Processes the span from `start` to `end` (inclusive).
fn rdp_recursive<F: Float>(
    points: &[Point2<F>],
    start: usize,
    end: usize,
    epsilon: F,
    keep: &mut [bool],
) {
    if end <= start + 1 {
        return;
    }

    // On a closed ring points[start] == points[end], so the chord
    // degenerates to a point and distances become radial.
    let chord = Segment2::new(points[start], points[end]);
    let mut max_dist = F::zero();
    let mut max_idx = start;

    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let dist = chord.distance_to_point(p);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        keep[max_idx] = true;
        rdp_recursive(points, start, max_idx, epsilon, keep);
        rdp_recursive(points, max_idx, end, epsilon, keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rdp_trivial_inputs() {
        let empty: Vec<Point2<f64>> = vec![];
        assert!(rdp(&empty, 1.0).is_empty());

        let single = vec![Point2::new(1.0, 2.0)];
        assert_eq!(rdp(&single, 1.0), single);

        let pair = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)];
        assert_eq!(rdp(&pair, 1.0).len(), 2);
    }

    #[test]
    fn test_rdp_straight_line() {
        let points: Vec<Point2<f64>> = (0..5).map(|i| Point2::new(i as f64, i as f64)).collect();
        let result = rdp(&points, 0.1);
        assert_eq!(result, vec![points[0], points[4]]);
    }

    #[test]
    fn test_rdp_keeps_corner() {
        let points: Vec<Point2<f64>> = vec![
            Point2::new(0.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(5.0, 5.0),
        ];
        assert_eq!(rdp(&points, 0.1).len(), 3);
    }

    #[test]
    fn test_rdp_gps_like_track() {
        let points: Vec<Point2<f64>> = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.1),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.1),
            Point2::new(4.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(6.0, 3.1),
            Point2::new(7.0, 3.0),
            Point2::new(8.0, 0.0),
            Point2::new(9.0, 0.1),
            Point2::new(10.0, 0.0),
        ];

        let result = rdp(&points, 0.5);
        assert!(result.len() < points.len());
        assert_relative_eq!(result.first().unwrap().x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.last().unwrap().x, 10.0, epsilon = 1e-10);
        assert!(result.iter().any(|p| (p.y - 3.0).abs() < 0.5));
    }

    #[test]
    fn test_rdp_indices_closed_ring() {
        // Square ring with a redundant midpoint on the bottom edge
        let ring: Vec<Point2<f64>> = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let indices = rdp_indices(&ring, 0.01);
        assert_eq!(indices, vec![0, 2, 3, 4, 5]);
    }
}
