//! 2D line segment type.

use super::{Point2, Vec2};
use num_traits::Float;

/// A 2D line segment defined by two endpoints.
///
/// Used by the simplifiers to measure how far a vertex strays from the chord
/// that would replace it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2<F> {
    pub start: Point2<F>,
    pub end: Point2<F>,
}

impl<F: Float> Segment2<F> {
    /// Creates a new segment from two points.
    #[inline]
    pub fn new(start: Point2<F>, end: Point2<F>) -> Self {
        Self { start, end }
    }

    /// Returns the direction vector from start to end.
    #[inline]
    pub fn direction(self) -> Vec2<F> {
        self.end - self.start
    }

    /// Computes the closest point on the segment to `p`.
    ///
    /// Returns the closest point and its parameter `t` in [0, 1]. A degenerate
    /// segment (start == end) behaves as a single point.
    pub fn closest_point(self, p: Point2<F>) -> (Point2<F>, F) {
        let v = self.direction();
        let len_sq = v.magnitude_squared();

        if len_sq <= F::epsilon() {
            return (self.start, F::zero());
        }

        let t = (p - self.start).dot(v) / len_sq;
        let t = t.max(F::zero()).min(F::one());

        (self.start.lerp(self.end, t), t)
    }

    /// Distance from `p` to the nearest point of the segment.
    #[inline]
    pub fn distance_to_point(self, p: Point2<F>) -> F {
        let (closest, _) = self.closest_point(p);
        p.distance(closest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let s: Segment2<f64> = Segment2::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));

        let (above, t) = s.closest_point(Point2::new(5.0, 5.0));
        assert_relative_eq!(above.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(t, 0.5, epsilon = 1e-12);

        let (before, t) = s.closest_point(Point2::new(-5.0, 1.0));
        assert_eq!(before, Point2::new(0.0, 0.0));
        assert_eq!(t, 0.0);

        let (after, t) = s.closest_point(Point2::new(15.0, -1.0));
        assert_eq!(after, Point2::new(10.0, 0.0));
        assert_eq!(t, 1.0);
    }

    #[test]
    fn test_distance_to_point() {
        let s: Segment2<f64> = Segment2::new(Point2::new(0.0, 0.0), Point2::new(0.0, 4.0));
        assert_relative_eq!(s.distance_to_point(Point2::new(3.0, 2.0)), 3.0, epsilon = 1e-12);
        assert_relative_eq!(s.distance_to_point(Point2::new(0.0, 7.0)), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_segment() {
        let s: Segment2<f64> = Segment2::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert_relative_eq!(s.distance_to_point(Point2::new(4.0, 5.0)), 5.0, epsilon = 1e-12);
    }
}
