//! Axis-aligned bounding box.

use crate::primitives::Point2;
use num_traits::Float;

/// A 2D axis-aligned bounding box.
///
/// Defined by minimum and maximum corners. In geographic use the corners are
/// (min lon, min lat) and (max lon, max lat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2<F> {
    /// Minimum corner (smallest x and y values).
    pub min: Point2<F>,
    /// Maximum corner (largest x and y values).
    pub max: Point2<F>,
}

impl<F: Float> Aabb2<F> {
    /// Creates a new AABB from min and max corners.
    ///
    /// Does not validate that min <= max.
    #[inline]
    pub fn new(min: Point2<F>, max: Point2<F>) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from `[min_x, min_y, max_x, max_y]`, the GeoJSON bbox
    /// ordering.
    #[inline]
    pub fn from_bounds(bounds: [F; 4]) -> Self {
        Self {
            min: Point2::new(bounds[0], bounds[1]),
            max: Point2::new(bounds[2], bounds[3]),
        }
    }

    /// Returns `[min_x, min_y, max_x, max_y]`.
    #[inline]
    pub fn to_bounds(self) -> [F; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    /// Creates an AABB containing a single point.
    #[inline]
    pub fn from_point(p: Point2<F>) -> Self {
        Self { min: p, max: p }
    }

    /// Creates an AABB from an iterator of points.
    ///
    /// Returns `None` if the iterator is empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2<F>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::from_point(first), Self::expand_to_include))
    }

    #[inline]
    pub fn width(self) -> F {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> F {
        self.max.y - self.min.y
    }

    /// Returns the larger of width and height.
    #[inline]
    pub fn max_extent(self) -> F {
        self.width().max(self.height())
    }

    /// Returns the center point of the AABB.
    #[inline]
    pub fn center(self) -> Point2<F> {
        self.min.midpoint(self.max)
    }

    /// Returns a new AABB expanded to include the given point.
    #[inline]
    pub fn expand_to_include(self, p: Point2<F>) -> Self {
        Self {
            min: Point2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Returns the smallest AABB containing both.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Returns `true` if this AABB intersects another AABB.
    ///
    /// Touching boxes count as intersecting.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_round_trip_order() {
        let aabb: Aabb2<f64> = Aabb2::from_bounds([-1.0, -2.0, 3.0, 4.0]);
        assert_eq!(aabb.min, Point2::new(-1.0, -2.0));
        assert_eq!(aabb.max, Point2::new(3.0, 4.0));
        assert_eq!(aabb.to_bounds(), [-1.0, -2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_points() {
        let points = vec![
            Point2::new(1.0, 2.0),
            Point2::new(-3.0, 5.0),
            Point2::new(4.0, -1.0),
        ];
        let aabb: Aabb2<f64> = Aabb2::from_points(points).unwrap();
        assert_eq!(aabb.to_bounds(), [-3.0, -1.0, 4.0, 5.0]);
        assert!(Aabb2::<f64>::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_dimensions() {
        let aabb: Aabb2<f64> = Aabb2::from_bounds([0.0, 0.0, 10.0, 5.0]);
        assert_eq!(aabb.width(), 10.0);
        assert_eq!(aabb.height(), 5.0);
        assert_eq!(aabb.max_extent(), 10.0);
        assert_eq!(aabb.center(), Point2::new(5.0, 2.5));
    }

    #[test]
    fn test_intersects_includes_touching() {
        let a: Aabb2<f64> = Aabb2::from_bounds([0.0, 0.0, 1.0, 1.0]);
        let touching = Aabb2::from_bounds([1.0, 0.0, 2.0, 1.0]);
        let apart = Aabb2::from_bounds([1.5, 1.5, 2.0, 2.0]);
        assert!(a.intersects(touching));
        assert!(!a.intersects(apart));
    }

    #[test]
    fn test_union() {
        let a: Aabb2<f64> = Aabb2::from_bounds([0.0, 0.0, 5.0, 5.0]);
        let b = Aabb2::from_bounds([3.0, 3.0, 10.0, 10.0]);
        assert_eq!(a.union(b).to_bounds(), [0.0, 0.0, 10.0, 10.0]);
    }
}
