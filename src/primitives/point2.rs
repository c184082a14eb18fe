//! 2D point type in planar (longitude, latitude) space.

use super::Vec2;
use num_traits::Float;
use std::ops::{Add, Sub};

/// A position in the plane.
///
/// For geographic data `x` is the longitude and `y` the latitude, both in
/// degrees. Generic over floating-point types (`f32` or `f64`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Point2<F> {
    /// Creates a new point.
    #[inline]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// Creates a point from a `[x, y]` pair (GeoJSON position order).
    #[inline]
    pub fn from_position(position: [F; 2]) -> Self {
        Self {
            x: position[0],
            y: position[1],
        }
    }

    /// Returns the squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> F {
        (other - self).magnitude_squared()
    }

    /// Returns the distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> F {
        self.distance_squared(other).sqrt()
    }

    /// Returns the point halfway between `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        let two = F::one() + F::one();
        Self::new((self.x + other.x) / two, (self.y + other.y) / two)
    }

    /// Linearly interpolates towards `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: F) -> Self {
        self + (other - self) * t
    }

    /// Returns `true` if both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<F: Float> Sub for Point2<F> {
    type Output = Vec2<F>;

    #[inline]
    fn sub(self, other: Self) -> Vec2<F> {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl<F: Float> Add<Vec2<F>> for Point2<F> {
    type Output = Self;

    #[inline]
    fn add(self, v: Vec2<F>) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl<F: Float> From<[F; 2]> for Point2<F> {
    fn from(position: [F; 2]) -> Self {
        Self::from_position(position)
    }
}
