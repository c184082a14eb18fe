//! 2D offset vector.

use num_traits::Float;
use std::ops::Mul;

/// A 2D displacement between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vec2<F> {
    /// Creates a new vector.
    #[inline]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Self) -> F {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn magnitude_squared(self) -> F {
        self.dot(self)
    }
}

impl<F: Float> Mul<F> for Vec2<F> {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: F) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        let a: Vec2<f64> = Vec2::new(1.0, 0.0);
        let b = Vec2::new(0.0, 1.0);
        assert_eq!(a.dot(b), 0.0);
        assert_eq!(Vec2::new(3.0, 4.0).magnitude_squared(), 25.0);
    }

    #[test]
    fn test_scale() {
        let a: Vec2<f64> = Vec2::new(1.0, 2.0);
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
    }
}
