//! Viewport bounding boxes and the constant fog polygons built from them.

use super::feature::{Feature, Ring};
use crate::bounds::Aabb2;
use crate::error::{FogError, Result};
use serde::{Deserialize, Serialize};

/// Longitude range accepted for coordinates.
pub const MAX_LONGITUDE: f64 = 180.0;
/// Latitude range accepted for coordinates.
pub const MAX_LATITUDE: f64 = 90.0;

/// An axis-aligned map viewport in degrees.
///
/// Construction through [`Viewport::new`] guarantees
/// `min_lon < max_lon`, `min_lat < max_lat` and all corners inside the valid
/// longitude/latitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Viewport {
    /// The whole valid coordinate range.
    pub const WORLD: Viewport = Viewport {
        min_lon: -MAX_LONGITUDE,
        min_lat: -MAX_LATITUDE,
        max_lon: MAX_LONGITUDE,
        max_lat: MAX_LATITUDE,
    };

    /// Creates a validated viewport.
    ///
    /// Returns [`FogError::Configuration`] for non-finite, out-of-range or
    /// inverted bounds.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        let all = [min_lon, min_lat, max_lon, max_lat];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(FogError::Configuration(format!(
                "viewport bounds must be finite, got {all:?}"
            )));
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(FogError::Configuration(format!(
                "viewport bounds are inverted or empty: {all:?}"
            )));
        }
        if min_lon < -MAX_LONGITUDE
            || max_lon > MAX_LONGITUDE
            || min_lat < -MAX_LATITUDE
            || max_lat > MAX_LATITUDE
        {
            return Err(FogError::Configuration(format!(
                "viewport bounds outside valid lon/lat range: {all:?}"
            )));
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Creates a viewport from `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn from_bounds(bounds: [f64; 4]) -> Result<Self> {
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }

    pub fn bounds(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Planar area in square degrees.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn to_aabb(&self) -> Aabb2<f64> {
        Aabb2::from_bounds(self.bounds())
    }

    /// The closed, counter-clockwise rectangle ring.
    pub fn ring(&self) -> Ring {
        vec![
            [self.min_lon, self.min_lat],
            [self.max_lon, self.min_lat],
            [self.max_lon, self.max_lat],
            [self.min_lon, self.max_lat],
            [self.min_lon, self.min_lat],
        ]
    }

    /// The viewport rectangle as a Polygon feature.
    pub fn to_feature(&self) -> Feature {
        Feature::polygon(vec![self.ring()])
    }
}
