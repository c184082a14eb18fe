//! Geodesic circles around a point.

use crate::error::{FogError, Result};
use crate::geojson::{Position, Ring, MAX_LATITUDE, MAX_LONGITUDE};
use crate::polygon::position_is_valid;
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

const METERS_PER_MILE: f64 = 1_609.344;

/// Unit of a buffer distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    #[default]
    Meters,
    Kilometers,
    Miles,
    /// Great-circle arc in degrees.
    Degrees,
}

impl Units {
    /// Converts a distance in this unit to an angular distance in radians.
    pub fn to_radians(self, distance: f64) -> f64 {
        match self {
            Units::Meters => distance / EARTH_RADIUS_METERS,
            Units::Kilometers => distance * 1_000.0 / EARTH_RADIUS_METERS,
            Units::Miles => distance * METERS_PER_MILE / EARTH_RADIUS_METERS,
            Units::Degrees => distance.to_radians(),
        }
    }
}

/// Point at `angular_distance` radians from `origin` along `bearing`
/// (radians clockwise from north), by the haversine destination formula.
///
/// # Example
///
/// ```
/// use fogmap::ops::destination;
///
/// // One degree of arc due north along the prime meridian
/// let [lon, lat] = destination([0.0, 0.0], 0.0, 1f64.to_radians());
/// assert!(lon.abs() < 1e-12);
/// assert!((lat - 1.0).abs() < 1e-12);
/// ```
pub fn destination(origin: Position, bearing: f64, angular_distance: f64) -> Position {
    let lon1 = origin[0].to_radians();
    let lat1 = origin[1].to_radians();
    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_d, cos_d) = angular_distance.sin_cos();

    let sin_lat2 = (sin_lat1 * cos_d + cos_lat1 * sin_d * bearing.cos()).clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let lon2 = lon1 + (bearing.sin() * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * sin_lat2);

    [
        normalize_longitude(lon2.to_degrees()),
        lat2.to_degrees().clamp(-MAX_LATITUDE, MAX_LATITUDE),
    ]
}

fn normalize_longitude(lon: f64) -> f64 {
    if (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lon) {
        lon
    } else {
        (lon + 540.0).rem_euclid(360.0) - 180.0
    }
}

/// Builds the closed, counter-clockwise ring of a geodesic circle.
///
/// # Arguments
///
/// * `center` - Circle center as `[lon, lat]`
/// * `distance` - Radius, positive and finite
/// * `units` - Unit of `distance`
/// * `steps` - Number of distinct vertices, at least 3
///
/// # Returns
///
/// A ring of `steps + 1` positions, or a validation error for an invalid
/// center or radius.
pub fn geodesic_circle(center: Position, distance: f64, units: Units, steps: usize) -> Result<Ring> {
    if !position_is_valid(center) {
        return Err(FogError::Validation(format!(
            "buffer center {center:?} is not a valid position"
        )));
    }
    if !distance.is_finite() || distance <= 0.0 {
        return Err(FogError::Validation(format!(
            "buffer distance must be positive and finite, got {distance}"
        )));
    }

    let steps = steps.max(3);
    let angular = units.to_radians(distance);
    let mut ring: Ring = (0..steps)
        .map(|i| {
            // Negative bearings walk the circle counter-clockwise.
            let bearing = -(i as f64) * std::f64::consts::TAU / steps as f64;
            destination(center, bearing, angular)
        })
        .collect();
    ring.push(ring[0]);
    Ok(ring)
}
