//! Repair of slightly malformed polygon features.
//!
//! The sanitizer fixes what is safe to fix (precision noise, duplicated
//! consecutive positions, rings left open) and drops what is not (rings that
//! collapse below four positions). If the repaired feature still fails
//! validation the sanitizer gives up and returns `None`; it never panics.

use super::validate::{validate_with, MIN_RING_POSITIONS};
use crate::config::ValidationConfig;
use crate::geojson::{Feature, Geometry, Position, Ring};

/// Sanitizes a feature with the default configuration.
///
/// # Example
///
/// ```
/// use fogmap::geojson::Feature;
/// use fogmap::polygon::sanitize;
///
/// // Duplicated vertex, noisy precision and a ring left open
/// let messy = Feature::polygon(vec![vec![
///     [0.0, 0.0],
///     [0.0, 0.0],
///     [0.0, 1.000_000_04],
///     [1.0, 1.0],
///     [1.0, 0.0],
/// ]]);
///
/// let clean = sanitize(&messy).unwrap();
/// assert_eq!(clean.geometry.vertex_count(), 5);
/// assert_eq!(sanitize(&clean), Some(clean));
/// ```
pub fn sanitize(feature: &Feature) -> Option<Feature> {
    sanitize_with(feature, &ValidationConfig::default())
}

/// Sanitizes a feature.
///
/// Steps, per ring: round coordinates to `config.precision` decimals, drop
/// positions closer than `config.dedup_tolerance` to the previous kept
/// position, re-close the ring, drop it if fewer than four positions remain.
/// A polygon losing its exterior ring is dropped with its holes. Returns
/// `None` if nothing survives or the result fails validation.
///
/// The operation is idempotent: sanitizing a sanitized feature returns it
/// unchanged.
pub fn sanitize_with(feature: &Feature, config: &ValidationConfig) -> Option<Feature> {
    let geometry = match &feature.geometry {
        Geometry::Polygon { coordinates } => Geometry::Polygon {
            coordinates: sanitize_polygon(coordinates, config)?,
        },
        Geometry::MultiPolygon { coordinates } => {
            let polygons: Vec<Vec<Ring>> = coordinates
                .iter()
                .filter_map(|rings| sanitize_polygon(rings, config))
                .collect();
            if polygons.is_empty() {
                return None;
            }
            Geometry::MultiPolygon {
                coordinates: polygons,
            }
        }
    };

    let sanitized = Feature {
        kind: feature.kind,
        geometry,
        properties: feature.properties.clone(),
    };

    if validate_with(&sanitized, config).is_valid {
        Some(sanitized)
    } else {
        None
    }
}

/// Sanitizes the rings of one polygon; `None` if the exterior does not survive.
fn sanitize_polygon(rings: &[Ring], config: &ValidationConfig) -> Option<Vec<Ring>> {
    let (exterior, holes) = rings.split_first()?;
    let exterior = sanitize_ring(exterior, config)?;

    let mut result = Vec::with_capacity(rings.len());
    result.push(exterior);
    result.extend(holes.iter().filter_map(|hole| sanitize_ring(hole, config)));
    Some(result)
}

/// Sanitizes a single ring, `None` if fewer than four positions remain.
pub fn sanitize_ring(ring: &[Position], config: &ValidationConfig) -> Option<Ring> {
    let factor = 10f64.powi(config.precision as i32);
    let tolerance_sq = config.dedup_tolerance * config.dedup_tolerance;

    let mut cleaned: Ring = Vec::with_capacity(ring.len() + 1);
    for &position in ring {
        let rounded = round_position(position, factor);
        match cleaned.last() {
            Some(&prev) if distance_squared(prev, rounded) < tolerance_sq => {}
            Some(&prev) if prev == rounded => {}
            _ => cleaned.push(rounded),
        }
    }

    if let (Some(&first), Some(&last)) = (cleaned.first(), cleaned.last()) {
        if first != last {
            cleaned.push(first);
        }
    }

    if cleaned.len() < MIN_RING_POSITIONS {
        None
    } else {
        Some(cleaned)
    }
}

#[inline]
fn round_position(position: Position, factor: f64) -> Position {
    [
        (position[0] * factor).round() / factor,
        (position[1] * factor).round() / factor,
    ]
}

#[inline]
fn distance_squared(a: Position, b: Position) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
