//! Structural validation and complexity classification of polygon features.
//!
//! A feature is valid when every ring has at least four positions, is
//! closed, and every coordinate is a finite number inside the
//! longitude/latitude ranges. Validation never fails: it reports.
//!
//! # Example
//!
//! ```
//! use fogmap::geojson::Feature;
//! use fogmap::polygon::{validate, ComplexityLevel};
//!
//! let square = Feature::polygon(vec![vec![
//!     [0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0],
//! ]]);
//! let report = validate(&square);
//! assert!(report.is_valid);
//! assert_eq!(report.complexity.level, ComplexityLevel::Low);
//!
//! let open = Feature::polygon(vec![vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]]);
//! assert!(!validate(&open).is_valid);
//! ```

use super::core::{ring_has_self_intersection, ring_is_closed};
use crate::config::ValidationConfig;
use crate::geojson::{Feature, Geometry, Position, MAX_LATITUDE, MAX_LONGITUDE};
use serde::{Deserialize, Serialize};

/// Minimum number of positions in a closed ring.
pub const MIN_RING_POSITIONS: usize = 4;

/// Rings above this size skip the quadratic self-intersection scan.
const SELF_INTERSECTION_SCAN_LIMIT: usize = 1_024;

/// Coarse complexity tier used to decide when to simplify.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ComplexityLevel {
    /// Classifies a vertex count against the configured thresholds.
    pub fn classify(total_vertices: usize, config: &ValidationConfig) -> Self {
        if total_vertices >= config.high_complexity_vertices {
            ComplexityLevel::High
        } else if total_vertices >= config.medium_complexity_vertices {
            ComplexityLevel::Medium
        } else {
            ComplexityLevel::Low
        }
    }
}

/// Vertex statistics of one or more features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Complexity {
    /// Positions over all rings.
    pub total_vertices: usize,
    /// Number of rings (exteriors and holes).
    pub ring_count: usize,
    /// Largest ring.
    pub max_ring_vertices: usize,
    /// Mean ring size, 0 without rings.
    pub avg_ring_vertices: f64,
    pub level: ComplexityLevel,
}

impl Complexity {
    /// Aggregates several measurements into one, reclassifying the total.
    pub fn combine<'a, I>(items: I, config: &ValidationConfig) -> Self
    where
        I: IntoIterator<Item = &'a Complexity>,
    {
        let (total_vertices, ring_count, max_ring_vertices) =
            items.into_iter().fold((0, 0, 0), |(t, r, m), c| {
                (
                    t + c.total_vertices,
                    r + c.ring_count,
                    m.max(c.max_ring_vertices),
                )
            });

        Self::from_counts(total_vertices, ring_count, max_ring_vertices, config)
    }

    fn from_counts(
        total_vertices: usize,
        ring_count: usize,
        max_ring_vertices: usize,
        config: &ValidationConfig,
    ) -> Self {
        let avg_ring_vertices = if ring_count == 0 {
            0.0
        } else {
            total_vertices as f64 / ring_count as f64
        };

        Self {
            total_vertices,
            ring_count,
            max_ring_vertices,
            avg_ring_vertices,
            level: ComplexityLevel::classify(total_vertices, config),
        }
    }
}

/// Result of validating a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Whether the feature may enter a geometry operation.
    pub is_valid: bool,
    /// Vertex statistics, filled even for invalid features.
    pub complexity: Complexity,
    /// Human-readable description of each violation.
    pub issues: Vec<String>,
    /// Whether a ring crosses itself. Not a validity violation: the boolean
    /// operations resolve self-intersections, but callers may want to know.
    pub has_self_intersection: bool,
}

/// Computes vertex statistics with the default thresholds.
pub fn complexity(feature: &Feature) -> Complexity {
    complexity_with(feature, &ValidationConfig::default())
}

/// Computes vertex statistics of a feature.
pub fn complexity_with(feature: &Feature, config: &ValidationConfig) -> Complexity {
    geometry_complexity(&feature.geometry, config)
}

/// Computes vertex statistics of bare geometry.
pub fn geometry_complexity(geometry: &Geometry, config: &ValidationConfig) -> Complexity {
    let (total, rings, max) = geometry
        .rings()
        .fold((0, 0, 0), |(t, r, m), ring| (t + ring.len(), r + 1, m.max(ring.len())));

    Complexity::from_counts(total, rings, max, config)
}

/// Validates a feature with the default configuration.
pub fn validate(feature: &Feature) -> ValidationReport {
    validate_with(feature, &ValidationConfig::default())
}

/// Returns `true` if the feature passes validation.
pub fn is_valid(feature: &Feature) -> bool {
    validate(feature).is_valid
}

/// Validates a feature.
///
/// Every violation is reported, not just the first, so a log line can tell
/// the whole story of a rejected feature.
pub fn validate_with(feature: &Feature, config: &ValidationConfig) -> ValidationReport {
    let mut issues = Vec::new();
    let mut has_self_intersection = false;

    let polygons = feature.geometry.polygons();
    if polygons.is_empty() {
        issues.push(format!("{} has no polygons", feature.geometry.kind_name()));
    }

    for (p, rings) in polygons.iter().enumerate() {
        if rings.is_empty() {
            issues.push(format!("polygon {p} has no rings"));
        }

        for (r, ring) in rings.iter().enumerate() {
            if ring.len() < MIN_RING_POSITIONS {
                issues.push(format!(
                    "polygon {p} ring {r} has {} positions, need at least {MIN_RING_POSITIONS}",
                    ring.len()
                ));
            }
            if !ring.is_empty() && !ring_is_closed(ring) {
                issues.push(format!("polygon {p} ring {r} is not closed"));
            }
            if let Some(bad) = ring.iter().find(|&&pos| !position_is_valid(pos)) {
                issues.push(format!(
                    "polygon {p} ring {r} has invalid position {bad:?}"
                ));
            }
            if ring.len() <= SELF_INTERSECTION_SCAN_LIMIT && ring_has_self_intersection(ring) {
                has_self_intersection = true;
            }
        }
    }

    ValidationReport {
        is_valid: issues.is_empty(),
        complexity: complexity_with(feature, config),
        issues,
        has_self_intersection,
    }
}

/// Returns `true` if the position is finite and inside the lon/lat ranges.
pub fn position_is_valid(position: Position) -> bool {
    let [lon, lat] = position;
    lon.is_finite()
        && lat.is_finite()
        && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
        && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Position> {
        vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]
    }

    #[test]
    fn test_accepts_closed_square() {
        let report = validate(&Feature::polygon(vec![unit_square()]));
        assert!(report.is_valid, "{:?}", report.issues);
        assert!(report.issues.is_empty());
        assert!(!report.has_self_intersection);
    }

    #[test]
    fn test_rejects_short_ring() {
        let triangle_open = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let report = validate(&Feature::polygon(vec![triangle_open]));
        assert!(!report.is_valid);
        assert!(report.issues[0].contains("has 3 positions"));
    }

    #[test]
    fn test_rejects_unclosed_ring() {
        let open = vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.5, -0.5]];
        let report = validate(&Feature::polygon(vec![open]));
        assert!(!report.is_valid);
        assert_eq!(report.issues, vec!["polygon 0 ring 0 is not closed".to_string()]);
    }

    #[test]
    fn test_rejects_out_of_range_and_non_finite() {
        let mut far = unit_square();
        far[1] = [181.0, 1.0];
        assert!(!is_valid(&Feature::polygon(vec![far])));

        let mut nan = unit_square();
        nan[2] = [f64::NAN, 1.0];
        assert!(!is_valid(&Feature::polygon(vec![nan])));

        let mut lat = unit_square();
        lat[2] = [1.0, -90.5];
        assert!(!is_valid(&Feature::polygon(vec![lat])));
    }

    #[test]
    fn test_rejects_empty_coordinates() {
        assert!(!is_valid(&Feature::polygon(Vec::new())));
        assert!(!is_valid(&Feature::multi_polygon(Vec::new())));
        assert!(!is_valid(&Feature::multi_polygon(vec![Vec::new()])));
    }

    #[test]
    fn test_reports_every_issue() {
        let bad = Feature::multi_polygon(vec![
            vec![vec![[0.0, 0.0], [1.0, 0.0]]],
            vec![unit_square()],
            vec![vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]],
        ]);
        let report = validate(&bad);
        assert!(!report.is_valid);
        assert_eq!(report.issues.len(), 3);
    }

    #[test]
    fn test_flags_self_intersection_without_rejecting() {
        let figure_8 = vec![[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 2.0], [0.0, 0.0]];
        let report = validate(&Feature::polygon(vec![figure_8]));
        assert!(report.is_valid);
        assert!(report.has_self_intersection);
    }

    #[test]
    fn test_complexity_counts() {
        let hole = vec![[0.2, 0.2], [0.4, 0.2], [0.4, 0.4], [0.2, 0.2]];
        let c = complexity(&Feature::polygon(vec![unit_square(), hole]));
        assert_eq!(c.total_vertices, 9);
        assert_eq!(c.ring_count, 2);
        assert_eq!(c.max_ring_vertices, 5);
        assert_relative_eq!(c.avg_ring_vertices, 4.5, epsilon = 1e-12);
        assert_eq!(c.level, ComplexityLevel::Low);
    }

    #[test]
    fn test_complexity_levels() {
        let config = ValidationConfig {
            medium_complexity_vertices: 10,
            high_complexity_vertices: 20,
            ..ValidationConfig::default()
        };
        assert_eq!(ComplexityLevel::classify(9, &config), ComplexityLevel::Low);
        assert_eq!(ComplexityLevel::classify(10, &config), ComplexityLevel::Medium);
        assert_eq!(ComplexityLevel::classify(25, &config), ComplexityLevel::High);
    }

    #[test]
    fn test_combine() {
        let config = ValidationConfig {
            medium_complexity_vertices: 8,
            high_complexity_vertices: 100,
            ..ValidationConfig::default()
        };
        let a = complexity_with(&Feature::polygon(vec![unit_square()]), &config);
        let combined = Complexity::combine([&a, &a], &config);
        assert_eq!(combined.total_vertices, 10);
        assert_eq!(combined.ring_count, 2);
        assert_eq!(combined.level, ComplexityLevel::Medium);

        let empty = Complexity::combine(std::iter::empty(), &config);
        assert_eq!(empty.avg_ring_vertices, 0.0);
    }
}
