//! Polygon validation, repair and measurement.
//!
//! This module provides the checks every feature passes before it reaches a
//! boolean operation:
//! - Structural validation ([`validate`]) with a list of violations
//! - Repair of precision noise, duplicates and open rings ([`sanitize`])
//! - Vertex statistics and complexity tiers ([`complexity`])
//! - Ring area and bounds helpers

mod core;
mod sanitize;
mod validate;

pub use self::core::{
    geometry_area, geometry_bounds, ring_area, ring_bounds, ring_has_self_intersection,
    ring_is_closed, ring_signed_area,
};
pub use sanitize::{sanitize, sanitize_ring, sanitize_with};
pub use validate::{
    complexity, complexity_with, geometry_complexity, is_valid, position_is_valid, validate,
    validate_with, Complexity, ComplexityLevel, ValidationReport, MIN_RING_POSITIONS,
};
