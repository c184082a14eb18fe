//! Geometry operations: union, difference and buffer.
//!
//! Boolean operations run on `geo` multipolygons. Every call returns an
//! [`OperationOutcome`] rather than failing outright: the result (if any),
//! metrics, and the errors and warnings collected on the way.

mod buffer;
mod engine;
mod metrics;

pub use buffer::{destination, geodesic_circle, Units, EARTH_RADIUS_METERS};
pub use engine::GeometryEngine;
pub use metrics::{OperationKind, OperationMetrics, OperationOutcome};
