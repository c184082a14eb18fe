//! Polyline and polygon simplification used for level of detail.

mod rdp;
mod ring;

pub use rdp::{rdp, rdp_indices};
pub use ring::{bbox_ring, simplify_geometry, simplify_ring};
