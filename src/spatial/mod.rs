//! Spatial indexing of revealed areas.
//!
//! - [`Bvh`] - bounding volume hierarchy over anything [`Bounded`]
//! - [`SpatialIndex`] - viewport queries with level of detail and a memory bound

mod bvh;
mod index;
mod lod;

pub use bvh::{Bounded, Bvh};
pub use index::{AreaId, SpatialIndex, ViewportQuery};
pub use lod::{apply_level_of_detail, LevelOfDetail};
