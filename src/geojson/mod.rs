//! GeoJSON-shaped interchange types.
//!
//! Revealed areas arrive from the store, and fog leaves the engine, as
//! GeoJSON `Feature` / `FeatureCollection` structures. Only the polygonal
//! geometry kinds are representable: anything else is rejected at the
//! boundary by [`Feature::from_value`], so the rest of the crate can match
//! exhaustively on [`Geometry`].
//!
//! # Example
//!
//! ```
//! use fogmap::geojson::{Feature, Geometry, Viewport};
//!
//! let square = Feature::polygon(vec![vec![
//!     [0.0, 0.0],
//!     [0.0, 1.0],
//!     [1.0, 1.0],
//!     [1.0, 0.0],
//!     [0.0, 0.0],
//! ]]);
//! assert!(matches!(square.geometry, Geometry::Polygon { .. }));
//!
//! let viewport = Viewport::new(-1.0, -1.0, 1.0, 1.0).unwrap();
//! assert_eq!(viewport.to_feature().geometry.vertex_count(), 5);
//! ```

mod convert;
mod feature;
mod viewport;

pub use convert::{from_multi_polygon, to_multi_polygon};
pub use feature::{
    CollectionKind, Feature, FeatureCollection, FeatureKind, Geometry, Position, Ring,
};
pub use viewport::{Viewport, MAX_LATITUDE, MAX_LONGITUDE};
