//! Fog calculation: the viewport minus everything revealed, with fallbacks.
//!
//! [`FogCalculator`] ties the other components together. A calculation
//! walks down a chain of tiers until one succeeds:
//!
//! 1. primary: union of revealed areas subtracted from the viewport
//! 2. simplified viewport: the viewport rectangle
//! 3. world fog: the world rectangle
//! 4. emergency: the world rectangle after a panic
//!
//! The tier that answered is reported in [`FogMetrics::tier`].

mod calculator;
mod options;
mod result;

pub use calculator::FogCalculator;
pub use options::{get_default_options, FallbackStrategy, FogOptions, PerformanceMode};
pub use result::{FogMetrics, FogResult, FogTier};
