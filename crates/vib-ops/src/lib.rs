//! # vib-ops
//!
//! Vibrance color transform for Lab images.
//!
//! Vibrance boosts chroma in proportion to how saturated a pixel already is,
//! while gently compressing lightness on the most saturated pixels. The math
//! runs on CIE Lab pixels (`L`, `a`, `b`, `alpha` as `f32`) and is purely
//! per-pixel, so it parallelizes trivially.
//!
//! # Modules
//!
//! - [`vibrance`] - Parameters and the per-pixel kernel
//! - [`region`] - Rectangular region descriptors
//! - [`parallel`] - Row-parallel CPU execution engine (rayon)
//!
//! # Example
//!
//! ```rust
//! use vib_ops::{Region, Vibrance, parallel};
//!
//! let params = Vibrance::new(25.0);
//! let region = Region::full(1920, 1080);
//!
//! let src = vec![0.0f32; region.len()];
//! let mut dst = vec![0.0f32; region.len()];
//! parallel::apply_vibrance(&src, &mut dst, &region, params.amount01()).unwrap();
//! ```
//!
//! # Design
//!
//! The GPU execution engine in `vib-gpu` runs the same kernel as a WGSL
//! compute shader. Both paths share the constants and operation order of
//! [`vibrance::vibrance_pixel`], so CPU and GPU outputs agree to within
//! floating-point rounding of the shader's `sqrt`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod region;
pub mod vibrance;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use error::{OpsError, OpsResult};
pub use region::Region;
pub use vibrance::{CHROMA_NORM, LIGHTNESS_COMPRESSION, Vibrance, vibrance_pixel};
