//! GPU and CPU execution backends for the vibrance transform.
//!
//! Runs the `vib-ops` vibrance kernel over a region on either a rayon CPU
//! backend or a wgpu compute backend. Both paths execute the same per-pixel
//! math, so their outputs agree to within floating-point rounding; the
//! caller picks the path and handles fallback when a GPU dispatch fails.
//!
//! # Architecture
//!
//! ```text
//! VibranceProcessor
//!     └── Backend (CPU or wgpu)
//!             └── GpuPrimitives trait
//!                     ├── CpuPrimitives (rayon, via vib-ops)
//!                     └── WgpuPrimitives (WGSL compute shader)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use vib_gpu::{Backend, LabImage, VibranceProcessor};
//! use vib_ops::Vibrance;
//!
//! let processor = VibranceProcessor::new(Backend::Auto)?;
//! let mut img = LabImage::from_f32(data, 1920, 1080, 4)?;
//! processor.apply(&mut img, &Vibrance::new(25.0))?;
//! ```

pub mod backend;
pub mod image;
pub mod processor;
mod shaders;

pub use backend::{
    Backend, BackendInfo, GpuLimits, ImageHandle, ProcessingBackend, create_backend,
    detect_backends, select_best_backend,
};
pub use backend::{CpuBackend, CpuPrimitives};
#[cfg(feature = "wgpu")]
pub use backend::{WgpuBackend, WgpuPrimitives};
pub use image::LabImage;
pub use processor::VibranceProcessor;

use thiserror::Error;

/// GPU operation errors
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("GPU operation failed: {0}")]
    OperationFailed(String),
}

pub type GpuResult<T> = Result<T, GpuError>;
