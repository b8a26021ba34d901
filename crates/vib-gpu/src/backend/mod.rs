//! Compute backends for the vibrance transform.
//!
//! Provides CPU (rayon) and wgpu backends with automatic selection.

mod cpu_backend;
mod detect;
mod gpu_primitives;

#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use cpu_backend::{CpuBackend, CpuPrimitives};
pub use detect::{BackendInfo, describe_backends, detect_backends, select_best_backend};
pub use gpu_primitives::{AsAny, GpuPrimitives, ImageHandle};

#[cfg(feature = "wgpu")]
pub use wgpu_backend::{WgpuBackend, WgpuPrimitives};

use crate::GpuResult;
#[cfg(not(feature = "wgpu"))]
use crate::GpuError;

/// Available compute backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Auto-select best available (wgpu > CPU).
    #[default]
    Auto,
    /// CPU backend using rayon for parallelization.
    Cpu,
    /// wgpu backend (Vulkan/Metal/DX12).
    Wgpu,
}

impl Backend {
    /// Check if this backend is available on current system.
    pub fn is_available(&self) -> bool {
        match self {
            Self::Auto => true,
            Self::Cpu => true,
            #[cfg(feature = "wgpu")]
            Self::Wgpu => WgpuBackend::is_available(),
            #[cfg(not(feature = "wgpu"))]
            Self::Wgpu => false,
        }
    }
}

/// Resource limits the host's tiling logic can plan against.
#[derive(Debug, Clone)]
pub struct GpuLimits {
    /// Maximum region dimension (width or height) per dispatch.
    pub max_tile_dim: u32,
    /// Maximum buffer size in bytes.
    pub max_buffer_bytes: u64,
    /// Available memory in bytes.
    pub available_memory: u64,
}

impl Default for GpuLimits {
    fn default() -> Self {
        Self {
            max_tile_dim: 16384,
            max_buffer_bytes: 256 * 1024 * 1024,
            available_memory: 2 * 1024 * 1024 * 1024,
        }
    }
}

impl GpuLimits {
    /// Check if a region exceeds the per-dispatch dimension limit.
    pub fn needs_tiling(&self, width: u32, height: u32) -> bool {
        width > self.max_tile_dim || height > self.max_tile_dim
    }

    /// Check if a region fits in available memory, with headroom for the
    /// output buffer.
    pub fn fits_memory(&self, width: u32, height: u32, channels: u32) -> bool {
        let bytes = (width as u64) * (height as u64) * (channels as u64) * 4;
        bytes <= self.available_memory / 2
    }
}

/// Trait for vibrance execution backends.
///
/// Object-safe facade over [`GpuPrimitives`]: the two engines are
/// interchangeable implementations of one region-transform capability, both
/// delegating pixel math to `vib_ops::vibrance_pixel` (the wgpu backend via
/// a WGSL mirror of it).
pub trait ProcessingBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Resource limits for the host's tiling decisions.
    fn limits(&self) -> &GpuLimits;

    /// Upload image data to backend memory.
    fn upload(
        &self,
        data: &[f32],
        width: u32,
        height: u32,
        channels: u32,
    ) -> GpuResult<Box<dyn ImageHandle>>;

    /// Download image data from backend memory.
    fn download(&self, handle: &dyn ImageHandle) -> GpuResult<Vec<f32>>;

    /// Apply vibrance with the resolved unit-scale amount.
    ///
    /// On error the handle's contents are undefined; the caller decides
    /// whether to retry on another backend.
    fn apply_vibrance(&self, handle: &mut dyn ImageHandle, amount01: f32) -> GpuResult<()>;
}

/// Create a backend instance.
pub fn create_backend(backend: Backend) -> GpuResult<Box<dyn ProcessingBackend>> {
    match backend {
        Backend::Auto => create_backend(select_best_backend()),
        Backend::Cpu => Ok(Box::new(CpuBackend::new())),
        Backend::Wgpu => {
            #[cfg(feature = "wgpu")]
            {
                Ok(Box::new(WgpuBackend::new()?))
            }
            #[cfg(not(feature = "wgpu"))]
            {
                Err(GpuError::BackendNotAvailable(
                    "wgpu feature not enabled".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_tiling() {
        let limits = GpuLimits {
            max_tile_dim: 4096,
            ..Default::default()
        };
        assert!(!limits.needs_tiling(4096, 2160));
        assert!(limits.needs_tiling(8192, 2160));
    }

    #[test]
    fn test_limits_memory() {
        let limits = GpuLimits {
            available_memory: 64 * 1024 * 1024,
            ..Default::default()
        };
        assert!(limits.fits_memory(1024, 1024, 4));
        assert!(!limits.fits_memory(8192, 8192, 4));
    }

    #[test]
    fn test_cpu_always_available() {
        assert!(Backend::Cpu.is_available());
        assert!(Backend::Auto.is_available());
    }
}
