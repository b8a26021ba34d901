//! Primitives abstraction shared by the CPU and wgpu backends.

use super::GpuLimits;
use crate::GpuResult;

/// Handle to an image in backend memory.
///
/// For the wgpu backend this wraps a device-resident buffer; for the CPU
/// backend it owns the data in RAM. The backend borrows buffers only for the
/// duration of a call and retains no references afterwards.
pub trait ImageHandle: Send + Sync + AsAny {
    /// Image dimensions (width, height, channels).
    fn dimensions(&self) -> (u32, u32, u32);

    /// Width.
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Height.
    fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Channel count.
    fn channels(&self) -> u32 {
        self.dimensions().2
    }

    /// Size in bytes of backend memory used.
    fn size_bytes(&self) -> u64 {
        let (w, h, c) = self.dimensions();
        (w as u64) * (h as u64) * (c as u64) * 4 // f32
    }
}

/// Helper trait for downcasting.
pub trait AsAny: 'static {
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Core backend operations with a concrete handle type.
pub trait GpuPrimitives: Send + Sync {
    /// Backend-specific image handle type.
    type Handle: ImageHandle;

    /// Upload image data to backend memory.
    fn upload(&self, data: &[f32], width: u32, height: u32, channels: u32)
    -> GpuResult<Self::Handle>;

    /// Download image data from backend memory.
    fn download(&self, handle: &Self::Handle) -> GpuResult<Vec<f32>>;

    /// Allocate an output buffer.
    fn allocate(&self, width: u32, height: u32, channels: u32) -> GpuResult<Self::Handle>;

    /// Execute the vibrance kernel over the full extent of `src`, writing
    /// `dst`. A zero-area source succeeds without touching memory.
    fn exec_vibrance(&self, src: &Self::Handle, dst: &mut Self::Handle, amount01: f32)
    -> GpuResult<()>;

    /// Get resource limits.
    fn limits(&self) -> &GpuLimits;

    /// Backend name.
    fn name(&self) -> &'static str;
}
