//! CPU backend delegating to the vib-ops row-parallel engine.

use vib_ops::{Region, parallel};

use super::gpu_primitives::{AsAny, GpuPrimitives, ImageHandle};
use super::{GpuLimits, ProcessingBackend};
use crate::{GpuError, GpuResult};

/// CPU image handle - data stored in RAM.
pub struct CpuImage {
    data: Vec<f32>,
    width: u32,
    height: u32,
    channels: u32,
}

impl CpuImage {
    pub fn new(data: Vec<f32>, width: u32, height: u32, channels: u32) -> Self {
        Self { data, width, height, channels }
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

impl AsAny for CpuImage {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl ImageHandle for CpuImage {
    fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }
}

/// CPU primitives implementation.
pub struct CpuPrimitives {
    limits: GpuLimits,
}

impl CpuPrimitives {
    pub fn new() -> Self {
        // System RAM stands in for device memory (4GB fallback if detection fails)
        let available = sys_info::mem_info()
            .map(|m| m.avail * 1024)
            .unwrap_or(4 * 1024 * 1024 * 1024);

        Self {
            limits: GpuLimits {
                max_tile_dim: u32::MAX,
                max_buffer_bytes: u64::MAX,
                available_memory: available,
            },
        }
    }
}

impl Default for CpuPrimitives {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuPrimitives for CpuPrimitives {
    type Handle = CpuImage;

    fn upload(
        &self,
        data: &[f32],
        width: u32,
        height: u32,
        channels: u32,
    ) -> GpuResult<Self::Handle> {
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if data.len() != expected {
            return Err(GpuError::BufferSizeMismatch { expected, actual: data.len() });
        }
        Ok(CpuImage::new(data.to_vec(), width, height, channels))
    }

    fn download(&self, handle: &Self::Handle) -> GpuResult<Vec<f32>> {
        Ok(handle.data.clone())
    }

    fn allocate(&self, width: u32, height: u32, channels: u32) -> GpuResult<Self::Handle> {
        let size = (width as usize) * (height as usize) * (channels as usize);
        Ok(CpuImage::new(vec![0.0; size], width, height, channels))
    }

    fn exec_vibrance(
        &self,
        src: &Self::Handle,
        dst: &mut Self::Handle,
        amount01: f32,
    ) -> GpuResult<()> {
        let (w, h, c) = src.dimensions();
        let region = Region::new(0, 0, w, h, c);
        parallel::apply_vibrance(&src.data, &mut dst.data, &region, amount01)
            .map_err(|e| GpuError::OperationFailed(e.to_string()))
    }

    fn limits(&self) -> &GpuLimits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "CPU"
    }
}

/// CPU backend wrapper.
pub struct CpuBackend {
    primitives: CpuPrimitives,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self { primitives: CpuPrimitives::new() }
    }

    /// Get inner primitives.
    pub fn primitives(&self) -> &CpuPrimitives {
        &self.primitives
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "CPU"
    }

    fn limits(&self) -> &GpuLimits {
        &self.primitives.limits
    }

    fn upload(
        &self,
        data: &[f32],
        width: u32,
        height: u32,
        channels: u32,
    ) -> GpuResult<Box<dyn ImageHandle>> {
        let handle = self.primitives.upload(data, width, height, channels)?;
        Ok(Box::new(handle))
    }

    fn download(&self, handle: &dyn ImageHandle) -> GpuResult<Vec<f32>> {
        let cpu_handle = handle
            .as_any()
            .downcast_ref::<CpuImage>()
            .ok_or_else(|| GpuError::OperationFailed("Invalid handle type".into()))?;
        self.primitives.download(cpu_handle)
    }

    fn apply_vibrance(&self, handle: &mut dyn ImageHandle, amount01: f32) -> GpuResult<()> {
        let cpu_handle = handle
            .as_any_mut()
            .downcast_mut::<CpuImage>()
            .ok_or_else(|| GpuError::OperationFailed("Invalid handle type".into()))?;

        let mut dst =
            self.primitives
                .allocate(cpu_handle.width, cpu_handle.height, cpu_handle.channels)?;
        self.primitives.exec_vibrance(cpu_handle, &mut dst, amount01)?;
        *cpu_handle = dst;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vib_ops::vibrance_pixel;

    #[test]
    fn test_upload_download_roundtrip() {
        let prims = CpuPrimitives::new();
        let data = vec![1.0f32, 2.0, 3.0, 4.0];
        let handle = prims.upload(&data, 1, 1, 4).unwrap();
        assert_eq!(handle.dimensions(), (1, 1, 4));
        assert_eq!(prims.download(&handle).unwrap(), data);
    }

    #[test]
    fn test_upload_rejects_wrong_size() {
        let prims = CpuPrimitives::new();
        let data = vec![0.0f32; 7];
        assert!(matches!(
            prims.upload(&data, 2, 1, 4),
            Err(GpuError::BufferSizeMismatch { expected: 8, actual: 7 })
        ));
    }

    #[test]
    fn test_exec_matches_kernel() {
        let prims = CpuPrimitives::new();
        let data = vec![50.0, 20.0, 0.0, 1.0, 10.0, -5.0, 90.0, 0.25];
        let src = prims.upload(&data, 2, 1, 4).unwrap();
        let mut dst = prims.allocate(2, 1, 4).unwrap();
        prims.exec_vibrance(&src, &mut dst, 0.25).unwrap();

        let out = prims.download(&dst).unwrap();
        assert_eq!(&out[..4], &vibrance_pixel([50.0, 20.0, 0.0, 1.0], 0.25));
        assert_eq!(&out[4..], &vibrance_pixel([10.0, -5.0, 90.0, 0.25], 0.25));
    }

    #[test]
    fn test_backend_apply_swaps_buffer() {
        let backend = CpuBackend::new();
        let data = vec![50.0f32, 20.0, 0.0, 1.0];
        let mut handle = backend.upload(&data, 1, 1, 4).unwrap();
        backend.apply_vibrance(handle.as_mut(), 0.25).unwrap();

        let out = backend.download(handle.as_ref()).unwrap();
        assert_eq!(out, vibrance_pixel([50.0, 20.0, 0.0, 1.0], 0.25));
    }
}
