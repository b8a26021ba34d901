//! High-level vibrance processor over a selected backend.

use tracing::debug;
use vib_ops::Vibrance;

use crate::backend::{Backend, GpuLimits, ImageHandle, ProcessingBackend, create_backend};
use crate::{GpuResult, LabImage};

/// Applies the vibrance transform through a chosen execution backend.
///
/// The backend is fixed at construction; the caller owns the CPU-vs-GPU
/// choice and any fallback after a failed GPU dispatch.
pub struct VibranceProcessor {
    backend: Box<dyn ProcessingBackend>,
}

impl VibranceProcessor {
    /// Create with specified backend.
    pub fn new(backend: Backend) -> GpuResult<Self> {
        Ok(Self { backend: create_backend(backend)? })
    }

    /// Backend name.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Backend resource limits, for the host's tiling decisions.
    pub fn limits(&self) -> &GpuLimits {
        self.backend.limits()
    }

    /// Upload an image to backend memory.
    pub fn upload(&self, img: &LabImage) -> GpuResult<Box<dyn ImageHandle>> {
        self.backend.upload(&img.data, img.width, img.height, img.channels)
    }

    /// Download an image from backend memory.
    pub fn download(&self, handle: &dyn ImageHandle) -> GpuResult<LabImage> {
        let (w, h, c) = handle.dimensions();
        let data = self.backend.download(handle)?;
        LabImage::from_f32(data, w, h, c)
    }

    /// Apply vibrance to a resident handle, e.g. between other device-side
    /// operations without a host round trip.
    ///
    /// The amount is resolved to its unit-scale multiplier once, here, before
    /// any pixel is processed.
    pub fn apply_to_handle(&self, handle: &mut dyn ImageHandle, params: &Vibrance) -> GpuResult<()> {
        self.backend.apply_vibrance(handle, params.amount01())
    }

    /// Apply vibrance to a host image: upload, transform, download.
    ///
    /// An empty image is a successful no-op. On error the image is left
    /// untouched; the caller may retry on another backend.
    pub fn apply(&self, img: &mut LabImage, params: &Vibrance) -> GpuResult<()> {
        if img.width == 0 || img.height == 0 {
            return Ok(());
        }

        debug!(
            backend = self.backend.name(),
            amount = params.amount,
            width = img.width,
            height = img.height,
            "vibrance: processing image"
        );

        let mut handle = self.backend.upload(&img.data, img.width, img.height, img.channels)?;
        self.backend.apply_vibrance(handle.as_mut(), params.amount01())?;
        img.data = self.backend.download(handle.as_ref())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vib_ops::vibrance_pixel;

    fn processor() -> VibranceProcessor {
        VibranceProcessor::new(Backend::Cpu).unwrap()
    }

    #[test]
    fn test_apply_reference_pixel() {
        let proc = processor();
        let mut img = LabImage::from_f32(vec![50.0, 20.0, 0.0, 1.0], 1, 1, 4).unwrap();
        proc.apply(&mut img, &Vibrance::new(25.0)).unwrap();

        let out = img.data();
        assert_relative_eq!(out[0], 49.755859375, max_relative = 1e-6);
        assert_relative_eq!(out[1], 20.390625, max_relative = 1e-6);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_apply_empty_image_is_noop() {
        let proc = processor();
        let mut img = LabImage::new(0, 5);
        proc.apply(&mut img, &Vibrance::new(50.0)).unwrap();
        assert!(img.data().is_empty());
    }

    #[test]
    fn test_apply_identity() {
        let proc = processor();
        let data = vec![50.0, 20.0, -30.0, 1.0, 10.0, 0.0, 5.0, 0.5];
        let mut img = LabImage::from_f32(data.clone(), 2, 1, 4).unwrap();
        proc.apply(&mut img, &Vibrance::identity()).unwrap();
        assert_eq!(img.data(), &data[..]);
    }

    #[test]
    fn test_apply_to_handle_matches_kernel() {
        let proc = processor();
        let img = LabImage::from_f32(vec![60.0, -15.0, 25.0, 0.75], 1, 1, 4).unwrap();
        let mut handle = proc.upload(&img).unwrap();
        proc.apply_to_handle(handle.as_mut(), &Vibrance::new(80.0)).unwrap();

        let out = proc.download(handle.as_ref()).unwrap();
        assert_eq!(out.data(), &vibrance_pixel([60.0, -15.0, 25.0, 0.75], 0.8));
    }
}
