//! Host-side Lab image representation.

use vib_ops::Region;

use crate::{GpuError, GpuResult};

/// A Lab image held in host memory, the upload/download unit for backends.
///
/// Pixels are `(L, a, b, alpha)` f32 tuples, contiguous, row-major. The
/// buffer is owned here; backends borrow it only for the duration of a call.
#[derive(Clone)]
pub struct LabImage {
    /// Raw pixel data (f32).
    pub(crate) data: Vec<f32>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of channels (4 for Lab + alpha).
    pub channels: u32,
}

impl LabImage {
    /// Create from f32 data.
    pub fn from_f32(data: Vec<f32>, width: u32, height: u32, channels: u32) -> GpuResult<Self> {
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if data.len() != expected {
            return Err(GpuError::BufferSizeMismatch { expected, actual: data.len() });
        }
        Ok(Self { data, width, height, channels })
    }

    /// Create an empty 4-channel image filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * 4;
        Self { data: vec![0.0; size], width, height, channels: 4 }
    }

    /// Get pixel data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get mutable pixel data.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Image dimensions.
    pub fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }

    /// The full image as a region descriptor.
    pub fn region(&self) -> Region {
        Region::new(0, 0, self.width, self.height, self.channels)
    }

    /// Size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * 4
    }
}

impl std::fmt::Debug for LabImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_validates_length() {
        assert!(LabImage::from_f32(vec![0.0; 8], 2, 1, 4).is_ok());
        assert!(matches!(
            LabImage::from_f32(vec![0.0; 9], 2, 1, 4),
            Err(GpuError::BufferSizeMismatch { expected: 8, actual: 9 })
        ));
    }

    #[test]
    fn test_region_covers_image() {
        let img = LabImage::new(7, 3);
        let region = img.region();
        assert_eq!(region.len(), img.data().len());
        assert_eq!(region.channels, 4);
    }
}
