//! Rectangular region descriptors for buffer processing.
//!
//! A [`Region`] describes the rectangular view of a pixel buffer that an
//! execution engine operates on. The host pipeline may hand the engine any
//! sub-region of a larger image; the buffers passed alongside hold exactly
//! that region, row-major, so indexing is always region-local.
//!
//! # Coordinate System
//!
//! - Origin (0, 0) is at the **top-left** corner
//! - X increases to the right
//! - Y increases downward

use crate::{OpsError, OpsResult};

/// A rectangular region with an origin, dimensions, and a channel count.
///
/// `x` and `y` record where the region sits inside the full image and are
/// bookkeeping for the host pipeline only; the engines index buffers
/// region-locally via `row * width * channels`.
///
/// # Invariants
///
/// - A region with zero `width` or `height` is empty: engines treat it as a
///   successful no-op.
/// - `channels` is never inferred from buffer length; it is always supplied
///   explicitly. The vibrance transform requires `channels == 4`.
///
/// # Example
///
/// ```rust
/// use vib_ops::Region;
///
/// let region = Region::full(1920, 1080);
/// assert_eq!(region.num_pixels(), 1920 * 1080);
/// assert_eq!(region.len(), 1920 * 1080 * 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// X coordinate of the left edge in the full image.
    pub x: u32,
    /// Y coordinate of the top edge in the full image.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Floats per pixel (4 for Lab + alpha).
    pub channels: u32,
}

impl Region {
    /// Creates a region with the given origin, dimensions, and channel count.
    pub fn new(x: u32, y: u32, width: u32, height: u32, channels: u32) -> Self {
        Self { x, y, width, height, channels }
    }

    /// A full image as a single 4-channel region at the origin.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height, 4)
    }

    /// True if the region covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels in the region.
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of floats a buffer must hold for this region.
    pub fn len(&self) -> usize {
        self.num_pixels() * self.channels as usize
    }

    /// [`Region::len`] with overflow checking, for host-supplied dimensions.
    pub fn checked_len(&self) -> OpsResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.channels as usize))
            .ok_or_else(|| {
                OpsError::InvalidDimensions(format!(
                    "{}x{}x{} overflows buffer length",
                    self.width, self.height, self.channels
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_region() {
        assert!(Region::full(0, 5).is_empty());
        assert!(Region::full(5, 0).is_empty());
        assert!(!Region::full(1, 1).is_empty());
    }

    #[test]
    fn test_len() {
        let region = Region::new(10, 20, 100, 50, 4);
        assert_eq!(region.num_pixels(), 5000);
        assert_eq!(region.len(), 20000);
        assert_eq!(region.checked_len().unwrap(), 20000);
    }

    #[test]
    fn test_checked_len_overflow() {
        let region = Region::full(u32::MAX, u32::MAX);
        assert!(region.checked_len().is_err());
    }
}
