//! Vibrance parameters and the per-pixel kernel.
//!
//! Reference: darktable's vibrance module (Lab-space formulation).
//!
//! The transform weights each pixel by its own chroma magnitude: already
//! saturated pixels get the strongest chroma boost, near-neutral pixels are
//! left almost untouched. Lightness is compressed slightly on saturated
//! pixels so the boost does not read as a brightness increase.
//!
//! Both execution engines delegate to [`vibrance_pixel`]; the WGSL shader in
//! `vib-gpu` mirrors it operation for operation.

/// Chroma normalization divisor.
///
/// Empirically tuned, not derived: it keeps the saturation weight in a
/// convenient range for typical Lab chroma magnitudes. The weight may exceed
/// 1.0 for highly saturated pixels and the formula tolerates that.
pub const CHROMA_NORM: f32 = 256.0;

/// Lightness compression factor, also empirically tuned.
pub const LIGHTNESS_COMPRESSION: f32 = 0.25;

/// Vibrance parameters.
///
/// `amount` is a percent strength in [0, 100]. Values outside that range are
/// a caller contract violation; validation belongs to the parameter supplier
/// and is not rechecked here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrance {
    /// Strength in percent, [0, 100].
    pub amount: f32,
}

impl Default for Vibrance {
    fn default() -> Self {
        Self { amount: 25.0 }
    }
}

impl Vibrance {
    /// Create with the given percent strength.
    pub fn new(amount: f32) -> Self {
        Self { amount }
    }

    /// Create identity (no change).
    pub fn identity() -> Self {
        Self { amount: 0.0 }
    }

    /// Check if this is identity (no-op).
    pub fn is_identity(&self) -> bool {
        self.amount == 0.0
    }

    /// Unit-scale multiplier, resolved once before pixel processing.
    ///
    /// Invariant: in [0, 1] for in-range `amount`.
    pub fn amount01(&self) -> f32 {
        self.amount / 100.0
    }

    /// Apply the transform to one `(L, a, b, alpha)` pixel.
    #[inline]
    pub fn apply(&self, px: [f32; 4]) -> [f32; 4] {
        vibrance_pixel(px, self.amount01())
    }
}

/// The vibrance kernel: one `(L, a, b, alpha)` pixel in, one out.
///
/// ```text
/// sw = sqrt(a^2 + b^2) / 256      saturation weight
/// L' = L * (1 - amount01 * sw * 0.25)
/// a' = a * (1 + amount01 * sw)
/// b' = b * (1 + amount01 * sw)
/// ```
///
/// Alpha is copied, never read for math. Outputs are not clamped; lightness
/// may go negative and chroma may overshoot. Display-time clipping is a
/// later pipeline stage's job. NaN inputs propagate as NaN outputs.
#[inline]
pub fn vibrance_pixel(px: [f32; 4], amount01: f32) -> [f32; 4] {
    let [l, a, b, alpha] = px;
    let sw = (a * a + b * b).sqrt() / CHROMA_NORM;
    let ls = 1.0 - amount01 * sw * LIGHTNESS_COMPRESSION;
    let ss = 1.0 + amount01 * sw;
    [l * ls, a * ss, b * ss, alpha]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_pixel() {
        // amount 25 on (50, 20, 0, 1):
        //   sw = 20/256, ls = 1 - 0.25 * sw * 0.25, ss = 1 + 0.25 * sw
        let out = Vibrance::new(25.0).apply([50.0, 20.0, 0.0, 1.0]);
        assert_relative_eq!(out[0], 49.755859375, max_relative = 1e-6);
        assert_relative_eq!(out[1], 20.390625, max_relative = 1e-6);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_zero_amount_is_identity() {
        let px = [42.5, -13.25, 7.75, 0.5];
        assert_eq!(vibrance_pixel(px, 0.0), px);
        assert!(Vibrance::identity().is_identity());
        assert!(!Vibrance::default().is_identity());
    }

    #[test]
    fn test_alpha_preserved() {
        for alpha in [0.0, 0.25, 1.0, -3.0, f32::INFINITY] {
            let out = vibrance_pixel([60.0, 30.0, -40.0, alpha], 0.8);
            assert_eq!(out[3], alpha);
        }
    }

    #[test]
    fn test_monotonic_in_amount() {
        let px = [50.0f32, 20.0, -10.0, 1.0];
        let mut prev = vibrance_pixel(px, 0.0);
        for step in 1..=10 {
            let out = vibrance_pixel(px, step as f32 / 10.0);
            assert!(out[1].abs() > prev[1].abs());
            assert!(out[2].abs() > prev[2].abs());
            assert!(out[0] < prev[0]);
            prev = out;
        }
    }

    #[test]
    fn test_neutral_pixel_unchanged() {
        // sw = 0: no chroma to weight by, any amount is a no-op
        let px = [77.0, 0.0, 0.0, 1.0];
        assert_eq!(vibrance_pixel(px, 1.0), px);
    }

    #[test]
    fn test_not_idempotent() {
        // Applying twice at x is not the same as once at 2x: the second pass
        // sees the already-expanded chroma. Guards against a wrong linear
        // compose assumption.
        let px = [50.0, 20.0, 10.0, 1.0];
        let twice = vibrance_pixel(vibrance_pixel(px, 0.25), 0.25);
        let once = vibrance_pixel(px, 0.5);
        assert_ne!(twice[0], once[0]);
        assert_ne!(twice[1], once[1]);
    }

    #[test]
    fn test_nan_propagates() {
        let out = vibrance_pixel([50.0, f32::NAN, 0.0, 1.0], 0.5);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn test_amount01_range() {
        assert_eq!(Vibrance::new(0.0).amount01(), 0.0);
        assert_eq!(Vibrance::new(100.0).amount01(), 1.0);
        assert_eq!(Vibrance::new(25.0).amount01(), 0.25);
    }
}
