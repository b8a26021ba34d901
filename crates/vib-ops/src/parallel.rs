//! Row-parallel CPU execution engine using Rayon.
//!
//! The region is partitioned by row: each worker owns a disjoint set of
//! output rows, the input buffer is shared read-only, and rows are assigned
//! statically since per-row cost is uniform. No synchronization happens
//! inside the loop.
//!
//! # Example
//!
//! ```rust
//! use vib_ops::{Region, parallel};
//!
//! let region = Region::full(1920, 1080);
//! let src = vec![0.5f32; region.len()];
//! let mut dst = vec![0.0f32; region.len()];
//! parallel::apply_vibrance(&src, &mut dst, &region, 0.25).unwrap();
//! ```

use rayon::prelude::*;
use tracing::trace;

use crate::vibrance::vibrance_pixel;
use crate::{OpsError, OpsResult, Region};

/// Apply vibrance to every pixel in `region`, reading `src`, writing `dst`.
///
/// Both buffers must hold at least `region.len()` floats laid out row-major.
/// A zero-area region succeeds without touching memory. Outputs are written
/// independently per pixel; results do not depend on scheduling order.
///
/// For processing a buffer in place see [`apply_vibrance_in_place`].
pub fn apply_vibrance(
    src: &[f32],
    dst: &mut [f32],
    region: &Region,
    amount01: f32,
) -> OpsResult<()> {
    let len = validate(region, &[src.len(), dst.len()])?;
    if len == 0 {
        return Ok(());
    }

    trace!(
        width = region.width,
        height = region.height,
        amount01,
        "vibrance: cpu row-parallel apply"
    );

    let row_len = region.width as usize * region.channels as usize;

    dst[..len]
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(row, out_row)| {
            let offs = row * row_len;
            let in_row = &src[offs..offs + row_len];
            for base in (0..row_len).step_by(region.channels as usize) {
                let px = [
                    in_row[base],
                    in_row[base + 1],
                    in_row[base + 2],
                    in_row[base + 3],
                ];
                out_row[base..base + 4].copy_from_slice(&vibrance_pixel(px, amount01));
            }
        });

    Ok(())
}

/// Apply vibrance to `buf` in place.
///
/// Covers the pointer-identical half of the engine contract: the kernel has
/// no cross-pixel dependency, so each pixel can be overwritten as it is
/// computed. Produces output identical to [`apply_vibrance`].
pub fn apply_vibrance_in_place(buf: &mut [f32], region: &Region, amount01: f32) -> OpsResult<()> {
    let len = validate(region, &[buf.len()])?;
    if len == 0 {
        return Ok(());
    }

    trace!(
        width = region.width,
        height = region.height,
        amount01,
        "vibrance: cpu in-place apply"
    );

    let row_len = region.width as usize * region.channels as usize;

    buf[..len].par_chunks_mut(row_len).for_each(|row| {
        for base in (0..row_len).step_by(region.channels as usize) {
            let px = [row[base], row[base + 1], row[base + 2], row[base + 3]];
            row[base..base + 4].copy_from_slice(&vibrance_pixel(px, amount01));
        }
    });

    Ok(())
}

/// Check channel count and buffer lengths, returning the region float count.
fn validate(region: &Region, buffer_lens: &[usize]) -> OpsResult<usize> {
    if region.channels != 4 {
        return Err(OpsError::InvalidDimensions(format!(
            "vibrance operates on 4-channel Lab pixels, got {} channels",
            region.channels
        )));
    }

    let len = region.checked_len()?;
    for &have in buffer_lens {
        if have < len {
            return Err(OpsError::SizeMismatch(format!(
                "region needs {len} floats, buffer holds {have}"
            )));
        }
    }
    Ok(len)
}
