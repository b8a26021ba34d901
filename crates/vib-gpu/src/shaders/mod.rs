//! WGSL shader sources for the wgpu backend.
//!
//! The vibrance shader mirrors `vib_ops::vibrance_pixel` operation for
//! operation, including the 256.0 chroma divisor and 0.25 lightness factor.
//! Any change here must be made in lockstep with the Rust kernel or the
//! CPU/GPU parity property breaks.

#![allow(dead_code)] // Shaders used by wgpu backend

/// Vibrance transform over (L, a, b, alpha) f32 pixels.
///
/// Dispatched as a 2D grid rounded up to 16x16 workgroups; invocations
/// outside the region return before any memory access.
pub const VIBRANCE: &str = r#"
@group(0) @binding(0) var<storage, read> src: array<f32>;
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<uniform> dims: vec4<u32>;   // w, h, c, 0
@group(0) @binding(3) var<uniform> params: vec4<f32>; // amount01, 0, 0, 0

@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    let x = id.x;
    let y = id.y;
    if x >= dims.x || y >= dims.y { return; }

    let c = dims.z;
    let base = (y * dims.x + x) * c;
    let amount = params.x;

    let a = src[base + 1];
    let b = src[base + 2];

    // saturation weight, may exceed 1.0 for highly saturated pixels
    let sw = sqrt(a * a + b * b) / 256.0;
    let ls = 1.0 - amount * sw * 0.25;
    let ss = 1.0 + amount * sw;

    dst[base] = src[base] * ls;
    dst[base + 1] = a * ss;
    dst[base + 2] = b * ss;
    dst[base + 3] = src[base + 3];
}
"#;
