//! CPU/GPU numeric parity tests.
//!
//! Both backends run the same per-pixel math (Rust kernel vs its WGSL
//! mirror), so outputs must agree to within the rounding of the shader's
//! `sqrt`. GPU tests skip when no adapter is present.

#![cfg(feature = "wgpu")]

use vib_gpu::{Backend, LabImage, VibranceProcessor, WgpuBackend};
use vib_ops::Vibrance;

/// Deterministic test image with a spread of chroma magnitudes, including
/// neutral and extreme pixels.
fn test_image(width: u32, height: u32) -> LabImage {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for i in 0..(width * height) as usize {
        data.push(5.0 + (i % 97) as f32); // L
        data.push(((i * 31) % 255) as f32 - 127.0); // a
        data.push(((i * 57) % 255) as f32 - 127.0); // b
        data.push((i % 4) as f32 * 0.25); // alpha
    }
    LabImage::from_f32(data, width, height, 4).unwrap()
}

/// Near-ulp comparison: both paths compute the same expression, but the
/// device `sqrt` is not required to be correctly rounded.
fn assert_near_ulp(cpu: &[f32], gpu: &[f32]) {
    assert_eq!(cpu.len(), gpu.len());
    for (i, (&c, &g)) in cpu.iter().zip(gpu.iter()).enumerate() {
        let tol = 4.0 * f32::EPSILON * c.abs().max(g.abs()).max(1.0);
        assert!(
            (c - g).abs() <= tol,
            "index {i}: cpu={c}, gpu={g}, tol={tol}"
        );
    }
}

fn gpu_available() -> bool {
    if WgpuBackend::is_available() {
        true
    } else {
        eprintln!("no GPU adapter available, skipping");
        false
    }
}

#[test]
fn cpu_gpu_parity() {
    if !gpu_available() {
        return;
    }

    let cpu = VibranceProcessor::new(Backend::Cpu).unwrap();
    let gpu = VibranceProcessor::new(Backend::Wgpu).unwrap();
    let params = Vibrance::new(37.5);

    // Odd dimensions force partially filled workgroups at both edges.
    let mut cpu_img = test_image(33, 17);
    let mut gpu_img = cpu_img.clone();

    cpu.apply(&mut cpu_img, &params).unwrap();
    gpu.apply(&mut gpu_img, &params).unwrap();

    assert_near_ulp(cpu_img.data(), gpu_img.data());
}

#[test]
fn gpu_alpha_and_identity() {
    if !gpu_available() {
        return;
    }

    let gpu = VibranceProcessor::new(Backend::Wgpu).unwrap();

    let src = test_image(16, 16);

    // amount 0 is the identity on the GPU path too
    let mut img = src.clone();
    gpu.apply(&mut img, &Vibrance::identity()).unwrap();
    assert_eq!(img.data(), src.data());

    // alpha passes through untouched at full strength
    let mut img = src.clone();
    gpu.apply(&mut img, &Vibrance::new(100.0)).unwrap();
    for (s, d) in src.data().chunks_exact(4).zip(img.data().chunks_exact(4)) {
        assert_eq!(s[3], d[3]);
    }
}

#[test]
fn auto_backend_runs() {
    // Auto resolves to whatever is present; either way the transform runs.
    let proc = VibranceProcessor::new(Backend::Auto).unwrap();
    let mut img = test_image(8, 8);
    proc.apply(&mut img, &Vibrance::default()).unwrap();
}
