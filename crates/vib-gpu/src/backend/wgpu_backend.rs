//! wgpu backend implementation.
//!
//! Runs the vibrance kernel as a compute shader over device-resident
//! buffers. The compute pipeline is compiled once at backend construction
//! and reused for every dispatch; per-call work is argument binding and a
//! single 2D grid enqueue.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use tracing::debug;
use wgpu::util::DeviceExt;

use super::gpu_primitives::{AsAny, GpuPrimitives};
use super::{GpuLimits, ImageHandle, ProcessingBackend};
use crate::shaders;
use crate::{GpuError, GpuResult};

/// Workgroup edge length; dispatches round the region up to this granularity.
const WORKGROUP_DIM: u32 = 16;

/// Dimensions uniform: [width, height, channels, 0]
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct DimsUniform {
    dims: [u32; 4],
}

/// Kernel parameters uniform: [amount01, 0, 0, 0]
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct ParamsUniform {
    params: [f32; 4],
}

/// GPU buffer handle for image data.
pub struct WgpuImage {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    channels: u32,
    size_bytes: u64,
}

impl AsAny for WgpuImage {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

impl ImageHandle for WgpuImage {
    fn dimensions(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

/// wgpu primitives implementation.
///
/// Holds the device kernel handle: the vibrance pipeline compiled once in
/// [`WgpuPrimitives::new`] and released when the backend drops. Concurrent
/// dispatches against one instance must be serialized by the caller.
pub struct WgpuPrimitives {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    vibrance_pipeline: wgpu::ComputePipeline,
    limits: GpuLimits,
}

impl WgpuPrimitives {
    /// Check if wgpu is available.
    pub fn is_available() -> bool {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .is_some()
        })
    }

    /// Create new wgpu primitives.
    pub fn new() -> GpuResult<Self> {
        pollster::block_on(Self::new_async())
    }

    /// Create new wgpu primitives asynchronously.
    pub async fn new_async() -> GpuResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_limits = adapter.limits();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("vib_gpu_device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter_limits.clone(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    ..Default::default()
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let adapter_info = adapter.get_info();
        let available_memory = estimate_vram(&adapter_info, adapter_limits.max_buffer_size);
        debug!(
            adapter = %adapter_info.name,
            backend = ?adapter_info.backend,
            "vibrance: wgpu backend initialized"
        );

        let limits = GpuLimits {
            max_tile_dim: adapter_limits.max_texture_dimension_2d,
            max_buffer_bytes: adapter_limits.max_buffer_size,
            available_memory,
        };

        let vibrance_pipeline = Self::create_pipeline(&device);

        Ok(Self { device, queue, vibrance_pipeline, limits })
    }

    fn create_pipeline(device: &wgpu::Device) -> wgpu::ComputePipeline {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vibrance_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::VIBRANCE.into()),
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("vibrance_pipeline"),
            layout: None, // Auto layout
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        })
    }

    /// Execute one compute dispatch and wait, surfacing validation errors.
    ///
    /// On error the destination buffer contents are undefined; nothing is
    /// retried here.
    fn dispatch_and_wait(
        &self,
        bind_group: &wgpu::BindGroup,
        workgroups: (u32, u32, u32),
    ) -> GpuResult<()> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vibrance_encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("vibrance_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.vibrance_pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups.0, workgroups.1, workgroups.2);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);

        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(GpuError::OperationFailed(format!(
                "vibrance dispatch failed: {err}"
            )));
        }
        Ok(())
    }
}

impl GpuPrimitives for WgpuPrimitives {
    type Handle = WgpuImage;

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

        let size_bytes = (data.len() * 4) as u64;

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("image_buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            });

        Ok(WgpuImage { buffer, width, height, channels, size_bytes })
    }

    fn download(&self, handle: &Self::Handle) -> GpuResult<Vec<f32>> {
        let size = handle.size_bytes;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self.device.create_command_encoder(&Default::default());
        encoder.copy_buffer_to_buffer(&handle.buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        self.device.poll(wgpu::Maintain::Wait);

        rx.recv()
            .map_err(|_| GpuError::OperationFailed("Map channel closed".into()))?
            .map_err(|e| GpuError::OperationFailed(format!("Map failed: {e}")))?;

        let data = slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();

        Ok(result)
    }

    fn allocate(&self, width: u32, height: u32, channels: u32) -> GpuResult<Self::Handle> {
        let size_bytes = (width as u64) * (height as u64) * (channels as u64) * 4;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("output_buffer"),
            size: size_bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(WgpuImage { buffer, width, height, channels, size_bytes })
    }

    fn exec_vibrance(
        &self,
        src: &Self::Handle,
        dst: &mut Self::Handle,
        amount01: f32,
    ) -> GpuResult<()> {
        let (w, h, c) = src.dimensions();
        if w == 0 || h == 0 {
            return Ok(());
        }

        // Argument order is fixed: src, dst, dims (width/height), amount.
        let dims = DimsUniform { dims: [w, h, c, 0] };
        let dims_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("dims_uniform"),
                contents: bytemuck::bytes_of(&dims),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let params = ParamsUniform { params: [amount01, 0.0, 0.0, 0.0] };
        let params_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("vibrance_params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let layout = self.vibrance_pipeline.get_bind_group_layout(0);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vibrance_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: src.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: dst.buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: dims_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: params_buf.as_entire_binding() },
            ],
        });

        // 2D grid rounded up; excess invocations bounds-check in the shader
        let workgroups = (w.div_ceil(WORKGROUP_DIM), h.div_ceil(WORKGROUP_DIM), 1);
        self.dispatch_and_wait(&bind_group, workgroups)
    }

    fn limits(&self) -> &GpuLimits {
        &self.limits
    }

    fn name(&self) -> &'static str {
        "wgpu"
    }
}

/// wgpu processing backend.
pub struct WgpuBackend {
    primitives: WgpuPrimitives,
}

impl WgpuBackend {
    /// Check if wgpu is available.
    pub fn is_available() -> bool {
        WgpuPrimitives::is_available()
    }

    /// Create new wgpu backend.
    pub fn new() -> GpuResult<Self> {
        Ok(Self { primitives: WgpuPrimitives::new()? })
    }

    /// Get inner primitives.
    pub fn primitives(&self) -> &WgpuPrimitives {
        &self.primitives
    }
}

impl ProcessingBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu"
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
        let wgpu_handle = handle
            .as_any()
            .downcast_ref::<WgpuImage>()
            .ok_or_else(|| GpuError::OperationFailed("Invalid handle type".into()))?;
        self.primitives.download(wgpu_handle)
    }

    fn apply_vibrance(&self, handle: &mut dyn ImageHandle, amount01: f32) -> GpuResult<()> {
        let wgpu_handle = handle
            .as_any_mut()
            .downcast_mut::<WgpuImage>()
            .ok_or_else(|| GpuError::OperationFailed("Invalid handle type".into()))?;

        let (w, h, c) = wgpu_handle.dimensions();
        let mut dst = self.primitives.allocate(w, h, c)?;
        self.primitives.exec_vibrance(wgpu_handle, &mut dst, amount01)?;

        // Swap buffers
        std::mem::swap(&mut wgpu_handle.buffer, &mut dst.buffer);
        Ok(())
    }
}

fn estimate_vram(info: &wgpu::AdapterInfo, max_buffer_bytes: u64) -> u64 {
    // Check env override
    if let Ok(mb) = std::env::var("VIB_GPU_MEMORY_MB") {
        if let Ok(mb) = mb.parse::<u64>() {
            return mb.saturating_mul(1024 * 1024);
        }
    }

    let from_buffer = max_buffer_bytes.saturating_mul(2);

    let estimated = match info.device_type {
        wgpu::DeviceType::DiscreteGpu => from_buffer.clamp(2u64 << 30, 24u64 << 30),
        wgpu::DeviceType::IntegratedGpu => from_buffer.clamp(512u64 << 20, 4u64 << 30),
        wgpu::DeviceType::VirtualGpu => from_buffer.clamp(1u64 << 30, 8u64 << 30),
        _ => from_buffer.clamp(256u64 << 20, 2u64 << 30),
    };

    // 80% safe margin
    estimated.saturating_mul(80) / 100
}
