//! `wgpu`-backed GPU implementation of the §4.5 search dispatcher.
//!
//! Structured the way `TechieQuokka-bitcoin-rust-educational`'s
//! `gpu_pow.rs` wires up a `wgpu` mining kernel: `bytemuck::Pod` param/
//! result structs uploaded as storage buffers, a `ShaderSource::Wgsl`
//! compute pipeline, a blocking `pollster::block_on` around adapter/device
//! acquisition and buffer readback, and a staging buffer for the
//! host-visible copy-back.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use log::{debug, info};
use wgpu::util::DeviceExt;

use crate::device::shader::{KAWPOW_SEARCH_SHADER, WORKGROUP_SIZE};
use crate::device::{validate_dag_size, Backend};
use crate::error::{KawPowError, Result};
use crate::primitives::{higher32, lower32};
use crate::search::{SearchHit, SearchOutcome, SearchParams};
use crate::types::{Digest, MixHash};

/// Host-visible mirror of the shader's `Params` struct. Field order and
/// widths must match `shader::KAWPOW_SEARCH_SHADER` exactly.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GpuParams {
    header: [u32; 8],
    target: [u32; 8],
    start_nonce_lo: u32,
    start_nonce_hi: u32,
    nonces_per_thread: u32,
    dag_item_count: u32,
    range_len: u32,
}

/// Host-visible mirror of the shader's `SearchResult` struct. The `found`
/// word is a plain `u32` here (it is zero either way); the shader reads and
/// writes it through `atomic<u32>`, which shares `u32`'s layout.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GpuResult {
    found: u32,
    nonce_lo: u32,
    nonce_hi: u32,
    hash: [u32; 8],
    mix: [u32; 8],
}

/// GPU search backend. Owns the `wgpu` device/queue and a compiled compute
/// pipeline; `search` allocates per-call buffers sized to that call's DAG
/// and range.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl WgpuBackend {
    /// Acquires a GPU adapter/device and compiles the search shader.
    /// Returns `LaunchFailure` if no adapter is available or device
    /// acquisition fails — both are launch-refusal errors per §7, not
    /// panics.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| KawPowError::LaunchFailure("no GPU adapter found".to_string()))?;

        let info = adapter.get_info();
        info!("kawpow_core: GPU adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("kawpow-search"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| KawPowError::LaunchFailure(format!("device request failed: {e}")))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kawpow-search-shader"),
            source: wgpu::ShaderSource::Wgsl(KAWPOW_SEARCH_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kawpow-search-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kawpow-search-pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("kawpow-search-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "kawpow_search",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });

        Ok(WgpuBackend {
            device,
            queue,
            pipeline,
            bind_group_layout,
        })
    }
}

impl Backend for WgpuBackend {
    fn search(&mut self, params: &SearchParams, dag_bytes: &[u8]) -> Result<SearchOutcome> {
        params.validate()?;
        validate_dag_size(dag_bytes.len() as u64)?;

        let range_len: u32 = params.range_len.try_into().map_err(|_| {
            KawPowError::LaunchFailure(format!(
                "range_len {} exceeds a single launch's u32 nonce-count bound",
                params.range_len
            ))
        })?;

        let dag_item_count = (dag_bytes.len() / 64) as u32;
        let nonces_per_thread = params.nonces_per_thread.max(1);
        let total_threads = params.range_len.div_ceil(nonces_per_thread as u64);
        let workgroups = (total_threads as u32).div_ceil(WORKGROUP_SIZE);

        let gpu_params = GpuParams {
            header: params.header.words(),
            target: params.target.words(),
            start_nonce_lo: lower32(params.start_nonce),
            start_nonce_hi: higher32(params.start_nonce),
            nonces_per_thread,
            dag_item_count,
            range_len,
        };

        let dag_words: &[u32] = bytemuck::cast_slice(dag_bytes);

        let dag_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kawpow-dag"),
                contents: bytemuck::cast_slice(dag_words),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let params_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kawpow-params"),
                contents: bytemuck::bytes_of(&gpu_params),
                usage: wgpu::BufferUsages::STORAGE,
            });

        let zero_result = GpuResult::zeroed();
        let result_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kawpow-result"),
                contents: bytemuck::bytes_of(&zero_result),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            });

        let staging_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kawpow-staging"),
            size: size_of::<GpuResult>() as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kawpow-search-bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: result_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: dag_buf.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kawpow-search-cmd"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("kawpow-search-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(&result_buf, 0, &staging_buf, 0, size_of::<GpuResult>() as u64);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buf.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |v| {
            let _ = tx.send(v);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| KawPowError::DeviceMemory("result readback channel closed".to_string()))?
            .map_err(|e| KawPowError::DeviceMemory(format!("buffer map failed: {e:?}")))?;

        let gpu_result: GpuResult = {
            let view = slice.get_mapped_range();
            *bytemuck::from_bytes(&view)
        };
        staging_buf.unmap();

        if gpu_result.found == 0 {
            debug!("kawpow_core: launch of {workgroups} workgroups found nothing");
            return Ok(None);
        }

        let nonce = ((gpu_result.nonce_hi as u64) << 32) | gpu_result.nonce_lo as u64;
        Ok(Some(SearchHit {
            nonce,
            digest: Digest(gpu_result.hash),
            mix: MixHash(gpu_result.mix),
        }))
    }
}
