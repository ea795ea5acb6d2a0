use std::sync::mpsc;

use pixwarp_image::{Image, ImageSize};
use pixwarp_imgproc::render::{Backend, RenderJob};

use crate::context::GpuContext;
use crate::error::GpuError;
use crate::readback::{padded_bytes_per_row, rgb_to_rgba, rgba_to_rgb, strip_row_padding};
use crate::shader::WARP_SHADER;

const QUAD_VERTICES: [f32; 8] = [-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

/// Resample a job on the GPU, acquiring and tearing down a fresh context.
///
/// Equivalent to the CPU backend: a fragment program inverse-maps every
/// output pixel into the source texture and blends its four clamped
/// neighbors. Out-of-bounds fragments keep the cleared background.
///
/// # Errors
///
/// Context acquisition, shader compilation and readback failures all
/// surface as typed [`GpuError`]s; nothing aborts the process.
pub fn warp_gpu(job: &RenderJob<'_>) -> Result<Image<u8, 3>, GpuError> {
    let ctx = GpuContext::new()?;
    warp_gpu_with_context(&ctx, job)
}

/// Resample a job on an already acquired [`GpuContext`].
pub fn warp_gpu_with_context(
    ctx: &GpuContext,
    job: &RenderJob<'_>,
) -> Result<Image<u8, 3>, GpuError> {
    if !matches!(job.backend, Backend::Gpu) {
        return Err(GpuError::BackendMismatch);
    }

    let ImageSize { width, height } = job.dst_size;
    if width == 0 || height == 0 {
        return Ok(Image::from_size_val(job.dst_size, 0u8)?);
    }
    let (width, height) = (width as u32, height as u32);

    let src_size = wgpu::Extent3d {
        width: job.src.width() as u32,
        height: job.src.height() as u32,
        depth_or_array_layers: 1,
    };
    let dst_size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    // upload the source as a rgba8 texture, sampled texel-by-texel
    let src_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pixwarp_src"),
        size: src_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    ctx.queue.write_texture(
        src_texture.as_image_copy(),
        &rgb_to_rgba(job.src.as_slice()),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(src_size.width * 4),
            rows_per_image: Some(src_size.height),
        },
        src_size,
    );

    // offscreen color target plus a depth attachment completing the pass
    let color_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pixwarp_color"),
        size: dst_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let depth_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pixwarp_depth"),
        size: dst_size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    // surface shader diagnostics instead of panicking inside the driver
    ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = ctx
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pixwarp_warp_shader"),
            source: wgpu::ShaderSource::Wgsl(WARP_SHADER.into()),
        });
    if let Some(error) = pollster::block_on(ctx.device.pop_error_scope()) {
        return Err(GpuError::ShaderCompile(error.to_string()));
    }

    let bind_group_layout = ctx
        .device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pixwarp_warp_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pixwarp_warp_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

    let pipeline = ctx
        .device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pixwarp_warp_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 2 * std::mem::size_of::<f32>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

    let vertex_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pixwarp_quad_vertices"),
        size: std::mem::size_of_val(&QUAD_VERTICES) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    ctx.queue
        .write_buffer(&vertex_buffer, 0, &f32s_as_bytes(&QUAD_VERTICES));

    let index_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pixwarp_quad_indices"),
        size: std::mem::size_of_val(&QUAD_INDICES) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    ctx.queue
        .write_buffer(&index_buffer, 0, &u32s_as_bytes(&QUAD_INDICES));

    let params: [f32; 8] = [
        job.src.width() as f32,
        job.src.height() as f32,
        job.x_offset as f32,
        job.y_offset as f32,
        job.inverse[0] as f32,
        job.inverse[1] as f32,
        job.inverse[2] as f32,
        job.inverse[3] as f32,
    ];
    let params_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pixwarp_warp_params"),
        size: std::mem::size_of_val(&params) as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    ctx.queue
        .write_buffer(&params_buffer, 0, &f32s_as_bytes(&params));

    let src_view = src_texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("pixwarp_warp_bg"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&src_view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: params_buffer.as_entire_binding(),
            },
        ],
    });

    let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pixwarp_warp_encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pixwarp_warp_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.0,
                        g: 0.0,
                        b: 0.0,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    // synchronous readback through a row-padded staging buffer
    let padded_stride = padded_bytes_per_row(width);
    let readback_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pixwarp_readback"),
        size: padded_stride as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        color_texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &readback_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_stride),
                rows_per_image: Some(height),
            },
        },
        dst_size,
    );

    ctx.queue.submit([encoder.finish()]);

    let slice = readback_buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    let _ = ctx.device.poll(wgpu::Maintain::Wait);

    rx.recv()
        .map_err(|e| GpuError::Readback(e.to_string()))?
        .map_err(|e| GpuError::Readback(e.to_string()))?;

    let rgb = {
        let mapped = slice.get_mapped_range();
        let rgba = strip_row_padding(&mapped, width, height);
        rgba_to_rgb(&rgba)
    };
    readback_buffer.unmap();

    Ok(Image::new(job.dst_size, rgb)?)
}

fn f32s_as_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

fn u32s_as_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}
