//! A generic full-screen pass built from caller-supplied WGSL.

use crate::compositor::pass::{CompositorError, Pass, PassContext, PassFlags};
use crate::gpu::GpuContext;

/// Standard uniforms every [`ShaderPass`] shader receives at
/// `@group(0) @binding(0)`.
///
/// ```wgsl
/// struct Uniforms {
///     resolution: vec2f,
///     time: f32,
/// }
/// @group(0) @binding(0) var<uniform> u: Uniforms;
/// @group(0) @binding(1) var input_texture: texture_2d<f32>;
/// @group(0) @binding(2) var input_sampler: sampler;
/// ```
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    /// Render target resolution in pixels.
    pub resolution: [f32; 2],
    /// Seconds accumulated across every render of this pass.
    pub time: f32,
    pub _padding: f32,
}

/// A full-screen shader pass over the pipeline's read buffer.
///
/// The shader must define `vs` and `fs` entry points; the vertex stage is
/// expected to emit a full-screen triangle with a `uv` output. The pass
/// accumulates elapsed time into its `time` uniform on every render; that
/// accumulator is its only mutable state besides the shared flag set.
pub struct ShaderPass {
    flags: PassFlags,
    uniforms: ShaderUniforms,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl ShaderPass {
    /// Build a pass from WGSL source. Fails if the source is empty — a
    /// missing shader is a configuration error, reported once at
    /// construction.
    pub fn new(gpu: &GpuContext, shader_source: &str) -> Result<Self, CompositorError> {
        if shader_source.trim().is_empty() {
            return Err(CompositorError::EmptyShader);
        }

        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ShaderPass Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ShaderPass Uniforms"),
            size: std::mem::size_of::<ShaderUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ShaderPass Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ShaderPass Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ShaderPass Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ShaderPass Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            flags: PassFlags::new(true),
            uniforms: ShaderUniforms {
                resolution: [gpu.width() as f32, gpu.height() as f32],
                time: 0.0,
                _padding: 0.0,
            },
            pipeline,
            uniform_buffer,
            bind_group_layout,
            sampler,
        })
    }

    /// Accumulated shader time in seconds.
    pub fn time(&self) -> f32 {
        self.uniforms.time
    }
}

impl Pass for ShaderPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn resize(&mut self, _gpu: &GpuContext, width: u32, height: u32) {
        self.uniforms.resolution = [width as f32, height as f32];
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        self.uniforms.time += ctx.dt;
        ctx.gpu.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.uniforms]),
        );

        let bind_group = ctx.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ShaderPass Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&ctx.read.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ShaderPass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.output_view(&self.flags),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: ctx.load_op(&self.flags),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
