//! Parameterized full-screen distortion passes (water ripple, ink flow).

use glam::Vec2;

use crate::compositor::pass::{CompositorError, Pass, PassContext, PassFlags};
use crate::gpu::GpuContext;

/// Ripples spreading from the pointer position, displacing the sampled uv.
const WATER_SHADER: &str = r#"
struct Uniforms {
    time: f32,
    _pad: f32,
    resolution: vec2f,
    mouse: vec2f,
}
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var input_texture: texture_2d<f32>;
@group(0) @binding(2) var input_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4f,
    @location(0) uv: vec2f,
}

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
    let uv = vec2f(f32((vi << 1u) & 2u), f32(vi & 2u));
    var out: VsOut;
    out.pos = vec4f(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2f(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4f {
    let aspect = u.resolution.x / max(u.resolution.y, 1.0);
    let center = u.mouse / max(u.resolution, vec2f(1.0));
    var toward = in.uv - center;
    toward.x *= aspect;

    let dist = length(toward);
    let falloff = exp(-dist * 4.0);
    let ripple = sin(dist * 40.0 - u.time * 4.0) * 0.0125 * falloff;

    let dir = select(toward / dist, vec2f(0.0), dist < 1e-4);
    let displaced = in.uv + dir * ripple;

    return textureSample(input_texture, input_sampler, displaced);
}
"#;

/// Ink-wash look: luminance-driven flow with a wandering threshold.
const INK_SHADER: &str = r#"
struct Uniforms {
    time: f32,
    _pad: f32,
    resolution: vec2f,
    mouse: vec2f,
}
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(0) @binding(1) var input_texture: texture_2d<f32>;
@group(0) @binding(2) var input_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4f,
    @location(0) uv: vec2f,
}

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
    let uv = vec2f(f32((vi << 1u) & 2u), f32(vi & 2u));
    var out: VsOut;
    out.pos = vec4f(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2f(uv.x, 1.0 - uv.y);
    return out;
}

fn hash(p: vec2f) -> f32 {
    return fract(sin(dot(p, vec2f(12.9898, 78.233))) * 43758.5453);
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4f {
    let wobble = vec2f(
        hash(in.uv + fract(u.time * 0.1)) - 0.5,
        hash(in.uv.yx - fract(u.time * 0.1)) - 0.5
    ) * 0.004;

    let color = textureSample(input_texture, input_sampler, in.uv + wobble);
    let luma = dot(color.rgb, vec3f(0.3, 0.59, 0.11));
    let edge = smoothstep(0.2, 0.8, luma + sin(u.time * 0.5) * 0.05);
    let ink = mix(vec3f(0.05, 0.05, 0.08), vec3f(0.96, 0.95, 0.9), edge);

    return vec4f(mix(color.rgb, ink, 0.85), color.a);
}
"#;

/// Uniform block shared by every distortion variant.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DistortionParams {
    /// Seconds accumulated across every render. Monotonic.
    pub time: f32,
    pub _pad: f32,
    /// Render target resolution in pixels.
    pub resolution: [f32; 2],
    /// Pointer position in pixels, feeding the displacement center.
    pub mouse: [f32; 2],
    pub _pad2: [f32; 2],
}

/// A full-screen distortion pass parameterized by time, resolution, and the
/// pointer position.
///
/// The water and ink looks are the same pass with different shader content;
/// [`from_source`](DistortionPass::from_source) accepts any shader with the
/// same uniform interface.
pub struct DistortionPass {
    flags: PassFlags,
    params: DistortionParams,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl DistortionPass {
    /// The built-in water-ripple variant.
    pub fn water(gpu: &GpuContext) -> Self {
        Self::from_source(gpu, WATER_SHADER).expect("built-in water shader is non-empty")
    }

    /// The built-in ink-wash variant.
    pub fn ink(gpu: &GpuContext) -> Self {
        Self::from_source(gpu, INK_SHADER).expect("built-in ink shader is non-empty")
    }

    /// Build a distortion pass from custom WGSL with the standard uniform
    /// interface. Fails on empty source.
    pub fn from_source(gpu: &GpuContext, shader_source: &str) -> Result<Self, CompositorError> {
        if shader_source.trim().is_empty() {
            return Err(CompositorError::EmptyShader);
        }

        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Distortion Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Distortion Uniforms"),
            size: std::mem::size_of::<DistortionParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Distortion Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Distortion Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
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
            label: Some("Distortion Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Distortion Pipeline"),
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
            params: DistortionParams {
                time: 0.0,
                _pad: 0.0,
                resolution: [gpu.width() as f32, gpu.height() as f32],
                mouse: [10.0, 10.0],
                _pad2: [0.0; 2],
            },
            pipeline,
            uniform_buffer,
            bind_group_layout,
            sampler,
        })
    }

    /// Feed the pointer position in window pixels.
    pub fn set_pointer(&mut self, position: Vec2) {
        self.params.mouse = [position.x, position.y];
    }

    pub fn params(&self) -> &DistortionParams {
        &self.params
    }
}

impl Pass for DistortionPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn resize(&mut self, _gpu: &GpuContext, width: u32, height: u32) {
        self.params.resolution = [width as f32, height as f32];
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        self.params.time += ctx.dt;
        ctx.gpu.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.params]),
        );

        let bind_group = ctx.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Distortion Bind Group"),
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
            label: Some("Distortion"),
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
