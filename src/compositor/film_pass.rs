//! Film-grain pass: procedural noise, scanline interference, optional
//! grayscale.

use crate::compositor::pass::{Pass, PassContext, PassFlags};
use crate::gpu::GpuContext;

const FILM_SHADER: &str = r#"
struct Uniforms {
    time: f32,
    noise_intensity: f32,
    scanline_intensity: f32,
    scanline_count: f32,
    grayscale: u32,
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
    let base = textureSample(input_texture, input_sampler, in.uv);

    // Per-pixel pseudo-noise seeded by uv and time.
    let seed = in.uv + fract(u.time);
    let x = seed.x * seed.y * u.time * 1000.0;
    let xm = fract(fract(x / 13.0) * fract(x / 123.0) * 0.01);
    let noise = clamp(0.1 + xm * 100.0, 0.0, 1.0);

    var color = base.rgb + base.rgb * clamp(noise, 0.3, 1.0) * u.noise_intensity;

    // Horizontal interference lines as a function of vertical position.
    let sc = vec2f(sin(in.uv.y * u.scanline_count), cos(in.uv.y * u.scanline_count));
    color += base.rgb * vec3f(sc.x, sc.y, sc.x) * u.scanline_intensity;

    // Blend the effect over the source by how strong the grain is set.
    color = base.rgb + clamp(u.noise_intensity, 0.0, 1.0) * (color - base.rgb);

    if u.grayscale != 0u {
        color = vec3f(color.r * 0.3 + color.g * 0.59 + color.b * 0.11);
    }

    return vec4f(color, base.a);
}
"#;

/// Tunable film-effect parameters, laid out to match the shader's uniform
/// block.
///
/// `time` accumulates across renders and is never reset; it drives the noise
/// seed. Values are conventionally in `[0, 1]` but are not clamped here —
/// bounding happens inside the shader math, not host-side.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FilmParams {
    /// Seconds accumulated across every render of the pass. Monotonic.
    pub time: f32,
    /// Strength of the additive grain.
    pub noise_intensity: f32,
    /// Strength of the scanline interference.
    pub scanline_intensity: f32,
    /// Number of scanlines across the frame height.
    pub scanline_count: f32,
    /// Nonzero converts output to luminance (0.3 / 0.59 / 0.11 weights).
    pub grayscale: u32,
    pub _pad: [u32; 3],
}

impl Default for FilmParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            noise_intensity: 0.5,
            scanline_intensity: 0.05,
            scanline_count: 4096.0,
            grayscale: 0,
            _pad: [0; 3],
        }
    }
}

impl FilmParams {
    /// Advance the time accumulator by one frame delta.
    pub fn advance(&mut self, dt: f32) {
        self.time += dt;
    }
}

/// Adds film grain and scanline interference over the read buffer.
pub struct FilmPass {
    flags: PassFlags,
    params: FilmParams,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl FilmPass {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Film Shader"),
            source: wgpu::ShaderSource::Wgsl(FILM_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Film Uniforms"),
            size: std::mem::size_of::<FilmParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Film Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Film Bind Group Layout"),
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
            label: Some("Film Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Film Pipeline"),
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

        Self {
            flags: PassFlags::new(true),
            params: FilmParams::default(),
            pipeline,
            uniform_buffer,
            bind_group_layout,
            sampler,
        }
    }

    /// Set all four tunables at once.
    pub fn set_params(
        &mut self,
        noise_intensity: f32,
        scanline_intensity: f32,
        scanline_count: f32,
        grayscale: bool,
    ) {
        self.params.noise_intensity = noise_intensity;
        self.params.scanline_intensity = scanline_intensity;
        self.params.scanline_count = scanline_count;
        self.params.grayscale = grayscale as u32;
    }

    pub fn params(&self) -> &FilmParams {
        &self.params
    }
}

impl Pass for FilmPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        self.params.advance(ctx.dt);
        ctx.gpu.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[self.params]),
        );

        let bind_group = ctx.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Film Bind Group"),
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
            label: Some("Film"),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accumulates_monotonically() {
        let mut params = FilmParams::default();
        assert_eq!(params.time, 0.0);

        params.advance(0.016);
        assert!((params.time - 0.016).abs() < 1e-7);

        params.advance(0.016);
        params.advance(0.033);
        assert!((params.time - 0.065).abs() < 1e-6);
    }

    #[test]
    fn params_layout_matches_uniform_block_size() {
        // Five scalars padded to a 16-byte boundary.
        assert_eq!(std::mem::size_of::<FilmParams>(), 32);
    }
}
