//! Demo scene driver: a cube under orbit controls, rendered through the
//! full post-processing chain (scene → water ripple → film grain →
//! vignette).

use std::sync::Arc;
use std::time::Instant;

use tracing::info;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use skylight::{
    Camera, Collider, Compositor, ControlEvent, DistortionPass, DrawScene, FilmPass, GpuContext,
    Input, OrbitControls, OverlayPass, OverrideMode, Pass, SceneContext, SceneFrame, ScenePass,
    Texture, Transform, Vec3,
};

const CUBE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    flat_color: vec4f,
    mode: vec4f,
}
@group(0) @binding(0) var<uniform> u: Uniforms;

var<private> CORNERS: array<vec3f, 8> = array<vec3f, 8>(
    vec3f(-1.0, -1.0, -1.0), vec3f(1.0, -1.0, -1.0),
    vec3f(1.0, 1.0, -1.0),   vec3f(-1.0, 1.0, -1.0),
    vec3f(-1.0, -1.0, 1.0),  vec3f(1.0, -1.0, 1.0),
    vec3f(1.0, 1.0, 1.0),    vec3f(-1.0, 1.0, 1.0),
);
var<private> INDICES: array<u32, 36> = array<u32, 36>(
    0u, 1u, 2u, 0u, 2u, 3u,
    5u, 4u, 7u, 5u, 7u, 6u,
    4u, 0u, 3u, 4u, 3u, 7u,
    1u, 5u, 6u, 1u, 6u, 2u,
    3u, 2u, 6u, 3u, 6u, 7u,
    4u, 5u, 1u, 4u, 1u, 0u,
);

struct VsOut {
    @builtin(position) pos: vec4f,
    @location(0) world: vec3f,
}

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
    let p = CORNERS[INDICES[vi]] * 60.0 + vec3f(0.0, 100.0, 0.0);
    var out: VsOut;
    out.pos = u.view_proj * vec4f(p, 1.0);
    out.world = p;
    return out;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4f {
    if u.mode.x > 1.5 {
        return vec4f(vec3f(in.pos.z), 1.0);
    }
    if u.mode.x > 0.5 {
        return u.flat_color;
    }
    let n = normalize(cross(dpdx(in.world), dpdy(in.world)));
    let light = normalize(vec3f(-1.0, 1.0, 1.0));
    let diffuse = max(dot(n, light), 0.0);
    return vec4f(vec3f(0.0, 0.8, 0.8) * (0.25 + 0.75 * diffuse), 1.0);
}
"#;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CubeUniforms {
    view_proj: [[f32; 4]; 4],
    flat_color: [f32; 4],
    mode: [f32; 4],
}

/// A single lit cube, drawn with vertex pulling (no vertex buffers).
struct CubeScene {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl CubeScene {
    fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(CUBE_SHADER.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cube Uniforms"),
            size: std::mem::size_of::<CubeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cube Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cube Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Pipeline"),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: skylight::DEPTH_STENCIL_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
        }
    }
}

impl DrawScene for CubeScene {
    fn draw(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        frame: SceneFrame<'_>,
    ) {
        // The cube pipeline is depth-tested, so it only draws into targets
        // that carry a depth buffer.
        let Some(depth) = frame.depth else {
            return;
        };

        let mode = match frame.override_mode {
            None => 0.0,
            Some(OverrideMode::FlatColor(_)) => 1.0,
            Some(OverrideMode::Depth) => 2.0,
        };
        let flat_color = match frame.override_mode {
            Some(OverrideMode::FlatColor(c)) => c,
            _ => [0.0; 4],
        };

        let uniforms = CubeUniforms {
            view_proj: frame.camera.view_projection_matrix().to_cols_array_2d(),
            flat_color,
            mode: [mode, 0.0, 0.0, 0.0],
        };
        gpu.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let color_load = match frame.clear_color {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        let depth_load = if frame.clear_depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cube Scene"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..36, 0..1);
    }
}

/// Pass indices in the compositor's list, in execution order.
const WATER_PASS: usize = 1;

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    compositor: Option<Compositor>,
    controls: Option<OrbitControls>,
    camera: Camera,
    scene: SceneContext,
    input: Input,
    last_frame: Instant,
}

impl App {
    fn new() -> Self {
        let mut camera = Camera::new()
            .at([0.0, 200.0, 500.0])
            .with_fov(45.0)
            .with_clip(10.0, 20000.0);
        camera.look_at(Vec3::new(0.0, 100.0, 0.0));

        Self {
            window: None,
            gpu: None,
            compositor: None,
            controls: None,
            camera,
            scene: SceneContext::new(),
            input: Input::new(),
            last_frame: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = match event_loop.create_window(Window::default_attributes()) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                tracing::error!(%error, "window creation failed");
                event_loop.exit();
                return;
            }
        };

        let gpu = GpuContext::new(window.clone());
        self.camera.aspect = gpu.aspect();

        let mut compositor = Compositor::new(&gpu);
        compositor.add_pass(
            &gpu,
            ScenePass::new(CubeScene::new(&gpu)).with_clear_color(wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.05,
                a: 1.0,
            }),
        );
        compositor.add_pass(&gpu, DistortionPass::water(&gpu));
        let mut film = FilmPass::new(&gpu);
        film.set_params(0.35, 0.05, 2048.0, false);
        film.flags_mut().render_to_screen = true;
        compositor.add_pass(&gpu, film);
        let vignette = Texture::vignette(&gpu, 512, 0.9);
        let mut overlay = OverlayPass::new(&gpu, &vignette, 0.9);
        overlay.flags_mut().render_to_screen = true;
        compositor.add_pass(&gpu, overlay);

        let mut controls = OrbitControls::new(&self.camera)
            .target([0.0, 100.0, 0.0])
            .distance_limits(150.0, 1500.0)
            .polar_limits(0.2, std::f32::consts::FRAC_PI_2)
            .damping(0.1);
        controls.set_viewport(gpu.width() as f32, gpu.height() as f32);

        let cube = self.scene.world.spawn((
            Transform::new().position([0.0, 100.0, 0.0]),
            Collider::box_collider(Vec3::splat(120.0)),
        ));
        controls.register_tap_target(cube);

        self.gpu = Some(gpu);
        self.compositor = Some(compositor);
        self.controls = Some(controls);
        self.window = Some(window);
        self.last_frame = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(gpu), Some(compositor), Some(controls)) = (
                    self.gpu.as_mut(),
                    self.compositor.as_mut(),
                    self.controls.as_mut(),
                ) {
                    gpu.resize(size.width, size.height);
                    compositor.set_size(gpu, size.width, size.height);
                    controls.set_viewport(size.width as f32, size.height as f32);
                    self.camera.aspect = gpu.aspect();
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(gpu), Some(compositor), Some(controls)) = (
                    self.gpu.as_ref(),
                    self.compositor.as_mut(),
                    self.controls.as_mut(),
                ) else {
                    return;
                };

                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32().min(0.1);
                self.last_frame = now;

                controls.process_input(&mut self.camera, &self.input);
                controls.update(&mut self.camera, &mut self.scene, dt);

                if let Some(water) = compositor.pass_downcast_mut::<DistortionPass>(WATER_PASS) {
                    water.set_pointer(self.input.mouse_position());
                }

                compositor.render(gpu, &self.camera, dt);

                for event in controls.drain_events() {
                    match event {
                        ControlEvent::TapTarget(entity) => info!(?entity, "cube tapped"),
                        ControlEvent::SceneTapped => info!("scene tapped"),
                        ControlEvent::Shake => info!("shake"),
                        _ => {}
                    }
                }

                self.input.begin_frame();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            other => {
                self.input.handle_event(&other);
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(error) => {
            eprintln!("failed to create event loop: {error}");
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    if let Err(error) = event_loop.run_app(&mut app) {
        eprintln!("event loop error: {error}");
    }
}
