//! The pipeline's entry point: renders the 3D scene into the read buffer.

use crate::camera::Camera;
use crate::compositor::pass::{Pass, PassContext, PassFlags};
use crate::gpu::GpuContext;

/// Optional whole-scene material override for special render passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverrideMode {
    /// Draw everything in one flat color.
    FlatColor([f32; 4]),
    /// Draw depth only; color output is undefined.
    Depth,
}

/// Everything a scene renderer needs for one draw.
pub struct SceneFrame<'a> {
    pub camera: &'a Camera,
    /// Color attachment to draw into.
    pub color: &'a wgpu::TextureView,
    /// Depth-stencil attachment, when the target has one.
    pub depth: Option<&'a wgpu::TextureView>,
    /// Clear color for this draw, or `None` to load existing contents.
    pub clear_color: Option<wgpu::Color>,
    pub clear_depth: bool,
    pub override_mode: Option<OverrideMode>,
}

/// The 3D-engine boundary: something that can draw a scene with a camera.
///
/// The compositor does not know about meshes or materials; scene content is
/// drawn by whatever implements this trait.
pub trait DrawScene {
    fn draw(&mut self, gpu: &GpuContext, encoder: &mut wgpu::CommandEncoder, frame: SceneFrame<'_>);
}

/// Renders the scene at the head of the pipeline.
///
/// The output goes into the **read** buffer, not the write buffer, and
/// `needs_swap` is false: downstream passes expect the freshly rendered scene
/// in the read slot, where their input texture is bound from.
///
/// The clear color is a per-draw setting computed from this pass's own
/// fields, so a temporary override never leaks into other passes regardless
/// of how the draw exits.
pub struct ScenePass {
    flags: PassFlags,
    scene: Box<dyn DrawScene>,
    /// Clear color override; `None` clears to black when `flags.clear` is
    /// set.
    pub clear_color: Option<wgpu::Color>,
    pub clear_depth: bool,
    pub override_mode: Option<OverrideMode>,
}

impl ScenePass {
    pub fn new(scene: impl DrawScene + 'static) -> Self {
        Self {
            flags: PassFlags::new(false).clearing(),
            scene: Box::new(scene),
            clear_color: None,
            clear_depth: true,
            override_mode: None,
        }
    }

    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = Some(color);
        self
    }
}

impl Pass for ScenePass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn render(&mut self, ctx: &mut PassContext<'_>) {
        let to_screen = self.flags.render_to_screen;
        let color = if to_screen {
            ctx.screen.unwrap_or(&ctx.read.view)
        } else {
            &ctx.read.view
        };
        // The display surface carries no depth buffer; offscreen draws use
        // the read target's.
        let depth = (!to_screen).then_some(&ctx.read.depth_view);

        let clear_color = if self.flags.clear {
            Some(self.clear_color.unwrap_or(wgpu::Color::BLACK))
        } else {
            None
        };

        self.scene.draw(
            ctx.gpu,
            ctx.encoder,
            SceneFrame {
                camera: ctx.camera,
                color,
                depth,
                clear_color,
                clear_depth: self.clear_depth,
                override_mode: self.override_mode,
            },
        );
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
