//! The pass capability interface and per-frame execution context.

use thiserror::Error;

use crate::camera::Camera;
use crate::compositor::target::RenderTarget;
use crate::gpu::GpuContext;

/// Errors from compositor and pass configuration.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// `insert_pass` was called with an index past the end of the list.
    #[error("pass index {index} is out of range for a list of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// A shader-driven pass was constructed without shader source.
    #[error("shader source is empty")]
    EmptyShader,
}

/// How a pass participates in stencil-mask bracketing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MaskRole {
    /// An ordinary pass.
    #[default]
    None,
    /// Opens a masked region; swaps inside it go through the inverted-
    /// stencil copy.
    Begin,
    /// Closes the masked region.
    End,
}

/// Scheduling flags shared by every pass.
///
/// `needs_swap` means executing the pass advances the pipeline: its output in
/// the write buffer becomes the next pass's input. `render_to_screen` routes
/// the output to the display surface instead.
#[derive(Clone, Copy, Debug)]
pub struct PassFlags {
    /// Disabled passes are skipped entirely: no buffer writes, no uniform
    /// updates, no time advance.
    pub enabled: bool,
    /// Whether running this pass flips the read/write buffer roles
    /// afterwards.
    pub needs_swap: bool,
    /// Whether the output target is cleared before drawing.
    pub clear: bool,
    /// Present to the display surface instead of the offscreen write buffer.
    pub render_to_screen: bool,
}

impl PassFlags {
    pub fn new(needs_swap: bool) -> Self {
        Self {
            enabled: true,
            needs_swap,
            clear: false,
            render_to_screen: false,
        }
    }

    pub fn clearing(mut self) -> Self {
        self.clear = true;
        self
    }
}

/// Everything a pass may touch while rendering one frame step.
///
/// Buffer references are borrows scoped to a single `render` call; passes
/// must not hold onto them. This is what keeps the compositor's two buffers
/// exclusively owned: a pass only ever sees them through this context.
pub struct PassContext<'a> {
    pub gpu: &'a GpuContext,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// The buffer this pass should write into (unless it renders to screen).
    pub write: &'a RenderTarget,
    /// The buffer holding the previous pass's output, bound as input.
    pub read: &'a RenderTarget,
    /// The display surface view, if this frame presents.
    pub screen: Option<&'a wgpu::TextureView>,
    /// Camera state for passes that draw the scene or need view data.
    pub camera: &'a Camera,
    /// Frame delta in seconds.
    pub dt: f32,
    /// Whether a stencil-mask region is active.
    pub masking: bool,
}

impl<'a> PassContext<'a> {
    /// The view a pass with the given flags should draw into.
    pub fn output_view(&self, flags: &PassFlags) -> &'a wgpu::TextureView {
        if flags.render_to_screen {
            self.screen.unwrap_or(&self.write.view)
        } else {
            &self.write.view
        }
    }

    /// The load op implied by the pass's clear flag.
    pub fn load_op(&self, flags: &PassFlags) -> wgpu::LoadOp<wgpu::Color> {
        if flags.clear {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        }
    }
}

/// One step of the post-processing pipeline.
///
/// Implementations own their GPU resources (pipeline, uniforms, sampler) for
/// their whole lifetime and receive buffers only through [`PassContext`].
/// List order in the compositor is execution order, always.
pub trait Pass {
    /// Scheduling flags; the compositor consults these before executing.
    fn flags(&self) -> &PassFlags;

    /// Mutable access to the flags, for enabling/disabling a pass or routing
    /// the final pass to the screen.
    fn flags_mut(&mut self) -> &mut PassFlags;

    /// Type tag for stencil-mask bracketing.
    fn mask_role(&self) -> MaskRole {
        MaskRole::None
    }

    /// Called when the compositor's surface size changes, and once when the
    /// pass is added (so late-added passes never see a stale size).
    fn resize(&mut self, _gpu: &GpuContext, _width: u32, _height: u32) {}

    /// Execute the pass against the current buffers.
    fn render(&mut self, ctx: &mut PassContext<'_>);

    /// Downcast support, so callers can reach a concrete pass inside the
    /// compositor's list (e.g. to feed a distortion pass the pointer
    /// position). Implementations return `self`.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
