//! Post-processing compositor: an ordered pass pipeline over two ping-pong
//! buffers.
//!
//! The [`Compositor`] owns exactly two offscreen [`RenderTarget`]s — one in
//! the write role, one in the read role — and an ordered list of passes.
//! Each frame it executes every enabled pass in list order:
//!
//! ```text
//! ScenePass ──▶ read buffer           (needs_swap = false)
//! FilmPass:   read ──▶ write, swap    (needs_swap = true)
//! Overlay:    blends onto read/screen (needs_swap = false)
//! ```
//!
//! A pass with `needs_swap` flips the buffer roles after it runs, so its
//! output becomes the next pass's input. The final pass usually sets
//! `render_to_screen` and draws to the display surface instead.
//!
//! Pass variants:
//!
//! - [`ScenePass`] — pipeline entry point; draws a [`DrawScene`] collaborator
//! - [`CopyPass`] — opacity blit, also the masked-swap helper
//! - [`ShaderPass`] — generic full-screen WGSL pass
//! - [`FilmPass`] — grain + scanlines + optional grayscale
//! - [`DistortionPass`] — pointer-driven displacement (water / ink built-ins)
//! - [`OverlayPass`] — fixed texture composited at an opacity
//! - [`MaskPass`] / [`ClearMaskPass`] — stencil-mask brackets

mod compositor;
mod copy_pass;
mod distortion_pass;
mod film_pass;
mod mask_pass;
mod overlay_pass;
mod pass;
mod scene_pass;
mod shader_pass;
mod target;

pub use compositor::Compositor;
pub use copy_pass::CopyPass;
pub use distortion_pass::{DistortionParams, DistortionPass};
pub use film_pass::{FilmParams, FilmPass};
pub use mask_pass::{ClearMaskPass, MaskPass};
pub use overlay_pass::OverlayPass;
pub use pass::{CompositorError, MaskRole, Pass, PassContext, PassFlags};
pub use scene_pass::{DrawScene, OverrideMode, SceneFrame, ScenePass};
pub use shader_pass::{ShaderPass, ShaderUniforms};
pub use target::{DEPTH_STENCIL_FORMAT, RenderTarget};
