//! # Skylight
//!
//! **Post-processing compositor and orbit camera controls for wgpu scenes.**
//!
//! Two independent building blocks for interactive 3D scenes:
//!
//! - A [`Compositor`] that threads each frame through an ordered chain of
//!   full-screen passes over two ping-pong buffers — scene render, film
//!   grain, pointer-driven distortion, texture overlays — presenting the
//!   final pass to the display.
//! - [`OrbitControls`] that keep the camera in spherical coordinates around
//!   a target, fed by mouse, wheel, touch, and device-orientation input,
//!   with damping, clamping, tap detection against scene entities, and
//!   tween-driven programmatic moves.
//!
//! ## Quick start
//!
//! ```ignore
//! use skylight::*;
//!
//! let gpu = GpuContext::new(window.clone());
//! let mut compositor = Compositor::new(&gpu);
//! compositor.add_pass(&gpu, ScenePass::new(my_scene));
//! compositor.add_pass(&gpu, FilmPass::new(&gpu));
//!
//! let mut camera = Camera::new().at([0.0, 100.0, 500.0]);
//! let mut controls = OrbitControls::new(&camera).target([0.0, 100.0, 0.0]);
//!
//! // Each frame:
//! controls.process_input(&mut camera, &input);
//! controls.update(&mut camera, &mut scene, dt);
//! compositor.render(&gpu, &camera, dt);
//! ```

mod camera;
mod compositor;
mod gpu;
mod input;
mod orbit_controls;
mod picking;
mod scene;
mod spherical;
mod texture;
mod tween;

pub use camera::{Camera, Projection};
pub use compositor::{
    ClearMaskPass, Compositor, CompositorError, CopyPass, DEPTH_STENCIL_FORMAT, DistortionParams,
    DistortionPass, DrawScene, FilmParams, FilmPass, MaskPass, MaskRole, OverlayPass,
    OverrideMode, Pass, PassContext, PassFlags, RenderTarget, SceneFrame, ScenePass, ShaderPass,
    ShaderUniforms,
};
pub use gpu::GpuContext;
pub use input::Input;
pub use orbit_controls::{ControlEvent, ControlState, DeviceOrientation, OrbitControls};
pub use picking::{Collider, Ray, RayHit, raycast_all, raycast_entity};
pub use scene::{SceneContext, Transform};
pub use spherical::Spherical;
pub use texture::{Texture, TextureError};
pub use tween::{Ease, Tween};

// Re-export the math types used across the public API.
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience.
pub use winit::event::MouseButton;

// Entities used as tap targets.
pub use hecs::{Entity, World};
