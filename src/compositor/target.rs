//! Offscreen render targets for the ping-pong pipeline.

use crate::gpu::GpuContext;

/// Depth-stencil format shared by both compositor buffers: scene passes need
/// the depth half, mask bracketing needs the stencil half.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// An offscreen color buffer with an attached depth-stencil buffer.
///
/// The color texture can be both rendered to and sampled, which is what makes
/// ping-pong chaining possible: one pass writes target A while reading target
/// B, then the roles flip. Dropping the target releases the GPU memory.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
    label: String,
}

impl RenderTarget {
    /// Create a target at the given size, in the surface's color format.
    pub fn new(gpu: &GpuContext, label: &str, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let depth_texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} Depth")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_STENCIL_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            depth_texture,
            depth_view,
            width,
            height,
            label: label.to_string(),
        }
    }

    /// Create a target matching the current surface dimensions.
    pub fn matching_surface(gpu: &GpuContext, label: &str) -> Self {
        Self::new(gpu, label, gpu.width(), gpu.height())
    }

    /// Reallocate at a new size. A no-op when the size already matches.
    pub fn resize(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        if self.width != width || self.height != height {
            let label = std::mem::take(&mut self.label);
            *self = Self::new(gpu, &label, width, height);
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
