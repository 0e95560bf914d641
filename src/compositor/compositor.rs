//! The compositor: an ordered pass list driven over two ping-pong buffers.

use tracing::{debug, warn};

use crate::camera::Camera;
use crate::compositor::copy_pass::CopyPass;
use crate::compositor::pass::{CompositorError, MaskRole, Pass, PassContext};
use crate::compositor::target::RenderTarget;
use crate::gpu::GpuContext;

/// The scheduling-relevant view of one pass, extracted before a frame walk.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PassProfile {
    pub enabled: bool,
    pub needs_swap: bool,
    pub mask_role: MaskRole,
}

/// One step of a planned frame. Buffer indices select between the
/// compositor's two targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlanStep {
    /// Run pass `pass` with the given buffer roles.
    Execute {
        pass: usize,
        write: usize,
        read: usize,
        masking: bool,
    },
    /// Blit read into write through the inverted-stencil copy, preserving
    /// masked content across the upcoming role swap.
    MaskedCopy { write: usize, read: usize },
}

/// A planned frame: the execution steps plus the buffer bookkeeping results.
#[derive(Clone, Debug)]
pub(crate) struct FramePlan {
    pub steps: Vec<PlanStep>,
    /// Which target holds the write role after the frame.
    pub final_write: usize,
    /// How many times the read/write roles flipped.
    pub swaps: usize,
}

/// Walk the pass list and decide, without touching the GPU, which passes run
/// against which buffers and where the roles flip.
///
/// Disabled passes contribute nothing. A pass with `needs_swap` flips the
/// roles after it runs; if a mask region is open at that point, a masked copy
/// is scheduled first. Mask begin/end passes toggle the region and never
/// swap.
pub(crate) fn plan(profiles: &[PassProfile], start_write: usize) -> FramePlan {
    let mut write = start_write;
    let mut read = 1 - start_write;
    let mut masking = false;
    let mut steps = Vec::with_capacity(profiles.len());
    let mut swaps = 0;

    for (i, profile) in profiles.iter().enumerate() {
        if !profile.enabled {
            continue;
        }

        steps.push(PlanStep::Execute {
            pass: i,
            write,
            read,
            masking: masking && profile.mask_role == MaskRole::None,
        });

        match profile.mask_role {
            MaskRole::Begin => masking = true,
            MaskRole::End => masking = false,
            MaskRole::None => {
                if profile.needs_swap {
                    if masking {
                        steps.push(PlanStep::MaskedCopy { write, read });
                    }
                    std::mem::swap(&mut write, &mut read);
                    swaps += 1;
                }
            }
        }
    }

    FramePlan {
        steps,
        final_write: write,
        swaps,
    }
}

/// Owner and driver of the post-processing pipeline.
///
/// The compositor owns exactly two offscreen buffers. Each frame it executes
/// every enabled pass in list order; passes read the previous result from the
/// read buffer and write into the write buffer (or the screen), with the
/// roles flipping after each `needs_swap` pass. List order is execution
/// order, always.
///
/// # Example
///
/// ```ignore
/// let mut compositor = Compositor::new(&gpu);
/// compositor.add_pass(&gpu, ScenePass::new(scene));
/// compositor.add_pass(&gpu, FilmPass::new(&gpu));
/// let mut vignette = OverlayPass::new(&gpu, &vignette_texture, 0.9);
/// vignette.flags_mut().render_to_screen = true;
/// compositor.add_pass(&gpu, vignette);
///
/// // In frame loop:
/// compositor.render(&gpu, &camera, dt);
/// ```
pub struct Compositor {
    targets: [RenderTarget; 2],
    /// Index of the target currently holding the write role. Persists across
    /// frames, like the buffers themselves.
    write_index: usize,
    passes: Vec<Box<dyn Pass>>,
    /// Internal blit used at swap points inside a mask region.
    copy: CopyPass,
    width: u32,
    height: u32,
}

impl Compositor {
    /// Create a compositor sized to the current surface.
    pub fn new(gpu: &GpuContext) -> Self {
        let width = gpu.width();
        let height = gpu.height();
        Self {
            targets: [
                RenderTarget::new(gpu, "Compositor Target A", width, height),
                RenderTarget::new(gpu, "Compositor Target B", width, height),
            ],
            write_index: 0,
            passes: Vec::new(),
            copy: CopyPass::new(gpu),
            width,
            height,
        }
    }

    /// Append a pass. Its resize hook runs immediately with the current
    /// surface size, so passes added after construction never see a stale
    /// size.
    pub fn add_pass(&mut self, gpu: &GpuContext, pass: impl Pass + 'static) {
        let mut pass: Box<dyn Pass> = Box::new(pass);
        pass.resize(gpu, self.width, self.height);
        self.passes.push(pass);
        debug!(passes = self.passes.len(), "pass added");
    }

    /// Insert a pass at `index`, shifting later passes back. Fails if the
    /// index is past the end of the list.
    pub fn insert_pass(
        &mut self,
        gpu: &GpuContext,
        pass: impl Pass + 'static,
        index: usize,
    ) -> Result<(), CompositorError> {
        if index > self.passes.len() {
            return Err(CompositorError::IndexOutOfRange {
                index,
                len: self.passes.len(),
            });
        }
        let mut pass: Box<dyn Pass> = Box::new(pass);
        pass.resize(gpu, self.width, self.height);
        self.passes.insert(index, pass);
        debug!(index, passes = self.passes.len(), "pass inserted");
        Ok(())
    }

    /// Remove and return the pass at `index`.
    pub fn remove_pass(&mut self, index: usize) -> Option<Box<dyn Pass>> {
        if index < self.passes.len() {
            Some(self.passes.remove(index))
        } else {
            None
        }
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut (dyn Pass + '_)> {
        match self.passes.get_mut(index) {
            Some(p) => Some(p.as_mut()),
            None => None,
        }
    }

    /// Reach a concrete pass in the list by index and type.
    pub fn pass_downcast_mut<P: Pass + 'static>(&mut self, index: usize) -> Option<&mut P> {
        self.passes
            .get_mut(index)
            .and_then(|p| p.as_any_mut().downcast_mut::<P>())
    }

    /// The buffer currently holding the write role.
    pub fn write_buffer(&self) -> &RenderTarget {
        &self.targets[self.write_index]
    }

    /// The buffer currently holding the read role.
    pub fn read_buffer(&self) -> &RenderTarget {
        &self.targets[1 - self.write_index]
    }

    /// Resize both buffers and forward the new size to every pass, in list
    /// order.
    pub fn set_size(&mut self, gpu: &GpuContext, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.width = width;
        self.height = height;
        for target in &mut self.targets {
            target.resize(gpu, width, height);
        }
        for pass in &mut self.passes {
            pass.resize(gpu, width, height);
        }
    }

    /// Dispose both buffers, allocate a fresh pair at the current size, and
    /// restore the canonical role assignment.
    pub fn reset(&mut self, gpu: &GpuContext) {
        self.targets = [
            RenderTarget::new(gpu, "Compositor Target A", self.width, self.height),
            RenderTarget::new(gpu, "Compositor Target B", self.width, self.height),
        ];
        self.write_index = 0;
        debug!("compositor buffers reset");
    }

    /// Execute the pipeline and present to the window surface.
    ///
    /// A surface acquisition failure (lost/outdated swapchain) skips the
    /// frame with a warning rather than failing; the surface recovers on a
    /// subsequent configure.
    pub fn render(&mut self, gpu: &GpuContext, camera: &Camera, dt: f32) {
        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(error) => {
                warn!(%error, "skipping frame: surface unavailable");
                return;
            }
        };
        let screen = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.render_to(gpu, &screen, camera, dt);
        output.present();
    }

    /// Execute the pipeline against an arbitrary "screen" view (used for
    /// capturing the chain's output without presenting).
    pub fn render_to(
        &mut self,
        gpu: &GpuContext,
        screen: &wgpu::TextureView,
        camera: &Camera,
        dt: f32,
    ) {
        let profiles: Vec<PassProfile> = self
            .passes
            .iter()
            .map(|pass| PassProfile {
                enabled: pass.flags().enabled,
                needs_swap: pass.flags().needs_swap,
                mask_role: pass.mask_role(),
            })
            .collect();
        let frame = plan(&profiles, self.write_index);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Compositor Encoder"),
            });

        for step in &frame.steps {
            match *step {
                PlanStep::Execute {
                    pass,
                    write,
                    read,
                    masking,
                } => {
                    let mut ctx = PassContext {
                        gpu,
                        encoder: &mut encoder,
                        write: &self.targets[write],
                        read: &self.targets[read],
                        screen: Some(screen),
                        camera,
                        dt,
                        masking,
                    };
                    self.passes[pass].render(&mut ctx);
                }
                PlanStep::MaskedCopy { write, read } => {
                    self.copy.render_masked(
                        gpu,
                        &mut encoder,
                        &self.targets[read],
                        &self.targets[write],
                    );
                }
            }
        }

        self.write_index = frame.final_write;
        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(enabled: bool, needs_swap: bool) -> PassProfile {
        PassProfile {
            enabled,
            needs_swap,
            mask_role: MaskRole::None,
        }
    }

    fn mask(role: MaskRole) -> PassProfile {
        PassProfile {
            enabled: true,
            needs_swap: false,
            mask_role: role,
        }
    }

    #[test]
    fn swap_count_matches_needs_swap_passes() {
        let profiles = [
            profile(true, false),
            profile(true, true),
            profile(true, true),
            profile(true, false),
            profile(true, true),
        ];
        let frame = plan(&profiles, 0);
        assert_eq!(frame.swaps, 3);
        // Odd number of swaps leaves the roles flipped.
        assert_eq!(frame.final_write, 1);
    }

    #[test]
    fn disabled_pass_contributes_nothing() {
        let enabled_plan = plan(&[profile(true, true), profile(true, true)], 0);
        let one_disabled = plan(&[profile(true, true), profile(false, true)], 0);

        assert_eq!(enabled_plan.swaps, 2);
        assert_eq!(one_disabled.swaps, 1);
        assert_eq!(one_disabled.steps.len(), 1);
        assert!(matches!(
            one_disabled.steps[0],
            PlanStep::Execute { pass: 0, .. }
        ));
    }

    #[test]
    fn scene_film_overlay_chain_swaps_once() {
        // Scene renders into the read buffer (needs_swap = false), film
        // processes read -> write and swaps, the overlay then composites the
        // film output (now in the read role) to the screen.
        let profiles = [
            profile(true, false),
            profile(true, true),
            profile(true, false),
        ];
        let frame = plan(&profiles, 0);

        assert_eq!(frame.swaps, 1);
        assert_eq!(
            frame.steps,
            vec![
                PlanStep::Execute {
                    pass: 0,
                    write: 0,
                    read: 1,
                    masking: false
                },
                PlanStep::Execute {
                    pass: 1,
                    write: 0,
                    read: 1,
                    masking: false
                },
                PlanStep::Execute {
                    pass: 2,
                    write: 1,
                    read: 0,
                    masking: false
                },
            ]
        );
        // The overlay reads buffer 0, which is exactly where the film pass
        // wrote before the swap.
    }

    #[test]
    fn swap_state_carries_across_frames() {
        let profiles = [profile(true, true)];
        let first = plan(&profiles, 0);
        assert_eq!(first.final_write, 1);

        let second = plan(&profiles, first.final_write);
        assert_eq!(second.final_write, 0);
        assert!(matches!(
            second.steps[0],
            PlanStep::Execute {
                write: 1,
                read: 0,
                ..
            }
        ));
    }

    #[test]
    fn masked_region_inserts_copy_at_swap_points() {
        let profiles = [
            mask(MaskRole::Begin),
            profile(true, true),
            mask(MaskRole::End),
            profile(true, true),
        ];
        let frame = plan(&profiles, 0);

        // Only the swap inside the mask region gets the stencil copy.
        let copies: Vec<_> = frame
            .steps
            .iter()
            .filter(|s| matches!(s, PlanStep::MaskedCopy { .. }))
            .collect();
        assert_eq!(copies.len(), 1);
        assert_eq!(frame.swaps, 2);

        // The masked pass executes with masking set; the one after End does
        // not.
        assert!(matches!(
            frame.steps[1],
            PlanStep::Execute {
                pass: 1,
                masking: true,
                ..
            }
        ));
        assert!(matches!(
            frame.steps[4],
            PlanStep::Execute {
                pass: 3,
                masking: false,
                ..
            }
        ));
    }

    #[test]
    fn empty_pipeline_plans_nothing() {
        let frame = plan(&[], 0);
        assert!(frame.steps.is_empty());
        assert_eq!(frame.swaps, 0);
        assert_eq!(frame.final_write, 0);
    }
}
