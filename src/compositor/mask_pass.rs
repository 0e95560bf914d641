//! Marker passes bracketing a stencil-masked region of the pipeline.
//!
//! The compositor recognizes these by their [`MaskRole`] tag: between a
//! [`MaskPass`] and the following [`ClearMaskPass`], every buffer swap runs
//! the internal copy pass with an inverted stencil comparison so unmasked
//! content survives the role flip. The stencil *writes* that define the mask
//! region belong to the scene renderer, not to these markers.

use crate::compositor::pass::{MaskRole, Pass, PassContext, PassFlags};

/// Opens a stencil-masked region.
pub struct MaskPass {
    flags: PassFlags,
}

impl MaskPass {
    pub fn new() -> Self {
        Self {
            flags: PassFlags::new(false),
        }
    }
}

impl Default for MaskPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for MaskPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn mask_role(&self) -> MaskRole {
        MaskRole::Begin
    }

    fn render(&mut self, _ctx: &mut PassContext<'_>) {}

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Closes the stencil-masked region opened by the preceding [`MaskPass`].
pub struct ClearMaskPass {
    flags: PassFlags,
}

impl ClearMaskPass {
    pub fn new() -> Self {
        Self {
            flags: PassFlags::new(false),
        }
    }
}

impl Default for ClearMaskPass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ClearMaskPass {
    fn flags(&self) -> &PassFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut PassFlags {
        &mut self.flags
    }

    fn mask_role(&self) -> MaskRole {
        MaskRole::End
    }

    fn render(&mut self, _ctx: &mut PassContext<'_>) {}

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
