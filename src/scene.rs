use glam::{Quat, Vec3};

/// Position, rotation and scale of a scene entity.
///
/// Attached as a `hecs` component to anything that can be placed in the
/// world, including the tap targets the orbit controller ray-tests against.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    /// World-space position (translation).
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: impl Into<Vec3>) -> Self {
        self.scale = scale.into();
        self
    }
}

/// Shared scene state passed by reference to the components that need it.
///
/// Replaces module-level scene/container singletons: the entity world and the
/// root-container rotation live here, and the caller decides who gets access
/// each frame.
pub struct SceneContext {
    /// Entity world holding scene objects and their components.
    pub world: hecs::World,
    /// Orientation of the scene's root container. The device-orientation
    /// input channel slerps this toward the device pose; the renderer applies
    /// it to everything below the root.
    pub root_rotation: Quat,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            world: hecs::World::new(),
            root_rotation: Quat::IDENTITY,
        }
    }
}

impl SceneContext {
    pub fn new() -> Self {
        Self::default()
    }
}
