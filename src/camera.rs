use glam::{Mat4, Quat, Vec3};

/// Projection kind for a [`Camera`].
///
/// The set is closed: every camera is either perspective or orthographic, so
/// operations that vary by projection (dollying, zooming) can match
/// exhaustively instead of probing for an unknown type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    /// Perspective projection with a vertical field of view in radians.
    Perspective { fov: f32 },
    /// Orthographic projection; `half_height` is half the vertical extent of
    /// the view volume at `zoom = 1`.
    Orthographic { half_height: f32 },
}

/// A camera for 3D scenes.
///
/// Holds position and orientation plus projection parameters. The orbit
/// controller treats the pose as a derived value: it reads `position`, runs
/// its spherical-state update, then writes `position` back and re-orients via
/// [`look_at`](Camera::look_at). View and projection matrices are computed on
/// demand.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Orientation as a unit quaternion; identity looks down -Z.
    pub rotation: Quat,
    /// The orbit axis reference, normally +Y.
    pub up: Vec3,
    pub projection: Projection,
    /// Projection zoom factor; 1.0 is unzoomed. Narrows the fov for
    /// perspective cameras, shrinks the view volume for orthographic ones.
    pub zoom: f32,
    /// Width / height of the output surface.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            up: Vec3::Y,
            projection: Projection::Perspective {
                fov: std::f32::consts::FRAC_PI_4,
            },
            zoom: 1.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    /// Set the vertical field of view in degrees (perspective cameras).
    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.projection = Projection::Perspective {
            fov: fov_degrees.to_radians(),
        };
        self
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    pub fn looking_at(mut self, target: impl Into<Vec3>) -> Self {
        self.look_at(target.into());
        self
    }

    /// Re-orient the camera to face `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let view = Mat4::look_at_rh(self.position, target, self.up);
        self.rotation = Quat::from_mat4(&view.inverse());
    }

    /// The normalized forward direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The right direction, orthogonal to forward and up.
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let zoom = if self.zoom > 0.0 { self.zoom } else { 1.0 };
        match self.projection {
            Projection::Perspective { fov } => {
                // Zoom narrows the frustum the same way a lens does.
                let zoomed = 2.0 * ((fov * 0.5).tan() / zoom).atan();
                Mat4::perspective_rh(zoomed, self.aspect, self.near, self.far)
            }
            Projection::Orthographic { half_height } => {
                let top = half_height / zoom;
                let right = top * self.aspect;
                Mat4::orthographic_rh(-right, right, -top, top, self.near, self.far)
            }
        }
    }

    /// Combined projection * view matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_at_points_forward_at_target() {
        let mut camera = Camera::new().at([0.0, 0.0, 5.0]);
        camera.look_at(Vec3::ZERO);

        let forward = camera.forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5, "got {forward:?}");
    }

    #[test]
    fn look_at_from_an_angle() {
        let mut camera = Camera::new().at([3.0, 4.0, 5.0]);
        camera.look_at(Vec3::new(1.0, 1.0, 1.0));

        let expect = (Vec3::new(1.0, 1.0, 1.0) - camera.position).normalize();
        assert!((camera.forward() - expect).length() < 1e-5);
    }

    #[test]
    fn perspective_zoom_narrows_the_frustum() {
        let mut camera = Camera::new().with_aspect(1.0);
        let wide = camera.projection_matrix();
        camera.zoom = 2.0;
        let narrow = camera.projection_matrix();

        // Larger zoom means larger focal-length terms on the diagonal.
        assert!(narrow.col(0).x > wide.col(0).x);
        assert!(narrow.col(1).y > wide.col(1).y);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let mut camera = Camera::new().at([0.0, 0.0, 5.0]);
        camera.look_at(Vec3::ZERO);

        let origin_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_view - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }
}
