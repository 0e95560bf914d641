use glam::Vec3;

/// Keeps the polar angle away from exactly 0 or PI, where the orbit
/// up-vector degenerates.
const POLE_EPS: f32 = 1e-6;

/// A point expressed in spherical coordinates around an origin.
///
/// The conventions follow a y-up orbit frame:
///
/// - `radius` — distance from the origin
/// - `phi` — polar angle measured down from the +Y axis, in `[0, PI]`
/// - `theta` — azimuth around the Y axis, measured from +Z toward +X
///
/// Used by [`OrbitControls`](crate::OrbitControls) as the source of truth for
/// the camera pose; the Cartesian camera position is derived from this every
/// update tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spherical {
    /// Distance from the origin.
    pub radius: f32,
    /// Polar angle from the +Y axis, in radians.
    pub phi: f32,
    /// Azimuthal angle around the Y axis, in radians.
    pub theta: f32,
}

impl Default for Spherical {
    fn default() -> Self {
        Self {
            radius: 1.0,
            phi: 0.0,
            theta: 0.0,
        }
    }
}

impl Spherical {
    pub fn new(radius: f32, phi: f32, theta: f32) -> Self {
        Self { radius, phi, theta }
    }

    /// A zero-magnitude spherical value, used for pending rotation deltas.
    pub fn zero() -> Self {
        Self {
            radius: 0.0,
            phi: 0.0,
            theta: 0.0,
        }
    }

    /// Set all three components at once.
    pub fn set(&mut self, radius: f32, phi: f32, theta: f32) {
        self.radius = radius;
        self.phi = phi;
        self.theta = theta;
    }

    /// Convert a Cartesian offset (relative to the orbit origin) into
    /// spherical coordinates.
    ///
    /// A zero vector maps to `radius = 0` with both angles zero.
    pub fn from_vec3(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            Self::zero()
        } else {
            Self {
                radius,
                phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
                theta: v.x.atan2(v.z),
            }
        }
    }

    /// Convert back to a Cartesian offset.
    pub fn to_vec3(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Nudge `phi` off the poles so the derived look-at orientation never
    /// collapses onto the up axis.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(POLE_EPS, std::f32::consts::PI - POLE_EPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_cartesian_within_tolerance() {
        let points = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 2.0),
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(100.0, -30.0, -70.0),
        ];

        for p in points {
            let back = Spherical::from_vec3(p).to_vec3();
            assert!(
                (back - p).length() < 1e-4 * p.length().max(1.0),
                "round trip of {p:?} produced {back:?}"
            );
        }
    }

    #[test]
    fn zero_vector_maps_to_zero_spherical() {
        let s = Spherical::from_vec3(Vec3::ZERO);
        assert_eq!(s.radius, 0.0);
        assert_eq!(s.phi, 0.0);
        assert_eq!(s.theta, 0.0);
    }

    #[test]
    fn make_safe_keeps_phi_off_the_poles() {
        let mut s = Spherical::new(1.0, 0.0, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);

        let mut s = Spherical::new(1.0, std::f32::consts::PI, 0.0);
        s.make_safe();
        assert!(s.phi < std::f32::consts::PI);
    }

    #[test]
    fn straight_up_has_zero_polar_angle() {
        let s = Spherical::from_vec3(Vec3::new(0.0, 3.0, 0.0));
        assert!((s.phi).abs() < 1e-6);
        assert!((s.radius - 3.0).abs() < 1e-6);
    }
}
