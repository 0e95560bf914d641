//! Ray casting against scene entities for tap/click hit testing.
//!
//! Provides [`Ray`] (with camera unprojection), [`Collider`] shapes that can
//! be attached to entities, and [`raycast_all`] which returns every
//! intersected entity. The orbit controller uses these for its gesture-target
//! test: a tap is unprojected through the camera and tested against each
//! registered target.

use glam::{Vec2, Vec3, Vec4};

use crate::camera::Camera;
use crate::scene::Transform;

/// A ray in 3D space with an origin and a normalized direction.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray through a point given in normalized device coordinates
    /// (`x`, `y` in `[-1, 1]`, y up).
    ///
    /// The ray originates on the camera's near plane and passes through the
    /// corresponding far-plane point.
    pub fn from_ndc(ndc: Vec2, camera: &Camera) -> Self {
        let inv_view_proj = camera.view_projection_matrix().inverse();

        let near_world = inv_view_proj * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far_world = inv_view_proj * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);

        let near_point = near_world.truncate() / near_world.w;
        let far_point = far_world.truncate() / far_world.w;

        Self {
            origin: near_point,
            direction: (far_point - near_point).normalize_or_zero(),
        }
    }

    /// Create a ray from window coordinates (pixels, y down).
    pub fn from_screen(screen: Vec2, viewport: Vec2, camera: &Camera) -> Self {
        let ndc = Vec2::new(
            (2.0 * screen.x / viewport.x) - 1.0,
            1.0 - (2.0 * screen.y / viewport.y),
        );
        Self::from_ndc(ndc, camera)
    }

    /// A point along the ray at distance `t` from the origin.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Slab test against an axis-aligned bounding box. Returns the distance
    /// to the nearest positive intersection, or `None` on a miss.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            let origin = self.origin[i];
            let dir = self.direction[i];

            if dir.abs() < f32::EPSILON {
                if origin < min[i] || origin > max[i] {
                    return None;
                }
            } else {
                let inv_dir = 1.0 / dir;
                let mut t1 = (min[i] - origin) * inv_dir;
                let mut t2 = (max[i] - origin) * inv_dir;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }

                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return None;
                }
            }
        }

        if t_min > 0.0 {
            Some(t_min)
        } else if t_max > 0.0 {
            Some(t_max)
        } else {
            None
        }
    }

    /// Quadratic test against a sphere. Returns the distance to the nearest
    /// positive intersection, or `None` on a miss.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);

        if t1 > 0.0 {
            Some(t1)
        } else if t2 > 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// A collision shape for hit testing, attached to entities as a component.
///
/// Colliders are cheap analytic shapes; they stand in for full mesh geometry
/// in the gesture-target test.
#[derive(Clone, Copy, Debug)]
pub enum Collider {
    /// Axis-aligned bounding box defined by half-extents.
    Box { half_extents: Vec3 },
    /// Sphere defined by radius.
    Sphere { radius: f32 },
}

impl Collider {
    /// Box collider from full dimensions, centered on the entity.
    pub fn box_collider(size: Vec3) -> Self {
        Self::Box {
            half_extents: size * 0.5,
        }
    }

    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Test the ray against this collider at the given transform. Returns the
    /// hit distance, or `None` on a miss.
    pub fn intersect(&self, ray: &Ray, position: Vec3, scale: Vec3) -> Option<f32> {
        match self {
            Collider::Box { half_extents } => {
                let scaled_half = *half_extents * scale;
                ray.intersect_aabb(position - scaled_half, position + scaled_half)
            }
            Collider::Sphere { radius } => {
                // Average scale stands in for non-uniform sphere scaling.
                let avg_scale = (scale.x + scale.y + scale.z) / 3.0;
                ray.intersect_sphere(position, radius * avg_scale)
            }
        }
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self::box_collider(Vec3::ONE)
    }
}

/// Information about a ray-collider intersection.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    pub entity: hecs::Entity,
    /// Distance from ray origin to the hit point.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

/// Cast a ray against every entity with a `Transform` and a `Collider` and
/// return all hits, sorted nearest first.
pub fn raycast_all(world: &hecs::World, ray: &Ray) -> Vec<RayHit> {
    let mut hits = Vec::new();

    for (entity, (transform, collider)) in world.query::<(&Transform, &Collider)>().iter() {
        if let Some(distance) = collider.intersect(ray, transform.position, transform.scale) {
            hits.push(RayHit {
                entity,
                distance,
                point: ray.point_at(distance),
            });
        }
    }

    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    hits
}

/// Test a single entity's collider against a ray.
pub fn raycast_entity(world: &hecs::World, entity: hecs::Entity, ray: &Ray) -> Option<RayHit> {
    let mut query = world
        .query_one::<(&Transform, &Collider)>(entity)
        .ok()?;
    let (transform, collider) = query.get()?;
    let distance = collider.intersect(ray, transform.position, transform.scale)?;
    Some(RayHit {
        entity,
        distance,
        point: ray.point_at(distance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_aabb_head_on() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_aabb(Vec3::new(5.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        assert!((t.unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ray_misses_offset_aabb() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_aabb(Vec3::splat(5.0), Vec3::splat(10.0));
        assert!(t.is_none());
    }

    #[test]
    fn ray_starting_inside_aabb_reports_exit() {
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::X);
        let t = ray.intersect_aabb(Vec3::new(0.0, -1.0, -1.0), Vec3::new(10.0, 1.0, 1.0));
        assert!(t.unwrap() > 0.0);
    }

    #[test]
    fn ray_hits_sphere() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let t = ray.intersect_sphere(Vec3::new(0.0, 0.0, 10.0), 2.0);
        assert!((t.unwrap() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn screen_center_ray_matches_camera_forward() {
        let mut camera = Camera::new().at([0.0, 0.0, 5.0]).with_aspect(1.0);
        camera.look_at(Vec3::ZERO);

        let ray = Ray::from_ndc(Vec2::ZERO, &camera);
        assert!((ray.direction - camera.forward()).length() < 1e-4);
    }

    #[test]
    fn raycast_all_returns_every_hit_sorted() {
        let mut world = hecs::World::new();
        let near = world.spawn((
            Transform::new().position([0.0, 0.0, -5.0]),
            Collider::sphere(1.0),
        ));
        let far = world.spawn((
            Transform::new().position([0.0, 0.0, -15.0]),
            Collider::sphere(1.0),
        ));
        // Off to the side, should not be hit.
        world.spawn((
            Transform::new().position([50.0, 0.0, -10.0]),
            Collider::sphere(1.0),
        ));

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = raycast_all(&world, &ray);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity, near);
        assert_eq!(hits[1].entity, far);
        assert!(hits[0].distance < hits[1].distance);
    }
}
