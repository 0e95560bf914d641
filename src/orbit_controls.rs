//! Orbit-style camera controls with damping, clamping, and gesture handling.
//!
//! [`OrbitControls`] keeps the camera pose as spherical coordinates around a
//! target point and feeds on five input channels: mouse drag (rotate), mouse
//! wheel (dolly), one-finger touch drag (dolly), two-finger pinch (dolly),
//! and device orientation (applied to the scene's root container, not the
//! camera). Input events are buffered into pending deltas; the camera itself
//! is only repositioned inside [`update`](OrbitControls::update), once per
//! frame, which keeps every frame's mutation in a single place.
//!
//! Note the touch asymmetry: a one-finger touch drag adjusts distance rather
//! than rotating, while a mouse drag rotates. This mirrors the interaction
//! scheme the controller was built for and is pinned by tests; treat any
//! change as a product decision, not a cleanup.
//!
//! # Example
//!
//! ```ignore
//! let mut camera = Camera::new().at([0.0, 100.0, 500.0]);
//! let mut controls = OrbitControls::new(&camera).target([0.0, 100.0, 0.0]);
//! controls.set_viewport(1280.0, 720.0);
//!
//! // In frame loop:
//! controls.process_input(&mut camera, &input);
//! let moved = controls.update(&mut camera, &mut scene, dt);
//! for event in controls.drain_events() {
//!     // react to taps, move completions, ...
//! }
//! ```

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{EulerRot, Quat, Vec2, Vec3};
use tracing::debug;
use winit::event::MouseButton;

use crate::camera::{Camera, Projection};
use crate::input::Input;
use crate::picking::{Ray, raycast_entity};
use crate::scene::SceneContext;
use crate::spherical::Spherical;
use crate::tween::{Ease, Tween};

/// Squared-distance / quaternion-dot threshold for the camera-moved test.
const EPS: f32 = 1e-6;

/// Maximum accumulated pointer travel (pixels) for a press to count as a tap.
const TAP_SLOP: f32 = 1.0;

/// Slerp factor applied to the root container per update when device
/// orientation is active.
const DEVICE_ORIENT_SLERP: f32 = 0.2;

/// Filtered-acceleration threshold for shake detection.
const SHAKE_THRESHOLD: f32 = 2000.0;

/// What the controller is currently doing with pointer input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlState {
    #[default]
    None,
    /// Mouse drag in progress; pixel deltas accumulate into rotation.
    Rotate,
    /// Touch drag or pinch in progress; movement adjusts distance.
    Dolly,
}

/// Notifications produced by the controller, drained by the caller each
/// frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// An interaction began.
    Start,
    /// An interaction ended.
    End,
    /// The camera pose changed this update.
    Change,
    /// A tap landed on a registered target.
    TapTarget(hecs::Entity),
    /// A tap landed somewhere in the scene (fires for every tap, hit or
    /// not).
    SceneTapped,
    /// A programmatic move finished.
    MoveComplete,
    /// The device was shaken.
    Shake,
}

/// Device orientation sample in degrees, as reported by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceOrientation {
    /// Rotation about the device z axis.
    pub alpha: f32,
    /// Rotation about the device x axis.
    pub beta: f32,
    /// Rotation about the device y axis.
    pub gamma: f32,
}

impl DeviceOrientation {
    fn is_zero(&self) -> bool {
        self.alpha == 0.0 && self.beta == 0.0 && self.gamma == 0.0
    }
}

/// Detects shakes from accelerometer samples: a large change in summed
/// acceleration over a short interval.
#[derive(Clone, Copy, Debug, Default)]
struct ShakeDetector {
    last_sum: f32,
    last_time_ms: f64,
    primed: bool,
}

impl ShakeDetector {
    fn sample(&mut self, accel: Vec3, time_ms: f64) -> bool {
        let sum = accel.x + accel.y + accel.z;
        if !self.primed {
            self.primed = true;
            self.last_sum = sum;
            self.last_time_ms = time_ms;
            return false;
        }

        let dt_ms = time_ms - self.last_time_ms;
        if dt_ms <= 10.0 {
            return false;
        }

        let speed = (sum - self.last_sum).abs() / dt_ms as f32 * 10000.0;
        self.last_sum = sum;
        self.last_time_ms = time_ms;
        speed > SHAKE_THRESHOLD
    }
}

/// Orbit camera controller. See the module docs for the interaction model.
pub struct OrbitControls {
    /// Master enable; when false, input channels are ignored (the camera can
    /// still be driven programmatically).
    pub enabled: bool,
    /// The point the camera orbits and looks at.
    pub target: Vec3,

    /// Dolly limits for perspective cameras.
    pub min_distance: f32,
    pub max_distance: f32,
    /// Zoom limits for orthographic cameras.
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Polar angle limits, within `[0, PI]`.
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    /// Azimuth limits; leave infinite for a full turn.
    pub min_azimuth_angle: f32,
    pub max_azimuth_angle: f32,

    /// When true, pending rotation decays by `1 - damping_factor` per update
    /// instead of being zeroed, producing inertia.
    pub enable_damping: bool,
    pub damping_factor: f32,

    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub enable_rotate: bool,
    pub rotate_speed: f32,

    /// Inject a constant azimuth rotation each update while no interaction
    /// is in progress.
    pub auto_rotate: bool,
    /// Revolutions are `auto_rotate_speed` / 30 seconds at 60 updates/sec.
    pub auto_rotate_speed: f32,

    // Saved pose for reset.
    target0: Vec3,
    position0: Vec3,
    zoom0: f32,

    state: ControlState,
    spherical: Spherical,
    spherical_delta: Spherical,
    scale: f32,
    zoom_changed: bool,

    // Per-channel scratch state; working data, not part of the public
    // contract.
    viewport: Vec2,
    rotate_start: Vec2,
    dolly_start: Vec2,
    start_touch_point: Vec2,
    move_touch_point: Vec2,
    pending_tap: bool,

    device_orientation: Option<DeviceOrientation>,
    shake: ShakeDetector,

    tap_targets: Vec<hecs::Entity>,
    tween: Option<Tween>,
    events: VecDeque<ControlEvent>,

    last_position: Vec3,
    last_rotation: Quat,
}

impl OrbitControls {
    /// Create a controller for the given camera, saving its current pose as
    /// the reset state.
    pub fn new(camera: &Camera) -> Self {
        Self {
            enabled: true,
            target: Vec3::ZERO,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_zoom: 0.0,
            max_zoom: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_azimuth_angle: f32::NEG_INFINITY,
            max_azimuth_angle: f32::INFINITY,
            enable_damping: false,
            damping_factor: 0.25,
            enable_zoom: true,
            zoom_speed: 1.0,
            enable_rotate: true,
            rotate_speed: 1.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            target0: Vec3::ZERO,
            position0: camera.position,
            zoom0: camera.zoom,
            state: ControlState::None,
            spherical: Spherical::default(),
            spherical_delta: Spherical::zero(),
            scale: 1.0,
            zoom_changed: false,
            viewport: Vec2::new(1280.0, 720.0),
            rotate_start: Vec2::ZERO,
            dolly_start: Vec2::ZERO,
            start_touch_point: Vec2::ZERO,
            move_touch_point: Vec2::ZERO,
            pending_tap: false,
            device_orientation: None,
            shake: ShakeDetector::default(),
            tap_targets: Vec::new(),
            tween: None,
            events: VecDeque::new(),
            last_position: camera.position,
            last_rotation: camera.rotation,
        }
    }

    /// Set the orbit target point.
    pub fn target(mut self, target: impl Into<Vec3>) -> Self {
        self.target = target.into();
        self.target0 = self.target;
        self
    }

    /// Set dolly distance limits.
    pub fn distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Set polar angle limits (radians, within `[0, PI]`).
    pub fn polar_limits(mut self, min: f32, max: f32) -> Self {
        self.min_polar_angle = min;
        self.max_polar_angle = max;
        self
    }

    /// Set azimuth limits (radians).
    pub fn azimuth_limits(mut self, min: f32, max: f32) -> Self {
        self.min_azimuth_angle = min;
        self.max_azimuth_angle = max;
        self
    }

    /// Enable inertial damping with the given decay factor.
    pub fn damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    /// Viewport size in pixels; rotation speed is normalized against it so a
    /// full-viewport drag is a full turn.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Current interaction state.
    pub fn state(&self) -> ControlState {
        self.state
    }

    /// Polar angle after the last update, radians from the +Y axis.
    pub fn polar_angle(&self) -> f32 {
        self.spherical.phi
    }

    /// Azimuthal angle after the last update, radians around the Y axis.
    pub fn azimuthal_angle(&self) -> f32 {
        self.spherical.theta
    }

    /// Register an entity for the gesture-target test. Taps are tested
    /// against every registered entity in registration order, and fire one
    /// [`ControlEvent::TapTarget`] per intersected entity.
    pub fn register_tap_target(&mut self, entity: hecs::Entity) {
        self.tap_targets.push(entity);
    }

    pub fn clear_tap_targets(&mut self) {
        self.tap_targets.clear();
    }

    /// Pull all notifications produced since the last drain.
    pub fn drain_events(&mut self) -> std::collections::vec_deque::Drain<'_, ControlEvent> {
        self.events.drain(..)
    }

    //
    // Input channels. These buffer into controller state; geometry changes
    // happen in `update`.
    //

    /// Begin a mouse drag at the given window position.
    pub fn pointer_down(&mut self, position: Vec2) {
        if !self.enabled || !self.enable_rotate {
            return;
        }
        self.rotate_start = position;
        self.start_touch_point = position;
        self.move_touch_point = Vec2::ZERO;
        self.state = ControlState::Rotate;
        self.events.push_back(ControlEvent::Start);
    }

    /// Continue a mouse drag.
    pub fn pointer_move(&mut self, position: Vec2) {
        if !self.enabled || !self.enable_rotate || self.state != ControlState::Rotate {
            return;
        }
        let delta = position - self.rotate_start;

        // A full-viewport drag sweeps a full revolution.
        self.rotate_left(TAU * delta.x / self.viewport.x * self.rotate_speed);
        self.rotate_up(TAU * delta.y / self.viewport.y * self.rotate_speed);

        self.rotate_start = position;
        self.move_touch_point = position - self.start_touch_point;
    }

    /// End a mouse drag. If the pointer barely moved, the press is queued as
    /// a tap and resolved during the next update.
    pub fn pointer_up(&mut self) {
        if !self.enabled || self.state == ControlState::None {
            return;
        }
        self.pending_tap = self.move_touch_point.length() < TAP_SLOP;
        self.state = ControlState::None;
        self.events.push_back(ControlEvent::End);
    }

    /// Mouse wheel input; positive `delta_y` scrolls down and dollies away.
    /// Orthographic cameras change zoom immediately; perspective cameras
    /// accumulate a radius scale applied at the next update.
    pub fn wheel(&mut self, camera: &mut Camera, delta_y: f32) {
        if !self.enabled
            || !self.enable_zoom
            || !matches!(self.state, ControlState::None | ControlState::Rotate)
        {
            return;
        }
        let zs = self.zoom_scale();
        if delta_y < 0.0 {
            self.apply_dolly(camera, zs);
        } else if delta_y > 0.0 {
            self.apply_dolly(camera, 1.0 / zs);
        }
        self.events.push_back(ControlEvent::Start);
        self.events.push_back(ControlEvent::End);
    }

    /// Begin a touch interaction. One finger starts a dolly drag; two start
    /// a pinch; more cancel the interaction.
    pub fn touch_start(&mut self, points: &[Vec2]) {
        if !self.enabled {
            return;
        }
        match points {
            [p] => {
                if !self.enable_rotate {
                    return;
                }
                self.dolly_start = *p;
                self.start_touch_point = *p;
                self.move_touch_point = Vec2::ZERO;
                self.state = ControlState::Dolly;
            }
            [a, b] => {
                if !self.enable_zoom {
                    return;
                }
                self.dolly_start = Vec2::new(0.0, (*a - *b).length());
                self.start_touch_point = (*a + *b) * 0.5;
                self.move_touch_point = Vec2::ONE * TAP_SLOP; // a pinch is never a tap
                self.state = ControlState::Dolly;
            }
            _ => {
                self.state = ControlState::None;
                return;
            }
        }
        self.events.push_back(ControlEvent::Start);
    }

    /// Continue a touch interaction.
    pub fn touch_move(&mut self, camera: &mut Camera, points: &[Vec2]) {
        if !self.enabled || self.state != ControlState::Dolly {
            return;
        }
        match points {
            [p] => {
                if !self.enable_zoom {
                    return;
                }
                let zs = self.zoom_scale();
                let delta_y = p.y - self.dolly_start.y;
                // Dragging down moves in, dragging up moves out; the inverse
                // of the wheel mapping.
                if delta_y > 0.0 {
                    self.apply_dolly(camera, zs);
                } else if delta_y < 0.0 {
                    self.apply_dolly(camera, 1.0 / zs);
                }
                self.dolly_start = *p;
                self.move_touch_point = *p - self.start_touch_point;
            }
            [a, b] => {
                if !self.enable_zoom {
                    return;
                }
                let zs = self.zoom_scale();
                let distance = (*a - *b).length();
                if distance > self.dolly_start.y {
                    self.apply_dolly(camera, zs);
                } else if distance < self.dolly_start.y {
                    self.apply_dolly(camera, 1.0 / zs);
                }
                self.dolly_start.y = distance;
            }
            _ => {}
        }
    }

    /// End a touch interaction; a motionless single touch is queued as a
    /// tap.
    pub fn touch_end(&mut self) {
        if !self.enabled || self.state == ControlState::None {
            return;
        }
        self.pending_tap = self.move_touch_point.length() < TAP_SLOP;
        self.state = ControlState::None;
        self.events.push_back(ControlEvent::End);
    }

    /// Feed a device-orientation sample (degrees). Zero samples are treated
    /// as "no data".
    pub fn set_device_orientation(&mut self, orientation: DeviceOrientation) {
        if !self.enabled {
            return;
        }
        self.device_orientation = Some(orientation);
    }

    /// Feed an accelerometer sample with a monotonic timestamp in
    /// milliseconds. Emits [`ControlEvent::Shake`] when the filtered
    /// acceleration delta spikes.
    pub fn device_motion(&mut self, acceleration: Vec3, time_ms: f64) {
        if !self.enabled {
            return;
        }
        if self.shake.sample(acceleration, time_ms) {
            debug!("shake detected");
            self.events.push_back(ControlEvent::Shake);
        }
    }

    /// Map a frame's buffered [`Input`] onto the controller's channels.
    pub fn process_input(&mut self, camera: &mut Camera, input: &Input) {
        if input.touch_count() > 0 || input.touch_ended() {
            self.process_touches(camera, input);
            return;
        }

        if input.mouse_pressed(MouseButton::Left) {
            self.pointer_down(input.mouse_position());
        }
        if input.mouse_down(MouseButton::Left) && input.mouse_delta() != Vec2::ZERO {
            self.pointer_move(input.mouse_position());
        }
        if input.mouse_released(MouseButton::Left) {
            self.pointer_up();
        }

        let scroll = input.scroll_delta();
        if scroll.y != 0.0 {
            // winit reports scroll-up as positive; the dolly convention is
            // the DOM's, where scroll-up is negative delta.
            self.wheel(camera, -scroll.y);
        }
    }

    fn process_touches(&mut self, camera: &mut Camera, input: &Input) {
        let mut points = [Vec2::ZERO; 2];
        let count = input.touch_count().min(2);
        for (i, point) in points.iter_mut().enumerate().take(count) {
            if let Some(pos) = input.touch_position(i) {
                *point = pos;
            }
        }

        if input.touch_started() {
            self.touch_start(&points[..count]);
        } else if count > 0 {
            self.touch_move(camera, &points[..count]);
        }

        if input.touch_ended() && input.touch_count() == 0 {
            self.touch_end();
        }
    }

    //
    // Programmatic moves.
    //

    /// Record the current pose as the reset state.
    pub fn save_state(&mut self, camera: &Camera) {
        self.target0 = self.target;
        self.position0 = camera.position;
        self.zoom0 = camera.zoom;
    }

    /// Instantly restore the saved pose. The spherical state follows on the
    /// next update.
    pub fn reset(&mut self, camera: &mut Camera) {
        self.target = self.target0;
        camera.position = self.position0;
        camera.zoom = self.zoom0;
        self.tween = None;
        self.state = ControlState::None;
        self.events.push_back(ControlEvent::Change);
    }

    /// Animate the camera toward `to` over `duration` seconds with a strong
    /// ease-in-out. The interpolated positions are re-expressed as clamped
    /// spherical state on each update, so a target outside the configured
    /// bounds snaps to them as the move lands.
    pub fn move_in(&mut self, camera: &Camera, to: Vec3, duration: f32) {
        self.tween = Some(Tween::new(camera.position, to, duration, Ease::StrongInOut));
    }

    /// Animate the camera away toward `to`, decelerating.
    pub fn move_out(&mut self, camera: &Camera, to: Vec3, duration: f32) {
        self.tween = Some(Tween::new(camera.position, to, duration, Ease::StrongOut));
    }

    /// Animate back to the saved pose over one second.
    pub fn reset_to_start(&mut self, camera: &Camera) {
        self.tween = Some(Tween::new(
            camera.position,
            self.position0,
            1.0,
            Ease::StrongInOut,
        ));
    }

    //
    // Per-frame update.
    //

    /// Recompute the camera pose from buffered input. Call once per frame;
    /// calling with no pending input is a no-op (and returns `false`).
    ///
    /// Returns `true` when the camera actually moved, so callers can skip
    /// work that only depends on the camera (mirrors, reflection captures).
    pub fn update(&mut self, camera: &mut Camera, scene: &mut SceneContext, dt: f32) -> bool {
        // Programmatic move: the tween writes Cartesian positions, which the
        // spherical derivation below immediately re-expresses and clamps.
        if let Some(tween) = &mut self.tween {
            camera.position = tween.step(dt);
            if tween.is_complete() {
                self.tween = None;
                self.events.push_back(ControlEvent::MoveComplete);
            }
        }

        // Device-orientation channel: orthogonal to the spherical state, it
        // steers the scene's root container instead of the camera.
        if let Some(orientation) = self.device_orientation
            && !orientation.is_zero()
        {
            let alpha = orientation.alpha.to_radians();
            let beta = orientation.beta.to_radians();
            let gamma = orientation.gamma.to_radians();

            let device = Quat::from_euler(EulerRot::YXZ, alpha, -beta, gamma)
                * Quat::from_rotation_x(FRAC_PI_2);
            scene.root_rotation = scene.root_rotation.slerp(device, DEVICE_ORIENT_SLERP);
        }

        // Rotate the offset into the y-up orbit frame in case the camera's
        // up vector is customized.
        let quat = Quat::from_rotation_arc(camera.up.normalize_or(Vec3::Y), Vec3::Y);
        let quat_inverse = quat.inverse();

        let offset = quat * (camera.position - self.target);
        self.spherical = Spherical::from_vec3(offset);

        if self.auto_rotate && self.state == ControlState::None {
            self.rotate_left(self.auto_rotation_angle());
        }

        self.spherical.theta += self.spherical_delta.theta;
        self.spherical.phi += self.spherical_delta.phi;

        self.spherical.theta = self
            .spherical
            .theta
            .clamp(self.min_azimuth_angle, self.max_azimuth_angle);
        self.spherical.phi = self
            .spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        self.spherical.make_safe();

        self.spherical.radius =
            (self.spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        camera.position = self.target + quat_inverse * self.spherical.to_vec3();
        camera.look_at(self.target);

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::zero();
        }
        self.scale = 1.0;

        if self.pending_tap {
            self.pending_tap = false;
            self.check_tap_target(camera, scene);
        }

        // Moved test: squared displacement, or rotation via the small-angle
        // approximation 8 * (1 - q_old . q_new).
        let moved = self.zoom_changed
            || self.last_position.distance_squared(camera.position) > EPS
            || 8.0 * (1.0 - self.last_rotation.dot(camera.rotation)) > EPS;

        if moved {
            self.events.push_back(ControlEvent::Change);
            self.last_position = camera.position;
            self.last_rotation = camera.rotation;
            self.zoom_changed = false;
        }

        moved
    }

    //
    // Internals.
    //

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Dolly by `factor`: below 1 moves closer, above 1 moves away.
    /// Perspective cameras scale the orbit radius at the next update;
    /// orthographic cameras change projection zoom immediately.
    fn apply_dolly(&mut self, camera: &mut Camera, factor: f32) {
        match camera.projection {
            Projection::Perspective { .. } => {
                self.scale *= factor;
            }
            Projection::Orthographic { .. } => {
                camera.zoom = (camera.zoom / factor).clamp(self.min_zoom, self.max_zoom);
                self.zoom_changed = true;
            }
        }
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn auto_rotation_angle(&self) -> f32 {
        // One revolution per 30 seconds at speed 2.0 and 60 updates/sec.
        TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    /// Resolve a queued tap: unproject it through the camera and test every
    /// registered target, firing a tap event for each intersection (all hits
    /// fire, not just the first), then the generic scene-tapped event.
    fn check_tap_target(&mut self, camera: &Camera, scene: &SceneContext) {
        let ray = Ray::from_screen(self.start_touch_point, self.viewport, camera);

        for &entity in &self.tap_targets {
            if raycast_entity(&scene.world, entity, &ray).is_some() {
                self.events.push_back(ControlEvent::TapTarget(entity));
            }
        }

        self.events.push_back(ControlEvent::SceneTapped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Camera, OrbitControls, SceneContext) {
        let mut camera = Camera::new().at([0.0, 0.0, 10.0]).with_aspect(1.0);
        camera.look_at(Vec3::ZERO);
        let mut controls = OrbitControls::new(&camera);
        controls.set_viewport(1000.0, 1000.0);
        (camera, controls, SceneContext::new())
    }

    #[test]
    fn update_with_no_input_is_idempotent() {
        let (mut camera, mut controls, mut scene) = rig();

        // First update settles the pose derived from the initial position.
        controls.update(&mut camera, &mut scene, 0.016);
        let settled = camera.position;

        for _ in 0..10 {
            let moved = controls.update(&mut camera, &mut scene, 0.016);
            assert!(!moved, "camera moved without input");
        }
        assert!((camera.position - settled).length() < 1e-6);
    }

    #[test]
    fn drag_rotates_around_target() {
        let (mut camera, mut controls, mut scene) = rig();

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(600.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        // Radius preserved, azimuth changed.
        assert!((camera.position.length() - 10.0).abs() < 1e-3);
        assert!(controls.azimuthal_angle().abs() > 0.1);
    }

    #[test]
    fn polar_and_radius_stay_clamped_over_input_sequences() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.min_polar_angle = 0.5;
        controls.max_polar_angle = 2.0;
        controls.min_distance = 5.0;
        controls.max_distance = 20.0;

        // Hammer the controller with alternating violent drags and zooms.
        for i in 0..50 {
            let dir = if i % 2 == 0 { 1.0 } else { -0.3 };
            controls.pointer_down(Vec2::new(500.0, 500.0));
            controls.pointer_move(Vec2::new(500.0 + 900.0 * dir, 500.0 + 900.0 * dir));
            controls.pointer_up();
            controls.wheel(&mut camera, if i % 3 == 0 { 120.0 } else { -120.0 });
            controls.update(&mut camera, &mut scene, 0.016);

            let polar = controls.polar_angle();
            let radius = (camera.position - controls.target).length();
            assert!(
                (0.5..=2.0).contains(&polar),
                "polar {polar} escaped bounds at step {i}"
            );
            assert!(
                (5.0 - 1e-3..=20.0 + 1e-3).contains(&radius),
                "radius {radius} escaped bounds at step {i}"
            );
        }
    }

    #[test]
    fn damping_decays_pending_rotation_to_zero() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.enable_damping = true;
        controls.damping_factor = 0.25;

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(700.0, 500.0));
        controls.pointer_up();

        controls.update(&mut camera, &mut scene, 0.016);
        let mut previous = controls.spherical_delta.theta.abs();
        assert!(previous > 0.0);

        let mut ticks = 0;
        while controls.spherical_delta.theta.abs() > 1e-9 {
            controls.update(&mut camera, &mut scene, 0.016);
            let current = controls.spherical_delta.theta.abs();
            assert!(current < previous, "delta not strictly decreasing");
            previous = current;
            ticks += 1;
            assert!(ticks < 200, "damping failed to converge");
        }
    }

    #[test]
    fn without_damping_delta_snaps_to_zero() {
        let (mut camera, mut controls, mut scene) = rig();

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(700.0, 500.0));
        controls.pointer_up();

        controls.update(&mut camera, &mut scene, 0.016);
        assert_eq!(controls.spherical_delta.theta, 0.0);
        let moved = controls.update(&mut camera, &mut scene, 0.016);
        assert!(!moved);
    }

    #[test]
    fn auto_rotate_advances_azimuth_only_when_idle() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.auto_rotate = true;

        controls.update(&mut camera, &mut scene, 0.016);
        let first = controls.azimuthal_angle();
        controls.update(&mut camera, &mut scene, 0.016);
        assert!(controls.azimuthal_angle() != first);

        // While a drag is in progress, auto-rotation pauses.
        controls.pointer_down(Vec2::new(500.0, 500.0));
        let before = controls.azimuthal_angle();
        controls.update(&mut camera, &mut scene, 0.016);
        assert!((controls.azimuthal_angle() - before).abs() < 1e-6);
    }

    #[test]
    fn wheel_dolly_respects_distance_limits() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.min_distance = 8.0;
        controls.max_distance = 12.0;

        for _ in 0..100 {
            controls.wheel(&mut camera, -120.0);
            controls.update(&mut camera, &mut scene, 0.016);
        }
        assert!((camera.position.length() - 8.0).abs() < 1e-2);

        for _ in 0..100 {
            controls.wheel(&mut camera, 120.0);
            controls.update(&mut camera, &mut scene, 0.016);
        }
        assert!((camera.position.length() - 12.0).abs() < 1e-2);
    }

    #[test]
    fn orthographic_dolly_changes_zoom_immediately() {
        let (_, mut controls, _) = rig();
        let mut camera = Camera {
            projection: Projection::Orthographic { half_height: 5.0 },
            ..Camera::new().at([0.0, 0.0, 10.0])
        };
        controls.min_zoom = 0.5;
        controls.max_zoom = 4.0;

        controls.wheel(&mut camera, -120.0);
        assert!(camera.zoom > 1.0, "scroll up should zoom an ortho camera in");

        for _ in 0..100 {
            controls.wheel(&mut camera, -120.0);
        }
        assert!((camera.zoom - 4.0).abs() < 1e-6, "zoom must clamp");
    }

    #[test]
    fn device_orientation_steers_root_container() {
        let (mut camera, mut controls, mut scene) = rig();

        controls.set_device_orientation(DeviceOrientation {
            alpha: 30.0,
            beta: 10.0,
            gamma: 5.0,
        });
        controls.update(&mut camera, &mut scene, 0.016);

        assert!(scene.root_rotation.angle_between(Quat::IDENTITY) > 1e-3);

        // All-zero samples are "no data" and leave the container alone.
        let mut fresh = SceneContext::new();
        controls.set_device_orientation(DeviceOrientation::default());
        controls.update(&mut camera, &mut fresh, 0.016);
        assert_eq!(fresh.root_rotation, Quat::IDENTITY);
    }

    #[test]
    fn azimuth_limits_clamp_rotation() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.min_azimuth_angle = -0.5;
        controls.max_azimuth_angle = 0.5;

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(1500.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        let theta = controls.azimuthal_angle();
        assert!((-0.5..=0.5).contains(&theta), "theta {theta} out of bounds");
    }
}
