use glam::{Vec2, Vec3};
use skylight::{
    Camera, Collider, ControlEvent, ControlState, OrbitControls, SceneContext, Transform,
};

fn rig() -> (Camera, OrbitControls, SceneContext) {
    let mut camera = Camera::new().at([0.0, 0.0, 10.0]).with_aspect(1.0);
    camera.look_at(Vec3::ZERO);
    let mut controls = OrbitControls::new(&camera);
    controls.set_viewport(1000.0, 1000.0);
    (camera, controls, SceneContext::new())
}

fn drain(controls: &mut OrbitControls) -> Vec<ControlEvent> {
    controls.drain_events().collect()
}

mod gesture_tests {
    use super::*;

    #[test]
    fn motionless_tap_fires_target_and_scene_events() {
        let (mut camera, mut controls, mut scene) = rig();
        let target = scene.world.spawn((
            Transform::new().position(Vec3::ZERO),
            Collider::sphere(1.0),
        ));
        controls.register_tap_target(target);

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        let events = drain(&mut controls);
        assert!(
            events.contains(&ControlEvent::TapTarget(target)),
            "tap on the target should fire, got {events:?}"
        );
        assert!(
            events.contains(&ControlEvent::SceneTapped),
            "every tap fires the generic scene event"
        );
    }

    #[test]
    fn scene_tapped_fires_even_without_a_hit() {
        let (mut camera, mut controls, mut scene) = rig();

        // Tap in a corner, far away from anything.
        controls.pointer_down(Vec2::new(10.0, 10.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        let events = drain(&mut controls);
        assert!(!events.iter().any(|e| matches!(e, ControlEvent::TapTarget(_))));
        assert!(events.contains(&ControlEvent::SceneTapped));
    }

    #[test]
    fn drag_suppresses_the_tap() {
        let (mut camera, mut controls, mut scene) = rig();
        let target = scene.world.spawn((
            Transform::new().position(Vec3::ZERO),
            Collider::sphere(1.0),
        ));
        controls.register_tap_target(target);

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(540.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        let events = drain(&mut controls);
        assert!(
            !events.contains(&ControlEvent::SceneTapped),
            "a 40px drag is not a tap"
        );
    }

    #[test]
    fn every_intersected_target_fires_not_just_the_first() {
        let (mut camera, mut controls, mut scene) = rig();
        // Both spheres sit on the center ray, one behind the other.
        let near = scene.world.spawn((
            Transform::new().position(Vec3::ZERO),
            Collider::sphere(1.0),
        ));
        let far = scene.world.spawn((
            Transform::new().position([0.0, 0.0, -5.0]),
            Collider::sphere(1.0),
        ));
        controls.register_tap_target(near);
        controls.register_tap_target(far);

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        let taps: Vec<_> = drain(&mut controls)
            .into_iter()
            .filter_map(|e| match e {
                ControlEvent::TapTarget(entity) => Some(entity),
                _ => None,
            })
            .collect();
        assert_eq!(taps, vec![near, far], "all hits fire, in registration order");
    }

    #[test]
    fn one_finger_touch_dollies_instead_of_rotating() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.update(&mut camera, &mut scene, 0.016);
        let start_azimuth = controls.azimuthal_angle();

        controls.touch_start(&[Vec2::new(500.0, 500.0)]);
        assert_eq!(controls.state(), ControlState::Dolly);

        controls.touch_move(&mut camera, &[Vec2::new(500.0, 600.0)]);
        controls.touch_end();
        controls.update(&mut camera, &mut scene, 0.016);

        let radius = camera.position.length();
        assert!(
            radius < 10.0 - 1e-3,
            "downward touch drag should dolly in, radius {radius}"
        );
        assert!(
            (controls.azimuthal_angle() - start_azimuth).abs() < 1e-6,
            "touch drag must not rotate"
        );
    }

    #[test]
    fn pinch_spread_dollies_in() {
        let (mut camera, mut controls, mut scene) = rig();

        controls.touch_start(&[Vec2::new(450.0, 500.0), Vec2::new(550.0, 500.0)]);
        controls.touch_move(
            &mut camera,
            &[Vec2::new(400.0, 500.0), Vec2::new(600.0, 500.0)],
        );
        controls.touch_end();
        controls.update(&mut camera, &mut scene, 0.016);

        assert!(camera.position.length() < 10.0 - 1e-3);
    }

    #[test]
    fn disabled_controller_ignores_input() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.enabled = false;

        controls.pointer_down(Vec2::new(500.0, 500.0));
        assert_eq!(controls.state(), ControlState::None);

        controls.pointer_move(Vec2::new(700.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        assert!(drain(&mut controls).is_empty());
    }
}

mod programmatic_move_tests {
    use super::*;

    #[test]
    fn move_in_lands_on_target_and_completes_once() {
        let (mut camera, mut controls, mut scene) = rig();

        controls.move_in(&camera, Vec3::new(0.0, 0.0, 4.0), 0.5);

        let mut completions = 0;
        for _ in 0..100 {
            controls.update(&mut camera, &mut scene, 0.02);
            completions += drain(&mut controls)
                .iter()
                .filter(|e| **e == ControlEvent::MoveComplete)
                .count();
        }

        assert_eq!(completions, 1, "exactly one completion notification");
        assert!(
            (camera.position - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-3,
            "camera should land on the move target, got {:?}",
            camera.position
        );
    }

    #[test]
    fn tween_target_outside_bounds_snaps_on_update() {
        let (mut camera, mut controls, mut scene) = rig();
        controls.min_distance = 8.0;

        // The tween aims inside the minimum distance; every update clamps
        // the interpolated position back out to the bound.
        controls.move_in(&camera, Vec3::new(0.0, 0.0, 2.0), 0.3);
        for _ in 0..50 {
            controls.update(&mut camera, &mut scene, 0.02);
            let radius = camera.position.length();
            assert!(
                radius >= 8.0 - 1e-3,
                "clamp must hold during the move, radius {radius}"
            );
        }

        assert!((camera.position.length() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn reset_to_start_returns_to_saved_pose() {
        let (mut camera, mut controls, mut scene) = rig();
        let home = camera.position;

        // Wander off with a drag and a zoom.
        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(700.0, 600.0));
        controls.pointer_up();
        controls.wheel(&mut camera, -120.0);
        controls.update(&mut camera, &mut scene, 0.016);
        assert!((camera.position - home).length() > 0.1);

        controls.reset_to_start(&camera);
        for _ in 0..100 {
            controls.update(&mut camera, &mut scene, 0.02);
        }

        assert!(
            (camera.position - home).length() < 1e-2,
            "expected {home:?}, got {:?}",
            camera.position
        );
    }

    #[test]
    fn instant_reset_restores_pose_and_zoom() {
        let (mut camera, mut controls, mut scene) = rig();
        let home = camera.position;
        controls.save_state(&camera);

        controls.pointer_down(Vec2::new(500.0, 500.0));
        controls.pointer_move(Vec2::new(800.0, 500.0));
        controls.pointer_up();
        controls.update(&mut camera, &mut scene, 0.016);

        controls.reset(&mut camera);
        controls.update(&mut camera, &mut scene, 0.016);
        assert!((camera.position - home).length() < 1e-4);
    }
}

mod motion_channel_tests {
    use super::*;

    #[test]
    fn shake_spike_emits_event() {
        let (_, mut controls, _) = rig();

        controls.device_motion(Vec3::new(0.1, 9.8, 0.2), 0.0);
        controls.device_motion(Vec3::new(400.0, 300.0, 200.0), 20.0);

        let events = drain(&mut controls);
        assert!(events.contains(&ControlEvent::Shake), "got {events:?}");
    }

    #[test]
    fn gentle_motion_does_not_shake() {
        let (_, mut controls, _) = rig();

        controls.device_motion(Vec3::new(0.1, 9.8, 0.2), 0.0);
        controls.device_motion(Vec3::new(0.15, 9.81, 0.22), 20.0);
        controls.device_motion(Vec3::new(0.1, 9.79, 0.21), 40.0);

        assert!(drain(&mut controls).is_empty());
    }

    #[test]
    fn rapid_samples_are_debounced() {
        let (_, mut controls, _) = rig();

        controls.device_motion(Vec3::new(0.0, 9.8, 0.0), 0.0);
        // Huge spike, but within the 10ms debounce window.
        controls.device_motion(Vec3::new(500.0, 500.0, 500.0), 5.0);

        assert!(drain(&mut controls).is_empty());
    }
}
