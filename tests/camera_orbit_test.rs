use std::{f32::consts::PI, time::Duration};

use orbit_scenes::{
    EuclideanSpace, InnerSpace, Point3,
    camera::{Camera, OrbitConfig, OrbitControls, cursor_orbit_position},
    flow::SceneFlow,
    frame_loop::{FrameContext, FrameTime},
    input::{Cursor, InputEvent, PointerButton, Viewport},
    scenes::cube::CubeFlow,
};

use crate::common::test_utils::assert_close;

mod common;

#[test]
fn centered_cursor_puts_camera_in_front() {
    for cy in [-0.5, -0.1, 0.0, 0.3, 0.5] {
        let position = cursor_orbit_position(&Cursor { x: 0.0, y: cy }, 3.0);
        assert_close(position.x, 0.0);
        assert_close(position.y, 3.0 * cy as f32);
        assert_close(position.z, 3.0);
    }
}

#[test]
fn cursor_x_spans_a_full_turn() {
    let quarter = cursor_orbit_position(&Cursor { x: 0.25, y: 0.0 }, 3.0);
    assert_close(quarter.x, 3.0);
    assert_close(quarter.z, 0.0);

    let left = cursor_orbit_position(&Cursor { x: -0.5, y: 0.0 }, 3.0);
    let right = cursor_orbit_position(&Cursor { x: 0.5, y: 0.0 }, 3.0);
    assert_close(left.z, -3.0);
    assert_close(right.z, -3.0);
}

#[test]
fn cube_camera_follows_cursor_and_looks_at_cube() {
    let mut flow = CubeFlow::default();
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    flow.on_init(&mut frame);
    assert_close(frame.projection.aspect, 800.0 / 600.0);

    frame.cursor = Cursor { x: 0.1, y: -0.2 };
    flow.on_update(&mut frame, FrameTime::default());

    let expected = cursor_orbit_position(&frame.cursor, 3.0);
    assert_close(frame.camera.position.x, expected.x);
    assert_close(frame.camera.position.y, expected.y);
    assert_close(frame.camera.position.z, expected.z);
    assert_eq!(frame.camera.target, Point3::origin());
}

#[test]
fn cube_camera_tracks_tweened_cube() {
    let mut flow = CubeFlow::default();
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    flow.on_init(&mut frame);

    let step = FrameTime {
        delta: Duration::from_millis(2500),
        ..Default::default()
    };
    flow.on_update(&mut frame, step);

    assert_close(frame.camera.target.x, 2.0);
    assert_close(frame.camera.target.y, 0.0);
}

#[test]
fn drag_rotates_with_damping() {
    let viewport = Viewport::fixed(800, 600);
    let mut controls = OrbitControls::new(OrbitConfig::default());
    let mut camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));

    controls.handle_input(&InputEvent::PointerMoved { x: 100.0, y: 100.0 }, &viewport);
    controls.handle_input(
        &InputEvent::PointerButton {
            button: PointerButton::Primary,
            pressed: true,
        },
        &viewport,
    );
    controls.handle_input(&InputEvent::PointerMoved { x: 130.0, y: 100.0 }, &viewport);

    let (theta, phi) = controls.pending_rotation();
    assert_close(theta, -2.0 * PI * 30.0 / 600.0);
    assert_close(phi, 0.0);

    assert!(controls.update(&mut camera));
    // only a damping fraction of the drag is applied per frame
    let azimuth = camera.position.x.atan2(camera.position.z);
    assert_close(azimuth, theta * 0.05);
    assert_close(controls.pending_rotation().0, theta * 0.95);
    assert_close(camera.position.to_vec().magnitude(), 5.0);

    for _ in 0..200 {
        controls.update(&mut camera);
    }
    let azimuth = camera.position.x.atan2(camera.position.z);
    assert!((azimuth - theta).abs() < 1e-3);
}

#[test]
fn pointer_moves_without_button_do_not_rotate() {
    let viewport = Viewport::fixed(800, 600);
    let mut controls = OrbitControls::new(OrbitConfig::default());

    controls.handle_input(&InputEvent::PointerMoved { x: 0.0, y: 0.0 }, &viewport);
    controls.handle_input(&InputEvent::PointerMoved { x: 300.0, y: 200.0 }, &viewport);

    assert_eq!(controls.pending_rotation(), (0.0, 0.0));
    assert!(!controls.is_rotating());
}

#[test]
fn polar_angle_stays_off_the_poles() {
    let config = OrbitConfig {
        enable_damping: false,
        ..Default::default()
    };
    let mut controls = OrbitControls::new(config);
    let mut camera = Camera::new((0.0, 0.0, 5.0), (0.0, 0.0, 0.0));

    controls.rotate_up(10.0);
    controls.update(&mut camera);

    // clamped just short of the pole, still on the +z side
    assert_close(camera.position.y, 5.0);
    assert!(camera.position.z > 0.0);
    assert_close(camera.position.to_vec().magnitude(), 5.0);
    assert_eq!(controls.pending_rotation(), (0.0, 0.0));
}
