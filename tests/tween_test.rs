use std::time::Duration;

use orbit_scenes::{
    data_structures::scene_graph::{Geometry, Material, NodeId, Scene, Transform},
    flow::SceneFlow,
    frame_loop::{FrameContext, FrameTime},
    input::Viewport,
    scenes::cube::CubeFlow,
    tween::{Ease, Tween, TweenProperty, Tweens},
};

use crate::common::test_utils::assert_close;

mod common;

fn scene_with_node() -> (Scene, NodeId) {
    let mut scene = Scene::new();
    let geometry = scene.add_geometry(Geometry::Box {
        width: 1.0,
        height: 1.0,
        depth: 1.0,
    });
    let material = scene.add_material(Material::Basic { colour: 0xffffff });
    let node = scene.add_mesh(geometry, material, Transform::default()).unwrap();
    (scene, node)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn step(flow: &mut CubeFlow, frame: &mut FrameContext, delta: Duration) {
    flow.on_update(
        frame,
        FrameTime {
            delta,
            ..Default::default()
        },
    );
}

#[test]
fn cube_moves_to_two_after_the_delay() {
    let mut flow = CubeFlow::default();
    let mut frame = FrameContext::new(Viewport::fixed(800, 600));
    flow.on_init(&mut frame);
    let cube = flow.cube().unwrap();
    let x = |frame: &FrameContext| frame.scene.node(cube).transform.position.x;

    step(&mut flow, &mut frame, ms(500));
    assert_eq!(x(&frame), 0.0);
    step(&mut flow, &mut frame, ms(500));
    assert_eq!(x(&frame), 0.0);
    step(&mut flow, &mut frame, ms(500));
    // power1.out at t = 0.5
    assert_close(x(&frame), 1.5);
    step(&mut flow, &mut frame, ms(600));
    assert_eq!(x(&frame), 2.0);
    assert!(flow.tweens.is_empty());

    step(&mut flow, &mut frame, ms(600));
    assert_eq!(x(&frame), 2.0);
}

#[test]
fn start_value_is_read_when_the_delay_ends() {
    let (mut scene, node) = scene_with_node();
    let mut tweens = Tweens::new();
    tweens.to(node, TweenProperty::PositionY, 4.0, ms(1000), ms(200));

    tweens.advance(ms(100), &mut scene);
    scene.node_mut(node).transform.position.y = 2.0;
    tweens.advance(ms(100), &mut scene);
    assert_close(scene.node(node).transform.position.y, 2.0);

    tweens.advance(ms(500), &mut scene);
    assert_close(scene.node(node).transform.position.y, 2.0 + 2.0 * 0.75);
}

#[test]
fn linear_tweens_on_rotation() {
    let (mut scene, node) = scene_with_node();
    let mut tweens = Tweens::new();
    tweens.add(
        Tween::new(node, TweenProperty::RotationZ, 1.0, ms(1000), Duration::ZERO)
            .with_ease(Ease::Linear),
    );

    tweens.advance(ms(250), &mut scene);
    assert_close(scene.node(node).transform.rotation.z, 0.25);
    tweens.advance(ms(1000), &mut scene);
    assert_eq!(scene.node(node).transform.rotation.z, 1.0);
    assert!(tweens.is_empty());
}

#[test]
fn zero_duration_jumps_to_target() {
    let (mut scene, node) = scene_with_node();
    let mut tweens = Tweens::new();
    tweens.to(node, TweenProperty::PositionZ, -3.0, Duration::ZERO, Duration::ZERO);

    tweens.advance(Duration::ZERO, &mut scene);
    assert_eq!(scene.node(node).transform.position.z, -3.0);
    assert_eq!(tweens.len(), 0);
}
